use core::num::ParseIntError;

use crate::Encoding;

/// A result type defaulting to the crate-wide [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors that `mkey` can produce.
///
/// Errors are reported synchronously and are never retried internally. None of
/// the fallible operations hand back a partially built value alongside an
/// error.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The generator configuration describes an invalid bit layout or node.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A batch was requested with a count of zero or a count larger than the
    /// per-millisecond sequence capacity.
    #[error("batch count must be between 1 and {max}, got {count}")]
    InvalidBatchCount {
        /// The rejected count.
        count: usize,
        /// The largest accepted count (the layout's step mask).
        max: i64,
    },

    /// An encoded identifier could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The operating system entropy source could not be read.
    #[error("random source unavailable: {reason}")]
    RandomSource {
        /// Description reported by the entropy source.
        reason: String,
    },
}

/// Bit-layout and node-range violations found while validating a
/// [`crate::Config`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// `node_bits` exceeds [`crate::MAX_NODE_BITS`].
    #[error("node bits must be <= {max}, got {bits}")]
    NodeBitsTooLarge { bits: u8, max: u8 },

    /// `step_bits` exceeds [`crate::MAX_STEP_BITS`].
    #[error("step bits must be <= {max}, got {bits}")]
    StepBitsTooLarge { bits: u8, max: u8 },

    /// `node_bits + step_bits` leaves fewer than 41 bits for the timestamp.
    #[error("node bits + step bits must be <= {max}, got {node_bits} + {step_bits}")]
    LayoutTooWide {
        node_bits: u8,
        step_bits: u8,
        max: u8,
    },

    /// The node number does not fit in `node_bits`.
    #[error("node must be between 0 and {max}, got {node}")]
    NodeOutOfRange { node: i64, max: i64 },
}

/// Failures while turning an encoded string or byte slice back into an
/// [`crate::Id`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// A byte outside the alphabet of `encoding` was found at `index`.
    #[error("invalid {encoding} character {byte:#04x} at index {index}")]
    InvalidCharacter {
        encoding: Encoding,
        byte: u8,
        index: usize,
    },

    /// Base64 input is structurally invalid at `index`: a byte outside the
    /// URL-safe alphabet, a lone trailing symbol or non-zero trailing bits.
    #[error("malformed base64 at index {index}")]
    MalformedEncoding { index: usize },

    /// Decimal or binary text is not a valid signed 64-bit integer.
    #[error("invalid integer: {0}")]
    Parse(#[from] ParseIntError),

    /// The input denotes a value wider than 64 bits.
    #[error("{encoding} input does not fit in 64 bits")]
    Overflow { encoding: Encoding },

    /// A raw byte form was not exactly 8 bytes long.
    #[error("expected 8 bytes, got {len}")]
    InvalidLength { len: usize },
}

impl From<ParseIntError> for Error {
    fn from(err: ParseIntError) -> Self {
        Self::Decode(DecodeError::Parse(err))
    }
}
