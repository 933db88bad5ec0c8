mod alphabet;
mod b64;
mod radix;

pub(crate) use alphabet::{BASE32, BASE58};
pub(crate) use b64::{decode_base64, encode_base64};
pub(crate) use radix::{decode_radix, encode_radix};

use core::{fmt, str::FromStr};

/// The textual encodings an [`crate::Id`] can be rendered in and parsed from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Encoding {
    /// Signed base-10.
    Decimal,
    /// Signed base-2, no zero padding.
    Base2,
    /// Radix-32 over the `7w3x5h9k2m4p6q8r1sdyfgjtnvzbcaeu` alphabet.
    Base32,
    /// Radix-58 over the Bitcoin-style alphabet without `0OIl`.
    Base58,
    /// URL-safe unpadded base64 of the big-endian bytes, leading zero bytes
    /// stripped.
    Base64,
}

impl Encoding {
    /// Every encoding, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Decimal,
        Self::Base2,
        Self::Base32,
        Self::Base58,
        Self::Base64,
    ];

    /// Lower-case name used by [`fmt::Display`] and [`FromStr`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Decimal => "decimal",
            Self::Base2 => "base2",
            Self::Base32 => "base32",
            Self::Base58 => "base58",
            Self::Base64 => "base64",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when an encoding name is not recognized.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown encoding: {0}")]
pub struct UnknownEncoding(pub String);

impl FromStr for Encoding {
    type Err = UnknownEncoding;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|e| e.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownEncoding(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_roundtrip_through_from_str() {
        for encoding in Encoding::ALL {
            assert_eq!(encoding.to_string().parse::<Encoding>(), Ok(encoding));
        }
        assert_eq!("BASE58".parse::<Encoding>(), Ok(Encoding::Base58));
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert_eq!(
            "hex".parse::<Encoding>(),
            Err(UnknownEncoding("hex".to_owned()))
        );
    }
}
