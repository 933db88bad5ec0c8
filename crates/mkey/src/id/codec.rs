use core::{fmt, str::FromStr};

use super::Id;
use crate::{
    DecodeError, Encoding,
    encoding::{BASE32, BASE58, decode_base64, decode_radix, encode_base64, encode_radix},
};

impl Id {
    /// Big-endian bits of the ID, reinterpreted as unsigned.
    #[allow(clippy::cast_sign_loss)]
    const fn bits(&self) -> u64 {
        self.to_raw() as u64
    }

    #[allow(clippy::cast_possible_wrap)]
    const fn from_bits(bits: u64) -> Self {
        Self::from_raw(bits as i64)
    }

    /// Signed base-2 text, without leading zeros.
    ///
    /// ```
    /// use mkey::Id;
    ///
    /// assert_eq!(Id::from_raw(5).base2(), "101");
    /// assert_eq!(Id::from_raw(-5).base2(), "-101");
    /// ```
    #[must_use]
    pub fn base2(&self) -> String {
        let raw = self.to_raw();
        if raw < 0 {
            format!("-{:b}", raw.unsigned_abs())
        } else {
            format!("{raw:b}")
        }
    }

    /// Radix-32 over the `7w3x5h9k2m4p6q8r1sdyfgjtnvzbcaeu` alphabet, most
    /// significant digit first.
    ///
    /// ```
    /// use mkey::Id;
    ///
    /// assert_eq!(Id::from_raw(0).base32(), "7");
    /// assert_eq!(Id::from_raw(33).base32(), "ww");
    /// ```
    #[must_use]
    pub fn base32(&self) -> String {
        encode_radix(self.bits(), &BASE32)
    }

    /// Radix-58 over the Bitcoin-style alphabet, most significant digit first.
    ///
    /// ```
    /// use mkey::Id;
    ///
    /// assert_eq!(Id::from_raw(0).base58(), "1");
    /// assert_eq!(Id::from_raw(58).base58(), "21");
    /// ```
    #[must_use]
    pub fn base58(&self) -> String {
        encode_radix(self.bits(), &BASE58)
    }

    /// URL-safe, unpadded base64 of the big-endian bytes with leading zero
    /// bytes stripped, so small IDs give short strings and zero gives `""`.
    #[must_use]
    pub fn base64(&self) -> String {
        encode_base64(self.bits())
    }

    /// The full-width, 8-byte big-endian form used for storage and
    /// transmission.
    #[must_use]
    pub const fn to_bytes(&self) -> [u8; 8] {
        self.to_raw().to_be_bytes()
    }

    /// Renders the ID in the given encoding.
    #[must_use]
    pub fn encode(&self, encoding: Encoding) -> String {
        match encoding {
            Encoding::Decimal => self.to_string(),
            Encoding::Base2 => self.base2(),
            Encoding::Base32 => self.base32(),
            Encoding::Base58 => self.base58(),
            Encoding::Base64 => self.base64(),
        }
    }

    /// Parses signed base-2 text.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Parse`] if the input is not a valid signed 64-bit
    /// binary integer.
    pub fn parse_base2(input: impl AsRef<[u8]>) -> Result<Self, DecodeError> {
        let digits = text(input.as_ref(), Encoding::Base2)?;
        Ok(Self::from_raw(i64::from_str_radix(digits, 2)?))
    }

    /// Parses the output of [`Id::base32`].
    ///
    /// # Errors
    ///
    /// - [`DecodeError::InvalidCharacter`] at the first byte outside the
    ///   alphabet
    /// - [`DecodeError::Overflow`] if the value needs more than 64 bits
    pub fn parse_base32(input: impl AsRef<[u8]>) -> Result<Self, DecodeError> {
        decode_radix(input.as_ref(), &BASE32).map(Self::from_bits)
    }

    /// Parses the output of [`Id::base58`].
    ///
    /// # Errors
    ///
    /// - [`DecodeError::InvalidCharacter`] at the first byte outside the
    ///   alphabet
    /// - [`DecodeError::Overflow`] if the value needs more than 64 bits
    pub fn parse_base58(input: impl AsRef<[u8]>) -> Result<Self, DecodeError> {
        decode_radix(input.as_ref(), &BASE58).map(Self::from_bits)
    }

    /// Parses the output of [`Id::base64`]. Inputs shorter than eight bytes
    /// are treated as having their leading zero bytes stripped.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::MalformedEncoding`] on a byte outside the URL-safe
    ///   alphabet, padding or non-canonical trailing bits
    /// - [`DecodeError::Overflow`] if it decodes to more than eight bytes
    pub fn parse_base64(input: impl AsRef<[u8]>) -> Result<Self, DecodeError> {
        decode_base64(input.as_ref()).map(Self::from_bits)
    }

    /// Rebuilds an ID from its 8-byte big-endian form.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 8]) -> Self {
        Self::from_raw(i64::from_be_bytes(bytes))
    }

    /// Rebuilds an ID from a byte slice that must be exactly 8 bytes long.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::InvalidLength`] for any other length.
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, DecodeError> {
        let bytes: [u8; 8] = bytes
            .try_into()
            .map_err(|_| DecodeError::InvalidLength { len: bytes.len() })?;
        Ok(Self::from_bytes(bytes))
    }

    /// Parses `input` in the given encoding.
    ///
    /// # Errors
    ///
    /// Returns the error of the matching `parse_*` function.
    pub fn decode(encoding: Encoding, input: impl AsRef<[u8]>) -> Result<Self, DecodeError> {
        let input = input.as_ref();
        match encoding {
            Encoding::Decimal => text(input, Encoding::Decimal)?.parse(),
            Encoding::Base2 => Self::parse_base2(input),
            Encoding::Base32 => Self::parse_base32(input),
            Encoding::Base58 => Self::parse_base58(input),
            Encoding::Base64 => Self::parse_base64(input),
        }
    }
}

/// Decimal and binary text go through `str` parsing. Invalid UTF-8 cannot
/// contain a digit, so it is reported at the first offending byte.
fn text(input: &[u8], encoding: Encoding) -> Result<&str, DecodeError> {
    core::str::from_utf8(input).map_err(|e| {
        let index = e.valid_up_to();
        DecodeError::InvalidCharacter {
            encoding,
            byte: input[index],
            index,
        }
    })
}

impl fmt::Display for Id {
    /// Signed decimal.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_raw(), f)
    }
}

impl FromStr for Id {
    type Err = DecodeError;

    /// Parses signed decimal text.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_raw(s.parse()?))
    }
}

impl From<[u8; 8]> for Id {
    fn from(bytes: [u8; 8]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<Id> for [u8; 8] {
    fn from(id: Id) -> Self {
        id.to_bytes()
    }
}

impl TryFrom<&[u8]> for Id {
    type Error = DecodeError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::try_from_slice(bytes)
    }
}
