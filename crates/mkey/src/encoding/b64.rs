use crate::{DecodeError, Encoding};

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";
const NO_VALUE: u8 = 255;
const BITS_PER_CHAR: u32 = 6;

/// Lookup table for URL-safe base64 decoding
const LOOKUP: [u8; 256] = {
    let mut lut = [NO_VALUE; 256];
    let mut i = 0_u8;
    while i < 64 {
        lut[ALPHABET[i as usize] as usize] = i;
        i += 1;
    }
    lut
};

/// URL-safe, unpadded base64 of the big-endian bytes of `value`, with leading
/// zero bytes stripped. Zero therefore encodes as the empty string.
pub(crate) fn encode_base64(value: u64) -> String {
    let bytes = value.to_be_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count();

    let mut out = String::with_capacity(11);
    let mut acc = 0_u16;
    let mut bits = 0;
    for &b in &bytes[skip..] {
        acc = (acc << 8) | u16::from(b);
        bits += 8;
        while bits >= BITS_PER_CHAR {
            bits -= BITS_PER_CHAR;
            out.push(char::from(ALPHABET[usize::from((acc >> bits) & 0x3F)]));
        }
    }
    // Remaining bits are left-aligned in one final symbol
    if bits > 0 {
        out.push(char::from(
            ALPHABET[usize::from((acc << (BITS_PER_CHAR - bits)) & 0x3F)],
        ));
    }
    out
}

/// Inverse of [`encode_base64`]. Shorter inputs are treated as having had
/// their leading zero bytes stripped.
///
/// Padding, the standard `+/` alphabet, a lone trailing symbol and non-zero
/// trailing bits are all rejected with [`DecodeError::MalformedEncoding`].
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn decode_base64(input: &[u8]) -> Result<u64, DecodeError> {
    let mut value = 0_u64;
    let mut decoded = 0;
    let mut acc = 0_u16;
    let mut bits = 0;

    for (index, &byte) in input.iter().enumerate() {
        let digit = LOOKUP[usize::from(byte)];
        if digit == NO_VALUE {
            return Err(DecodeError::MalformedEncoding { index });
        }
        acc = (acc << BITS_PER_CHAR) | u16::from(digit);
        bits += BITS_PER_CHAR;
        if bits >= 8 {
            bits -= 8;
            if decoded == 8 {
                return Err(DecodeError::Overflow {
                    encoding: Encoding::Base64,
                });
            }
            value = (value << 8) | u64::from((acc >> bits) as u8);
            decoded += 1;
        }
    }

    if bits >= BITS_PER_CHAR || acc & ((1_u16 << bits) - 1) != 0 {
        return Err(DecodeError::MalformedEncoding {
            index: input.len() - 1,
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_zero_bytes_are_stripped() {
        assert_eq!(encode_base64(0), "");
        assert_eq!(encode_base64(1), "AQ");
        assert_eq!(encode_base64(0xFF), "_w");
        assert_eq!(encode_base64(0x0100), "AQA");
        assert_eq!(encode_base64(0x0001_0000), "AQAA");
        assert_eq!(encode_base64(u64::MAX), "__________8");
    }

    #[test]
    fn matches_rfc_4648_vectors() {
        // "f", "fo", "foo", "foob", "fooba", "foobar" as big-endian integers
        assert_eq!(encode_base64(0x66), "Zg");
        assert_eq!(encode_base64(0x666F), "Zm8");
        assert_eq!(encode_base64(0x666F_6F), "Zm9v");
        assert_eq!(encode_base64(0x666F_6F62), "Zm9vYg");
        assert_eq!(encode_base64(0x666F_6F62_61), "Zm9vYmE");
        assert_eq!(encode_base64(0x666F_6F62_6172), "Zm9vYmFy");
    }

    #[test]
    fn encode_decode_preserves_values() {
        for &v in &[
            0,
            1,
            0xFF,
            0x0100,
            0xFBFF,
            0x1234_5678_90AB_CDEF,
            i64::MAX as u64,
            u64::MAX,
        ] {
            let encoded = encode_base64(v);
            assert_eq!(decode_base64(encoded.as_bytes()), Ok(v), "{encoded}");
        }
    }

    #[test]
    fn explicit_leading_zero_bytes_are_accepted() {
        assert_eq!(decode_base64(b"AAAB"), Ok(1));
        assert_eq!(decode_base64(b""), Ok(0));
    }

    #[test]
    fn malformed_input_reports_offending_index() {
        assert_eq!(
            decode_base64(b"AQ=="),
            Err(DecodeError::MalformedEncoding { index: 2 })
        );
        assert_eq!(
            decode_base64(b"+w"),
            Err(DecodeError::MalformedEncoding { index: 0 })
        );
        // a single symbol cannot carry a whole byte
        assert_eq!(
            decode_base64(b"A"),
            Err(DecodeError::MalformedEncoding { index: 0 })
        );
        // 'R' leaves a set bit below the last whole byte
        assert_eq!(
            decode_base64(b"AR"),
            Err(DecodeError::MalformedEncoding { index: 1 })
        );
    }

    #[test]
    fn more_than_eight_bytes_overflow() {
        // 9 bytes of 0x01
        assert_eq!(
            decode_base64(b"AQEBAQEBAQEB"),
            Err(DecodeError::Overflow {
                encoding: Encoding::Base64
            })
        );
        // zero bytes count too
        assert_eq!(
            decode_base64(b"AAAAAAAAAAAA"),
            Err(DecodeError::Overflow {
                encoding: Encoding::Base64
            })
        );
    }
}
