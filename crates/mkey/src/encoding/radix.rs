use super::alphabet::Alphabet;
use crate::DecodeError;

// 64 bits need at most 13 base32 digits and 11 base58 digits.
const MAX_DIGITS: usize = 13;

/// Encodes the 64 raw bits of `value` in `alphabet`, most significant digit
/// first. Zero encodes as the alphabet's first symbol.
pub(crate) fn encode_radix(value: u64, alphabet: &Alphabet) -> String {
    let radix = alphabet.radix();
    let mut buf = [0_u8; MAX_DIGITS];
    let mut start = MAX_DIGITS;
    let mut rest = value;
    loop {
        start -= 1;
        buf[start] = alphabet.symbols[(rest % radix) as usize];
        rest /= radix;
        if rest == 0 {
            break;
        }
    }
    buf[start..].iter().map(|&b| char::from(b)).collect()
}

/// Decodes `input` left to right as `acc = acc * radix + digit`.
///
/// The first byte outside the alphabet aborts with
/// [`DecodeError::InvalidCharacter`]; values wider than 64 bits abort with
/// [`DecodeError::Overflow`]. Empty input decodes to zero.
pub(crate) fn decode_radix(input: &[u8], alphabet: &Alphabet) -> Result<u64, DecodeError> {
    let radix = alphabet.radix();
    let mut acc = 0_u64;
    for (index, &byte) in input.iter().enumerate() {
        let digit = alphabet
            .digit(byte)
            .ok_or(DecodeError::InvalidCharacter {
                encoding: alphabet.encoding,
                byte,
                index,
            })?;
        acc = acc
            .checked_mul(radix)
            .and_then(|acc| acc.checked_add(u64::from(digit)))
            .ok_or(DecodeError::Overflow {
                encoding: alphabet.encoding,
            })?;
    }
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Encoding;
    use crate::encoding::{BASE32, BASE58};

    #[test]
    fn zero_is_the_first_symbol() {
        assert_eq!(encode_radix(0, &BASE32), "7");
        assert_eq!(encode_radix(0, &BASE58), "1");
    }

    #[test]
    fn small_values_use_single_digits() {
        assert_eq!(encode_radix(1, &BASE32), "w");
        assert_eq!(encode_radix(31, &BASE32), "u");
        assert_eq!(encode_radix(32, &BASE32), "w7");
        assert_eq!(encode_radix(57, &BASE58), "Z");
        assert_eq!(encode_radix(58, &BASE58), "21");
    }

    #[test]
    fn full_width_values_fit_the_buffer() {
        assert_eq!(encode_radix(u64::MAX, &BASE32).len(), 13);
        assert_eq!(encode_radix(u64::MAX, &BASE58).len(), 11);
        for alphabet in [&BASE32, &BASE58] {
            let encoded = encode_radix(u64::MAX, alphabet);
            assert_eq!(decode_radix(encoded.as_bytes(), alphabet), Ok(u64::MAX));
        }
    }

    #[test]
    fn encode_decode_preserves_values() {
        for &v in &[
            0,
            1,
            42,
            u64::from(u32::MAX),
            0x1234_5678_90AB_CDEF,
            i64::MAX as u64,
            u64::MAX - 1,
        ] {
            for alphabet in [&BASE32, &BASE58] {
                let encoded = encode_radix(v, alphabet);
                assert_eq!(
                    decode_radix(encoded.as_bytes(), alphabet),
                    Ok(v),
                    "{} roundtrip for {v}: {encoded}",
                    alphabet.encoding
                );
            }
        }
    }

    #[test]
    fn decode_reports_first_invalid_character() {
        assert_eq!(
            decode_radix(b"w7!0", &BASE32),
            Err(DecodeError::InvalidCharacter {
                encoding: Encoding::Base32,
                byte: b'!',
                index: 2,
            })
        );
        assert_eq!(
            decode_radix(b"1l", &BASE58),
            Err(DecodeError::InvalidCharacter {
                encoding: Encoding::Base58,
                byte: b'l',
                index: 1,
            })
        );
    }

    #[test]
    fn decode_rejects_values_wider_than_64_bits() {
        // 13 base32 digits hold 65 bits; 'u' (31) sets the 65th.
        assert_eq!(
            decode_radix(b"uuuuuuuuuuuuu", &BASE32),
            Err(DecodeError::Overflow {
                encoding: Encoding::Base32
            })
        );
        assert_eq!(
            decode_radix(b"ZZZZZZZZZZZZ", &BASE58),
            Err(DecodeError::Overflow {
                encoding: Encoding::Base58
            })
        );
    }

    #[test]
    fn empty_input_decodes_to_zero() {
        assert_eq!(decode_radix(b"", &BASE32), Ok(0));
        assert_eq!(decode_radix(b"", &BASE58), Ok(0));
    }
}
