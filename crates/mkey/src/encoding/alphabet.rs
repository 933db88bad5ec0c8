use crate::Encoding;

const NO_VALUE: u8 = 255;

/// A radix alphabet together with its reverse lookup table.
pub(crate) struct Alphabet {
    pub(crate) encoding: Encoding,
    pub(crate) symbols: &'static [u8],
    pub(crate) lookup: [u8; 256],
}

impl Alphabet {
    const fn new(encoding: Encoding, symbols: &'static [u8]) -> Self {
        Self {
            encoding,
            symbols,
            lookup: lookup_table(symbols),
        }
    }

    pub(crate) const fn radix(&self) -> u64 {
        self.symbols.len() as u64
    }

    /// Digit value of `byte`, or `None` if it is not part of the alphabet.
    #[inline]
    pub(crate) const fn digit(&self, byte: u8) -> Option<u8> {
        match self.lookup[byte as usize] {
            NO_VALUE => None,
            d => Some(d),
        }
    }
}

/// Builds the byte-to-digit table at compile time. Bytes outside the alphabet
/// map to `NO_VALUE`.
const fn lookup_table(symbols: &[u8]) -> [u8; 256] {
    let mut lut = [NO_VALUE; 256];
    let mut i = 0;
    while i < symbols.len() {
        lut[symbols[i] as usize] = i as u8;
        i += 1;
    }
    lut
}

pub(crate) static BASE32: Alphabet =
    Alphabet::new(Encoding::Base32, b"7w3x5h9k2m4p6q8r1sdyfgjtnvzbcaeu");

pub(crate) static BASE58: Alphabet = Alphabet::new(
    Encoding::Base58,
    b"123456789abcdefghijkmnopqrstuvwxyzABCDEFGHJKLMNPQRSTUVWXYZ",
);

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_bijective(alphabet: &Alphabet) {
        for (value, &symbol) in alphabet.symbols.iter().enumerate() {
            assert_eq!(alphabet.digit(symbol), Some(value as u8));
        }
        let known = (0..=255_u8)
            .filter(|b| alphabet.digit(*b).is_some())
            .count();
        assert_eq!(known, alphabet.symbols.len());
    }

    #[test]
    fn base32_table_is_bijective() {
        assert_eq!(BASE32.radix(), 32);
        assert_bijective(&BASE32);
    }

    #[test]
    fn base58_table_is_bijective() {
        assert_eq!(BASE58.radix(), 58);
        assert_bijective(&BASE58);
    }

    #[test]
    fn base58_skips_ambiguous_symbols() {
        for byte in *b"0OIl" {
            assert_eq!(BASE58.digit(byte), None);
        }
    }

    #[test]
    fn base32_is_case_sensitive() {
        assert_eq!(BASE32.digit(b'w'), Some(1));
        assert_eq!(BASE32.digit(b'W'), None);
    }
}
