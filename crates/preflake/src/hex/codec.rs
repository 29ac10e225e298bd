use crate::DecodeError;

const ALPHABET: &[u8; 16] = b"0123456789abcdef";
const NO_VALUE: u8 = 255;
const BITS_PER_CHAR: u32 = 4;
const DIGIT_MASK: u128 = 0xF;

/// Maximum number of hex digits a `u128` can occupy.
pub(crate) const MAX_DIGITS: usize = (u128::BITS / BITS_PER_CHAR) as usize;

/// Lookup table for hex decoding
const LOOKUP: [u8; 256] = {
    let mut lut = [NO_VALUE; 256];
    let mut i = 0_u8;
    // Main alphabet, allow upper-case
    while i < 16 {
        let c = ALPHABET[i as usize];
        lut[c as usize] = i;
        if c.is_ascii_lowercase() {
            lut[(c - 32) as usize] = i; // upper-case letter
        }
        i += 1;
    }
    lut
};

/// Number of hex digits needed to hold `bits` bits.
pub(crate) const fn digits_for(bits: u32) -> usize {
    bits.div_ceil(BITS_PER_CHAR) as usize
}

/// Writes `raw` as lowercase hex into `buf`, most significant digit first,
/// left-padded with zeros to exactly `buf.len()` digits.
///
/// Digits of `raw` that do not fit in `buf` are dropped; callers size the
/// buffer from the layout so this never happens for packed identifiers.
#[inline]
pub(crate) fn encode_hex(raw: u128, buf: &mut [u8]) {
    let mut acc = raw;
    for slot in buf.iter_mut().rev() {
        *slot = ALPHABET[(acc & DIGIT_MASK) as usize];
        acc >>= BITS_PER_CHAR;
    }
}

/// Decodes a hex string of at most [`MAX_DIGITS`] digits into a `u128`.
///
/// Returns an error if the input contains a byte outside `[0-9a-fA-F]`. The
/// length is the caller's concern.
#[inline]
pub(crate) fn decode_hex(encoded: &str) -> Result<u128, DecodeError> {
    debug_assert!(encoded.len() <= MAX_DIGITS, "hex input wider than u128");
    let mut acc = 0_u128;
    for (index, byte) in encoded.bytes().enumerate() {
        let val = LOOKUP[byte as usize];
        if val == NO_VALUE {
            return Err(DecodeError::InvalidChar { byte, index });
        }
        acc = (acc << BITS_PER_CHAR) | u128::from(val);
    }
    Ok(acc)
}
