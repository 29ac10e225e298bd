use crate::{DecodeError, Fields, Layout, hex};
use core::{cmp::Ordering, fmt, str::FromStr};

/// Maximum length of an identifier's text form (a full 128-bit layout).
pub const MAX_TEXT_LEN: usize = hex::MAX_DIGITS;

/// A generated identifier in its fixed-width text form.
///
/// The text is lowercase hex, zero-padded to the producing layout's
/// [`Layout::text_len`]. It lives in an inline buffer, so identifiers are
/// `Copy` and producing one never allocates.
///
/// Identifiers of the same length compare lexicographically in the same order
/// as their numeric values, which makes the text safe to use as a sortable
/// key.
///
/// # Example
///
/// ```
/// use preflake::{Fields, Identifier, Layout};
///
/// let id = Layout::DEFAULT.encode(&Fields::new(999, 63_804_562, 1, 0));
/// assert_eq!(id, "00000003e70003cd949200010000");
/// assert_eq!(id.len(), 28);
///
/// let parsed: Identifier = "00000003E70003CD949200010000".parse().unwrap();
/// assert_eq!(parsed, id);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identifier {
    raw: u128,
    buf: [u8; MAX_TEXT_LEN],
    len: u8,
}

impl Identifier {
    /// Writes `raw` as `len` hex digits.
    pub(crate) fn encode(raw: u128, len: usize) -> Self {
        debug_assert!(len <= MAX_TEXT_LEN, "identifier wider than 128 bits");
        let mut buf = [b'0'; MAX_TEXT_LEN];
        hex::encode_hex(raw, &mut buf[..len]);
        Self {
            raw,
            buf,
            len: len as u8,
        }
    }

    /// Returns the text form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // SAFETY: `buf` only ever holds ASCII hex digits written by
        // `encode_hex`, so every prefix of it is valid UTF-8.
        unsafe { core::str::from_utf8_unchecked(self.as_bytes()) }
    }

    /// Returns the text form as ASCII bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len as usize]
    }

    /// Number of hex digits.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    /// Always `false` for identifiers produced by a [`Layout`] or parsed from
    /// text.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the numeric value of the identifier.
    #[must_use]
    pub const fn to_raw(&self) -> u128 {
        self.raw
    }

    /// Decodes the fields, checking the text against `layout`.
    ///
    /// # Errors
    ///
    /// See [`Layout::parse`].
    pub fn fields(&self, layout: &Layout) -> Result<Fields, DecodeError> {
        layout.parse(self.as_str())
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw
            .cmp(&other.raw)
            .then_with(|| self.len.cmp(&other.len))
    }
}

impl FromStr for Identifier {
    type Err = DecodeError;

    /// Parses any run of 1 to [`MAX_TEXT_LEN`] hex digits, normalizing it to
    /// lowercase. This does not check the text against a [`Layout`]; use
    /// [`Layout::parse`] for that.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.len() > MAX_TEXT_LEN {
            return Err(DecodeError::LengthOutOfRange {
                len: s.len(),
                min: 1,
                max: MAX_TEXT_LEN,
            });
        }
        let raw = hex::decode_hex(s)?;
        Ok(Self::encode(raw, s.len()))
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq<str> for Identifier {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Identifier {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identifier")
            .field("text", &self.as_str())
            .field("raw", &format_args!("{} (0x{:x})", self.raw, self.raw))
            .finish()
    }
}
