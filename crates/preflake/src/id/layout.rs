use crate::{ConfigError, DecodeError, Identifier, hex};

/// The four fields carried by an identifier.
///
/// Field order matches the bit layout, most significant first, so the derived
/// ordering of in-range `Fields` equals the numeric ordering of their packed
/// identifiers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fields {
    /// Caller-supplied value (partition key).
    pub pre: u64,
    /// Milliseconds since the generator's epoch.
    pub time: u64,
    /// Issuing node.
    pub node: u64,
    /// Sequence within the millisecond.
    pub step: u64,
}

impl Fields {
    #[must_use]
    pub const fn new(pre: u64, time: u64, node: u64, step: u64) -> Self {
        Self {
            pre,
            time,
            node,
            step,
        }
    }
}

/// Bit widths of the four identifier fields.
///
/// Fields are laid out from **most significant bit (MSB)** to **least
/// significant bit (LSB)** in this exact order: `pre`, `time`, `node`, `step`.
/// Each field is 1 to 64 bits wide and the total must fit in 128 bits. The
/// canonical text form is lowercase hex, zero-padded to
/// [`Layout::text_len`] digits.
///
/// The [`Layout::DEFAULT`] layout:
///
/// ```text
///  Bit Index:  111          72 71           32 31         16 15          0
///              +--------------+---------------+-------------+------------+
///  Field:      |   pre (40)   |   time (40)   |  node (16)  | step (16)  |
///              +--------------+---------------+-------------+------------+
///              |<------------------ MSB -- 112 bits -- LSB ------------->|
/// ```
///
/// # Example
///
/// ```
/// use preflake::{Fields, Layout};
///
/// let layout = Layout::new(24, 41, 10, 12).unwrap();
/// assert_eq!(layout.total_bits(), 87);
/// assert_eq!(layout.text_len(), 22);
///
/// let fields = Fields::new(7, 1_000, 3, 9);
/// let id = layout.encode(&fields);
/// assert_eq!(layout.parse(id.as_str()).unwrap(), fields);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "crate::serde::LayoutRepr", into = "crate::serde::LayoutRepr")
)]
pub struct Layout {
    pre_bits: u32,
    time_bits: u32,
    node_bits: u32,
    step_bits: u32,
}

impl Default for Layout {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Layout {
    /// 40-bit pre, 40-bit time (about 34 years of milliseconds), 16-bit node
    /// and 16-bit step: 112 bits, 28 hex digits.
    pub const DEFAULT: Self = Self {
        pre_bits: 40,
        time_bits: 40,
        node_bits: 16,
        step_bits: 16,
    };

    /// Builds a layout from explicit field widths.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidLayout`] if any width is zero or above 64
    /// bits, or if the widths sum to more than 128 bits.
    pub const fn new(
        pre_bits: u32,
        time_bits: u32,
        node_bits: u32,
        step_bits: u32,
    ) -> Result<Self, ConfigError> {
        let widths = [pre_bits, time_bits, node_bits, step_bits];
        let mut i = 0;
        while i < widths.len() {
            if widths[i] == 0 {
                return Err(ConfigError::InvalidLayout {
                    reason: "field widths must be at least 1 bit",
                });
            }
            if widths[i] > u64::BITS {
                return Err(ConfigError::InvalidLayout {
                    reason: "field widths must be at most 64 bits",
                });
            }
            i += 1;
        }
        if pre_bits + time_bits + node_bits + step_bits > u128::BITS {
            return Err(ConfigError::InvalidLayout {
                reason: "field widths must sum to at most 128 bits",
            });
        }
        Ok(Self {
            pre_bits,
            time_bits,
            node_bits,
            step_bits,
        })
    }

    #[must_use]
    pub const fn pre_bits(&self) -> u32 {
        self.pre_bits
    }
    #[must_use]
    pub const fn time_bits(&self) -> u32 {
        self.time_bits
    }
    #[must_use]
    pub const fn node_bits(&self) -> u32 {
        self.node_bits
    }
    #[must_use]
    pub const fn step_bits(&self) -> u32 {
        self.step_bits
    }

    /// Total width of the packed identifier in bits.
    #[must_use]
    pub const fn total_bits(&self) -> u32 {
        self.pre_bits + self.time_bits + self.node_bits + self.step_bits
    }

    /// Fixed number of hex digits in the text form.
    #[must_use]
    pub const fn text_len(&self) -> usize {
        hex::digits_for(self.total_bits())
    }

    // Widths are validated to 1..=64, so the shift is in 0..=63.
    const fn mask(bits: u32) -> u64 {
        u64::MAX >> (u64::BITS - bits)
    }

    /// Largest value the `pre` field can hold.
    #[must_use]
    pub const fn max_pre(&self) -> u64 {
        Self::mask(self.pre_bits)
    }
    /// Largest value the `time` field can hold. This is the identifier's
    /// wrap-around horizon in milliseconds since the epoch: past it the time
    /// field wraps to zero and identifiers are no longer guaranteed unique.
    #[must_use]
    pub const fn max_time(&self) -> u64 {
        Self::mask(self.time_bits)
    }
    /// Largest value the `node` field can hold.
    #[must_use]
    pub const fn max_node(&self) -> u64 {
        Self::mask(self.node_bits)
    }
    /// Largest value the `step` field can hold.
    #[must_use]
    pub const fn max_step(&self) -> u64 {
        Self::mask(self.step_bits)
    }

    const fn node_shift(&self) -> u32 {
        self.step_bits
    }
    const fn time_shift(&self) -> u32 {
        self.node_shift() + self.node_bits
    }
    const fn pre_shift(&self) -> u32 {
        self.time_shift() + self.time_bits
    }

    /// Returns `true` if every field fits its width.
    #[must_use]
    pub const fn contains(&self, fields: &Fields) -> bool {
        fields.pre <= self.max_pre()
            && fields.time <= self.max_time()
            && fields.node <= self.max_node()
            && fields.step <= self.max_step()
    }

    /// Packs the fields into their raw integer form. Each field is masked to
    /// its width; use [`Layout::contains`] first if truncation matters.
    #[must_use]
    pub const fn pack(&self, fields: &Fields) -> u128 {
        ((fields.pre & self.max_pre()) as u128) << self.pre_shift()
            | ((fields.time & self.max_time()) as u128) << self.time_shift()
            | ((fields.node & self.max_node()) as u128) << self.node_shift()
            | (fields.step & self.max_step()) as u128
    }

    /// Extracts the fields from a raw packed value. Bits above
    /// [`Layout::total_bits`] are ignored.
    #[must_use]
    pub const fn unpack(&self, raw: u128) -> Fields {
        Fields {
            pre: (raw >> self.pre_shift()) as u64 & self.max_pre(),
            time: (raw >> self.time_shift()) as u64 & self.max_time(),
            node: (raw >> self.node_shift()) as u64 & self.max_node(),
            step: raw as u64 & self.max_step(),
        }
    }

    /// Encodes the fields into their fixed-width text form.
    #[must_use]
    pub fn encode(&self, fields: &Fields) -> Identifier {
        Identifier::encode(self.pack(fields), self.text_len())
    }

    /// Decodes identifier text produced with this layout.
    ///
    /// Both lower- and upper-case hex digits are accepted.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::InvalidLength`] if `text` is not exactly
    ///   [`Layout::text_len`] bytes
    /// - [`DecodeError::InvalidChar`] on any byte outside `[0-9a-fA-F]`
    /// - [`DecodeError::Overflow`] if the padding bits above
    ///   [`Layout::total_bits`] are set
    pub fn parse(&self, text: &str) -> Result<Fields, DecodeError> {
        let expected = self.text_len();
        if text.len() != expected {
            return Err(DecodeError::InvalidLength {
                len: text.len(),
                expected,
            });
        }
        let raw = hex::decode_hex(text)?;
        if raw.checked_shr(self.total_bits()).unwrap_or(0) != 0 {
            return Err(DecodeError::Overflow { raw });
        }
        Ok(self.unpack(raw))
    }
}

/// Decodes identifier text produced with [`Layout::DEFAULT`].
///
/// ```
/// let fields = preflake::parse("00000003e70003cd949200010000").unwrap();
/// assert_eq!(fields.pre, 999);
/// assert_eq!(fields.node, 1);
/// ```
///
/// # Errors
///
/// See [`Layout::parse`].
pub fn parse(text: &str) -> Result<Fields, DecodeError> {
    Layout::DEFAULT.parse(text)
}
