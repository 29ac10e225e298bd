use core::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de, ser};

use crate::{ConfigError, Identifier, Layout};

/// Wire shape of a [`Layout`]; validated through [`Layout::new`] on the way
/// in.
#[derive(Serialize, Deserialize)]
pub(crate) struct LayoutRepr {
    pre_bits: u32,
    time_bits: u32,
    node_bits: u32,
    step_bits: u32,
}

impl TryFrom<LayoutRepr> for Layout {
    type Error = ConfigError;

    fn try_from(repr: LayoutRepr) -> Result<Self, Self::Error> {
        Self::new(repr.pre_bits, repr.time_bits, repr.node_bits, repr.step_bits)
    }
}

impl From<Layout> for LayoutRepr {
    fn from(layout: Layout) -> Self {
        Self {
            pre_bits: layout.pre_bits(),
            time_bits: layout.time_bits(),
            node_bits: layout.node_bits(),
            step_bits: layout.step_bits(),
        }
    }
}

/// Identifiers serialize as their canonical text.
impl Serialize for Identifier {
    fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct HexVisitor;

        impl de::Visitor<'_> for HexVisitor {
            type Value = Identifier;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a hex encoded identifier")
            }

            #[inline]
            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Identifier::from_str(v).map_err(de::Error::custom)
            }
        }

        d.deserialize_str(HexVisitor)
    }
}

/// Serialize an [`Identifier`] as its numeric value instead of text.
///
/// The text width is not carried, so only identifiers of
/// [`Layout::DEFAULT`]'s width are accepted in either direction. Store other
/// layouts as text.
pub mod as_raw {
    use super::{Deserialize, Deserializer, Serialize, Serializer, de, ser};
    use crate::{DecodeError, Identifier, Layout};

    /// Serialize a default-layout identifier as a `u128`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The identifier is not [`Layout::DEFAULT`]'s width
    /// - The underlying serializer fails
    pub fn serialize<S>(id: &Identifier, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let expected = Layout::DEFAULT.text_len();
        if id.len() != expected {
            return Err(ser::Error::custom(DecodeError::InvalidLength {
                len: id.len(),
                expected,
            }));
        }
        id.to_raw().serialize(s)
    }

    /// Deserialize an identifier from a `u128` packed with
    /// [`Layout::DEFAULT`].
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The underlying deserializer fails
    /// - The value does not fit in the default layout
    pub fn deserialize<'de, D>(d: D) -> Result<Identifier, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = u128::deserialize(d)?;
        let layout = Layout::DEFAULT;
        if raw.checked_shr(layout.total_bits()).unwrap_or(0) != 0 {
            return Err(de::Error::custom(DecodeError::Overflow { raw }));
        }
        Ok(layout.encode(&layout.unpack(raw)))
    }
}
