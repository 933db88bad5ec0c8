//! JSON and other serde formats.
//!
//! An [`Id`] serializes as a bare signed 64-bit integer, so JSON consumers see
//! a number. Generated IDs routinely exceed 2^53, the largest integer an
//! IEEE-754 double holds exactly; consumers that parse JSON numbers as doubles
//! (JavaScript's `JSON.parse`, for example) will silently lose precision.
//! Fields that must survive such consumers can opt into the quoted decimal
//! form with `#[serde(with = "mkey::as_string")]`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Id;

impl Serialize for Id {
    fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_i64(self.to_raw())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        i64::deserialize(d).map(Self::from_raw)
    }
}

pub mod as_string {
    use super::{Deserializer, Serializer};
    use crate::Id;

    /// Serialize an ID as a quoted decimal string.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S>(id: &Id, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.collect_str(id)
    }

    /// Deserialize an ID from a quoted decimal string.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The underlying deserializer fails
    /// - The string is not a valid signed 64-bit decimal integer
    pub fn deserialize<'de, D>(d: D) -> Result<Id, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DecimalVisitor;

        impl serde::de::Visitor<'_> for DecimalVisitor {
            type Value = Id;

            fn expecting(&self, formatter: &mut core::fmt::Formatter) -> core::fmt::Result {
                formatter.write_str("a decimal string holding a signed 64-bit integer")
            }

            #[inline]
            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                v.parse().map_err(serde::de::Error::custom)
            }
        }

        d.deserialize_str(DecimalVisitor)
    }
}
