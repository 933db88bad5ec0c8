use core::fmt;
use std::time::SystemTime;

use crate::{Layout, time::system_time_from_millis};

/// A 64-bit Snowflake-style identifier.
///
/// From most to least significant bit: one unused sign bit, the millisecond
/// offset from the generator's epoch, the node number, and the per-millisecond
/// step. The widths of the last three fields depend on the issuing
/// generator's [`Layout`], which is why every extraction method takes one.
///
/// ```text
///  Bit Index:  63           63 62            22 21           12 11           0
///              +--------------+----------------+---------------+-------------+
///  Field:      | unused (1)   | timestamp (41) | node (10)     | step (12)   |
///              +--------------+----------------+---------------+-------------+
///              |<----------- MSB -------- default layout -------- LSB ------>|
/// ```
///
/// An `Id` is immutable. Generated IDs are never negative, but any 64-bit
/// value can be reconstructed by parsing, and every encoding round-trips it.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Id {
    id: i64,
}

impl Id {
    /// Wraps a raw 64-bit value.
    #[must_use]
    pub const fn from_raw(raw: i64) -> Self {
        Self { id: raw }
    }

    /// Returns the raw 64-bit value.
    #[must_use]
    pub const fn to_raw(&self) -> i64 {
        self.id
    }

    /// Packs the given fields using `layout`. Out-of-range fields are masked to
    /// their width.
    ///
    /// # Example
    ///
    /// ```
    /// use mkey::{Id, Layout};
    ///
    /// let layout = Layout::default();
    /// let id = Id::from_components(&layout, 1000, 2, 1);
    /// assert_eq!(id.time_offset(&layout), 1000);
    /// assert_eq!(id.node(&layout), 2);
    /// assert_eq!(id.step(&layout), 1);
    /// ```
    #[must_use]
    pub const fn from_components(layout: &Layout, timestamp: i64, node: i64, step: i64) -> Self {
        Self::from_raw(layout.compose(
            timestamp & layout.max_timestamp(),
            node & layout.node_max(),
            step & layout.step_mask(),
        ))
    }

    /// Milliseconds between the layout's epoch and the moment this ID was
    /// issued.
    #[must_use]
    pub const fn time_offset(&self, layout: &Layout) -> i64 {
        self.id >> layout.time_shift()
    }

    /// Absolute issue time in milliseconds since the Unix epoch.
    #[must_use]
    pub const fn timestamp_millis(&self, layout: &Layout) -> i64 {
        self.time_offset(layout) + layout.epoch()
    }

    /// Absolute issue time.
    #[must_use]
    pub fn timestamp(&self, layout: &Layout) -> SystemTime {
        system_time_from_millis(self.timestamp_millis(layout))
    }

    /// The node number of the issuing generator.
    #[must_use]
    pub const fn node(&self, layout: &Layout) -> i64 {
        (self.id & layout.node_mask()) >> layout.node_shift()
    }

    /// The sequence number within the issuing millisecond.
    #[must_use]
    pub const fn step(&self, layout: &Layout) -> i64 {
        self.id & layout.step_mask()
    }

    /// All three fields at once.
    #[must_use]
    pub const fn components(&self, layout: &Layout) -> Components {
        Components {
            time_offset: self.time_offset(layout),
            node: self.node(layout),
            step: self.step(layout),
        }
    }
}

/// The decoded fields of an [`Id`] under a particular [`Layout`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Components {
    pub time_offset: i64,
    pub node: i64,
    pub step: i64,
}

impl From<i64> for Id {
    fn from(raw: i64) -> Self {
        Self::from_raw(raw)
    }
}

impl From<Id> for i64 {
    fn from(id: Id) -> Self {
        id.to_raw()
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Id").field(&self.id).finish()
    }
}
