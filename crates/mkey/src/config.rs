use crate::{ConfigError, DEFAULT_EPOCH, Error, Result};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Default number of bits for the node field (1024 nodes).
pub const DEFAULT_NODE_BITS: u8 = 10;

/// Default number of bits for the step field (4096 IDs per millisecond).
pub const DEFAULT_STEP_BITS: u8 = 12;

/// Largest accepted node field width.
pub const MAX_NODE_BITS: u8 = 16;

/// Largest accepted step field width.
pub const MAX_STEP_BITS: u8 = 16;

/// Largest accepted `node_bits + step_bits`, which keeps at least 41 bits for
/// the timestamp below the unused sign bit.
pub const MAX_LAYOUT_BITS: u8 = 22;

/// Generator parameters: the epoch, the split between node and step bits, and
/// this producer's node number.
///
/// A `Config` is inert until it is validated by [`Config::layout`], which every
/// generator constructor calls.
///
/// # Example
///
/// ```
/// use mkey::Config;
///
/// let config = Config::new(5).with_epoch(1_700_000_000_000);
/// let layout = config.layout().unwrap();
/// assert_eq!(layout.node_max(), 1023);
/// assert_eq!(layout.step_mask(), 4095);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Config {
    /// Milliseconds since the Unix epoch at which timestamps start.
    pub epoch: i64,
    /// Width of the node field.
    pub node_bits: u8,
    /// Width of the step (sequence) field.
    pub step_bits: u8,
    /// This producer's node number.
    pub node: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            epoch: DEFAULT_EPOCH,
            node_bits: DEFAULT_NODE_BITS,
            step_bits: DEFAULT_STEP_BITS,
            node: 0,
        }
    }
}

impl Config {
    /// Default layout for the given node.
    #[must_use]
    pub fn new(node: i64) -> Self {
        Self {
            node,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_epoch(mut self, epoch: i64) -> Self {
        self.epoch = epoch;
        self
    }

    #[must_use]
    pub const fn with_node_bits(mut self, node_bits: u8) -> Self {
        self.node_bits = node_bits;
        self
    }

    #[must_use]
    pub const fn with_step_bits(mut self, step_bits: u8) -> Self {
        self.step_bits = step_bits;
        self
    }

    #[must_use]
    pub const fn with_node(mut self, node: i64) -> Self {
        self.node = node;
        self
    }

    /// Replaces the node with one drawn uniformly from the range allowed by
    /// `node_bits`, using the operating system entropy source.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the bit widths are invalid
    /// - [`Error::RandomSource`] if the entropy source is unavailable
    pub fn with_random_node(self) -> Result<Self> {
        let layout = self.with_node(0).layout()?;
        Ok(self.with_node(layout.random_node_id()?))
    }

    /// Validates the configuration and derives the bit-layout constants.
    ///
    /// # Errors
    ///
    /// Checks, in order, that `node_bits <= 16`, `step_bits <= 16`,
    /// `node_bits + step_bits <= 22` and `0 <= node <= 2^node_bits - 1`,
    /// returning the first violation.
    pub fn layout(&self) -> Result<Layout, ConfigError> {
        if self.node_bits > MAX_NODE_BITS {
            return Err(ConfigError::NodeBitsTooLarge {
                bits: self.node_bits,
                max: MAX_NODE_BITS,
            });
        }
        if self.step_bits > MAX_STEP_BITS {
            return Err(ConfigError::StepBitsTooLarge {
                bits: self.step_bits,
                max: MAX_STEP_BITS,
            });
        }
        if self.node_bits + self.step_bits > MAX_LAYOUT_BITS {
            return Err(ConfigError::LayoutTooWide {
                node_bits: self.node_bits,
                step_bits: self.step_bits,
                max: MAX_LAYOUT_BITS,
            });
        }

        let node_max = (1_i64 << self.node_bits) - 1;
        if !(0..=node_max).contains(&self.node) {
            return Err(ConfigError::NodeOutOfRange {
                node: self.node,
                max: node_max,
            });
        }

        Ok(Layout {
            epoch: self.epoch,
            node_bits: self.node_bits,
            step_bits: self.step_bits,
            node_max,
            node_mask: node_max << self.step_bits,
            step_mask: (1_i64 << self.step_bits) - 1,
            time_shift: self.node_bits + self.step_bits,
            node_shift: self.step_bits,
        })
    }
}

/// An immutable snapshot of a validated bit layout.
///
/// Identifiers carry no header describing their own layout, so decomposing one
/// requires the `Layout` of the generator that issued it. Obtain it from
/// [`Config::layout`] or [`crate::Generator::layout`].
///
/// ```text
///  Bit Index:  63         63 62                 T T-1          S S-1        0
///              +------------+-------------------+----------------+----------+
///  Field:      | unused (1) | timestamp (63-T)  | node (T-S)     | step (S) |
///              +------------+-------------------+----------------+----------+
///  T = time_shift = node_bits + step_bits, S = node_shift = step_bits
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Layout {
    epoch: i64,
    node_bits: u8,
    step_bits: u8,
    node_max: i64,
    node_mask: i64,
    step_mask: i64,
    time_shift: u8,
    node_shift: u8,
}

impl Default for Layout {
    /// The layout of [`Config::default`].
    fn default() -> Self {
        Self {
            epoch: DEFAULT_EPOCH,
            node_bits: DEFAULT_NODE_BITS,
            step_bits: DEFAULT_STEP_BITS,
            node_max: (1 << DEFAULT_NODE_BITS) - 1,
            node_mask: ((1 << DEFAULT_NODE_BITS) - 1) << DEFAULT_STEP_BITS,
            step_mask: (1 << DEFAULT_STEP_BITS) - 1,
            time_shift: DEFAULT_NODE_BITS + DEFAULT_STEP_BITS,
            node_shift: DEFAULT_STEP_BITS,
        }
    }
}

impl Layout {
    /// Milliseconds since the Unix epoch that timestamp offset zero maps to.
    #[must_use]
    pub const fn epoch(&self) -> i64 {
        self.epoch
    }

    #[must_use]
    pub const fn node_bits(&self) -> u8 {
        self.node_bits
    }

    #[must_use]
    pub const fn step_bits(&self) -> u8 {
        self.step_bits
    }

    /// Width of the timestamp field: `63 - node_bits - step_bits`.
    #[must_use]
    pub const fn timestamp_bits(&self) -> u8 {
        63 - self.time_shift
    }

    /// Largest node number, `2^node_bits - 1`.
    #[must_use]
    pub const fn node_max(&self) -> i64 {
        self.node_max
    }

    /// Node field mask, already shifted into position.
    #[must_use]
    pub const fn node_mask(&self) -> i64 {
        self.node_mask
    }

    /// Step field mask, `2^step_bits - 1`. Also the largest batch size.
    #[must_use]
    pub const fn step_mask(&self) -> i64 {
        self.step_mask
    }

    #[must_use]
    pub const fn time_shift(&self) -> u8 {
        self.time_shift
    }

    #[must_use]
    pub const fn node_shift(&self) -> u8 {
        self.node_shift
    }

    /// Largest timestamp offset that fits below the unused sign bit.
    #[must_use]
    pub const fn max_timestamp(&self) -> i64 {
        i64::MAX >> self.time_shift
    }

    /// Packs the three fields into a raw value. No masking is applied, so
    /// callers must pass in-range values.
    #[must_use]
    pub const fn compose(&self, timestamp: i64, node: i64, step: i64) -> i64 {
        (timestamp << self.time_shift) | (node << self.node_shift) | step
    }

    /// Returns a cryptographically random node number uniformly distributed
    /// over `[0, node_max]`.
    ///
    /// A fresh ChaCha generator is seeded from the operating system for each
    /// call; nothing is cached between calls.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RandomSource`] if the operating system entropy source
    /// cannot be read.
    pub fn random_node_id(&self) -> Result<i64> {
        let mut rng = StdRng::try_from_os_rng().map_err(|e| Error::RandomSource {
            reason: e.to_string(),
        })?;
        Ok(rng.random_range(0..=self.node_max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_matches_default_config() {
        assert_eq!(Config::default().layout().unwrap(), Layout::default());
    }

    #[test]
    fn default_layout_constants() {
        let layout = Layout::default();
        assert_eq!(layout.node_max(), 1023);
        assert_eq!(layout.node_mask(), 1023 << 12);
        assert_eq!(layout.step_mask(), 4095);
        assert_eq!(layout.time_shift(), 22);
        assert_eq!(layout.node_shift(), 12);
        assert_eq!(layout.timestamp_bits(), 41);
        assert_eq!(layout.max_timestamp(), (1 << 41) - 1);
        assert_eq!(layout.epoch(), DEFAULT_EPOCH);
    }

    #[test]
    fn rejects_oversized_node_bits() {
        let err = Config::default().with_node_bits(17).layout().unwrap_err();
        assert_eq!(err, ConfigError::NodeBitsTooLarge { bits: 17, max: 16 });
    }

    #[test]
    fn rejects_oversized_step_bits() {
        let err = Config::default()
            .with_node_bits(0)
            .with_step_bits(17)
            .layout()
            .unwrap_err();
        assert_eq!(err, ConfigError::StepBitsTooLarge { bits: 17, max: 16 });
    }

    #[test]
    fn rejects_layouts_wider_than_22_bits() {
        let err = Config::default()
            .with_node_bits(16)
            .with_step_bits(7)
            .layout()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::LayoutTooWide {
                node_bits: 16,
                step_bits: 7,
                max: 22
            }
        );
        assert!(
            Config::default()
                .with_node_bits(16)
                .with_step_bits(6)
                .layout()
                .is_ok()
        );
    }

    #[test]
    fn rejects_nodes_outside_the_field() {
        assert_eq!(
            Config::new(1024).layout().unwrap_err(),
            ConfigError::NodeOutOfRange {
                node: 1024,
                max: 1023
            }
        );
        assert_eq!(
            Config::new(-1).layout().unwrap_err(),
            ConfigError::NodeOutOfRange { node: -1, max: 1023 }
        );
        assert!(Config::new(1023).layout().is_ok());
        assert!(Config::new(0).layout().is_ok());
    }

    #[test]
    fn zero_node_bits_only_allows_node_zero() {
        let config = Config::default().with_node_bits(0);
        assert_eq!(config.layout().unwrap().node_max(), 0);
        assert!(config.with_node(1).layout().is_err());
    }

    #[test]
    fn every_valid_split_derives_consistent_masks() {
        for node_bits in 0..=MAX_NODE_BITS {
            for step_bits in 0..=MAX_STEP_BITS {
                let config = Config::default()
                    .with_node_bits(node_bits)
                    .with_step_bits(step_bits);
                match config.layout() {
                    Ok(layout) => {
                        assert!(node_bits + step_bits <= MAX_LAYOUT_BITS);
                        assert_eq!(layout.node_mask() & layout.step_mask(), 0);
                        assert_eq!(
                            layout.compose(
                                layout.max_timestamp(),
                                layout.node_max(),
                                layout.step_mask()
                            ),
                            i64::MAX
                        );
                    }
                    Err(err) => {
                        assert!(node_bits + step_bits > MAX_LAYOUT_BITS);
                        assert!(matches!(err, ConfigError::LayoutTooWide { .. }));
                    }
                }
            }
        }
    }

    #[test]
    fn random_node_stays_in_range() {
        let layout = Config::default().with_node_bits(3).layout().unwrap();
        for _ in 0..256 {
            let node = layout.random_node_id().unwrap();
            assert!((0..=7).contains(&node));
        }
    }

    #[test]
    fn random_node_with_zero_bits_is_zero() {
        let layout = Config::default().with_node_bits(0).layout().unwrap();
        assert_eq!(layout.random_node_id().unwrap(), 0);
    }

    #[test]
    fn with_random_node_produces_a_valid_config() {
        let config = Config::default().with_random_node().unwrap();
        assert!(config.layout().is_ok());
    }

    #[test]
    fn with_random_node_reports_bad_layouts() {
        let err = Config::default().with_node_bits(20).with_random_node();
        assert_eq!(
            err.unwrap_err(),
            Error::Config(ConfigError::NodeBitsTooLarge { bits: 20, max: 16 })
        );
    }
}
