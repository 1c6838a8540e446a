//! Channel numbering and per-channel bitsets.

use core::ops::{BitAnd, BitOr, BitOrAssign, Not};

/// Highest channel number the transmitter can output.
pub const MAX_CHANNELS: u8 = 8;

/// One bit per channel, channel 1 in bit 0.
///
/// Used for the reverse flags and for the set of channels already produced
/// by 4WS/DIG mixing.
///
/// # Example
///
/// ```
/// use tx_config::ChannelMask;
///
/// let mut mask = ChannelMask::NONE;
/// mask.insert(3);
/// assert!(mask.contains(3));
/// assert!(!mask.contains(1));
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelMask(pub u8);

impl ChannelMask {
    pub const NONE: Self = Self(0);

    /// Mask with only `channel` set. Channel 0 or out-of-range gives an empty mask.
    #[inline]
    #[must_use]
    pub const fn channel(channel: u8) -> Self {
        if channel == 0 || channel > MAX_CHANNELS {
            Self::NONE
        } else {
            Self(1 << (channel - 1))
        }
    }

    #[inline]
    #[must_use]
    pub const fn contains(self, channel: u8) -> bool {
        let bit = Self::channel(channel).0;
        bit != 0 && self.0 & bit == bit
    }

    #[inline]
    pub fn insert(&mut self, channel: u8) {
        self.0 |= Self::channel(channel).0;
    }

    #[inline]
    pub fn remove(&mut self, channel: u8) {
        self.0 &= !Self::channel(channel).0;
    }

    #[inline]
    pub fn set(&mut self, channel: u8, on: bool) {
        if on {
            self.insert(channel);
        } else {
            self.remove(channel);
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for ChannelMask {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ChannelMask {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for ChannelMask {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

impl Not for ChannelMask {
    type Output = Self;

    #[inline]
    fn not(self) -> Self::Output {
        Self(!self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_bits() {
        assert_eq!(ChannelMask::channel(1), ChannelMask(0b1));
        assert_eq!(ChannelMask::channel(8), ChannelMask(0b1000_0000));
        assert_eq!(ChannelMask::channel(0), ChannelMask::NONE);
        assert_eq!(ChannelMask::channel(9), ChannelMask::NONE);
    }

    #[test]
    fn test_set_and_remove() {
        let mut mask = ChannelMask::NONE;
        mask.set(2, true);
        mask.set(5, true);
        assert!(mask.contains(2));
        assert!(mask.contains(5));
        mask.remove(2);
        assert!(!mask.contains(2));
        assert_eq!(mask, ChannelMask::channel(5));
    }

    #[test]
    fn test_out_of_range_never_contained() {
        let mask = ChannelMask(0xff);
        assert!(!mask.contains(0));
        assert!(!mask.contains(9));
    }
}
