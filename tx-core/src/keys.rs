//! Keys, key events and the input collaborator trait.

use core::future::Future;
use core::ops::{BitAnd, BitOr, BitOrAssign, Not};
use tx_config::{KeyConfig, TrimButtons};

/// Key state represented as a bitfield.
///
/// # Example
///
/// ```
/// use tx_core::Keys;
///
/// let keys = Keys::ENTER | Keys::ROT_L;
/// assert!(keys.intersects(Keys::ROT_ALL));
/// assert!(!keys.contains(Keys::ROT_ALL));
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Keys(pub u16);

impl Keys {
    pub const TRIM1_L: Self = Self(1 << 0); // Steering trim
    pub const TRIM1_R: Self = Self(1 << 1);
    pub const TRIM2_L: Self = Self(1 << 2); // Throttle trim
    pub const TRIM2_R: Self = Self(1 << 3);
    pub const TRIM3_L: Self = Self(1 << 4);
    pub const TRIM3_R: Self = Self(1 << 5);
    pub const DR_L: Self = Self(1 << 6); // Dual-rate key
    pub const DR_R: Self = Self(1 << 7);
    pub const CH3: Self = Self(1 << 8);
    pub const BACK: Self = Self(1 << 9);
    pub const END: Self = Self(1 << 10);
    pub const ENTER: Self = Self(1 << 11);
    pub const ROT_L: Self = Self(1 << 12); // Encoder rotated left
    pub const ROT_R: Self = Self(1 << 13);

    pub const ROT_ALL: Self = Self(Self::ROT_L.0 | Self::ROT_R.0);

    pub const NONE: Self = Self(0);

    /// Check if all given keys are set.
    #[inline]
    #[must_use]
    pub const fn contains(self, keys: Keys) -> bool {
        (self.0 & keys.0) == keys.0
    }

    /// Check if any of the given keys is set.
    #[inline]
    #[must_use]
    pub const fn intersects(self, keys: Keys) -> bool {
        (self.0 & keys.0) != 0
    }

    #[inline]
    pub fn set(&mut self, keys: Keys, on: bool) {
        if on {
            self.0 |= keys.0;
        } else {
            self.0 &= !keys.0;
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Keys {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Keys {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Keys {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

impl Not for Keys {
    type Output = Self;

    #[inline]
    fn not(self) -> Self::Output {
        Self(!self.0)
    }
}

/// Key pairs of the four electronic trims, indexed like [`KeyConfig::trims`].
pub const TRIM_KEYS: [(Keys, Keys); 4] = [
    (Keys::TRIM1_L, Keys::TRIM1_R),
    (Keys::TRIM2_L, Keys::TRIM2_R),
    (Keys::TRIM3_L, Keys::TRIM3_R),
    (Keys::DR_L, Keys::DR_R),
];

/// Keys that should auto-repeat for the given trim mapping.
#[must_use]
pub fn autorepeat_keys(config: &KeyConfig) -> Keys {
    config
        .trims
        .iter()
        .zip(TRIM_KEYS)
        .filter(|(map, _)| map.is_trim && map.buttons == TrimButtons::AutoRepeat)
        .fold(Keys::NONE, |acc, (_, (l, r))| acc | l | r)
}

/// Edge-triggered events collected since the last [`Keypad::clear`].
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyEvents {
    /// Keys pressed (or encoder steps) since the last clear.
    pub pressed: Keys,
    /// Keys held long; for the encoder, fast rotation.
    pub long: Keys,
}

impl KeyEvents {
    pub const NONE: Self = Self {
        pressed: Keys::NONE,
        long: Keys::NONE,
    };

    #[must_use]
    pub const fn pressed(keys: Keys) -> Self {
        Self {
            pressed: keys,
            long: Keys::NONE,
        }
    }

    #[must_use]
    pub const fn long(keys: Keys) -> Self {
        Self {
            pressed: keys,
            long: keys,
        }
    }

    #[inline]
    #[must_use]
    pub const fn btn(&self, keys: Keys) -> bool {
        self.pressed.intersects(keys)
    }

    #[inline]
    #[must_use]
    pub const fn btnl(&self, keys: Keys) -> bool {
        self.long.intersects(keys)
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pressed.is_empty() && self.long.is_empty()
    }

    /// Accumulate `other` into these events.
    #[inline]
    pub fn merge(&mut self, other: KeyEvents) {
        self.pressed |= other.pressed;
        self.long |= other.long;
    }
}

/// Input collaborator: buttons and rotary encoder.
///
/// # `no_std` Compatibility
///
/// All implementations must be `#![no_std]` compatible with no heap allocation.
pub trait Keypad {
    /// Suspend until the next wakeup (key event or poll timeout).
    fn wait(&mut self) -> impl Future<Output = ()>;

    /// Events collected since the last [`clear`](Self::clear).
    fn events(&self) -> KeyEvents;

    /// Drop all collected events.
    fn clear(&mut self);

    /// Enable autorepeat for exactly these keys.
    fn set_autorepeat(&mut self, keys: Keys);
}
