//! Per-model configuration: everything the frame computation reads for the
//! currently selected vehicle.

use crate::channel::{ChannelMask, MAX_CHANNELS};

/// Number of stored multi-position values.
pub const MULTI_POSITIONS: usize = 4;

/// Simulated anti-lock braking pattern.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AbsType {
    #[default]
    Off,
    /// Toggle brake reduction every 6 frames.
    Slow,
    /// Toggle every 4 frames.
    Normal,
    /// Toggle every 3 frames.
    Fast,
}

impl AbsType {
    /// Frames between brake-reduction toggles, `None` when ABS is off.
    #[inline]
    #[must_use]
    pub const fn period(self) -> Option<u8> {
        match self {
            AbsType::Off => None,
            AbsType::Slow => Some(6),
            AbsType::Normal => Some(4),
            AbsType::Fast => Some(3),
        }
    }

    /// Menu index (0..=3).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            AbsType::Off => 0,
            AbsType::Slow => 1,
            AbsType::Normal => 2,
            AbsType::Fast => 3,
        }
    }

    /// Inverse of [`index`](Self::index); values above 3 saturate to `Fast`.
    #[inline]
    #[must_use]
    pub const fn from_index(index: u8) -> Self {
        match index {
            0 => AbsType::Off,
            1 => AbsType::Slow,
            2 => AbsType::Normal,
            _ => AbsType::Fast,
        }
    }
}

/// Which physical channels take a mixing role.
///
/// Each field holds a channel number, 0 meaning "no channel". `dig == 1`
/// means channel 1 is the master side of dual-ESC steering.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelRoles {
    /// Rear steering channel mirroring channel 1.
    pub four_ws: u8,
    /// Second ESC channel mixed from throttle.
    pub dig: u8,
    /// Channel driven by the multi-position key.
    pub multi_position: u8,
}

impl ChannelRoles {
    #[inline]
    #[must_use]
    pub const fn four_ws(&self) -> Option<u8> {
        if self.four_ws == 0 {
            None
        } else {
            Some(self.four_ws)
        }
    }

    #[inline]
    #[must_use]
    pub const fn dig(&self) -> Option<u8> {
        if self.dig == 0 {
            None
        } else {
            Some(self.dig)
        }
    }

    #[inline]
    #[must_use]
    pub const fn multi_position(&self) -> Option<u8> {
        if self.multi_position == 0 {
            None
        } else {
            Some(self.multi_position)
        }
    }

    /// Channel 1 feeds dual-ESC steering instead of a servo.
    #[inline]
    #[must_use]
    pub const fn dual_esc_steering(&self) -> bool {
        self.dig == 1
    }

    /// Channels produced by 4WS/DIG logic rather than auxiliary inputs.
    #[must_use]
    pub const fn mixed(&self) -> ChannelMask {
        ChannelMask(ChannelMask::channel(self.four_ws).0 | ChannelMask::channel(self.dig).0)
    }
}

/// What the two keys of an electronic trim do when not used as trim.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TrimButtons {
    #[default]
    Plain,
    /// Keys repeat while held.
    AutoRepeat,
    /// Value is held only while the key is pressed.
    Momentary,
}

/// Mapping of one trim key pair.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TrimMapping {
    pub is_trim: bool,
    pub buttons: TrimButtons,
}

/// Key mapping of the four trim key pairs (steering, throttle, trim 3, D/R).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyConfig {
    pub trims: [TrimMapping; 4],
}

impl Default for KeyConfig {
    fn default() -> Self {
        let trim = TrimMapping {
            is_trim: true,
            buttons: TrimButtons::AutoRepeat,
        };
        Self {
            trims: [trim, trim, TrimMapping::default(), TrimMapping::default()],
        }
    }
}

/// Per-model settings.
///
/// Loaded wholesale on model switch and mutated only by the menu engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModelConfig {
    /// Three-character model name.
    pub name: [u8; 3],
    /// Number of output channels (2..=8).
    pub channels: u8,
    /// Steering and throttle trim, in microseconds.
    pub trim: [i8; 2],
    /// Subtrim per channel, in microseconds.
    pub subtrim: [i8; MAX_CHANNELS as usize],
    /// Endpoint per channel as `[left, right]` percent of throw.
    pub endpoint: [[u8; 2]; MAX_CHANNELS as usize],
    pub reverse: ChannelMask,
    pub expo_steering: i8,
    pub expo_forward: i8,
    pub expo_back: i8,
    pub dr_steering: u8,
    pub dr_forward: u8,
    pub dr_back: u8,
    /// Steering speed when turning away from centre, 100 = unlimited.
    pub stspd_turn: u8,
    /// Steering speed when returning to centre, 100 = unlimited.
    pub stspd_return: u8,
    pub abs_type: AbsType,
    pub roles: ChannelRoles,
    /// Multi-position values in percent.
    pub multi_position: [i8; MULTI_POSITIONS],
}

impl ModelConfig {
    /// Trim range in microseconds.
    pub const TRIM_MAX: i8 = 99;
    /// Subtrim range in microseconds.
    pub const SUBTRIM_MAX: i8 = 99;
    /// Largest endpoint in percent.
    pub const ENDPOINT_MAX: u8 = 120;
    pub const EXPO_MAX: i8 = 99;

    /// Factory defaults for a three channel car.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            name: *b"MOD",
            channels: 3,
            trim: [0; 2],
            subtrim: [0; MAX_CHANNELS as usize],
            endpoint: [[100, 100]; MAX_CHANNELS as usize],
            reverse: ChannelMask::NONE,
            expo_steering: 0,
            expo_forward: 0,
            expo_back: 0,
            dr_steering: 100,
            dr_forward: 100,
            dr_back: 100,
            stspd_turn: 100,
            stspd_return: 100,
            abs_type: AbsType::Off,
            roles: ChannelRoles {
                four_ws: 0,
                dig: 0,
                multi_position: 0,
            },
            multi_position: [-100, 0, 100, 0],
        }
    }

    /// Channel count clamped into `2..=MAX_CHANNELS`.
    #[inline]
    #[must_use]
    pub fn channel_count(&self) -> u8 {
        self.channels.clamp(2, MAX_CHANNELS)
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abs_periods() {
        assert_eq!(AbsType::Off.period(), None);
        assert_eq!(AbsType::Slow.period(), Some(6));
        assert_eq!(AbsType::Normal.period(), Some(4));
        assert_eq!(AbsType::Fast.period(), Some(3));
    }

    #[test]
    fn test_abs_index_roundtrip_saturates() {
        assert_eq!(AbsType::from_index(AbsType::Normal.index()), AbsType::Normal);
        assert_eq!(AbsType::from_index(200), AbsType::Fast);
    }

    #[test]
    fn test_mixed_follows_roles() {
        let mut roles = ChannelRoles::default();
        assert!(roles.mixed().is_empty());

        roles.four_ws = 3;
        roles.dig = 4;
        assert_eq!(roles.mixed(), ChannelMask(0b1100));

        roles.four_ws = 0;
        assert_eq!(roles.mixed(), ChannelMask::channel(4));
    }

    #[test]
    fn test_dual_esc_steering() {
        let roles = ChannelRoles {
            dig: 1,
            ..ChannelRoles::default()
        };
        assert!(roles.dual_esc_steering());
        assert_eq!(roles.dig(), Some(1));
        assert_eq!(roles.four_ws(), None);
    }

    #[test]
    fn test_channel_count_clamped() {
        let mut model = ModelConfig::default();
        model.channels = 12;
        assert_eq!(model.channel_count(), MAX_CHANNELS);
        model.channels = 0;
        assert_eq!(model.channel_count(), 2);
    }
}
