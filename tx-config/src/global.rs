//! Device-wide configuration: hardware calibration and power settings.

use crate::ppm::ADC_OVS_SHIFT;

/// Raw ADC bounds of one stick axis.
///
/// For steering `left`/`right` are the full lock positions, for throttle
/// `left` is full forward and `right` full brake.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisCalibration {
    pub left: u16,
    pub mid: u16,
    pub right: u16,
}

impl AxisCalibration {
    #[must_use]
    pub const fn new(left: u16, mid: u16, right: u16) -> Self {
        Self { left, mid, right }
    }

    /// Bounds shifted to the oversampled ADC scale, as `(left, mid, right)`.
    #[inline]
    #[must_use]
    pub fn oversampled(&self) -> (u16, u16, u16) {
        (
            oversample(self.left),
            oversample(self.mid),
            oversample(self.right),
        )
    }
}

/// Shift a raw ADC quantity to the oversampled scale.
#[inline]
#[must_use]
pub fn oversample(raw: u16) -> u16 {
    raw.saturating_mul(1 << ADC_OVS_SHIFT)
}

/// Global (not per-model) configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GlobalConfig {
    pub steering: AxisCalibration,
    pub throttle: AxisCalibration,
    /// Dead zone half-width in raw ADC units.
    pub steering_dead_zone: u8,
    pub throttle_dead_zone: u8,
    /// Raw battery ADC reading per volt, times ten.
    pub battery_calib: u16,
    /// Low battery threshold in tenths of a volt.
    pub battery_low: u8,
    /// Backlight timeout in seconds, 0 = always on.
    pub backlight_time: u16,
    /// Index of the selected model.
    pub model: u8,
}

impl GlobalConfig {
    /// Factory defaults for a 12-bit ADC.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            steering: AxisCalibration::new(0, 2048, 4095),
            throttle: AxisCalibration::new(0, 2048, 4095),
            steering_dead_zone: 0,
            throttle_dead_zone: 0,
            battery_calib: 406,
            battery_low: 92,
            backlight_time: 30,
            model: 0,
        }
    }

    /// Raw battery ADC value below which the battery counts as low.
    #[inline]
    #[must_use]
    pub fn battery_low_raw(&self) -> u16 {
        let raw = (u32::from(self.battery_calib) * u32::from(self.battery_low) + 50) / 100;
        raw.min(u32::from(u16::MAX)) as u16
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self::new()
    }
}
