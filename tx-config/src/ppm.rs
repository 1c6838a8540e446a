//! Fixed-point units shared by the signal pipeline.
//!
//! Every signal value is expressed in tenths of a microsecond of servo
//! pulse width, relative to the neutral pulse.

/// Value units per microsecond of pulse width.
pub const PPM_PER_US: i16 = 10;

/// Convert microseconds to signal value units.
#[inline]
#[must_use]
pub const fn us(us: i16) -> i16 {
    us * PPM_PER_US
}

/// Full throw in one direction (500 us).
pub const SIGNAL_MAX: i16 = us(500);

/// Neutral pulse width (1500 us), the output for a centred channel.
pub const NEUTRAL_PULSE: u16 = 15_000;

/// Value units per percent of throw (`SIGNAL_MAX / 100`).
pub const PERCENT_STEP: i16 = us(5);

/// Largest pulse offset handed to the waveform generator (800 us).
///
/// Covers 120% endpoints plus full subtrim and trim.
pub const PULSE_OFFSET_MAX: i32 = 8_000;

/// Oversampling shift applied to raw ADC samples.
pub const ADC_OVS_SHIFT: u8 = 2;

/// Clamp a wide intermediate into the signal range.
#[inline]
#[must_use]
pub fn clamp_signal(value: i32) -> i16 {
    value.clamp(-i32::from(SIGNAL_MAX), i32::from(SIGNAL_MAX)) as i16
}

/// Convert a `-100..=100` percentage into signal value units.
#[inline]
#[must_use]
pub const fn percent(value: i8) -> i16 {
    value as i16 * PERCENT_STEP
}
