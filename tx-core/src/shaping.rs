//! Stateless signal shaping: calibration mapping, expo and dual-rate.
//!
//! All functions work on signal values in `-5000..=5000` and never panic,
//! whatever the calibration.

use tx_config::ppm::{clamp_signal, SIGNAL_MAX};

/// Map an oversampled ADC reading to a signal value.
///
/// `left`, `mid`, `right` and `deadzone` must already be on the
/// oversampled scale. The reading is clamped to the calibrated bound on
/// its side of `mid`; readings within `deadzone` of `mid` map to exactly 0.
/// Each side scales linearly up to `±5000` at its bound, truncating toward
/// zero.
///
/// Non-monotonic calibration is not validated here; the result is still
/// bounded to `±5000`.
#[must_use]
pub fn calibrate(raw: u16, left: u16, mid: u16, right: u16, deadzone: u16) -> i16 {
    let max = i32::from(SIGNAL_MAX);
    let raw = i32::from(raw);
    let (left, mid, right, dead) = (
        i32::from(left),
        i32::from(mid),
        i32::from(right),
        i32::from(deadzone),
    );

    if raw < mid {
        let edge = mid - dead;
        let val = raw.max(left) - edge;
        if val >= 0 {
            return 0;
        }
        // val < 0 implies edge > left, so the span is positive
        clamp_signal(val * max / (edge - left))
    } else {
        let edge = mid + dead;
        let val = raw.min(right) - edge;
        if val <= 0 {
            return 0;
        }
        clamp_signal(val * max / (right - edge))
    }
}

/// Expo for magnitudes: `x` in `0..=5000`, `exp` in `1..=99`.
///
/// `(x³·exp/5000² + x·(100 - exp) + 50) / 100`
#[inline]
fn expou(x: u16, exp: u8) -> i16 {
    let x = u32::from(x);
    let exp = u32::from(exp);
    let max = SIGNAL_MAX as u32;
    ((x * x / max * x * exp / max + x * (100 - exp) + 50) / 100) as i16
}

/// Apply an expo curve of the given strength (`-99..=99`).
///
/// Positive strength softens the centre, negative strength sharpens it.
/// `±5000` and `0` are fixed points and the sign of `value` is kept.
///
/// # Example
///
/// ```
/// use tx_core::shaping::expo;
///
/// assert_eq!(expo(5000, 60), 5000);
/// assert!(expo(2500, 60) < 2500);
/// assert!(expo(2500, -60) > 2500);
/// ```
#[must_use]
pub fn expo(value: i16, strength: i8) -> i16 {
    if strength == 0 || value == 0 {
        return value;
    }
    let strength = strength.clamp(-99, 99);
    let magnitude = value.unsigned_abs().min(SIGNAL_MAX as u16);

    let shaped = if strength > 0 {
        expou(magnitude, strength as u8)
    } else {
        SIGNAL_MAX - expou(SIGNAL_MAX as u16 - magnitude, strength.unsigned_abs())
    };

    if value < 0 {
        -shaped
    } else {
        shaped
    }
}

/// Scale a value by `rate` percent. 100 leaves it unchanged, 0 centres it.
#[inline]
#[must_use]
pub fn dual_rate(value: i16, rate: u8) -> i16 {
    (i32::from(value) * i32::from(rate) / 100) as i16
}
