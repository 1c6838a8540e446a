//! Simulated anti-lock braking.
//!
//! While the brake is held past [`ABS_THRESHOLD`], braking is halved on
//! alternating windows whose length depends on the [`AbsType`].

use tx_config::ppm::us;
use tx_config::AbsType;

/// Brake values above this (50 us) count as braking.
pub const ABS_THRESHOLD: i16 = us(50);

/// Duty-cycle state of the ABS pulser, kept across frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AbsSimulator {
    count: u8,
    reduce: bool,
}

impl AbsSimulator {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            count: 0,
            reduce: false,
        }
    }

    /// Whether the current window halves the brake.
    #[inline]
    #[must_use]
    pub const fn is_reducing(&self) -> bool {
        self.reduce
    }

    /// Apply ABS to a throttle value. ABS off leaves the state untouched.
    pub fn apply(&mut self, abs: AbsType, value: i16) -> i16 {
        let Some(period) = abs.period() else {
            return value;
        };

        if value > ABS_THRESHOLD {
            self.count = self.count.saturating_add(1);
            if self.count >= period {
                self.count = 0;
                self.reduce = !self.reduce;
            }
            if self.reduce {
                value / 2
            } else {
                value
            }
        } else {
            self.count = 0;
            self.reduce = false;
            value
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::vec::Vec;

    fn run(abs: AbsType, frames: usize, value: i16) -> Vec<i16> {
        let mut sim = AbsSimulator::new();
        (0..frames).map(|_| sim.apply(abs, value)).collect()
    }

    #[test]
    fn test_off_passes_through() {
        assert!(run(AbsType::Off, 10, 5000).iter().all(|&v| v == 5000));
    }

    #[test]
    fn test_normal_alternates_four_frame_windows() {
        let out = run(AbsType::Normal, 12, 4000);
        assert_eq!(
            out,
            [4000, 4000, 4000, 2000, 2000, 2000, 2000, 4000, 4000, 4000, 4000, 2000]
        );
    }

    #[test]
    fn test_fast_alternates_every_three_frames() {
        let out = run(AbsType::Fast, 10, 5000);
        assert_eq!(out, [5000, 5000, 2500, 2500, 2500, 5000, 5000, 5000, 2500, 2500]);
    }

    #[test]
    fn test_slow_period() {
        let out = run(AbsType::Slow, 7, 5000);
        assert_eq!(out[4], 5000);
        assert_eq!(out[5], 2500);
        assert_eq!(out[6], 2500);
    }

    #[test]
    fn test_release_resets_immediately() {
        let mut sim = AbsSimulator::new();
        for _ in 0..4 {
            sim.apply(AbsType::Normal, 4000);
        }
        assert!(sim.is_reducing());

        assert_eq!(sim.apply(AbsType::Normal, ABS_THRESHOLD), ABS_THRESHOLD);
        assert!(!sim.is_reducing());
        // count restarted: three unreduced frames again
        assert_eq!(sim.apply(AbsType::Normal, 4000), 4000);
        assert_eq!(sim.apply(AbsType::Normal, 4000), 4000);
        assert_eq!(sim.apply(AbsType::Normal, 4000), 4000);
        assert_eq!(sim.apply(AbsType::Normal, 4000), 2000);
    }

    #[test]
    fn test_forward_throttle_untouched() {
        let out = run(AbsType::Fast, 6, -5000);
        assert!(out.iter().all(|&v| v == -5000));
    }

    #[test]
    fn test_halving_truncates() {
        let out = run(AbsType::Fast, 3, 4999);
        assert_eq!(out[2], 2499);
    }
}
