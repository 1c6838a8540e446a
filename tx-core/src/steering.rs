//! Steering speed: bounds how fast a channel output may move per frame.
//!
//! Motion away from centre is limited by the turn rate and motion toward
//! centre by the return rate. A move that crosses centre in one frame is
//! split into a return leg (capped against the return rate relative to the
//! last value) and a turn leg (capped against the turn rate relative to
//! centre).

use tx_config::channel::MAX_CHANNELS;
use tx_config::ppm::us;

/// Unbounded per-frame delta, used for rate 100.
const UNLIMITED: i16 = us(1000);

/// Largest per-frame change allowed for a steering speed of `rate` percent.
///
/// `PPM(1000) / 2 / (100 - rate)`, or `PPM(1000)` when `rate >= 100`.
#[inline]
#[must_use]
pub const fn max_delta(rate: u8) -> i16 {
    if rate >= 100 {
        UNLIMITED
    } else {
        UNLIMITED / 2 / (100 - rate as i16)
    }
}

/// Turn and return steering speeds of a model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SteeringSpeed {
    pub turn: u8,
    pub ret: u8,
}

impl SteeringSpeed {
    #[must_use]
    pub const fn new(turn: u8, ret: u8) -> Self {
        Self { turn, ret }
    }

    /// Both rates at 100: no limiting at all.
    #[inline]
    #[must_use]
    pub const fn is_unlimited(&self) -> bool {
        self.turn >= 100 && self.ret >= 100
    }

    /// Limit the move from `last` to `target`.
    #[must_use]
    pub fn limit(&self, target: i16, last: i16) -> i16 {
        let (target, last) = (i32::from(target), i32::from(last));
        let mut val = target;
        let mut delta = target - last;
        let mut delta2 = 0;

        if delta == 0 || self.is_unlimited() {
            return target as i16;
        }

        let rate = if last == 0 {
            self.turn
        } else if last < 0 {
            if val < last {
                self.turn
            } else if val <= 0 {
                self.ret
            } else {
                // crossing to the right side of centre
                delta = -last;
                delta2 = val;
                self.ret
            }
        } else if val > last {
            self.turn
        } else if val >= 0 {
            self.ret
        } else {
            // crossing to the left side of centre
            delta = -last;
            delta2 = val;
            self.ret
        };

        let max = i32::from(max_delta(rate));
        if delta < 0 {
            if max < -delta {
                val = last - max;
                delta2 = 0;
            }
        } else if max < delta {
            val = last + max;
            delta2 = 0;
        }

        // turn leg, measured from centre
        if delta2 != 0 {
            let max = i32::from(max_delta(self.turn));
            if delta2 < 0 {
                if max < -delta2 {
                    val = -max;
                }
            } else if max < delta2 {
                val = max;
            }
        }

        val as i16
    }
}

/// Last output value of every channel, kept across frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChannelHistory {
    last: [i16; MAX_CHANNELS as usize],
}

impl ChannelHistory {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last: [0; MAX_CHANNELS as usize],
        }
    }

    /// Last value of `channel` (1-based), 0 for an invalid channel.
    #[inline]
    #[must_use]
    pub fn get(&self, channel: u8) -> i16 {
        channel
            .checked_sub(1)
            .and_then(|i| self.last.get(usize::from(i)))
            .copied()
            .unwrap_or(0)
    }

    /// Overwrite the last value of `channel`.
    ///
    /// Lets a derived value share the rate-limit history of a physical
    /// channel whose role changed.
    #[inline]
    pub fn seed(&mut self, channel: u8, value: i16) {
        if let Some(slot) = channel
            .checked_sub(1)
            .and_then(|i| self.last.get_mut(usize::from(i)))
        {
            *slot = value;
        }
    }

    /// Limit `target` against the history of `channel`.
    #[inline]
    #[must_use]
    pub fn limit(&self, speed: &SteeringSpeed, target: i16, channel: u8) -> i16 {
        speed.limit(target, self.get(channel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_delta() {
        assert_eq!(max_delta(100), 10_000);
        assert_eq!(max_delta(0), 50);
        assert_eq!(max_delta(50), 100);
        assert_eq!(max_delta(99), 5000);
    }

    #[test]
    fn test_unchanged_passes_through() {
        let speed = SteeringSpeed::new(10, 10);
        assert_eq!(speed.limit(1200, 1200), 1200);
    }

    #[test]
    fn test_unlimited_passes_through() {
        let speed = SteeringSpeed::new(100, 100);
        assert_eq!(speed.limit(5000, -5000), 5000);
    }

    #[test]
    fn test_turn_from_centre_uses_turn_rate() {
        let speed = SteeringSpeed::new(50, 0);
        assert_eq!(speed.limit(5000, 0), 100);
        assert_eq!(speed.limit(-5000, 0), -100);
    }

    #[test]
    fn test_further_turn_uses_turn_rate() {
        let speed = SteeringSpeed::new(50, 0);
        assert_eq!(speed.limit(5000, 1000), 1100);
        assert_eq!(speed.limit(-5000, -1000), -1100);
    }

    #[test]
    fn test_return_uses_return_rate() {
        let speed = SteeringSpeed::new(0, 80);
        // max return 250
        assert_eq!(speed.limit(0, 1000), 750);
        assert_eq!(speed.limit(0, -1000), -750);
        assert_eq!(speed.limit(900, 1000), 900);
    }

    #[test]
    fn test_crossing_capped_on_return_leg() {
        let speed = SteeringSpeed::new(90, 80);
        // return leg 1000 > 250: stop short of centre, no turn leg
        assert_eq!(speed.limit(-3000, 1000), 750);
        assert_eq!(speed.limit(3000, -1000), -750);
    }

    #[test]
    fn test_crossing_turn_leg_capped_from_centre() {
        let speed = SteeringSpeed::new(90, 80);
        // return leg 200 <= 250 passes, turn leg capped at 500 from centre
        assert_eq!(speed.limit(-3000, 200), -500);
        assert_eq!(speed.limit(3000, -200), 500);
        // turn leg within its cap passes unchanged
        assert_eq!(speed.limit(-300, 200), -300);
    }

    #[test]
    fn test_turn_leg_uses_turn_rate_even_when_unlimited() {
        let speed = SteeringSpeed::new(100, 0);
        // return max 50 caps the return leg
        assert_eq!(speed.limit(-2000, 40), -2000);
        assert_eq!(speed.limit(-2000, 60), 10);
    }

    #[test]
    fn test_delta_bounded_per_leg() {
        for &(turn, ret) in &[(0u8, 0u8), (30, 70), (95, 10), (60, 60)] {
            let speed = SteeringSpeed::new(turn, ret);
            let (mt, mr) = (max_delta(turn), max_delta(ret));
            for last in (-5000i16..=5000).step_by(250) {
                for target in (-5000i16..=5000).step_by(250) {
                    let out = speed.limit(target, last);
                    let crossing = (last < 0 && target > 0) || (last > 0 && target < 0);
                    if crossing {
                        if out.signum() == last.signum() || out == 0 {
                            assert!((out - last).abs() <= mr);
                        } else {
                            assert!(last.abs() <= mr);
                            assert!(out.abs() <= mt);
                        }
                    } else {
                        assert!((out - last).abs() <= mt.max(mr), "{} -> {}", last, target);
                    }
                }
            }
        }
    }

    #[test]
    fn test_history_seed_and_get() {
        let mut history = ChannelHistory::new();
        history.seed(1, 1234);
        history.seed(8, -50);
        history.seed(0, 99);
        history.seed(9, 99);
        assert_eq!(history.get(1), 1234);
        assert_eq!(history.get(8), -50);
        assert_eq!(history.get(0), 0);
        assert_eq!(history.get(9), 0);

        let speed = SteeringSpeed::new(0, 0);
        assert_eq!(history.limit(&speed, 5000, 1), 1284);
    }
}
