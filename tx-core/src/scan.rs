//! Button debouncing and rotary encoder decoding.
//!
//! [`KeyScanner`] is fed one raw button snapshot per scan period and one
//! call per encoder detent, and turns them into the [`KeyEvents`] a
//! [`Keypad`](crate::keys::Keypad) reports.

use crate::keys::{KeyEvents, Keys};

/// Button scan period in milliseconds.
pub const SCAN_PERIOD_MS: u64 = 10;

/// Scans a changed snapshot must stay unchanged before it is accepted.
pub const DEBOUNCE_SCANS: u8 = 3;

/// Scans a key must be held to count as a long press (1 s).
pub const LONG_PRESS_SCANS: u16 = 100;

/// Autorepeat interval after the long press delay, in scans.
pub const REPEAT_SCANS: u16 = 10;

/// Two encoder steps closer than this many scans are a fast rotation.
pub const ENCODER_FAST_SCANS: u16 = 5;

/// Debouncer and event generator for the keypad.
///
/// A key press is reported once it has been stable for [`DEBOUNCE_SCANS`].
/// Held for [`LONG_PRESS_SCANS`], plain keys report a long press while
/// autorepeat keys start repeating every [`REPEAT_SCANS`]. Releases are
/// not reported.
#[derive(Debug, Clone)]
pub struct KeyScanner {
    last_raw: Keys,
    stable_for: u8,
    stable: Keys,
    held: u16,
    since_step: u16,
}

impl KeyScanner {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_raw: Keys::NONE,
            stable_for: 0,
            stable: Keys::NONE,
            held: 0,
            since_step: u16::MAX,
        }
    }

    /// Debounced key state.
    #[inline]
    #[must_use]
    pub fn held(&self) -> Keys {
        self.stable
    }

    /// Feed one button snapshot (`raw` has a bit set for every key
    /// currently down) and return the events it produced.
    pub fn scan(&mut self, raw: Keys, autorepeat: Keys) -> KeyEvents {
        let raw = raw & !Keys::ROT_ALL;
        self.since_step = self.since_step.saturating_add(1);

        if raw == self.last_raw {
            self.stable_for = self.stable_for.saturating_add(1);
        } else {
            self.last_raw = raw;
            self.stable_for = 0;
        }

        let mut events = KeyEvents::NONE;
        if self.stable_for >= DEBOUNCE_SCANS && raw != self.stable {
            events.pressed = raw & !self.stable;
            self.stable = raw;
            self.held = 0;
            return events;
        }
        if self.stable.is_empty() {
            return events;
        }

        self.held = self.held.saturating_add(1);
        if self.held == LONG_PRESS_SCANS {
            let plain = self.stable & !autorepeat;
            events.pressed = plain;
            events.long = plain;
        }
        if self.held >= LONG_PRESS_SCANS && (self.held - LONG_PRESS_SCANS) % REPEAT_SCANS == 0 {
            events.pressed |= self.stable & autorepeat;
        }
        // keep the counter bounded without producing a second long press
        if self.held > LONG_PRESS_SCANS + REPEAT_SCANS {
            self.held -= REPEAT_SCANS;
        }
        events
    }

    /// Decode one encoder detent: a rising edge of phase A with phase B
    /// at `b_high`.
    pub fn encoder_step(&mut self, b_high: bool) -> KeyEvents {
        let key = if b_high { Keys::ROT_L } else { Keys::ROT_R };
        let fast = self.since_step < ENCODER_FAST_SCANS;
        self.since_step = 0;
        if fast {
            KeyEvents::long(key)
        } else {
            KeyEvents::pressed(key)
        }
    }
}

impl Default for KeyScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Feed `raw` for `scans` periods, collecting all events
    fn feed(scanner: &mut KeyScanner, raw: Keys, autorepeat: Keys, scans: u16) -> KeyEvents {
        let mut all = KeyEvents::NONE;
        for _ in 0..scans {
            all.merge(scanner.scan(raw, autorepeat));
        }
        all
    }

    #[test]
    fn test_press_reported_after_debounce() {
        let mut scanner = KeyScanner::new();
        for _ in 0..DEBOUNCE_SCANS {
            assert!(scanner.scan(Keys::ENTER, Keys::NONE).is_empty());
        }
        let events = scanner.scan(Keys::ENTER, Keys::NONE);
        assert_eq!(events, KeyEvents::pressed(Keys::ENTER));
        assert_eq!(scanner.held(), Keys::ENTER);
    }

    #[test]
    fn test_bounce_is_ignored() {
        let mut scanner = KeyScanner::new();
        let mut events = KeyEvents::NONE;
        for i in 0..20 {
            let raw = if i % 2 == 0 { Keys::BACK } else { Keys::NONE };
            events.merge(scanner.scan(raw, Keys::NONE));
        }
        assert!(events.is_empty());
    }

    #[test]
    fn test_release_not_reported() {
        let mut scanner = KeyScanner::new();
        feed(&mut scanner, Keys::END, Keys::NONE, 10);
        let events = feed(&mut scanner, Keys::NONE, Keys::NONE, 10);
        assert!(events.is_empty());
        assert_eq!(scanner.held(), Keys::NONE);
    }

    #[test]
    fn test_long_press_once() {
        let mut scanner = KeyScanner::new();
        let first = feed(&mut scanner, Keys::ENTER, Keys::NONE, u16::from(DEBOUNCE_SCANS) + 1);
        assert!(!first.btnl(Keys::ENTER));

        let events = feed(&mut scanner, Keys::ENTER, Keys::NONE, LONG_PRESS_SCANS);
        assert!(events.btnl(Keys::ENTER));

        // held much longer: no second long press
        let events = feed(&mut scanner, Keys::ENTER, Keys::NONE, 500);
        assert!(events.is_empty());
    }

    #[test]
    fn test_autorepeat_keys_repeat_instead_of_long() {
        let mut scanner = KeyScanner::new();
        let repeat = Keys::TRIM1_L | Keys::TRIM1_R;
        feed(&mut scanner, Keys::TRIM1_L, repeat, u16::from(DEBOUNCE_SCANS) + 1);

        let mut presses = 0;
        let mut long = false;
        for _ in 0..(LONG_PRESS_SCANS + 3 * REPEAT_SCANS) {
            let events = scanner.scan(Keys::TRIM1_L, repeat);
            if events.btn(Keys::TRIM1_L) {
                presses += 1;
            }
            long |= events.btnl(Keys::TRIM1_L);
        }
        assert!(!long);
        assert_eq!(presses, 4);
    }

    #[test]
    fn test_second_key_joins_held_key() {
        let mut scanner = KeyScanner::new();
        feed(&mut scanner, Keys::CH3, Keys::NONE, 10);
        let events = feed(&mut scanner, Keys::CH3 | Keys::BACK, Keys::NONE, 10);
        assert_eq!(events, KeyEvents::pressed(Keys::BACK));
    }

    #[test]
    fn test_encoder_direction() {
        let mut scanner = KeyScanner::new();
        assert_eq!(scanner.encoder_step(false), KeyEvents::pressed(Keys::ROT_R));
        feed(&mut scanner, Keys::NONE, Keys::NONE, ENCODER_FAST_SCANS);
        assert_eq!(scanner.encoder_step(true), KeyEvents::pressed(Keys::ROT_L));
    }

    #[test]
    fn test_fast_rotation_is_long() {
        let mut scanner = KeyScanner::new();
        scanner.encoder_step(false);
        scanner.scan(Keys::NONE, Keys::NONE);
        let events = scanner.encoder_step(false);
        assert!(events.btn(Keys::ROT_R));
        assert!(events.btnl(Keys::ROT_R));
    }

    #[test]
    fn test_scan_ignores_rotation_bits() {
        let mut scanner = KeyScanner::new();
        let events = feed(&mut scanner, Keys::ROT_L, Keys::NONE, 10);
        assert!(events.is_empty());
    }
}
