//! Display and buzzer collaborators used by the menu engine.
//!
//! The engine decides *what* is shown and when it blinks; rendering is up
//! to the implementation.

/// Status symbols of the segment display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Segment {
    ModelNo,
    Dot,
    Volts,
    Percent,
    Left,
    Right,
    Channel,
    LowPower,
}

impl Segment {
    /// Symbols cleared when a menu screen changes.
    pub const STATUS: [Segment; 7] = [
        Segment::ModelNo,
        Segment::Dot,
        Segment::Volts,
        Segment::Percent,
        Segment::Left,
        Segment::Right,
        Segment::Channel,
    ];
}

/// Blink mode of a display element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Blink {
    Off,
    /// Alternate with blank.
    Space,
}

/// Which displayed fields blink: one bit per character plus the
/// seven-segment digit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BlinkMask(pub u8);

impl BlinkMask {
    pub const NONE: Self = Self(0);
    /// All three characters.
    pub const CHARS: Self = Self(0b111);
    /// The seven-segment digit.
    pub const SEG7: Self = Self(1 << 7);
    pub const ALL: Self = Self(0xff);

    #[inline]
    #[must_use]
    pub const fn contains(self, other: BlinkMask) -> bool {
        self.0 & other.0 == other.0
    }
}

impl Default for BlinkMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// Display collaborator: one seven-segment digit, three characters and
/// status symbols.
pub trait Display {
    fn segment(&mut self, segment: Segment, on: bool);
    fn segment_blink(&mut self, segment: Segment, blink: Blink);
    fn seg7_blink(&mut self, blink: Blink);
    fn seg7_number(&mut self, value: u8);
    fn chars_number(&mut self, value: i16);
    fn chars_text(&mut self, text: &[u8; 3]);
    fn chars_blink_mask(&mut self, blink: Blink, mask: BlinkMask);
    fn chars_blink(&mut self, blink: Blink);
    /// Backlight timeout in seconds after the last key, 0 for always on.
    fn backlight(&mut self, seconds: u16);
    /// Push pending changes to the hardware.
    fn update(&mut self);
}

/// Buzzer repeat count meaning "until switched off".
pub const BUZZER_FOREVER: u16 = u16::MAX;

/// Buzzer collaborator.
pub trait Buzzer {
    /// Beep `count` times, `on`/`off` in units of 10 ms.
    fn on(&mut self, on: u8, off: u8, count: u16);
    fn off(&mut self);
    /// Short acknowledge beep.
    fn key_beep(&mut self);
    fn is_running(&self) -> bool;
}
