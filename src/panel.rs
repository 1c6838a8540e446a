//! Display and buzzer.
//!
//! The display has no panel driver yet: [`RttDisplay`] keeps the screen
//! state and logs it over RTT whenever an update changes it. The buzzer
//! is an active buzzer on a GPIO, driven by [`BuzzerDriver`] from its own
//! task while the menu talks to a [`BuzzerHandle`].

use defmt::{debug, info, Format};
use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Timer};
use embedded_hal::digital::OutputPin;
use portable_atomic::{AtomicBool, Ordering};
use tx_core::{Blink, BlinkMask, Buzzer, Display, Segment, BUZZER_FOREVER};

/// Content of the three character cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Format)]
pub enum Chars {
    Blank,
    Number(i16),
    Text([u8; 3]),
}

/// Everything the panel shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Format)]
pub struct Screen {
    /// One bit per [`Segment`].
    pub symbols: u8,
    pub blinking_symbols: u8,
    pub seg7: Option<u8>,
    pub seg7_blink: bool,
    pub chars: Chars,
    /// Blinking characters, as in [`BlinkMask::CHARS`].
    pub blink: u8,
    /// Backlight timeout in seconds, 0 for always on.
    pub backlight: u16,
}

impl Screen {
    const fn blank() -> Self {
        Self {
            symbols: 0,
            blinking_symbols: 0,
            seg7: None,
            seg7_blink: false,
            chars: Chars::Blank,
            blink: 0,
            backlight: 0,
        }
    }
}

const fn bit(segment: Segment) -> u8 {
    1 << segment as u8
}

fn apply(mask: &mut u8, bits: u8, on: bool) {
    if on {
        *mask |= bits;
    } else {
        *mask &= !bits;
    }
}

/// [`Display`] that logs each changed screen over RTT.
pub struct RttDisplay {
    screen: Screen,
    shown: Option<Screen>,
}

impl RttDisplay {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            screen: Screen::blank(),
            shown: None,
        }
    }

    /// Screen state including changes not yet pushed by an update.
    #[must_use]
    pub fn screen(&self) -> &Screen {
        &self.screen
    }
}

impl Default for RttDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RttDisplay {
    fn segment(&mut self, segment: Segment, on: bool) {
        apply(&mut self.screen.symbols, bit(segment), on);
    }

    fn segment_blink(&mut self, segment: Segment, blink: Blink) {
        apply(&mut self.screen.blinking_symbols, bit(segment), blink == Blink::Space);
    }

    fn seg7_blink(&mut self, blink: Blink) {
        self.screen.seg7_blink = blink == Blink::Space;
    }

    fn seg7_number(&mut self, value: u8) {
        self.screen.seg7 = Some(value);
    }

    fn chars_number(&mut self, value: i16) {
        self.screen.chars = Chars::Number(value);
    }

    fn chars_text(&mut self, text: &[u8; 3]) {
        self.screen.chars = Chars::Text(*text);
    }

    fn chars_blink_mask(&mut self, blink: Blink, mask: BlinkMask) {
        let chars = mask.0 & BlinkMask::CHARS.0;
        self.screen.blink &= !BlinkMask::CHARS.0;
        apply(&mut self.screen.blink, chars, blink == Blink::Space);
    }

    fn chars_blink(&mut self, blink: Blink) {
        self.chars_blink_mask(blink, BlinkMask::CHARS);
    }

    fn backlight(&mut self, seconds: u16) {
        self.screen.backlight = seconds;
    }

    fn update(&mut self) {
        if self.shown != Some(self.screen) {
            info!("Display: {}", self.screen);
            self.shown = Some(self.screen);
        }
    }
}

/// Length of the key acknowledge beep, in units of 10 ms.
pub const KEY_BEEP: u8 = 2;

/// Request to the buzzer task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Format)]
pub enum BuzzerCommand {
    Off,
    Beep { on: u8, off: u8, count: u16 },
}

/// State shared between the buzzer task and its [`BuzzerHandle`]s.
pub struct BuzzerShared {
    command: Signal<CriticalSectionRawMutex, BuzzerCommand>,
    running: AtomicBool,
}

impl BuzzerShared {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            command: Signal::new(),
            running: AtomicBool::new(false),
        }
    }
}

impl Default for BuzzerShared {
    fn default() -> Self {
        Self::new()
    }
}

/// Menu-side [`Buzzer`].
pub struct BuzzerHandle<'a> {
    shared: &'a BuzzerShared,
}

impl<'a> BuzzerHandle<'a> {
    pub fn new(shared: &'a BuzzerShared) -> Self {
        Self { shared }
    }
}

impl Buzzer for BuzzerHandle<'_> {
    fn on(&mut self, on: u8, off: u8, count: u16) {
        self.shared.running.store(true, Ordering::Relaxed);
        self.shared
            .command
            .signal(BuzzerCommand::Beep { on, off, count });
    }

    fn off(&mut self) {
        self.shared.running.store(false, Ordering::Relaxed);
        self.shared.command.signal(BuzzerCommand::Off);
    }

    fn key_beep(&mut self) {
        // an alarm in progress wins over the acknowledge beep
        if !self.is_running() {
            self.on(KEY_BEEP, 0, 1);
        }
    }

    fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Relaxed)
    }
}

fn ticks(units: u8) -> Duration {
    Duration::from_millis(u64::from(units) * 10)
}

/// Buzzer task body driving an active buzzer.
///
/// # Pins
///
/// - GPIO 22: buzzer (active high)
pub struct BuzzerDriver<P> {
    pin: P,
}

impl<P: OutputPin> BuzzerDriver<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    fn set(&mut self, on: bool) {
        let result = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        if result.is_err() {
            debug!("Buzzer pin error");
        }
    }

    /// Play commands from `shared` forever; a new command cuts the
    /// current pattern short.
    pub async fn run(mut self, shared: &BuzzerShared) -> ! {
        let mut command = BuzzerCommand::Off;
        loop {
            command = match command {
                BuzzerCommand::Off => {
                    self.set(false);
                    if !shared.command.signaled() {
                        shared.running.store(false, Ordering::Relaxed);
                    }
                    shared.command.wait().await
                }
                BuzzerCommand::Beep { on, off, count } => self
                    .play(shared, on, off, count)
                    .await
                    .unwrap_or(BuzzerCommand::Off),
            };
        }
    }

    /// Play one pattern; returns the command that interrupted it.
    async fn play(
        &mut self,
        shared: &BuzzerShared,
        on: u8,
        off: u8,
        count: u16,
    ) -> Option<BuzzerCommand> {
        let mut left = count;
        while left > 0 {
            self.set(true);
            if let Either::Second(next) =
                select(Timer::after(ticks(on)), shared.command.wait()).await
            {
                return Some(next);
            }
            self.set(false);
            if let Either::Second(next) =
                select(Timer::after(ticks(off)), shared.command.wait()).await
            {
                return Some(next);
            }
            if left != BUZZER_FOREVER {
                left -= 1;
            }
        }
        None
    }
}
