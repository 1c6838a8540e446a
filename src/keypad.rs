//! Key and encoder scanning, and the keypad the menu task waits on.

use core::cell::Cell;
use defmt::{debug, warn};
use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Ticker, Timer};
use embedded_hal::digital::InputPin;
use embedded_hal_async::digital::Wait;
use portable_atomic::{AtomicU16, Ordering};
use tx_core::scan::SCAN_PERIOD_MS;
use tx_core::{KeyEvents, KeyScanner, Keypad, Keys};

/// Number of push buttons.
pub const BUTTONS: usize = 12;

/// Key reported by each entry of [`KeyPins::buttons`].
pub const BUTTON_KEYS: [Keys; BUTTONS] = [
    Keys::TRIM1_L,
    Keys::TRIM1_R,
    Keys::TRIM2_L,
    Keys::TRIM2_R,
    Keys::TRIM3_L,
    Keys::TRIM3_R,
    Keys::DR_L,
    Keys::DR_R,
    Keys::CH3,
    Keys::BACK,
    Keys::END,
    Keys::ENTER,
];

/// State shared between the keys task and the menu's [`SharedKeypad`].
pub struct KeyShared {
    events: Mutex<CriticalSectionRawMutex, Cell<KeyEvents>>,
    autorepeat: AtomicU16,
    wake: Signal<CriticalSectionRawMutex, ()>,
}

impl KeyShared {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            events: Mutex::new(Cell::new(KeyEvents::NONE)),
            autorepeat: AtomicU16::new(0),
            wake: Signal::new(),
        }
    }

    /// Add events and wake the menu.
    fn push(&self, events: KeyEvents) {
        if events.is_empty() {
            return;
        }
        self.events.lock(|cell| {
            let mut all = cell.get();
            all.merge(events);
            cell.set(all);
        });
        self.wake.signal(());
    }

    fn autorepeat(&self) -> Keys {
        Keys(self.autorepeat.load(Ordering::Relaxed))
    }
}

impl Default for KeyShared {
    fn default() -> Self {
        Self::new()
    }
}

/// Key and encoder inputs, all active low.
///
/// # Pins
///
/// - GPIO 8-19: buttons in [`BUTTON_KEYS`] order
/// - GPIO 20: encoder phase A
/// - GPIO 21: encoder phase B
pub struct KeyPins<P, E> {
    pub buttons: [P; BUTTONS],
    pub encoder_a: E,
    pub encoder_b: P,
}

impl<P: InputPin, E: Wait> KeyPins<P, E> {
    fn read(buttons: &mut [P; BUTTONS]) -> Keys {
        buttons
            .iter_mut()
            .zip(BUTTON_KEYS)
            .fold(Keys::NONE, |acc, (pin, key)| {
                if pin.is_low().unwrap_or(false) {
                    acc | key
                } else {
                    acc
                }
            })
    }

    /// Scan the buttons every [`SCAN_PERIOD_MS`] and decode encoder
    /// steps as they happen, publishing the events to `shared`.
    pub async fn run(mut self, shared: &KeyShared) -> ! {
        let mut scanner = KeyScanner::new();
        let mut ticker = Ticker::every(Duration::from_millis(SCAN_PERIOD_MS));

        loop {
            let wakeup = select(ticker.next(), self.encoder_a.wait_for_rising_edge()).await;
            let events = match wakeup {
                Either::First(()) => {
                    let raw = Self::read(&mut self.buttons);
                    scanner.scan(raw, shared.autorepeat())
                }
                Either::Second(Ok(())) => {
                    let b_high = self.encoder_b.is_high().unwrap_or(false);
                    scanner.encoder_step(b_high)
                }
                Either::Second(Err(_)) => {
                    warn!("Encoder pin error");
                    KeyEvents::NONE
                }
            };
            if !events.is_empty() {
                debug!("Keys: {:?}", events);
            }
            shared.push(events);
        }
    }
}

/// Menu-side [`Keypad`] over a [`KeyShared`].
///
/// [`wait`](Keypad::wait) also returns after `poll` without any key so
/// the menu can refresh the battery indicator.
pub struct SharedKeypad<'a> {
    shared: &'a KeyShared,
    poll: Duration,
}

impl<'a> SharedKeypad<'a> {
    pub fn new(shared: &'a KeyShared, poll: Duration) -> Self {
        Self { shared, poll }
    }
}

impl Keypad for SharedKeypad<'_> {
    async fn wait(&mut self) {
        select(self.shared.wake.wait(), Timer::after(self.poll)).await;
    }

    fn events(&self) -> KeyEvents {
        self.shared.events.lock(Cell::get)
    }

    fn clear(&mut self) {
        self.shared.events.lock(|cell| cell.set(KeyEvents::NONE));
        self.shared.wake.reset();
    }

    fn set_autorepeat(&mut self, keys: Keys) {
        self.shared.autorepeat.store(keys.0, Ordering::Relaxed);
    }
}
