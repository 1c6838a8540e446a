//! Menu interaction engine.
//!
//! Two reusable state machines edit the channel store from button and
//! encoder events:
//!
//! - [`Menu::common`]: two-tier id-select / setting-edit menu driven by a
//!   [`CommonItem`]
//! - [`Menu::list`]: flat list of [`ListItem`]s, each owning its own
//!   sub-navigation
//!
//! Item callbacks are synchronous and always run inside one store lock, so
//! an edit is complete before the frame task can see it. The engine only
//! yields while waiting for input.

mod common;
mod list;
pub mod screens;

pub use common::CommonItem;
pub use list::{ListAction, ListItem};

use crate::keys::{autorepeat_keys, KeyEvents, Keypad, Keys};
use crate::panel::{Blink, BlinkMask, Buzzer, Display, Segment, BUZZER_FOREVER};
use crate::store::{with_store, ChannelStore, SharedStore};
use core::ops::BitOr;
use embassy_sync::blocking_mutex::raw::RawMutex;
use tx_config::{ConfigSource, GlobalConfig, KeyConfig, ModelConfig};

/// Buzzer pattern of the low battery alarm, in units of 10 ms.
const LOW_BATTERY_ON: u8 = 40;
const LOW_BATTERY_OFF: u8 = 160;

/// Options of a [`Menu::common`] session.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MenuFlags(pub u8);

impl MenuFlags {
    pub const NONE: Self = Self(0);
    /// Rotation in id-select calls [`CommonItem::id_change`] instead of
    /// stepping the id.
    pub const ID_CHANGE: Self = Self(1 << 0);
    /// Wait for input without reconciling the low battery indicator.
    pub const STOP: Self = Self(1 << 1);
    /// Keep the low battery symbol off while this session runs.
    pub const LOW_POWER: Self = Self(1 << 2);
    /// Id selection stops at the first and last id instead of wrapping.
    pub const CLAMP_ID: Self = Self(1 << 3);

    #[inline]
    #[must_use]
    pub const fn contains(self, flags: MenuFlags) -> bool {
        self.0 & flags.0 == flags.0
    }
}

impl BitOr for MenuFlags {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

/// Transient state of one menu session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Session {
    /// Selected menu id.
    pub id: u8,
    /// Setting being edited, `1..=settings`.
    pub k: u8,
    /// In setting-edit rather than id-select.
    pub editing: bool,
    /// Which displayed fields blink while editing.
    pub blink: BlinkMask,
    /// Call the ADC hooks on every wakeup.
    pub adc_wakeup: bool,
    pub flags: MenuFlags,
}

impl Session {
    #[must_use]
    pub const fn new(flags: MenuFlags) -> Self {
        Self {
            id: 0,
            k: 1,
            editing: false,
            blink: BlinkMask::ALL,
            adc_wakeup: false,
            flags,
        }
    }

    /// Move the id one step within `0..ids`, wrapping unless
    /// [`MenuFlags::CLAMP_ID`] is set.
    pub fn step_id(&mut self, ids: u8, forward: bool) {
        let Some(last) = ids.checked_sub(1) else {
            self.id = 0;
            return;
        };
        let clamp = self.flags.contains(MenuFlags::CLAMP_ID);
        self.id = match (forward, self.id.min(last)) {
            (true, id) if id == last => {
                if clamp {
                    last
                } else {
                    0
                }
            }
            (true, id) => id + 1,
            (false, 0) => {
                if clamp {
                    0
                } else {
                    last
                }
            }
            (false, id) => id - 1,
        };
    }
}

/// What an item callback gets to work with.
pub struct MenuCx<'a> {
    pub session: &'a mut Session,
    pub store: &'a mut ChannelStore,
    pub display: &'a mut dyn Display,
    /// Events of the current wakeup.
    pub events: KeyEvents,
}

impl MenuCx<'_> {
    /// Step `val` by one encoder detent, or by `fast` on fast rotation.
    ///
    /// Leaving `min..=max` wraps to the other end when `wrap` is set and
    /// clamps otherwise.
    #[must_use]
    pub fn change_val(&self, val: i16, min: i16, max: i16, fast: u8, wrap: bool) -> i16 {
        let (val, min, max) = (i32::from(val), i32::from(min), i32::from(max));
        let left = self.events.btn(Keys::ROT_L);
        let step = if (left && self.events.btnl(Keys::ROT_L))
            || (!left && self.events.btnl(Keys::ROT_R))
        {
            i32::from(fast)
        } else {
            1
        };

        let next = if left { val - step } else { val + step };
        let next = if next < min {
            if wrap {
                max
            } else {
                min
            }
        } else if next > max {
            if wrap {
                min
            } else {
                max
            }
        } else {
            next
        };
        next as i16
    }
}

/// The menu task: owns the input and panel collaborators and edits the
/// shared store.
pub struct Menu<'s, K, D, B, M: RawMutex> {
    keypad: K,
    display: D,
    buzzer: B,
    store: &'s SharedStore<M>,
    battery_low_on: bool,
}

impl<'s, K: Keypad, D: Display, B: Buzzer, M: RawMutex> Menu<'s, K, D, B, M> {
    pub fn new(keypad: K, display: D, buzzer: B, store: &'s SharedStore<M>) -> Self {
        Self {
            keypad,
            display,
            buzzer,
            store,
            battery_low_on: false,
        }
    }

    /// Load the global configuration, falling back to defaults.
    pub fn load_global(&mut self, source: &mut impl ConfigSource) {
        let global = source.load_global().unwrap_or_else(|e| {
            warn!("Global config unavailable ({}), using defaults", e);
            GlobalConfig::default()
        });
        self.display.backlight(global.backlight_time);
        with_store(self.store, |s| s.set_global(global));
    }

    /// Load the selected model and its key mapping, falling back to
    /// defaults, and reset all menu-set channel values.
    pub fn load_model(&mut self, source: &mut impl ConfigSource) {
        let index = with_store(self.store, |s| s.global.model);
        let model = source.load_model(index).unwrap_or_else(|e| {
            warn!("Model {} unavailable ({}), using defaults", index, e);
            ModelConfig::default()
        });
        let keys = source.load_keys(index).unwrap_or_else(|e| {
            warn!("Key mapping {} unavailable ({}), using defaults", index, e);
            KeyConfig::default()
        });

        with_store(self.store, |s| s.load_model(model, keys));
        self.keypad.set_autorepeat(autorepeat_keys(&keys));
        info!("Model {} loaded, {} channels", index, model.channel_count());
    }

    /// Wait for input, then show or hide the low battery indicator.
    ///
    /// The alarm is re-armed when the buzzer went quiet while the battery is
    /// still low, unless the operator silenced it.
    pub async fn stop(&mut self) {
        self.keypad.wait().await;

        let (low, shutup) = with_store(self.store, |s| (s.battery_low, s.battery_low_shutup));
        if low && !self.buzzer.is_running() && !shutup {
            self.battery_low_on = false;
        }
        if self.battery_low_on == low {
            return;
        }

        self.battery_low_on = low;
        if low {
            info!("Battery low");
            self.display.segment(Segment::LowPower, true);
            self.display.segment_blink(Segment::LowPower, Blink::Space);
            self.buzzer.on(LOW_BATTERY_ON, LOW_BATTERY_OFF, BUZZER_FOREVER);
        } else {
            self.display.segment(Segment::LowPower, false);
            self.buzzer.off();
        }
        self.display.update();
    }

    /// Turn off all status symbols.
    pub fn clear_symbols(&mut self) {
        for segment in Segment::STATUS {
            self.display.segment(segment, false);
        }
    }

    pub fn keypad_mut(&mut self) -> &mut K {
        &mut self.keypad
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn buzzer_mut(&mut self) -> &mut B {
        &mut self.buzzer
    }

    /// Decompose the menu into its collaborators.
    pub fn into_parts(self) -> (K, D, B) {
        (self.keypad, self.display, self.buzzer)
    }

    /// Drop old events and wait for the next wakeup.
    async fn wait(&mut self, plain: bool) -> KeyEvents {
        self.keypad.clear();
        if plain {
            self.keypad.wait().await;
        } else {
            self.stop().await;
        }
        self.keypad.events()
    }

    /// Clear symbols left by the previous screen.
    fn clear_screen(&mut self, hide_low_power: bool) {
        self.clear_symbols();
        if hide_low_power {
            self.display.segment(Segment::LowPower, false);
        }
    }

    /// Run an item callback with the store locked.
    fn with_cx<R>(&mut self, session: &mut Session, f: impl FnOnce(&mut MenuCx<'_>) -> R) -> R {
        let events = self.keypad.events();
        let display = &mut self.display;
        with_store(self.store, |store| {
            let mut cx = MenuCx {
                session,
                store,
                display,
                events,
            };
            f(&mut cx)
        })
    }

    /// Common exit path of both variants.
    fn finish(&mut self, session: &mut Session, hide_low_power: bool) {
        self.clear_screen(hide_low_power);
        self.display.seg7_blink(Blink::Off);
        self.display.chars_blink(Blink::Off);
        self.display.update();

        with_store(self.store, |s| s.clear_force());
        session.adc_wakeup = false;
        session.editing = false;
        session.blink = BlinkMask::ALL;
        self.buzzer.key_beep();
    }
}

/// Keys that end a session.
#[inline]
fn is_exit(events: &KeyEvents) -> bool {
    events.btn(Keys::BACK | Keys::END) || events.btnl(Keys::ENTER)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::testing::{block_on, MockBuzzer, MockDisplay, MockKeypad};
    use core::cell::RefCell;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use embassy_sync::blocking_mutex::Mutex;
    use std::vec;
    use tx_config::{ConfigError, DefaultConfig, TrimButtons};

    type TestMenu<'s> = Menu<'s, MockKeypad, MockDisplay, MockBuzzer, NoopRawMutex>;

    fn store() -> SharedStore<NoopRawMutex> {
        Mutex::new(RefCell::new(ChannelStore::default()))
    }

    fn menu(store: &SharedStore<NoopRawMutex>, script: std::vec::Vec<KeyEvents>) -> TestMenu<'_> {
        Menu::new(
            MockKeypad::new(script),
            MockDisplay::new(),
            MockBuzzer::default(),
            store,
        )
    }

    fn cx_change(events: KeyEvents, val: i16, min: i16, max: i16, wrap: bool) -> i16 {
        let mut session = Session::new(MenuFlags::NONE);
        let mut store = ChannelStore::default();
        let mut display = MockDisplay::new();
        let cx = MenuCx {
            session: &mut session,
            store: &mut store,
            display: &mut display,
            events,
        };
        cx.change_val(val, min, max, 5, wrap)
    }

    #[test]
    fn test_change_val_steps() {
        assert_eq!(cx_change(KeyEvents::pressed(Keys::ROT_R), 10, 0, 20, false), 11);
        assert_eq!(cx_change(KeyEvents::pressed(Keys::ROT_L), 10, 0, 20, false), 9);
        assert_eq!(cx_change(KeyEvents::long(Keys::ROT_L), 10, 0, 20, false), 5);
        assert_eq!(cx_change(KeyEvents::long(Keys::ROT_R), 10, 0, 20, false), 15);
    }

    #[test]
    fn test_change_val_limits() {
        assert_eq!(cx_change(KeyEvents::long(Keys::ROT_R), 18, 0, 20, false), 20);
        assert_eq!(cx_change(KeyEvents::pressed(Keys::ROT_R), 20, 0, 20, true), 0);
        assert_eq!(cx_change(KeyEvents::pressed(Keys::ROT_L), 0, 0, 20, true), 20);
        assert_eq!(cx_change(KeyEvents::long(Keys::ROT_L), 2, 0, 20, false), 0);
    }

    #[test]
    fn test_step_id_wraps_or_clamps() {
        let mut session = Session::new(MenuFlags::NONE);
        session.step_id(3, false);
        assert_eq!(session.id, 2);
        session.step_id(3, true);
        assert_eq!(session.id, 0);

        let mut session = Session::new(MenuFlags::CLAMP_ID);
        session.step_id(3, false);
        assert_eq!(session.id, 0);
        session.id = 2;
        session.step_id(3, true);
        assert_eq!(session.id, 2);

        session.step_id(0, true);
        assert_eq!(session.id, 0);
    }

    #[test]
    fn test_battery_indicator() {
        let store = store();
        let none = KeyEvents::NONE;
        let mut menu = menu(&store, vec![none; 6]);

        with_store(&store, |s| s.battery_low = true);
        block_on(menu.stop());
        assert!(menu.display().is_on(Segment::LowPower));
        assert_eq!(menu.display().segment_blinks[Segment::LowPower as usize], Blink::Space);
        assert_eq!(menu.buzzer_mut().alarms, 1);

        // still sounding, nothing to do
        block_on(menu.stop());
        assert_eq!(menu.buzzer_mut().alarms, 1);

        // alarm finished while still low: re-armed
        menu.buzzer_mut().running = false;
        block_on(menu.stop());
        assert_eq!(menu.buzzer_mut().alarms, 2);

        // silenced by the operator
        with_store(&store, |s| s.battery_low_shutup = true);
        menu.buzzer_mut().running = false;
        block_on(menu.stop());
        assert_eq!(menu.buzzer_mut().alarms, 2);

        with_store(&store, |s| s.battery_low = false);
        block_on(menu.stop());
        assert!(!menu.display().is_on(Segment::LowPower));
        assert_eq!(menu.buzzer_mut().offs, 1);
    }

    #[test]
    fn test_clear_symbols_leaves_low_power() {
        let store = store();
        let mut menu = menu(&store, vec![]);
        menu.display_mut().segments = [true; 8];
        menu.clear_symbols();
        for segment in Segment::STATUS {
            assert!(!menu.display().is_on(segment));
        }
        assert!(menu.display().is_on(Segment::LowPower));
    }

    #[test]
    fn test_load_model_sets_autorepeat_and_resets() {
        let store = store();
        let mut menu = menu(&store, vec![]);
        with_store(&store, |s| {
            s.four_ws_mix = 30;
            s.aux = [0; 6];
        });

        menu.load_model(&mut DefaultConfig);

        assert_eq!(
            menu.keypad_mut().autorepeat,
            Keys::TRIM1_L | Keys::TRIM1_R | Keys::TRIM2_L | Keys::TRIM2_R
        );
        with_store(&store, |s| {
            assert_eq!(s.four_ws_mix, 0);
            assert_eq!(s.aux, [-100; 6]);
        });
    }

    struct BrokenStorage;

    impl ConfigSource for BrokenStorage {
        fn load_global(&mut self) -> Result<GlobalConfig, ConfigError> {
            Err(ConfigError::Io)
        }

        fn load_model(&mut self, _index: u8) -> Result<ModelConfig, ConfigError> {
            Err(ConfigError::Corrupted)
        }

        fn load_keys(&mut self, _index: u8) -> Result<KeyConfig, ConfigError> {
            let mut keys = KeyConfig::default();
            keys.trims[0].buttons = TrimButtons::Momentary;
            Ok(keys)
        }
    }

    #[test]
    fn test_load_falls_back_to_defaults() {
        let store = store();
        let mut menu = menu(&store, vec![]);
        with_store(&store, |s| {
            s.model.channels = 7;
            s.global.battery_low = 10;
        });

        menu.load_global(&mut BrokenStorage);
        menu.load_model(&mut BrokenStorage);

        with_store(&store, |s| {
            assert_eq!(s.model, ModelConfig::default());
            assert_eq!(s.global, GlobalConfig::default());
            assert_eq!(s.battery_low_raw(), GlobalConfig::default().battery_low_raw());
        });
        assert_eq!(menu.display().backlight, Some(GlobalConfig::default().backlight_time));
        assert_eq!(menu.keypad_mut().autorepeat, Keys::TRIM2_L | Keys::TRIM2_R);
    }
}
