//! Channel store: the configuration and menu-set values shared by the
//! frame task and the menu engine.
//!
//! Both tasks run on one cooperative executor. The store sits in an
//! `embassy-sync` blocking mutex and is only touched through
//! [`with_store`], whose closure cannot await, so every multi-field update
//! is complete before the other task can observe it.

use core::cell::RefCell;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use tx_config::channel::MAX_CHANNELS;
use tx_config::{GlobalConfig, KeyConfig, ModelConfig};

/// Number of auxiliary channels (3..=8).
pub const AUX_CHANNELS: usize = MAX_CHANNELS as usize - 2;

/// Exact value injected into one channel, bypassing the signal path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ForceValue {
    pub channel: u8,
    pub value: i16,
}

/// State shared between the frame task and the menu engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelStore {
    pub model: ModelConfig,
    pub global: GlobalConfig,
    pub keys: KeyConfig,
    /// Operator-set values (-100..=100) of channels 3..=8.
    pub aux: [i8; AUX_CHANNELS],
    /// 4WS mix, negative reduces front, positive reduces rear.
    pub four_ws_mix: i8,
    pub four_ws_crab: bool,
    /// Dual-ESC mix, negative reduces channel 2, positive the DIG channel.
    pub dig_mix: i8,
    /// Selected multi-position entry.
    pub mp_index: u8,
    pub force: Option<ForceValue>,
    pub battery_low: bool,
    /// Operator silenced the low battery alarm.
    pub battery_low_shutup: bool,
    battery_low_raw: u16,
}

impl ChannelStore {
    #[must_use]
    pub fn new(model: ModelConfig, global: GlobalConfig, keys: KeyConfig) -> Self {
        let mut store = Self {
            model,
            global,
            keys,
            aux: [0; AUX_CHANNELS],
            four_ws_mix: 0,
            four_ws_crab: false,
            dig_mix: 0,
            mp_index: 0,
            force: None,
            battery_low: false,
            battery_low_shutup: false,
            battery_low_raw: 0,
        };
        store.load_model(model, keys);
        store.apply_global();
        store
    }

    /// Replace the model and reset every menu-set value to its start state.
    ///
    /// Auxiliary channels start fully left; the multi-position channel
    /// starts at its first position.
    pub fn load_model(&mut self, model: ModelConfig, keys: KeyConfig) {
        self.model = model;
        self.keys = keys;
        self.aux = [-100; AUX_CHANNELS];
        self.four_ws_mix = 0;
        self.four_ws_crab = false;
        self.dig_mix = 0;
        self.mp_index = 0;
        self.force = None;
        if let Some(ch) = model.roles.multi_position() {
            self.set_aux(ch, model.multi_position[0]);
        }
    }

    /// Replace the global configuration and refresh derived values.
    pub fn set_global(&mut self, global: GlobalConfig) {
        self.global = global;
        self.apply_global();
    }

    /// Refresh values derived from the global configuration.
    pub fn apply_global(&mut self) {
        self.battery_low_raw = self.global.battery_low_raw();
    }

    #[inline]
    #[must_use]
    pub fn battery_low_raw(&self) -> u16 {
        self.battery_low_raw
    }

    /// Operator value of auxiliary `channel` (3..=8).
    #[must_use]
    pub fn aux(&self, channel: u8) -> Option<i8> {
        aux_index(channel).map(|i| self.aux[i])
    }

    /// Set the operator value of auxiliary `channel`, clamped to ±100.
    pub fn set_aux(&mut self, channel: u8, value: i8) {
        if let Some(i) = aux_index(channel) {
            self.aux[i] = value.clamp(-100, 100);
        }
    }

    /// Force `channel` to an exact value until cleared.
    pub fn set_force(&mut self, channel: u8, value: i16) {
        self.force = Some(ForceValue { channel, value });
    }

    pub fn clear_force(&mut self) {
        self.force = None;
    }
}

impl Default for ChannelStore {
    fn default() -> Self {
        Self::new(
            ModelConfig::default(),
            GlobalConfig::default(),
            KeyConfig::default(),
        )
    }
}

#[inline]
fn aux_index(channel: u8) -> Option<usize> {
    match channel {
        3..=MAX_CHANNELS => Some(usize::from(channel - 3)),
        _ => None,
    }
}

/// The store as shared between tasks.
pub type SharedStore<M> = Mutex<M, RefCell<ChannelStore>>;

/// Run `f` with exclusive access to the store.
///
/// This is the only way to read or change shared state. The closure is
/// synchronous, so the update cannot be interleaved with the other task.
#[inline]
pub fn with_store<M: RawMutex, R>(
    store: &SharedStore<M>,
    f: impl FnOnce(&mut ChannelStore) -> R,
) -> R {
    store.lock(|cell| f(&mut cell.borrow_mut()))
}
