//! Concrete menu screens built on the generic engine.

use super::{CommonItem, ListAction, ListItem, MenuCx};
use crate::panel::Segment;
use crate::store::{ChannelStore, AUX_CHANNELS};
use heapless::Vec;
use tx_config::ppm::SIGNAL_MAX;
use tx_config::{AbsType, ModelConfig};

/// Fast encoder step for percentage settings.
const FAST_STEP: u8 = 5;

/// Display names of the ABS types, by index.
const ABS_NAMES: [&[u8; 3]; 4] = [b"OFF", b"SLW", b"NRM", b"FST"];

/// One model parameter editable from [`ModelSetup`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModelParam {
    ExpoSteering,
    ExpoForward,
    ExpoBack,
    RateSteering,
    RateForward,
    RateBack,
    SpeedTurn,
    SpeedReturn,
    Abs,
}

impl ModelParam {
    /// Parameters in menu order.
    pub const ALL: [ModelParam; 9] = [
        ModelParam::ExpoSteering,
        ModelParam::ExpoForward,
        ModelParam::ExpoBack,
        ModelParam::RateSteering,
        ModelParam::RateForward,
        ModelParam::RateBack,
        ModelParam::SpeedTurn,
        ModelParam::SpeedReturn,
        ModelParam::Abs,
    ];

    /// Parameter shown at menu `id`; out-of-range ids select the last one.
    #[must_use]
    pub fn from_id(id: u8) -> Self {
        Self::ALL
            .get(usize::from(id))
            .copied()
            .unwrap_or(ModelParam::Abs)
    }

    /// Allowed values as `(min, max)`.
    #[must_use]
    pub fn range(self) -> (i16, i16) {
        match self {
            ModelParam::ExpoSteering | ModelParam::ExpoForward | ModelParam::ExpoBack => {
                let max = i16::from(ModelConfig::EXPO_MAX);
                (-max, max)
            }
            ModelParam::RateSteering
            | ModelParam::RateForward
            | ModelParam::RateBack
            | ModelParam::SpeedTurn
            | ModelParam::SpeedReturn => (0, 100),
            ModelParam::Abs => (0, 3),
        }
    }

    #[must_use]
    pub fn get(self, model: &ModelConfig) -> i16 {
        match self {
            ModelParam::ExpoSteering => i16::from(model.expo_steering),
            ModelParam::ExpoForward => i16::from(model.expo_forward),
            ModelParam::ExpoBack => i16::from(model.expo_back),
            ModelParam::RateSteering => i16::from(model.dr_steering),
            ModelParam::RateForward => i16::from(model.dr_forward),
            ModelParam::RateBack => i16::from(model.dr_back),
            ModelParam::SpeedTurn => i16::from(model.stspd_turn),
            ModelParam::SpeedReturn => i16::from(model.stspd_return),
            ModelParam::Abs => i16::from(model.abs_type.index()),
        }
    }

    /// Store `value`, clamped to [`range`](Self::range).
    pub fn set(self, model: &mut ModelConfig, value: i16) {
        let (min, max) = self.range();
        let value = value.clamp(min, max);
        match self {
            ModelParam::ExpoSteering => model.expo_steering = value as i8,
            ModelParam::ExpoForward => model.expo_forward = value as i8,
            ModelParam::ExpoBack => model.expo_back = value as i8,
            ModelParam::RateSteering => model.dr_steering = value as u8,
            ModelParam::RateForward => model.dr_forward = value as u8,
            ModelParam::RateBack => model.dr_back = value as u8,
            ModelParam::SpeedTurn => model.stspd_turn = value as u8,
            ModelParam::SpeedReturn => model.stspd_return = value as u8,
            ModelParam::Abs => model.abs_type = AbsType::from_index(value as u8),
        }
    }
}

/// Expo, dual-rate, steering speed and ABS of the current model, one
/// setting per id. Values take effect on the next frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct ModelSetup;

impl CommonItem for ModelSetup {
    fn ids(&self, _store: &ChannelStore) -> u8 {
        ModelParam::ALL.len() as u8
    }

    fn settings(&self, _id: u8) -> u8 {
        1
    }

    fn show(&mut self, cx: &mut MenuCx<'_>) {
        let param = ModelParam::from_id(cx.session.id);
        cx.display.seg7_number(cx.session.id + 1);
        if param == ModelParam::Abs {
            cx.display.segment(Segment::Percent, false);
            cx.display
                .chars_text(ABS_NAMES[usize::from(cx.store.model.abs_type.index())]);
        } else {
            cx.display.segment(Segment::Percent, true);
            cx.display.chars_number(param.get(&cx.store.model));
        }
    }

    fn setting_changed(&mut self, cx: &mut MenuCx<'_>) {
        let param = ModelParam::from_id(cx.session.id);
        let (min, max) = param.range();
        let (fast, wrap) = if param == ModelParam::Abs {
            (1, true)
        } else {
            (FAST_STEP, false)
        };
        let value = cx.change_val(param.get(&cx.store.model), min, max, fast, wrap);
        param.set(&mut cx.store.model, value);
        self.show(cx);
    }

    fn commit(&mut self, cx: &mut MenuCx<'_>) {
        debug!("Model setting {} committed", cx.session.id);
    }
}

/// Endpoints of every channel: id selects the channel, setting 1 is the
/// left side and setting 2 the right side.
///
/// While a side is being edited the channel is forced to full throw on
/// that side, so the servo shows the endpoint being set.
#[derive(Clone, Copy, Debug, Default)]
pub struct EndpointSetup;

impl EndpointSetup {
    fn channel(cx: &MenuCx<'_>) -> u8 {
        cx.session.id + 1
    }

    fn side(cx: &MenuCx<'_>) -> usize {
        usize::from(cx.session.k > 1)
    }

    fn force(cx: &mut MenuCx<'_>) {
        if cx.session.editing {
            let value = if Self::side(cx) == 0 {
                -SIGNAL_MAX
            } else {
                SIGNAL_MAX
            };
            cx.store.set_force(Self::channel(cx), value);
        }
    }
}

impl CommonItem for EndpointSetup {
    fn ids(&self, store: &ChannelStore) -> u8 {
        store.model.channel_count()
    }

    fn settings(&self, _id: u8) -> u8 {
        2
    }

    fn show(&mut self, cx: &mut MenuCx<'_>) {
        let side = Self::side(cx);
        let value = cx
            .store
            .model
            .endpoint
            .get(usize::from(cx.session.id))
            .map_or(0, |ep| ep[side]);

        cx.display.seg7_number(Self::channel(cx));
        cx.display.segment(Segment::Channel, true);
        cx.display.segment(Segment::Left, side == 0);
        cx.display.segment(Segment::Right, side == 1);
        cx.display.segment(Segment::Percent, true);
        cx.display.chars_number(i16::from(value));
    }

    fn setting_changed(&mut self, cx: &mut MenuCx<'_>) {
        let side = Self::side(cx);
        let index = usize::from(cx.session.id);
        if let Some(current) = cx.store.model.endpoint.get(index).map(|ep| ep[side]) {
            let max = i16::from(ModelConfig::ENDPOINT_MAX);
            let value = cx.change_val(i16::from(current), 0, max, FAST_STEP, false);
            cx.store.model.endpoint[index][side] = value as u8;
        }
        Self::force(cx);
        self.show(cx);
    }

    fn edit_start(&mut self, cx: &mut MenuCx<'_>) {
        Self::force(cx);
    }

    fn setting_next(&mut self, cx: &mut MenuCx<'_>) {
        Self::force(cx);
        self.show(cx);
    }

    fn commit(&mut self, cx: &mut MenuCx<'_>) {
        cx.store.clear_force();
        self.show(cx);
    }
}

/// Operator value of one auxiliary channel, as a list entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuxChannelItem {
    channel: u8,
}

impl AuxChannelItem {
    #[must_use]
    pub const fn new(channel: u8) -> Self {
        Self { channel }
    }

    #[must_use]
    pub const fn channel(&self) -> u8 {
        self.channel
    }

    fn show(&self, cx: &mut MenuCx<'_>) {
        cx.display.seg7_number(self.channel);
        cx.display.segment(Segment::Channel, true);
        cx.display.segment(Segment::Percent, true);
        cx.display
            .chars_number(i16::from(cx.store.aux(self.channel).unwrap_or(0)));
    }
}

impl ListItem for AuxChannelItem {
    fn handle(&mut self, sub: u8, action: ListAction, cx: &mut MenuCx<'_>) -> u8 {
        match action {
            ListAction::Show => {
                self.show(cx);
                sub
            }
            ListAction::Rotate => {
                let current = i16::from(cx.store.aux(self.channel).unwrap_or(0));
                let value = cx.change_val(current, -100, 100, FAST_STEP, false);
                cx.store.set_aux(self.channel, value as i8);
                self.show(cx);
                sub
            }
            ListAction::Confirm => 1,
        }
    }
}

/// List entries for every auxiliary channel of the current model that is
/// not produced by 4WS or DIG mixing.
#[must_use]
pub fn aux_items(store: &ChannelStore) -> Vec<AuxChannelItem, AUX_CHANNELS> {
    let mixed = store.model.roles.mixed();
    let mut items = Vec::new();
    for channel in 3..=store.model.channel_count() {
        if !mixed.contains(channel) {
            // at most AUX_CHANNELS channels from 3 upward
            let _ = items.push(AuxChannelItem::new(channel));
        }
    }
    items
}
