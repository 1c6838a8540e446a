//! Mixing stage: turns one frame of ADC samples and the channel store into
//! pulse widths for every channel.

use crate::abs::AbsSimulator;
use crate::input::AdcSample;
use crate::output::PpmOutput;
use crate::shaping::{calibrate, dual_rate, expo};
use crate::steering::{ChannelHistory, SteeringSpeed};
use crate::store::ChannelStore;
use tx_config::global::oversample;
use tx_config::ppm::{
    clamp_signal, percent, NEUTRAL_PULSE, PPM_PER_US, PULSE_OFFSET_MAX, SIGNAL_MAX,
};
use tx_config::{AxisCalibration, ModelConfig, MAX_CHANNELS};

/// Per-frame signal computation with the state it keeps across frames.
///
/// Channels are computed in a fixed order: steering, throttle, then the
/// auxiliary channels. In dual-ESC steering mode the throttle path consumes
/// the DIG mix the steering path produced in the same frame.
#[derive(Clone, Debug, Default)]
pub struct Mixer {
    history: ChannelHistory,
    /// Rate-limited steering value while channel 1 is a dual-ESC side.
    dig_steering: i16,
    abs: AbsSimulator,
}

impl Mixer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            history: ChannelHistory::new(),
            dig_steering: 0,
            abs: AbsSimulator::new(),
        }
    }

    /// Last value assigned to each channel.
    #[inline]
    #[must_use]
    pub fn history(&self) -> &ChannelHistory {
        &self.history
    }

    #[inline]
    #[must_use]
    pub fn abs(&self) -> &AbsSimulator {
        &self.abs
    }

    /// Overwrite the last value of `channel` before it is rate-limited.
    #[inline]
    pub fn seed(&mut self, channel: u8, value: i16) {
        self.history.seed(channel, value);
    }

    /// Compute and assign all channels for one frame.
    pub fn compute(
        &mut self,
        store: &mut ChannelStore,
        sample: &AdcSample,
        out: &mut impl PpmOutput,
    ) {
        let model = store.model;
        let roles = model.roles;
        let speed = SteeringSpeed::new(model.stspd_turn, model.stspd_return);
        let mut dig = percent(store.dig_mix.clamp(-100, 100));

        // steering
        let val = axis(
            sample.steering,
            &store.global.steering,
            store.global.steering_dead_zone,
        );
        let val = expo(val, model.expo_steering);
        let val = dual_rate(val, model.dr_steering);
        if !roles.dual_esc_steering() {
            match roles.four_ws() {
                None => {
                    let front = self.history.limit(&speed, val, 1);
                    self.assign(store, out, 1, front);
                }
                Some(rear_channel) => {
                    let mix = i32::from(store.four_ws_mix.clamp(-100, 100));
                    let mut front = val;
                    let mut rear = if store.four_ws_crab { -val } else { val };
                    if mix < 0 {
                        front = (i32::from(front) * (100 + mix) / 100) as i16;
                    } else if mix > 0 {
                        rear = (i32::from(rear) * (100 - mix) / 100) as i16;
                    }

                    let front = self.history.limit(&speed, front, 1);
                    self.assign(store, out, 1, front);
                    let rear = self.history.limit(&speed, rear, rear_channel);
                    self.assign(store, out, rear_channel, rear);
                }
            }
        } else {
            // channel 1 history belongs to the throttle side this frame
            self.history.seed(1, self.dig_steering);
            let val = clamp_signal(i32::from(self.history.limit(&speed, val, 1)));
            self.dig_steering = val;
            // moving right reduces channel 1, hence the negation
            dig = -val;
            store.dig_mix = (dig / percent(1)) as i8;
        }

        // throttle
        let val = axis(
            sample.throttle,
            &store.global.throttle,
            store.global.throttle_dead_zone,
        );
        let forward = val < 0;
        let val = expo(val, if forward { model.expo_forward } else { model.expo_back });
        let val = self.abs.apply(model.abs_type, val);
        let val = dual_rate(val, if val < 0 { model.dr_forward } else { model.dr_back });
        match roles.dig() {
            None => self.assign(store, out, 2, val),
            Some(dig_channel) => {
                let max = i32::from(SIGNAL_MAX);
                let dig = i32::from(dig);
                let mut front = val;
                let mut rear = val;
                if store.dig_mix < 0 {
                    front = (i32::from(front) * (max + dig) / max) as i16;
                } else if store.dig_mix > 0 {
                    rear = (i32::from(rear) * (max - dig) / max) as i16;
                }

                self.assign(store, out, 2, front);
                self.assign(store, out, dig_channel, rear);
            }
        }

        // auxiliary channels
        let mixed = roles.mixed();
        for channel in 3..=model.channel_count() {
            if mixed.contains(channel) {
                continue;
            }
            let val = percent(store.aux(channel).unwrap_or(0));
            self.assign(store, out, channel, val);
        }
    }

    /// Pass one channel value through the per-channel calibration and hand
    /// the pulse width to `out`.
    ///
    /// An active force value for `channel` replaces `value`. The result is
    /// clamped to `±5000` and recorded as the channel's last value before
    /// trim, endpoint, subtrim and reverse are applied.
    pub fn assign(
        &mut self,
        store: &ChannelStore,
        out: &mut impl PpmOutput,
        channel: u8,
        value: i16,
    ) {
        let Some(index) = channel_index(channel) else {
            return;
        };
        let model = &store.model;

        let value = match store.force {
            Some(force) if force.channel == channel => force.value,
            _ => value,
        };
        let value = clamp_signal(i32::from(value));
        self.history.seed(channel, value);
        let value = i32::from(value);

        let mut trim = 0;
        let mut trim_offset = 0;
        if let Some(&t) = model.trim.get(index) {
            let max = ModelConfig::TRIM_MAX;
            trim = i32::from(t.clamp(-max, max));
            if trim != 0 && value != 0 {
                // keeps the far endpoint in place while the centre moves
                trim_offset = (value.abs() * trim + 2) / 5;
            }
        }

        let side = usize::from(value >= 0);
        let endpoint = i32::from(model.endpoint[index][side]);
        let mut offset = (value * endpoint - trim_offset) / 100;
        let max = ModelConfig::SUBTRIM_MAX;
        let subtrim = model.subtrim[index].clamp(-max, max);
        offset += (i32::from(subtrim) + trim) * i32::from(PPM_PER_US);
        if model.reverse.contains(channel) {
            offset = -offset;
        }
        let offset = offset.clamp(-PULSE_OFFSET_MAX, PULSE_OFFSET_MAX);

        out.set_value(channel, (i32::from(NEUTRAL_PULSE) + offset) as u16);
    }
}

#[inline]
fn channel_index(channel: u8) -> Option<usize> {
    match channel {
        1..=MAX_CHANNELS => Some(usize::from(channel - 1)),
        _ => None,
    }
}

#[inline]
fn axis(raw: u16, calib: &AxisCalibration, dead_zone: u8) -> i16 {
    let (left, mid, right) = calib.oversampled();
    calibrate(raw, left, mid, right, oversample(u16::from(dead_zone)))
}
