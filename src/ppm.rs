//! PWM servo outputs and the frame ticker.

use defmt::{info, warn};
use embassy_rp::pwm::{Config, Pwm, PwmOutput};
use embassy_time::{Duration, Ticker};
use embedded_hal::pwm::SetDutyCycle;
use fixed_macro::fixed;
use heapless::Vec;
use tx_config::ppm::{NEUTRAL_PULSE, PPM_PER_US};
use tx_config::MAX_CHANNELS;
use tx_core::{FrameTick, PpmOutput};

/// Frame period in microseconds.
pub const FRAME_PERIOD_US: u16 = 22_500;

const CHANNELS: usize = MAX_CHANNELS as usize;

/// PWM configuration with a 1 MHz counter wrapping once per frame.
///
/// PWM frequency = SYS_CLOCK / (DIV * (TOP + 1)):
/// 125_000_000 / (125 * 22_500) = 44.4 Hz
#[must_use]
pub fn servo_pwm_config() -> Config {
    let mut config = Config::default();
    config.divider = fixed!(125: U12F4);
    config.top = FRAME_PERIOD_US - 1;
    config
}

/// Servo output sink driving one PWM channel per RC channel.
///
/// Pulses set during a frame are latched on [`sync`](PpmOutput::sync).
/// Outputs beyond the active channel count stay low.
///
/// # Pins
///
/// - GPIO 0-7: channels 1-8 (PWM slices 0-3, A then B)
pub struct ServoOutput<P> {
    pins: Vec<P, CHANNELS>,
    pending: [u16; CHANNELS],
    channels: u8,
}

impl<P: SetDutyCycle> ServoOutput<P> {
    /// Create an output over `pins`; channel 1 is the first pin.
    pub fn new(pins: Vec<P, CHANNELS>) -> Self {
        let channels = u8::try_from(pins.len()).unwrap_or(MAX_CHANNELS);
        Self {
            pins,
            pending: [NEUTRAL_PULSE; CHANNELS],
            channels,
        }
    }

    /// Pulse width of `channel` (1-based) to be emitted at the next sync.
    #[must_use]
    pub fn pending(&self, channel: u8) -> Option<u16> {
        let index = usize::from(channel).checked_sub(1)?;
        self.pending.get(index).copied()
    }
}

impl<'d> ServoOutput<PwmOutput<'d>> {
    /// Build the output from four PWM slices, two channels each.
    pub fn from_slices(slices: [Pwm<'d>; 4]) -> Self {
        let mut pins = Vec::new();
        for pwm in slices {
            let (a, b) = pwm.split();
            for output in [a, b].into_iter().flatten() {
                // four slices fill the capacity exactly
                let _ = pins.push(output);
            }
        }
        Self::new(pins)
    }
}

impl<P: SetDutyCycle> PpmOutput for ServoOutput<P> {
    fn set_channels(&mut self, channels: u8) {
        let available = u8::try_from(self.pins.len()).unwrap_or(MAX_CHANNELS);
        self.channels = channels.min(available);
        info!("Servo outputs: {} channels", self.channels);
    }

    fn set_value(&mut self, channel: u8, pulse: u16) {
        if let Some(slot) = usize::from(channel)
            .checked_sub(1)
            .and_then(|i| self.pending.get_mut(i))
        {
            *slot = pulse;
        }
    }

    fn sync(&mut self) {
        let active = usize::from(self.channels);
        for (i, (pin, pulse)) in self.pins.iter_mut().zip(self.pending).enumerate() {
            let duty = if i < active {
                pulse / PPM_PER_US as u16
            } else {
                0
            };
            if pin.set_duty_cycle(duty).is_err() {
                warn!("PWM set_duty failed on channel {}", i + 1);
            }
        }
    }
}

/// [`FrameTick`] firing every [`FRAME_PERIOD_US`].
pub struct FrameTicker(Ticker);

impl FrameTicker {
    #[must_use]
    pub fn new() -> Self {
        Self(Ticker::every(Duration::from_micros(u64::from(FRAME_PERIOD_US))))
    }
}

impl Default for FrameTicker {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTick for FrameTicker {
    async fn wait(&mut self) {
        self.0.next().await;
    }
}
