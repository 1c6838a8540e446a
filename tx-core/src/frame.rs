//! Frame scheduler task: runs the mixer once per real-time frame.

use crate::input::{AdcError, AdcSample, AdcSource};
use crate::mixer::Mixer;
use crate::output::{FrameTick, PpmOutput};
use crate::store::{with_store, SharedStore};
use embassy_sync::blocking_mutex::raw::RawMutex;

/// Per-frame control loop.
///
/// Owns the ADC source, the waveform generator and the frame tick. All
/// per-frame work happens inside a single store lock, so the menu task
/// never observes a half-computed frame and never changes configuration
/// in the middle of one.
pub struct FrameTask<A, O, T> {
    adc: A,
    output: O,
    tick: T,
    mixer: Mixer,
    sample: AdcSample,
    channels: u8,
}

impl<A: AdcSource, O: PpmOutput, T: FrameTick> FrameTask<A, O, T> {
    pub fn new(adc: A, output: O, tick: T) -> Self {
        Self {
            adc,
            output,
            tick,
            mixer: Mixer::new(),
            sample: AdcSample::default(),
            channels: 0,
        }
    }

    /// Run frames forever.
    pub async fn run<M: RawMutex>(&mut self, store: &SharedStore<M>) -> ! {
        loop {
            let _ = self.process_one(store).await;
        }
    }

    /// Compute one frame, hand it to the output and wait for the next tick.
    ///
    /// A failed ADC sample does not skip the frame: the last good sample is
    /// reused and the error is reported once the frame is out.
    pub async fn process_one<M: RawMutex>(
        &mut self,
        store: &SharedStore<M>,
    ) -> Result<(), FrameError> {
        let sampled = self.adc.sample().await;
        let fresh = match sampled {
            Ok(sample) => {
                self.sample = sample;
                true
            }
            Err(e) => {
                warn!("ADC sample failed, reusing last: {}", e);
                false
            }
        };

        let Self {
            output,
            mixer,
            sample,
            channels,
            ..
        } = self;
        with_store(store, |s| {
            if fresh {
                s.battery_low = sample.battery < s.battery_low_raw();
            }
            let count = s.model.channel_count();
            if count != *channels {
                debug!("Channel count {} -> {}", *channels, count);
                output.set_channels(count);
                *channels = count;
            }
            mixer.compute(s, sample, output);
        });
        self.output.sync();

        self.tick.wait().await;

        match sampled {
            Ok(_) => Ok(()),
            Err(e) => Err(FrameError::Adc(e)),
        }
    }

    pub fn mixer(&self) -> &Mixer {
        &self.mixer
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Decompose the task into its collaborators.
    pub fn into_parts(self) -> (A, O, T) {
        (self.adc, self.output, self.tick)
    }
}

/// Error type for frame processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// The ADC failed; the frame used the previous sample.
    Adc(AdcError),
}
