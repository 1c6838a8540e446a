//! ADC collaborator: raw stick and battery samples, once per frame.

use core::future::Future;

/// Oversampled raw ADC readings for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdcSample {
    pub steering: u16,
    pub throttle: u16,
    /// Battery reading, not oversampled.
    pub battery: u16,
}

impl AdcSample {
    #[must_use]
    pub const fn new(steering: u16, throttle: u16, battery: u16) -> Self {
        Self {
            steering,
            throttle,
            battery,
        }
    }
}

/// Error type for ADC sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcError {
    /// Conversion failed or timed out.
    Conversion,
    /// Sampler not ready yet.
    NotReady,
}

/// Async trait for ADC sample sources.
///
/// # `no_std` Compatibility
///
/// All implementations must be `#![no_std]` compatible with no heap allocation.
pub trait AdcSource {
    /// Take the samples for the coming frame.
    fn sample(&mut self) -> impl Future<Output = Result<AdcSample, AdcError>>;
}
