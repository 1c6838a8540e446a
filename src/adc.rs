//! ADC sampler for the sticks and the battery.

use embassy_rp::adc::{Adc, Async, Channel, Error as RpAdcError};
use tx_config::ppm::ADC_OVS_SHIFT;
use tx_core::{AdcError, AdcSample, AdcSource};

/// Conversions summed per stick reading.
const OVERSAMPLE: u8 = 1 << ADC_OVS_SHIFT;

/// ADC source reading steering, throttle and battery.
///
/// Stick channels are oversampled by summing [`OVERSAMPLE`] conversions,
/// which puts them on the scale of
/// [`AxisCalibration::oversampled`](tx_config::AxisCalibration::oversampled).
/// The battery is read once per frame at plain 12-bit resolution.
///
/// # Pins
///
/// - GPIO 26: steering (ADC0)
/// - GPIO 27: throttle (ADC1)
/// - GPIO 28: battery (ADC2)
pub struct RpAdcSource<'d> {
    adc: Adc<'d, Async>,
    steering: Channel<'d>,
    throttle: Channel<'d>,
    battery: Channel<'d>,
}

impl<'d> RpAdcSource<'d> {
    /// Create a sampler from an initialized ADC and its three channels.
    pub fn new(
        adc: Adc<'d, Async>,
        steering: Channel<'d>,
        throttle: Channel<'d>,
        battery: Channel<'d>,
    ) -> Self {
        Self {
            adc,
            steering,
            throttle,
            battery,
        }
    }

    async fn oversampled(
        adc: &mut Adc<'d, Async>,
        channel: &mut Channel<'d>,
    ) -> Result<u16, AdcError> {
        let mut sum = 0u16;
        for _ in 0..OVERSAMPLE {
            sum = sum.saturating_add(adc.read(channel).await.map_err(adc_error)?);
        }
        Ok(sum)
    }
}

impl AdcSource for RpAdcSource<'_> {
    async fn sample(&mut self) -> Result<AdcSample, AdcError> {
        let steering = Self::oversampled(&mut self.adc, &mut self.steering).await?;
        let throttle = Self::oversampled(&mut self.adc, &mut self.throttle).await?;
        let battery = self.adc.read(&mut self.battery).await.map_err(adc_error)?;

        Ok(AdcSample::new(steering, throttle, battery))
    }
}

/// Map an ADC driver error to the core error type.
fn adc_error(_e: RpAdcError) -> AdcError {
    AdcError::Conversion
}
