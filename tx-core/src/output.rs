//! Waveform generator collaborator and frame tick.

use core::future::Future;

/// Consumer of the per-channel pulse widths.
///
/// Values are absolute pulse widths in tenths of a microsecond.
/// Implementations latch the values and start using them on [`sync`](Self::sync).
pub trait PpmOutput {
    /// Set the number of transmitted channels.
    fn set_channels(&mut self, channels: u8);

    /// Set the pulse width of `channel` (1-based).
    fn set_value(&mut self, channel: u8, pulse: u16);

    /// All channels of this frame are assigned.
    fn sync(&mut self);
}

/// Source of the fixed real-time frame tick.
pub trait FrameTick {
    /// Suspend until the next frame starts.
    fn wait(&mut self) -> impl Future<Output = ()>;
}
