//! Host-side mocks of the collaborator traits and a minimal executor.

extern crate std;

use crate::input::{AdcError, AdcSample, AdcSource};
use crate::keys::{KeyEvents, Keypad, Keys};
use crate::output::{FrameTick, PpmOutput};
use crate::panel::{Blink, BlinkMask, Buzzer, Display, Segment};
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};
use std::collections::VecDeque;
use std::vec::Vec;
use tx_config::MAX_CHANNELS;

// Run a future to completion; mocks never return Pending
pub fn block_on<F: Future>(mut f: F) -> F::Output {
    fn noop_raw_waker() -> RawWaker {
        fn noop(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            noop_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, noop, noop, noop);
        RawWaker::new(core::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(noop_raw_waker()) };
    let mut cx = Context::from_waker(&waker);

    // SAFETY: We don't move f after pinning
    let mut f = unsafe { Pin::new_unchecked(&mut f) };

    match f.as_mut().poll(&mut cx) {
        Poll::Ready(result) => result,
        Poll::Pending => panic!("Mock future returned Pending unexpectedly"),
    }
}

/// Raw reading of a stick at its default calibration (0/2048/4095),
/// already oversampled.
pub const RAW_LEFT: u16 = 0;
pub const RAW_MID: u16 = 2048 << 2;
pub const RAW_RIGHT: u16 = 4095 << 2;

pub struct MockOutput {
    pub channels: u8,
    pub set_channels_calls: usize,
    pub values: [Option<u16>; MAX_CHANNELS as usize + 1],
    pub syncs: usize,
}

impl MockOutput {
    pub fn new() -> Self {
        Self {
            channels: 0,
            set_channels_calls: 0,
            values: [None; MAX_CHANNELS as usize + 1],
            syncs: 0,
        }
    }

    pub fn value(&self, channel: u8) -> u16 {
        self.values[usize::from(channel)].expect("channel not assigned")
    }
}

impl PpmOutput for MockOutput {
    fn set_channels(&mut self, channels: u8) {
        self.channels = channels;
        self.set_channels_calls += 1;
    }

    fn set_value(&mut self, channel: u8, pulse: u16) {
        self.values[usize::from(channel)] = Some(pulse);
    }

    fn sync(&mut self) {
        self.syncs += 1;
    }
}

pub struct MockAdc {
    pub samples: VecDeque<Result<AdcSample, AdcError>>,
}

impl MockAdc {
    pub fn new(samples: Vec<Result<AdcSample, AdcError>>) -> Self {
        Self {
            samples: samples.into(),
        }
    }
}

impl AdcSource for MockAdc {
    fn sample(&mut self) -> impl Future<Output = Result<AdcSample, AdcError>> {
        let result = self.samples.pop_front().unwrap_or(Err(AdcError::NotReady));
        core::future::ready(result)
    }
}

#[derive(Default)]
pub struct MockTick {
    pub ticks: usize,
}

impl FrameTick for MockTick {
    fn wait(&mut self) -> impl Future<Output = ()> {
        self.ticks += 1;
        core::future::ready(())
    }
}

/// Keypad replaying one scripted event set per wakeup.
pub struct MockKeypad {
    pub script: VecDeque<KeyEvents>,
    pub current: KeyEvents,
    pub autorepeat: Keys,
    pub waits: usize,
}

impl MockKeypad {
    pub fn new(script: Vec<KeyEvents>) -> Self {
        Self {
            script: script.into(),
            current: KeyEvents::NONE,
            autorepeat: Keys::NONE,
            waits: 0,
        }
    }
}

impl Keypad for MockKeypad {
    fn wait(&mut self) -> impl Future<Output = ()> {
        self.waits += 1;
        self.current = self.script.pop_front().expect("keypad script exhausted");
        core::future::ready(())
    }

    fn events(&self) -> KeyEvents {
        self.current
    }

    fn clear(&mut self) {
        self.current = KeyEvents::NONE;
    }

    fn set_autorepeat(&mut self, keys: Keys) {
        self.autorepeat = keys;
    }
}

/// Display keeping only the current state of every element.
pub struct MockDisplay {
    pub segments: [bool; 8],
    pub segment_blinks: [Blink; 8],
    pub seg7: Option<u8>,
    pub seg7_blink: Blink,
    pub number: Option<i16>,
    pub text: Option<[u8; 3]>,
    pub chars_blink: Blink,
    pub chars_mask: BlinkMask,
    pub backlight: Option<u16>,
    pub updates: usize,
}

impl MockDisplay {
    pub fn new() -> Self {
        Self {
            segments: [false; 8],
            segment_blinks: [Blink::Off; 8],
            seg7: None,
            seg7_blink: Blink::Off,
            number: None,
            text: None,
            chars_blink: Blink::Off,
            chars_mask: BlinkMask::NONE,
            backlight: None,
            updates: 0,
        }
    }

    pub fn is_on(&self, segment: Segment) -> bool {
        self.segments[segment as usize]
    }
}

impl Display for MockDisplay {
    fn segment(&mut self, segment: Segment, on: bool) {
        self.segments[segment as usize] = on;
    }

    fn segment_blink(&mut self, segment: Segment, blink: Blink) {
        self.segment_blinks[segment as usize] = blink;
    }

    fn seg7_blink(&mut self, blink: Blink) {
        self.seg7_blink = blink;
    }

    fn seg7_number(&mut self, value: u8) {
        self.seg7 = Some(value);
    }

    fn chars_number(&mut self, value: i16) {
        self.number = Some(value);
        self.text = None;
    }

    fn chars_text(&mut self, text: &[u8; 3]) {
        self.text = Some(*text);
        self.number = None;
    }

    fn chars_blink_mask(&mut self, blink: Blink, mask: BlinkMask) {
        self.chars_blink = blink;
        self.chars_mask = mask;
    }

    fn chars_blink(&mut self, blink: Blink) {
        self.chars_blink = blink;
    }

    fn backlight(&mut self, seconds: u16) {
        self.backlight = Some(seconds);
    }

    fn update(&mut self) {
        self.updates += 1;
    }
}

#[derive(Default)]
pub struct MockBuzzer {
    pub running: bool,
    pub beeps: usize,
    pub alarms: usize,
    pub offs: usize,
}

impl Buzzer for MockBuzzer {
    fn on(&mut self, _on: u8, _off: u8, _count: u16) {
        self.running = true;
        self.alarms += 1;
    }

    fn off(&mut self) {
        self.running = false;
        self.offs += 1;
    }

    fn key_beep(&mut self) {
        self.beeps += 1;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}
