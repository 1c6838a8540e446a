//! RC car transmitter firmware for RP2040.
//!
//! This crate provides the hardware side of the transmitter: it samples
//! the sticks, scans the keys and drives the servo outputs, and hands
//! everything else to [`tx_core`].
//!
//! # Overview
//!
//! The firmware runs on a Raspberry Pi Pico (RP2040) and:
//! 1. Samples steering, throttle and battery through the ADC
//! 2. Computes every channel once per 22.5 ms frame
//! 3. Emits the pulses on eight PWM servo outputs
//! 4. Runs the menus on the key/encoder input, a buzzer and an RTT display
//!
//! # Hardware Configuration
//!
//! | Function       | GPIO  | Description |
//! |----------------|-------|-------------|
//! | ADC0           | 26    | Steering potentiometer |
//! | ADC1           | 27    | Throttle potentiometer |
//! | ADC2           | 28    | Battery voltage divider |
//! | PWM 0A..3B     | 0-7   | Servo outputs, channels 1-8 |
//! | Keys           | 8-19  | Trims, dual-rate, CH3, BACK, END, ENTER (to GND) |
//! | Encoder A/B    | 20/21 | Rotary encoder (to GND) |
//! | Buzzer         | 22    | Active buzzer |
//! | LED            | 25    | On-board LED (ADC error indicator) |
//!
//! # Architecture
//!
//! The firmware uses the Embassy async runtime with four concurrent tasks:
//!
//! - **Frame Task**: Samples the ADC, mixes and emits one frame per tick
//! - **Menu Task**: Runs the configuration menus
//! - **Keys Task**: Debounces the keys and decodes the encoder
//! - **Buzzer Task**: Plays beep patterns
//!
//! The frame and menu tasks share one
//! [`SharedStore`](tx_core::SharedStore); key events and buzzer commands
//! travel through [`Signal`](embassy_sync::signal::Signal)s.
//!
//! # Modules
//!
//! - [`adc`]: ADC sampler ([`RpAdcSource`])
//! - [`keypad`]: key scanner and menu-side keypad ([`KeyShared`], [`SharedKeypad`])
//! - [`ppm`]: PWM servo output and frame ticker ([`ServoOutput`], [`FrameTicker`])
//! - [`panel`]: RTT display and buzzer ([`RttDisplay`], [`BuzzerHandle`])
//!
//! # Features
//!
//! - **`dev-panic`** (default): Use `panic-probe` for development (prints panic info via RTT)
//! - **`prod-panic`**: Use `panic-reset` for production (silent watchdog reset)
//!
//! # Re-exports
//!
//! This crate re-exports [`tx_core`] and [`tx_config`] so the binary only
//! needs to depend on this crate.

#![no_std]

pub use tx_config;
pub use tx_core;

pub mod adc;
pub mod keypad;
pub mod panel;
pub mod ppm;

pub use adc::RpAdcSource;
pub use keypad::{KeyPins, KeyShared, SharedKeypad};
pub use panel::{BuzzerDriver, BuzzerHandle, BuzzerShared, RttDisplay};
pub use ppm::{servo_pwm_config, FrameTicker, ServoOutput, FRAME_PERIOD_US};
