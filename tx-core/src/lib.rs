//! Platform-agnostic signal pipeline and menu engine of an RC transmitter.
//!
//! This crate turns raw stick samples and operator settings into servo
//! pulse widths once per frame, and runs the menus that edit those
//! settings. It has no platform-specific dependencies and runs both on
//! the transmitter and on host for testing.
//!
//! # Overview
//!
//! - [`shaping`]: calibration mapping, expo and dual-rate ([`calibrate`], [`expo`], [`dual_rate`])
//! - [`steering`]: steering speed limiter ([`SteeringSpeed`], [`ChannelHistory`])
//! - [`abs`]: simulated anti-lock braking ([`AbsSimulator`])
//! - [`mixer`]: per-frame channel computation ([`Mixer`])
//! - [`frame`]: the frame scheduler task ([`FrameTask`])
//! - [`store`]: state shared by both tasks ([`ChannelStore`], [`SharedStore`])
//! - [`menu`]: two-tier and flat-list menu engine ([`Menu`])
//! - [`scan`]: button debouncing and encoder decoding ([`KeyScanner`])
//! - [`input`], [`output`], [`keys`], [`panel`]: collaborator traits
//!
//! # Tasks
//!
//! Two cooperative tasks share one [`SharedStore`]: the frame task
//! computes every channel once per tick, the menu task edits configuration
//! while waiting for keys in between. Neither ever awaits while holding the
//! store, so a frame never sees a half-applied edit.
//!
//! # Example
//!
//! ```rust
//! use tx_core::{calibrate, dual_rate, expo};
//!
//! // stick at 3/4 right on a 0..4095 axis, oversampled by 4
//! let val = calibrate(14_332, 0, 8_192, 16_380, 0);
//! assert_eq!(val, 3_749);
//!
//! let val = dual_rate(expo(val, 0), 80);
//! assert_eq!(val, 2_999);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations,
//! making it suitable for embedded systems with limited resources.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

// This must go first so the logging macros are visible to every module.
#[macro_use]
mod fmt;

pub mod abs;
pub mod frame;
pub mod input;
pub mod keys;
pub mod menu;
pub mod mixer;
pub mod output;
pub mod panel;
pub mod scan;
pub mod shaping;
pub mod steering;
pub mod store;

#[cfg(test)]
mod testing;

// Re-export main types at crate root
pub use abs::{AbsSimulator, ABS_THRESHOLD};
pub use frame::{FrameError, FrameTask};
pub use input::{AdcError, AdcSample, AdcSource};
pub use keys::{autorepeat_keys, KeyEvents, Keypad, Keys};
pub use menu::{CommonItem, ListAction, ListItem, Menu, MenuCx, MenuFlags, Session};
pub use mixer::Mixer;
pub use output::{FrameTick, PpmOutput};
pub use panel::{Blink, BlinkMask, Buzzer, Display, Segment, BUZZER_FOREVER};
pub use scan::KeyScanner;
pub use shaping::{calibrate, dual_rate, expo};
pub use steering::{ChannelHistory, SteeringSpeed};
pub use store::{with_store, ChannelStore, ForceValue, SharedStore};
