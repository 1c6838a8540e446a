//! Configuration data model for the transmitter control core.
//!
//! This crate holds the plain data that parameterizes every frame
//! computation and that the menu engine edits:
//!
//! - **Model configuration**: [`ModelConfig`] - trims, endpoints, subtrims,
//!   reverse mask, expo, dual-rate, steering speed, ABS and channel roles
//! - **Global configuration**: [`GlobalConfig`] - stick calibration, dead
//!   zones, battery calibration, backlight
//! - **Key mapping**: [`KeyConfig`] - what the trim keys do
//! - **Channel bitsets**: [`ChannelMask`] - reverse and mixed-channel masks
//! - **Units**: [`ppm`] - fixed-point constants shared by all signal math
//! - **Persistence**: [`ConfigSource`] - how configuration gets loaded
//!
//! # Units
//!
//! Signal values are signed tenths of a microsecond around the neutral
//! pulse, so full throw is `±5000` and neutral is `15000` (1.5 ms).
//!
//! ```
//! use tx_config::{ppm, ModelConfig};
//!
//! let model = ModelConfig::default();
//! assert_eq!(model.endpoint[0], [100, 100]);
//! assert_eq!(ppm::us(500), ppm::SIGNAL_MAX);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod channel;
pub mod global;
pub mod model;
pub mod ppm;
pub mod source;

pub use channel::{ChannelMask, MAX_CHANNELS};
pub use global::{AxisCalibration, GlobalConfig};
pub use model::{AbsType, ChannelRoles, KeyConfig, ModelConfig, TrimButtons, TrimMapping};
pub use source::{ConfigError, ConfigSource, DefaultConfig};
