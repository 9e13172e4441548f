//! LoRaWAN end-device session controller
//!
//! This crate sits between an application and a LoRaWAN MAC engine. It
//! decides how the device activates, which device class it runs in, how
//! uplinks are admitted and encoded, and where downlinks go. The MAC engine
//! (channel plans, retransmissions, duty cycle, encryption) is reached
//! through the [`mac::MacEngine`] trait.
//!
//! # Features
//! - OTAA and ABP activation with a bounded, timer-driven join retry
//! - Class A / Class C switching
//! - Uplink admission with MAC command flushing for oversized payloads
//! - Certification traffic separation on port 224
//! - Single event ingress, with an optional interrupt-safe event queue
//! - `no_std`, no allocation, no unsafe code
//!
//! # Example
//! ```ignore
//! use lorawan_controller::{
//!     config::{device::DeviceIdentity, params::DeviceParams},
//!     device::{LoRaDevice, Timers},
//!     certification::NoCertification,
//!     mac::Region,
//! };
//!
//! // Create device identity
//! let identity = DeviceIdentity::new_otaa(
//!     [0x00; 8],  // DevEUI
//!     [0x00; 8],  // AppEUI
//!     [0x00; 16], // AppKey
//! );
//!
//! // Create controller (MAC engine, application and timers omitted)
//! let mut device = LoRaDevice::new(
//!     mac,
//!     app,
//!     NoCertification,
//!     Timers { join_retry, certification },
//!     identity,
//!     DeviceParams::for_region(Region::EU868),
//! )?;
//!
//! // Join network, the outcome arrives as a MAC event
//! device.join()?;
//! loop {
//!     if let Some(event) = mac_events.dequeue() {
//!         device.handle_event(&event);
//!     }
//!     device.process();
//!     if device.is_joined() {
//!         device.send_data(2, b"Hello, LoRaWAN!")?;
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![cfg_attr(not(feature = "std"), no_std)]

/// Network activation
pub mod activation;

/// Application layer callbacks
pub mod app;

/// LoRaWAN certification hooks
pub mod certification;

/// Device class switching
pub mod class;

/// Device and controller configuration
pub mod config;

/// High-level device interface
pub mod device;

/// Downlink routing
pub mod downlink;

/// Controller error type
pub mod error;

/// MAC engine events
pub mod events;

/// MAC engine boundary
pub mod mac;

/// Uplink admission
pub mod uplink;

pub use device::{LoRaDevice, Timers};
pub use error::DeviceError;
