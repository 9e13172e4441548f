//! Device and controller configuration
//!
//! This module contains the static configuration of the controller:
//! - Device identity and key material (DevEUI, AppEUI, keys, address)
//! - Join and ABP session primitives built from that identity
//! - Controller parameters (region, ADR, join retry policy, radio policy)

/// Device identity and key material
pub mod device;

/// Controller parameters
pub mod params;

pub use device::{ActivationMode, DeviceIdentity};
pub use params::{DeviceParams, JoinRetryPolicy, RadioPolicy};
