//! MAC engine boundary
//!
//! The controller never talks to the radio itself. Everything below the
//! controller (channel planning, regional parameters, retransmissions,
//! duty cycle enforcement, encryption) belongs to a LoRaWAN MAC engine
//! reached through the [`MacEngine`] trait. This module contains:
//! - The engine trait
//! - Request, confirm and indication primitives exchanged with the engine
//! - Region and data rate identifiers

/// Request, confirm and indication primitives
pub mod primitives;

/// Region and data rate identifiers
pub mod region;

/// MAC engine interface
pub mod traits;

pub use primitives::{
    EventStatus, McpsConfirm, McpsIndication, McpsKind, MlmeConfirm, MlmeKind, UplinkRequest,
};
pub use region::{DataRate, Region};
pub use traits::MacEngine;
