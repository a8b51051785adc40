//! Thermion Hardware Abstraction Layer
//!
//! This crate defines the bus abstraction implemented by platform-specific
//! crates. This enables the same board logic to run against real hardware
//! or an in-memory simulation.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (thermion-core, logd)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  thermion-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ thermion-hal- │       │  mock buses   │
//! │     linux     │       │  (test only)  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`bus::RegisterBus`] - 16-bit register reads/writes on an I2C device

#![deny(unsafe_code)]

pub mod bus;

// Re-export key types at crate root for convenience
pub use bus::{BusAddr, BusError, BusReg, BusResult, ByteOrder, RegisterBus};
