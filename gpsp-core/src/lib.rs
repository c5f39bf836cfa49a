//! Platform-agnostic core of the GPS co-processor bridge.
//!
//! One cooperative task wakes every millisecond, relays the receiver's
//! output to the host without ever splitting a sentence, forwards the host's
//! configuration traffic back to the receiver, and interleaves two small
//! telemetry frames of its own.
//!
//! # Overview
//!
//! - [`scheduler`]: Absolute-deadline periodic wake-ups ([`PeriodicScheduler`])
//! - [`relay`]: Staging buffer with carry-over ([`RelayBuffer`])
//! - [`mag`]: Magnetometer polling and axis remap ([`poll_magnetometer`])
//! - [`stats`]: Rate-limited runtime statistics ([`StatsSampler`])
//! - [`system`]: The task context tying it together ([`SystemTask`])
//! - [`health`]: Flags written by the runtime hooks ([`SystemHealth`])
//! - [`gps`], [`link`]: Transport traits ([`GpsSource`], [`HostLink`])
//! - [`devices`]: `embedded-hal-async` drivers for the u-blox DDC port and
//!   the HMC5883L
//!
//! # Tick
//!
//! ```text
//! wait for deadline -> heartbeat -> relay (N passes) -> magnetometer -> stats
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting and logging (for embedded targets)
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations. All
//! buffers live inside the task context.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

// Must come first so the logging macros are visible to the modules below
#[macro_use]
mod fmt;

pub mod config;
pub mod devices;
pub mod gps;
pub mod health;
pub mod link;
pub mod mag;
pub mod relay;
pub mod scheduler;
pub mod stats;
pub mod system;

#[cfg(test)]
mod mock;

// Re-export main types at crate root
pub use config::{SystemConfig, HOST_BAUDRATE, RELAY_CAPACITY};
pub use gps::{GpsError, GpsSource};
pub use health::{StackOverflow, SystemHealth};
pub use link::{HostLink, LinkError};
pub use mag::{poll_magnetometer, remap_axes, MagError, Magnetometer};
pub use relay::{RelayBuffer, RelayReport, SentenceLocator, UbxLocator};
pub use scheduler::{Clock, Heartbeat, PeriodicScheduler};
pub use stats::{RuntimeStats, StatsSampler};
pub use system::{Abort, Peripherals, SystemTask, TickReport};
