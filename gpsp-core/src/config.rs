//! Compile-time configuration of the system task.

/// Capacity of the relay staging buffer in bytes.
pub const RELAY_CAPACITY: usize = 200;

/// Host link baud rate set at start-up.
pub const HOST_BAUDRATE: u32 = 115_200;

/// Timing and sizing knobs of the system task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SystemConfig {
    /// Base scheduler period in microseconds.
    pub period_us: u64,
    /// Minimum time between two statistics frames in microseconds.
    pub stats_interval_us: u64,
    /// Relay passes per tick. Bounds the relay's share of each period.
    pub relay_passes: u8,
    /// The heartbeat toggles when `counter & heartbeat_mask == 0`.
    pub heartbeat_mask: u8,
    /// Host link baud rate.
    pub host_baud: u32,
}

impl SystemConfig {
    /// 1 ms period, 1 Hz statistics, 4 relay passes, heartbeat every 128 ticks.
    pub const DEFAULT: Self = Self {
        period_us: 1_000,
        stats_interval_us: 1_000_000,
        relay_passes: 4,
        heartbeat_mask: 0x7F,
        host_baud: HOST_BAUDRATE,
    };
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
