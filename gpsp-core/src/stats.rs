//! Rate-limited system statistics.

use crate::link::HostLink;
use ubx_proto::{SysData, SysOptions, UbxPayload};

/// Runtime figures the statistics frame reports.
pub trait RuntimeStats {
    /// Milliseconds since boot.
    fn uptime_ms(&self) -> u32;

    /// Free heap bytes. Zero on targets without a heap.
    fn free_heap(&self) -> u32;

    /// Unused interrupt-stack bytes.
    fn free_irq_stack(&self) -> u32;

    /// Unused stack bytes of the system task.
    fn free_task_stack(&self) -> u32;

    /// Whether persistent storage was detected.
    fn storage_present(&self) -> bool;
}

fn saturate(value: u32) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

/// Emits a statistics frame at most once per interval.
#[derive(Debug, Clone, Copy)]
pub struct StatsSampler {
    interval_us: u64,
    last_update_us: u64,
}

impl StatsSampler {
    /// The first frame is due one interval after time zero.
    #[must_use]
    pub const fn new(interval_us: u64) -> Self {
        Self {
            interval_us,
            last_update_us: 0,
        }
    }

    /// Whether a frame is due at `now_us`.
    #[must_use]
    pub fn due(&self, now_us: u64) -> bool {
        now_us.saturating_sub(self.last_update_us) >= self.interval_us
    }

    /// Snapshot the runtime figures. Values above `u16::MAX` saturate.
    #[must_use]
    pub fn collect<R: RuntimeStats>(runtime: &R) -> SysData {
        let options = if runtime.storage_present() {
            SysOptions::FLASH
        } else {
            SysOptions::NONE
        };

        SysData {
            flight_time_ms: runtime.uptime_ms(),
            heap_remaining: saturate(runtime.free_heap()),
            irq_stack_remaining: saturate(runtime.free_irq_stack()),
            task_stack_remaining: saturate(runtime.free_task_stack()),
            options,
        }
    }

    /// Send a statistics frame if one is due.
    ///
    /// Returns the data that was sent.
    pub async fn poll<R, L>(&mut self, now_us: u64, runtime: &R, link: &mut L) -> Option<SysData>
    where
        R: RuntimeStats,
        L: HostLink,
    {
        if !self.due(now_us) {
            return None;
        }
        self.last_update_us = now_us;

        let data = Self::collect(runtime);
        let mut frame = [0u8; SysData::FRAME_LEN];
        let len = data.encode(&mut frame).ok()?;
        if link.send(&frame[..len]).await.is_err() {
            debug!("stats: send failed");
        }
        Some(data)
    }
}
