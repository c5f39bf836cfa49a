//! The system task: one owned context driving relay and telemetry.

use core::convert::Infallible;
use core::fmt;

use crate::config::{SystemConfig, RELAY_CAPACITY};
use crate::gps::GpsSource;
use crate::health::SystemHealth;
use crate::link::HostLink;
use crate::mag::{poll_magnetometer, Magnetometer};
use crate::relay::{RelayBuffer, RelayReport, SentenceLocator};
use crate::scheduler::{Clock, Heartbeat, PeriodicScheduler};
use crate::stats::{RuntimeStats, StatsSampler};
use ubx_proto::{MagData, SysData};

/// Reason the system task gave up. The owner is expected to reset the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Abort {
    /// A static allocation or spawn failed before the loop started.
    AllocationFailed,
}

impl fmt::Display for Abort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Abort::AllocationFailed => write!(f, "allocation failed before start"),
        }
    }
}

/// Everything the system task talks to.
pub struct Peripherals<G, L, M, R, C, H> {
    pub gps: G,
    pub link: L,
    pub mag: M,
    pub runtime: R,
    pub clock: C,
    pub heartbeat: H,
}

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    /// Grid point this tick was scheduled for.
    pub deadline_us: u64,
    pub relay: RelayReport,
    /// Magnetometer sample sent this tick.
    pub mag: Option<MagData>,
    /// Statistics sent this tick.
    pub stats: Option<SysData>,
}

/// Task context. Owns all per-task state; nothing here is shared except the
/// health flags.
pub struct SystemTask<'a, G, L, M, R, C, H, S> {
    io: Peripherals<G, L, M, R, C, H>,
    locator: S,
    relay: RelayBuffer<RELAY_CAPACITY>,
    stats: StatsSampler,
    scheduler: PeriodicScheduler,
    health: &'a SystemHealth,
    config: SystemConfig,
    init_sentences: &'a [&'a [u8]],
    configured: bool,
}

impl<'a, G, L, M, R, C, H, S> SystemTask<'a, G, L, M, R, C, H, S>
where
    G: GpsSource,
    L: HostLink,
    M: Magnetometer,
    R: RuntimeStats,
    C: Clock,
    H: Heartbeat,
    S: SentenceLocator,
{
    #[must_use]
    pub fn new(
        io: Peripherals<G, L, M, R, C, H>,
        locator: S,
        health: &'a SystemHealth,
        config: SystemConfig,
    ) -> Self {
        Self {
            io,
            locator,
            relay: RelayBuffer::new(config.relay_passes),
            stats: StatsSampler::new(config.stats_interval_us),
            scheduler: PeriodicScheduler::new(config.period_us, config.heartbeat_mask),
            health,
            config,
            init_sentences: &[],
            configured: false,
        }
    }

    /// Sentences written to the receiver once during setup.
    #[must_use]
    pub fn with_init_sentences(mut self, sentences: &'a [&'a [u8]]) -> Self {
        self.init_sentences = sentences;
        self
    }

    /// One-time device configuration. Later calls do nothing.
    pub async fn setup(&mut self) {
        if self.configured {
            return;
        }
        self.configured = true;

        self.io.link.set_baud(self.config.host_baud);
        for sentence in self.init_sentences {
            if self.io.gps.write(sentence).await.is_err() {
                warn!("setup: receiver rejected {} byte sentence", sentence.len());
            }
        }
        debug!(
            "setup: baud {}, {} init sentences",
            self.config.host_baud,
            self.init_sentences.len()
        );
    }

    /// Check the health flags, configure devices and anchor the schedule.
    ///
    /// # Errors
    ///
    /// Returns [`Abort::AllocationFailed`] if the allocation hook fired
    /// before the task got here. Nothing is configured in that case.
    pub async fn prepare(&mut self) -> Result<(), Abort> {
        if self.health.allocation_failed() {
            return Err(Abort::AllocationFailed);
        }
        self.setup().await;
        self.scheduler.start(self.io.clock.now_us());
        Ok(())
    }

    /// Wait for the next period and run one round of work.
    pub async fn tick(&mut self) -> TickReport {
        let deadline_us = self.scheduler.wait_next(&mut self.io.clock).await;
        self.scheduler.beat(&mut self.io.heartbeat);

        let relay = self
            .relay
            .service(&mut self.io.gps, &mut self.io.link, &self.locator)
            .await;
        let mag = poll_magnetometer(&mut self.io.mag, &mut self.io.link).await;
        let stats = self
            .stats
            .poll(self.io.clock.now_us(), &self.io.runtime, &mut self.io.link)
            .await;

        TickReport {
            deadline_us,
            relay,
            mag,
            stats,
        }
    }

    /// Run forever. Only returns if the task cannot start.
    ///
    /// # Errors
    ///
    /// See [`SystemTask::prepare`].
    pub async fn run(&mut self) -> Result<Infallible, Abort> {
        self.prepare().await?;
        info!(
            "system task running, period {} us, {} relay passes",
            self.config.period_us,
            self.config.relay_passes
        );

        loop {
            let report = self.tick().await;
            if let Some(_stats) = report.stats {
                trace!("stats: {}", _stats);
            }
        }
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub fn relay(&self) -> &RelayBuffer<RELAY_CAPACITY> {
        &self.relay
    }

    pub fn peripherals(&self) -> &Peripherals<G, L, M, R, C, H> {
        &self.io
    }

    pub fn peripherals_mut(&mut self) -> &mut Peripherals<G, L, M, R, C, H> {
        &mut self.io
    }

    /// Decompose the task into its peripherals.
    pub fn into_peripherals(self) -> Peripherals<G, L, M, R, C, H> {
        self.io
    }
}
