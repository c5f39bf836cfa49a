//! Relay between the GPS receiver and the host link.
//!
//! Bytes from the receiver are staged in a fixed buffer and forwarded to the
//! host up to the end of the last complete sentence. The incomplete tail is
//! kept at the head of the buffer and completed by the next read, so the host
//! never sees a sentence split across two writes. Traffic from the host goes
//! back to the receiver verbatim.
//!
//! ```text
//!            +-------------- staging (N bytes) ---------------+
//!  read  --> | carry-over | fresh bytes        |    free      |
//!            +------------+-------------------+---------------+
//!            |<--- sent up to last sentence end --->| new carry |
//! ```
//!
//! If the staged bytes contain no complete sentence at all, everything is
//! forwarded as-is and the carry-over is dropped. A sentence longer than the
//! buffer is therefore passed through in pieces rather than stalling the relay.

use crate::config::RELAY_CAPACITY;
use crate::gps::GpsSource;
use crate::link::HostLink;
use ubx_proto::{last_sentence, SentenceSpan};

/// Finds the end of the last complete sentence in a buffer.
pub trait SentenceLocator {
    /// Span of the last complete sentence in `buf`, or `None` if there is none.
    fn locate(&self, buf: &[u8]) -> Option<SentenceSpan>;
}

/// Locator for u-blox output: UBX frames and NMEA sentences.
#[derive(Debug, Clone, Copy, Default)]
pub struct UbxLocator;

impl SentenceLocator for UbxLocator {
    fn locate(&self, buf: &[u8]) -> Option<SentenceSpan> {
        last_sentence(buf)
    }
}

/// What one relay invocation did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RelayReport {
    /// Bytes forwarded from the receiver to the host.
    pub forwarded: usize,
    /// Carry-over left in the staging buffer afterwards.
    pub retained: usize,
    /// Bytes forwarded from the host to the receiver.
    pub returned: usize,
    /// Loads forwarded without any sentence boundary (carry-over dropped).
    pub unterminated_flushes: u8,
}

/// Staging buffer plus the carry-over bookkeeping.
///
/// # Example
///
/// ```
/// use gpsp_core::RelayBuffer;
///
/// let relay: RelayBuffer<200> = RelayBuffer::new(4);
/// assert_eq!(relay.carry_over(), 0);
/// assert_eq!(relay.capacity(), 200);
/// ```
pub struct RelayBuffer<const N: usize = RELAY_CAPACITY> {
    staging: [u8; N],
    /// Length of the incomplete sentence at the head of `staging`.
    carry: usize,
    /// Host-to-receiver scratch; kept apart so it never clobbers the carry-over.
    inbound: [u8; N],
    passes: u8,
}

impl<const N: usize> RelayBuffer<N> {
    /// Create an empty relay doing `passes` read/forward rounds per invocation.
    #[must_use]
    pub const fn new(passes: u8) -> Self {
        Self {
            staging: [0; N],
            carry: 0,
            inbound: [0; N],
            passes,
        }
    }

    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of carried-over bytes waiting for the rest of their sentence.
    #[inline]
    #[must_use]
    pub const fn carry_over(&self) -> usize {
        self.carry
    }

    /// The carried-over bytes.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.staging[..self.carry]
    }

    /// Drop any carried-over bytes.
    pub fn clear(&mut self) {
        self.carry = 0;
    }

    /// Run the configured number of relay passes.
    ///
    /// Every pass is attempted even when the previous one found nothing, so
    /// the time spent here per tick is bounded by the pass count, not by the
    /// amount of backlog.
    pub async fn service<G, L, S>(&mut self, gps: &mut G, link: &mut L, locator: &S) -> RelayReport
    where
        G: GpsSource,
        L: HostLink,
        S: SentenceLocator,
    {
        let mut report = RelayReport::default();

        for _ in 0..self.passes {
            self.pump_gps(gps, link, locator, &mut report).await;
            self.pump_host(gps, link, &mut report).await;
        }

        report.retained = self.carry;
        if report.forwarded > 0 || report.returned > 0 {
            trace!(
                "relay: {} to host, {} to gps, {} carried",
                report.forwarded,
                report.returned,
                report.retained
            );
        }
        report
    }

    /// Receiver to host: read, forward whole sentences, keep the tail.
    async fn pump_gps<G, L, S>(
        &mut self,
        gps: &mut G,
        link: &mut L,
        locator: &S,
        report: &mut RelayReport,
    ) where
        G: GpsSource,
        L: HostLink,
        S: SentenceLocator,
    {
        let available = match gps.bytes_available().await {
            Ok(n) if n > 0 => n,
            // Nothing pending or the bus hiccuped; try again next pass
            _ => return,
        };

        let to_read = available.min(N - self.carry);
        if to_read == 0 {
            return;
        }

        let read = match gps
            .read(&mut self.staging[self.carry..self.carry + to_read])
            .await
        {
            Ok(n) if n > 0 => n.min(to_read),
            _ => return,
        };
        let filled = self.carry + read;

        match locator.locate(&self.staging[..filled]) {
            Some(span) if span.end() > 0 => {
                let end = span.end().min(filled);
                // Fire-and-forget: a failed send is not retried
                let _ = link.send(&self.staging[..end]).await;
                self.staging.copy_within(end..filled, 0);
                self.carry = filled - end;
                report.forwarded += end;
            }
            _ => {
                let _ = link.send(&self.staging[..filled]).await;
                if self.carry > 0 {
                    debug!("relay: no boundary in {} bytes, dropping carry-over", filled);
                }
                self.carry = 0;
                report.forwarded += filled;
                report.unterminated_flushes = report.unterminated_flushes.saturating_add(1);
            }
        }
    }

    /// Host to receiver: pass through whatever the host sent.
    async fn pump_host<G, L>(&mut self, gps: &mut G, link: &mut L, report: &mut RelayReport)
    where
        G: GpsSource,
        L: HostLink,
    {
        let received = match link.receive(&mut self.inbound).await {
            Ok(n) if n > 0 => n.min(N),
            _ => return,
        };

        if gps.write(&self.inbound[..received]).await.is_err() {
            warn!("relay: dropped {} bytes for the receiver", received);
        }
        report.returned += received;
    }
}

impl<const N: usize> Default for RelayBuffer<N> {
    fn default() -> Self {
        Self::new(crate::config::SystemConfig::DEFAULT.relay_passes)
    }
}
