//! Test doubles for the transport, device and runtime traits.

extern crate std;

use core::cell::Cell;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use crate::gps::{GpsError, GpsSource};
use crate::link::{HostLink, LinkError};
use crate::mag::{MagError, Magnetometer};
use crate::scheduler::{Clock, Heartbeat};
use crate::stats::RuntimeStats;

/// Run a future to completion. Mocks never return `Pending`.
pub fn block_on<F: Future>(mut f: F) -> F::Output {
    fn noop_raw_waker() -> RawWaker {
        fn noop(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            noop_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, noop, noop, noop);
        RawWaker::new(core::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(noop_raw_waker()) };
    let mut cx = Context::from_waker(&waker);

    // SAFETY: We don't move f after pinning
    let mut f = unsafe { Pin::new_unchecked(&mut f) };

    match f.as_mut().poll(&mut cx) {
        Poll::Ready(result) => result,
        Poll::Pending => panic!("Mock future returned Pending unexpectedly"),
    }
}

/// Receiver with an in-memory output queue.
#[derive(Default)]
pub struct MockGps {
    pub pending: VecDeque<u8>,
    pub written: Vec<Vec<u8>>,
    pub read_requests: Vec<usize>,
    pub fail: bool,
}

impl MockGps {
    pub fn push(&mut self, bytes: &[u8]) {
        self.pending.extend(bytes.iter().copied());
    }
}

impl GpsSource for MockGps {
    async fn bytes_available(&mut self) -> Result<usize, GpsError> {
        if self.fail {
            return Err(GpsError::Bus);
        }
        Ok(self.pending.len())
    }

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, GpsError> {
        self.read_requests.push(buf.len());
        if self.fail {
            return Err(GpsError::Bus);
        }
        let n = buf.len().min(self.pending.len());
        for (slot, byte) in buf.iter_mut().zip(self.pending.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    async fn write(&mut self, data: &[u8]) -> Result<usize, GpsError> {
        self.written.push(data.to_vec());
        Ok(data.len())
    }
}

/// Host link recording every send.
#[derive(Default)]
pub struct MockLink {
    pub sent: Vec<Vec<u8>>,
    pub inbound: VecDeque<Vec<u8>>,
    pub baud: Option<u32>,
    pub fail_send: bool,
}

impl MockLink {
    /// Everything sent so far, concatenated.
    pub fn sent_bytes(&self) -> Vec<u8> {
        self.sent.concat()
    }
}

impl HostLink for MockLink {
    async fn send(&mut self, data: &[u8]) -> Result<(), LinkError> {
        if self.fail_send {
            return Err(LinkError::Io);
        }
        self.sent.push(data.to_vec());
        Ok(())
    }

    async fn receive(&mut self, buf: &mut [u8]) -> Result<usize, LinkError> {
        let Some(mut chunk) = self.inbound.pop_front() else {
            return Ok(0);
        };
        let n = buf.len().min(chunk.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            self.inbound.push_front(chunk.split_off(n));
        }
        Ok(n)
    }

    fn set_baud(&mut self, baud: u32) {
        self.baud = Some(baud);
    }
}

pub struct MockMag {
    pub ready: bool,
    pub sample: Result<[i16; 3], MagError>,
    pub reads: usize,
}

impl Default for MockMag {
    fn default() -> Self {
        Self {
            ready: false,
            sample: Ok([0; 3]),
            reads: 0,
        }
    }
}

impl Magnetometer for MockMag {
    async fn data_ready(&mut self) -> Result<bool, MagError> {
        Ok(self.ready)
    }

    async fn read(&mut self) -> Result<[i16; 3], MagError> {
        self.reads += 1;
        self.ready = false;
        self.sample
    }
}

#[derive(Default)]
pub struct MockRuntime {
    pub uptime_ms: u32,
    pub heap: u32,
    pub irq_stack: u32,
    pub task_stack: u32,
    pub storage: bool,
}

impl RuntimeStats for MockRuntime {
    fn uptime_ms(&self) -> u32 {
        self.uptime_ms
    }

    fn free_heap(&self) -> u32 {
        self.heap
    }

    fn free_irq_stack(&self) -> u32 {
        self.irq_stack
    }

    fn free_task_stack(&self) -> u32 {
        self.task_stack
    }

    fn storage_present(&self) -> bool {
        self.storage
    }
}

/// Clock whose time only moves when a test (or a wait) moves it.
#[derive(Default)]
pub struct MockClock {
    pub now: Rc<Cell<u64>>,
    pub waits: Vec<u64>,
}

impl MockClock {
    /// A second handle on the current time, for advancing it from outside.
    pub fn handle(&self) -> Rc<Cell<u64>> {
        self.now.clone()
    }
}

impl Clock for MockClock {
    fn now_us(&self) -> u64 {
        self.now.get()
    }

    async fn wait_until(&mut self, deadline_us: u64) {
        self.waits.push(deadline_us);
        if deadline_us > self.now.get() {
            self.now.set(deadline_us);
        }
    }
}

#[derive(Default)]
pub struct MockHeartbeat {
    pub toggles: usize,
}

impl Heartbeat for MockHeartbeat {
    fn toggle(&mut self) {
        self.toggles += 1;
    }
}
