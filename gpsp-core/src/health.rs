//! Health flags written by the runtime hooks.
//!
//! The hooks only record what happened. Deciding what to do about it is up
//! to the owner of the flags: the system task checks
//! [`SystemHealth::allocation_failed`] before entering its loop.

use portable_atomic::{AtomicBool, AtomicU8, Ordering};

/// Stack overflow severity, ordered from harmless to fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StackOverflow {
    None = 0,
    Warning = 1,
    Critical = 3,
}

impl StackOverflow {
    fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::None,
            1 | 2 => Self::Warning,
            _ => Self::Critical,
        }
    }
}

/// Status flags shared between the runtime hooks and the system task.
///
/// Designed to live in a `static`; every method takes `&self`.
///
/// # Example
///
/// ```
/// use gpsp_core::{StackOverflow, SystemHealth};
///
/// static HEALTH: SystemHealth = SystemHealth::new();
///
/// HEALTH.on_stack_overflow();
/// assert_eq!(HEALTH.stack_overflow(), StackOverflow::Critical);
/// ```
pub struct SystemHealth {
    allocation_failed: AtomicBool,
    stack_overflow: AtomicU8,
}

impl SystemHealth {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            allocation_failed: AtomicBool::new(false),
            stack_overflow: AtomicU8::new(StackOverflow::None as u8),
        }
    }

    /// Clear both flags. Called once by the module start entry point.
    pub fn reset(&self) {
        self.allocation_failed.store(false, Ordering::Release);
        self.stack_overflow
            .store(StackOverflow::None as u8, Ordering::Release);
    }

    /// Hook: a static allocation or task spawn failed.
    pub fn on_allocation_failed(&self) {
        self.allocation_failed.store(true, Ordering::Release);
    }

    /// Hook: the stack guard was hit.
    pub fn on_stack_overflow(&self) {
        self.raise_stack_level(StackOverflow::Critical);
    }

    /// Hook: the stack margin dropped below the warning threshold.
    pub fn on_stack_warning(&self) {
        self.raise_stack_level(StackOverflow::Warning);
    }

    fn raise_stack_level(&self, level: StackOverflow) {
        self.stack_overflow.fetch_max(level as u8, Ordering::AcqRel);
    }

    #[must_use]
    pub fn allocation_failed(&self) -> bool {
        self.allocation_failed.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn stack_overflow(&self) -> StackOverflow {
        StackOverflow::from_raw(self.stack_overflow.load(Ordering::Acquire))
    }
}

impl Default for SystemHealth {
    fn default() -> Self {
        Self::new()
    }
}
