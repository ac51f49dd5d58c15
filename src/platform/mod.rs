//! Platform boundary traits.
//!
//! The controller issues exactly three kinds of platform calls: digital
//! line writes (via `embedded_hal::digital::OutputPin`, used directly),
//! one-shot timer scheduling ([`StepTimer`]) and edge interrupt
//! subscription ([`EdgeInput`]). Everything else is platform-free.

#[cfg(feature = "std")]
pub mod host;

#[cfg(all(feature = "alloc", not(feature = "std")))]
use alloc::boxed::Box;

/// A one-shot microsecond timer driving the step scheduler.
///
/// Arming replaces any pending expiry; there is never more than one
/// pending callback, which is what lets the scheduler run without
/// step-level locking. The platform wires the expiry to
/// [`StepperAxis::on_step_timer`](crate::axis::StepperAxis::on_step_timer).
pub trait StepTimer: Send {
    /// Schedule the next expiry `delay_micros` from now, replacing any
    /// pending one.
    fn arm(&mut self, delay_micros: u64);

    /// Drop the pending expiry, if any. Idempotent.
    fn cancel(&mut self);
}

/// Handler invoked from the interrupt context on each edge.
#[cfg(any(feature = "std", feature = "alloc"))]
pub type EdgeHandler = Box<dyn FnMut(crate::endstop::Edge) + Send + 'static>;

/// An edge-interrupt capable digital input, such as an endstop switch line.
#[cfg(any(feature = "std", feature = "alloc"))]
pub trait EdgeInput {
    /// Install the edge handler. The platform must report both rise and
    /// fall edges; the axis performs its own inversion normalization.
    fn subscribe(&mut self, handler: EdgeHandler);
}
