//! Host-side platform adapters for std targets.
//!
//! [`ThreadTimer`] backs [`StepTimer`] with a worker thread parked on a
//! condvar deadline, and [`ManualInput`] is an [`EdgeInput`] whose edges
//! the caller raises explicitly. Together they let the full controller
//! run and be exercised on a desktop without hardware.

use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::endstop::Edge;
use crate::platform::{EdgeHandler, EdgeInput, StepTimer};

type TimerCallback = Box<dyn FnMut() + Send + 'static>;

#[derive(Default)]
struct TimerCommand {
    deadline: Option<Instant>,
    quit: bool,
}

struct TimerShared {
    command: Mutex<TimerCommand>,
    wakeup: Condvar,
}

/// One-shot timer backed by a dedicated worker thread.
///
/// Construction is two-phase because the expiry callback usually closes
/// over the axis, which in turn owns the timer:
///
/// ```ignore
/// let (timer, hook) = ThreadTimer::spawn();
/// let axis = StepperAxisBuilder::new()/* pins */.timer(timer).build()?;
/// let pump = axis.clone();
/// hook.connect(move || pump.on_step_timer());
/// ```
pub struct ThreadTimer {
    shared: Arc<TimerShared>,
    worker: Option<JoinHandle<()>>,
}

/// Deferred callback slot handed out by [`ThreadTimer::spawn`].
pub struct TimerHook {
    callback: Arc<Mutex<Option<TimerCallback>>>,
}

impl TimerHook {
    /// Install the expiry callback. Expiries before this point are dropped.
    pub fn connect<F>(&self, callback: F)
    where
        F: FnMut() + Send + 'static,
    {
        if let Ok(mut slot) = self.callback.lock() {
            *slot = Some(Box::new(callback));
        }
    }
}

impl ThreadTimer {
    /// Start the worker thread and return the timer with its callback hook.
    pub fn spawn() -> (Self, TimerHook) {
        let shared = Arc::new(TimerShared {
            command: Mutex::new(TimerCommand::default()),
            wakeup: Condvar::new(),
        });
        let callback: Arc<Mutex<Option<TimerCallback>>> = Arc::new(Mutex::new(None));

        let worker_shared = Arc::clone(&shared);
        let worker_callback = Arc::clone(&callback);
        let worker = std::thread::Builder::new()
            .name("step-timer".into())
            .spawn(move || Self::run(&worker_shared, &worker_callback));

        let timer = ThreadTimer {
            shared,
            worker: worker.ok(),
        };
        (timer, TimerHook { callback })
    }

    fn run(shared: &TimerShared, callback: &Mutex<Option<TimerCallback>>) {
        let mut command = match shared.command.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        loop {
            if command.quit {
                return;
            }
            match command.deadline {
                None => {
                    command = match shared.wakeup.wait(command) {
                        Ok(guard) => guard,
                        Err(poisoned) => poisoned.into_inner(),
                    };
                }
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        command.deadline = None;
                        // The command lock must not be held across the
                        // callback: the callback re-enters the axis, and
                        // the axis arms this timer while holding its own
                        // lock. Holding both here would deadlock.
                        drop(command);
                        if let Ok(mut slot) = callback.lock() {
                            if let Some(fire) = slot.as_mut() {
                                fire();
                            }
                        }
                        command = match shared.command.lock() {
                            Ok(guard) => guard,
                            Err(poisoned) => poisoned.into_inner(),
                        };
                    } else {
                        command = match shared.wakeup.wait_timeout(command, deadline - now) {
                            Ok((guard, _)) => guard,
                            Err(poisoned) => poisoned.into_inner().0,
                        };
                    }
                }
            }
        }
    }
}

impl StepTimer for ThreadTimer {
    fn arm(&mut self, delay_micros: u64) {
        if let Ok(mut command) = self.shared.command.lock() {
            command.deadline = Some(Instant::now() + Duration::from_micros(delay_micros));
            self.shared.wakeup.notify_all();
        }
    }

    fn cancel(&mut self) {
        if let Ok(mut command) = self.shared.command.lock() {
            command.deadline = None;
            self.shared.wakeup.notify_all();
        }
    }
}

impl Drop for ThreadTimer {
    fn drop(&mut self) {
        if let Ok(mut command) = self.shared.command.lock() {
            command.quit = true;
            command.deadline = None;
            self.shared.wakeup.notify_all();
        }
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Edge input driven by explicit [`trigger`](ManualInput::trigger) calls.
///
/// Clones share the handler slot, so a test can keep one handle to raise
/// edges after registering the other with the axis.
#[derive(Clone, Default)]
pub struct ManualInput {
    handler: Arc<Mutex<Option<EdgeHandler>>>,
}

impl ManualInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver an edge to the subscribed handler, on the calling thread.
    /// Edges before subscription are dropped, as on real hardware with
    /// the interrupt not yet attached.
    pub fn trigger(&self, edge: Edge) {
        if let Ok(mut slot) = self.handler.lock() {
            if let Some(handler) = slot.as_mut() {
                handler(edge);
            }
        }
    }
}

impl EdgeInput for ManualInput {
    fn subscribe(&mut self, handler: EdgeHandler) {
        if let Ok(mut slot) = self.handler.lock() {
            *slot = Some(handler);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn timer_fires_once_after_delay() {
        let fired = Arc::new(AtomicU32::new(0));
        let (mut timer, hook) = ThreadTimer::spawn();
        let counter = Arc::clone(&fired);
        hook.connect(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        timer.arm(2_000);
        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn rearm_replaces_pending_deadline() {
        let fired = Arc::new(AtomicU32::new(0));
        let (mut timer, hook) = ThreadTimer::spawn();
        let counter = Arc::clone(&fired);
        hook.connect(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        timer.arm(500_000);
        timer.arm(1_000);
        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cancel_suppresses_expiry() {
        let fired = Arc::new(AtomicU32::new(0));
        let (mut timer, hook) = ThreadTimer::spawn();
        let counter = Arc::clone(&fired);
        hook.connect(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        timer.arm(5_000);
        timer.cancel();
        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn manual_input_routes_edges_to_handler() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut input = ManualInput::new();
        let side = input.clone();

        let log = Arc::clone(&seen);
        input.subscribe(Box::new(move |edge| {
            log.lock().unwrap().push(edge);
        }));

        side.trigger(Edge::Rise);
        side.trigger(Edge::Fall);
        assert_eq!(*seen.lock().unwrap(), vec![Edge::Rise, Edge::Fall]);
    }

    #[test]
    fn manual_input_drops_edges_before_subscription() {
        let input = ManualInput::new();
        input.trigger(Edge::Rise);
    }
}
