//! The stepper axis controller.
//!
//! [`StepperAxis`] owns the enable, step and direction lines plus a
//! one-shot [`StepTimer`], and exposes the rotation, slide, homing and
//! endstop surface. All handles are clones of one shared core, so the
//! platform layer keeps a clone to pump [`StepperAxis::on_step_timer`]
//! and [`StepperAxis::on_endstop_edge`] while the application drives
//! moves through another.
//!
//! Mutable state lives behind a bounded-wait [`StateLock`]; the two
//! platform entry points take the lock unbounded because there is no
//! caller to report contention to. A handful of hot counters
//! (`current_step`, `remaining_steps`, the traveling and homing flags,
//! last endstop ids) are additionally mirrored in atomics so status
//! polls never block.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use embedded_hal::digital::OutputPin;

use crate::config::units::{
    Degrees, Revolutions, RevsPerSec, RevsPerSecSquared, SlideUnits, Steps,
};
use crate::config::AxisGeometry;
use crate::endstop::{Edge, EndstopId, SlotUpdate};
use crate::error::{ConfigError, Error, Result, StateError, WaitError};
use crate::motion::{Direction, RampParams, StepScheduler, Wake};
use crate::platform::{EdgeInput, StepTimer};
use crate::sync::{EventFlags, StateLock};

/// Event flag raised when a homing run reaches its endstop.
pub const HOMED: u32 = 1 << 0;
/// Event flag raised when a travel ends, normally or at an endstop.
pub const TRAVEL_ENDED: u32 = 1 << 2;

/// Default homing timeout used by [`StepperAxis::home_default`].
pub const DEFAULT_HOMING_TIMEOUT: Duration = Duration::from_secs(3);

type EndstopCallback = Box<dyn FnMut(EndstopId) + Send + 'static>;

/// Endstop registration state and the user callback slots.
#[derive(Default)]
pub(crate) struct EndstopBank {
    registered: u8,
    on_hit: Option<EndstopCallback>,
    on_released: Option<EndstopCallback>,
}

/// Lock-protected axis state.
pub(crate) struct Inner<EN, STEP, DIR, T> {
    pub(crate) enable_pin: EN,
    pub(crate) step_pin: STEP,
    pub(crate) dir_pin: DIR,
    pub(crate) timer: T,
    pub(crate) geometry: AxisGeometry,
    pub(crate) ramp: RampParams,
    pub(crate) rpss: RevsPerSecSquared,
    pub(crate) homing_rps: f32,
    pub(crate) scheduler: StepScheduler,
    pub(crate) direction: Direction,
    pub(crate) enabled: bool,
    pub(crate) enable_active_low: bool,
    pub(crate) active_braking: bool,
    pub(crate) invert_rotation: bool,
    pub(crate) invert_endstops: bool,
    pub(crate) invert_slide: bool,
    pub(crate) slide_offset: f32,
    pub(crate) endstops: EndstopBank,
}

struct AxisShared<EN, STEP, DIR, T> {
    lock: StateLock<Inner<EN, STEP, DIR, T>>,
    flags: EventFlags,
    current_step: AtomicI64,
    remaining_steps: AtomicU32,
    traveling: AtomicBool,
    homing: AtomicBool,
    endstop_hit: AtomicU8,
    endstop_released: AtomicU8,
}

/// Handle to one stepper axis. Cheap to clone; clones share all state.
pub struct StepperAxis<EN, STEP, DIR, T> {
    shared: Arc<AxisShared<EN, STEP, DIR, T>>,
}

impl<EN, STEP, DIR, T> Clone for StepperAxis<EN, STEP, DIR, T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<EN, STEP, DIR, T> StepperAxis<EN, STEP, DIR, T>
where
    EN: OutputPin,
    STEP: OutputPin,
    DIR: OutputPin,
    T: StepTimer,
{
    pub(crate) fn from_inner(inner: Inner<EN, STEP, DIR, T>, lock_bound: Duration) -> Self {
        Self {
            shared: Arc::new(AxisShared {
                lock: StateLock::new(inner, lock_bound),
                flags: EventFlags::new(),
                current_step: AtomicI64::new(0),
                remaining_steps: AtomicU32::new(0),
                traveling: AtomicBool::new(false),
                homing: AtomicBool::new(false),
                endstop_hit: AtomicU8::new(0),
                endstop_released: AtomicU8::new(0),
            }),
        }
    }

    /// Energize the driver during bring-up, before the lock exists.
    pub(crate) fn energize_on_build(inner: &mut Inner<EN, STEP, DIR, T>) -> Result<()> {
        Self::write_enable(inner, true)
    }

    /// Drive the enable line and record the new state.
    fn write_enable(inner: &mut Inner<EN, STEP, DIR, T>, enabled: bool) -> Result<()> {
        let level_high = enabled != inner.enable_active_low;
        let outcome = if level_high {
            inner.enable_pin.set_high()
        } else {
            inner.enable_pin.set_low()
        };
        outcome.map_err(|_| Error::Pin)?;
        inner.enabled = enabled;
        Ok(())
    }

    /// Pulse the step line, advance the position, and either re-arm the
    /// timer or finish the travel. Runs under the state lock.
    fn run_tick(&self, inner: &mut Inner<EN, STEP, DIR, T>) {
        let ramp = inner.ramp;
        let spr = inner.geometry.steps_per_revolution;
        let homing = self.shared.homing.load(Ordering::Acquire);

        match inner.scheduler.tick(&ramp, spr, homing, inner.homing_rps) {
            Wake::Step { rearm_micros } => {
                let _ = inner.step_pin.set_high();
                let _ = inner.step_pin.set_low();
                self.shared
                    .current_step
                    .fetch_add(inner.direction.sign(), Ordering::AcqRel);
                self.shared
                    .remaining_steps
                    .store(inner.scheduler.remaining(), Ordering::Release);
                inner.timer.arm(rearm_micros);
            }
            Wake::Idle => {
                self.finish_travel(inner);
            }
        }
    }

    /// Mark the current travel as over and drop torque unless braking.
    fn finish_travel(&self, inner: &mut Inner<EN, STEP, DIR, T>) {
        self.shared.traveling.store(false, Ordering::Release);
        self.shared.remaining_steps.store(0, Ordering::Release);
        if !inner.active_braking {
            let _ = Self::write_enable(inner, false);
        }
        self.shared.flags.set(TRAVEL_ENDED);
    }

    /// Start a travel of `steps` in `direction`.
    ///
    /// Rejected while an endstop hit is latched or another travel is in
    /// flight. The first step fires immediately; the rest are paced by
    /// the timer.
    fn begin_travel(&self, steps: u32, direction: Direction) -> Result<()> {
        if steps == 0 {
            return Ok(());
        }

        let mut inner = self.shared.lock.lock()?;

        if let Some(id) = EndstopId::from_raw(self.shared.endstop_hit.load(Ordering::Acquire)) {
            return Err(StateError::EndstopEngaged(id).into());
        }
        if self.shared.traveling.load(Ordering::Acquire) {
            return Err(StateError::AlreadyTraveling.into());
        }

        if !inner.enabled {
            Self::write_enable(&mut inner, true)?;
        }

        // Position counting follows the commanded direction; inversion
        // only flips the physical line.
        inner.direction = direction;
        let physical = if inner.invert_rotation {
            direction.reversed()
        } else {
            direction
        };
        let outcome = match physical {
            Direction::Clockwise => inner.dir_pin.set_high(),
            Direction::Anticlockwise => inner.dir_pin.set_low(),
        };
        outcome.map_err(|_| Error::Pin)?;

        let ramp = inner.ramp;
        inner.scheduler = StepScheduler::begin(&ramp, steps);
        self.shared.remaining_steps.store(steps, Ordering::Release);
        self.shared.flags.clear(TRAVEL_ENDED);
        self.shared.traveling.store(true, Ordering::Release);

        self.run_tick(&mut inner);
        Ok(())
    }

    // ---- platform entry points ----

    /// Timer expiry entry point. Wire the platform timer callback here.
    pub fn on_step_timer(&self) {
        // A cancel from an endstop hit or Stop may already have landed.
        if !self.shared.traveling.load(Ordering::Acquire) {
            return;
        }
        let mut inner = self.shared.lock.lock_unbounded();
        if !self.shared.traveling.load(Ordering::Acquire) {
            return;
        }
        self.run_tick(&mut inner);
    }

    /// Endstop edge entry point. Wire each registered input's interrupt
    /// here with the id handed out by [`register_endstop`].
    ///
    /// A rising edge halts any travel before the next pulse, latches the
    /// hit, and completes a homing run. User callbacks run here, under
    /// the state lock; they must not call back into the axis.
    ///
    /// [`register_endstop`]: StepperAxis::register_endstop
    pub fn on_endstop_edge(&self, id: EndstopId, edge: Edge) {
        let mut inner = self.shared.lock.lock_unbounded();
        let edge = if inner.invert_endstops {
            edge.inverted()
        } else {
            edge
        };

        match edge {
            Edge::Rise => {
                inner.timer.cancel();
                let ramp = inner.ramp;
                inner.scheduler.cancel(&ramp);
                self.shared.remaining_steps.store(0, Ordering::Release);

                let hold = inner.active_braking;
                let _ = Self::write_enable(&mut inner, hold);

                // Latch before waking waiters. A homing waiter clears the
                // latch on success, so it must already be visible here.
                self.shared.endstop_hit.store(id.raw(), Ordering::Release);

                if self.shared.homing.swap(false, Ordering::AcqRel) {
                    self.shared.flags.set(HOMED);
                }
                if self.shared.traveling.swap(false, Ordering::AcqRel) {
                    self.shared.flags.set(TRAVEL_ENDED);
                }

                if let Some(callback) = inner.endstops.on_hit.as_mut() {
                    callback(id);
                }
            }
            Edge::Fall => {
                self.shared
                    .endstop_released
                    .store(id.raw(), Ordering::Release);
                if let Some(callback) = inner.endstops.on_released.as_mut() {
                    callback(id);
                }
            }
        }
    }

    // ---- rotation ----

    /// Rotate by `degrees` in `direction`.
    pub fn rotate(&self, degrees: Degrees, direction: Direction) -> Result<()> {
        let steps = {
            let inner = self.shared.lock.lock()?;
            inner.geometry.degrees_to_steps(degrees).abs()
        };
        self.begin_travel(clamp_steps(steps), direction)
    }

    /// Rotate to `target` within the current revolution, taking the
    /// shortest path. A 180° delta resolves clockwise.
    pub fn rotate_to(&self, target: Degrees) -> Result<()> {
        let (steps, direction) = {
            let inner = self.shared.lock.lock()?;
            let current = wrap_degrees(
                inner
                    .geometry
                    .revolutions(Steps::new(self.shared.current_step.load(Ordering::Acquire)))
                    .degrees_within_revolution()
                    .value(),
            );
            let target = wrap_degrees(target.value());

            let mut delta = target - current;
            if delta > 180.0 {
                delta -= 360.0;
            } else if delta < -180.0 {
                delta += 360.0;
            }

            let direction = if delta >= 0.0 {
                Direction::Clockwise
            } else {
                Direction::Anticlockwise
            };
            let steps = inner
                .geometry
                .degrees_to_steps(Degrees::new(delta))
                .abs();
            (steps, direction)
        };
        self.begin_travel(clamp_steps(steps), direction)
    }

    /// Rotate to `target` within the current revolution, forcing the
    /// approach `direction` even when the other way is shorter.
    pub fn rotate_to_with(&self, target: Degrees, direction: Direction) -> Result<()> {
        let steps = {
            let inner = self.shared.lock.lock()?;
            let current = wrap_degrees(
                inner
                    .geometry
                    .revolutions(Steps::new(self.shared.current_step.load(Ordering::Acquire)))
                    .degrees_within_revolution()
                    .value(),
            );
            let target = wrap_degrees(target.value());

            let span = match direction {
                Direction::Clockwise => wrap_degrees(target - current),
                Direction::Anticlockwise => wrap_degrees(current - target),
            };
            inner
                .geometry
                .degrees_to_steps(Degrees::new(span))
                .abs()
        };
        self.begin_travel(clamp_steps(steps), direction)
    }

    /// Rotate to an absolute lifetime angle, counted from the homed
    /// origin across full revolutions.
    pub fn set_rotation(&self, target: Degrees) -> Result<()> {
        let (steps, direction) = {
            let inner = self.shared.lock.lock()?;
            let target_steps = inner.geometry.degrees_to_steps(target);
            let delta = target_steps - Steps::new(self.shared.current_step.load(Ordering::Acquire));
            (delta.abs(), Direction::from_delta(delta.value()))
        };
        self.begin_travel(clamp_steps(steps), direction)
    }

    // ---- slide ----

    /// Move the slide by `distance` in `direction`.
    ///
    /// Errors with [`StateError::SlideUnitsNotSet`] until a units-per-
    /// revolution ratio is configured.
    pub fn slide(&self, distance: SlideUnits, direction: Direction) -> Result<()> {
        let (steps, direction) = {
            let inner = self.shared.lock.lock()?;
            if !inner.geometry.has_slide_units() {
                return Err(StateError::SlideUnitsNotSet.into());
            }
            let steps = inner
                .geometry
                .slide_to_steps(SlideUnits::new(distance.value().abs()))
                .abs();
            let direction = if inner.invert_slide {
                direction.reversed()
            } else {
                direction
            };
            (steps, direction)
        };
        self.begin_travel(clamp_steps(steps), direction)
    }

    /// Move the slide to absolute `position`, offset by the configured
    /// slide offset.
    pub fn slide_to(&self, position: SlideUnits) -> Result<()> {
        let (steps, direction) = {
            let inner = self.shared.lock.lock()?;
            if !inner.geometry.has_slide_units() {
                return Err(StateError::SlideUnitsNotSet.into());
            }
            let target = position.value() + inner.slide_offset;
            let current = inner
                .geometry
                .steps_to_slide(Steps::new(self.shared.current_step.load(Ordering::Acquire)))
                .value();
            let delta = target - current;

            let mut direction = if delta >= 0.0 {
                Direction::Clockwise
            } else {
                Direction::Anticlockwise
            };
            if inner.invert_slide {
                direction = direction.reversed();
            }
            let steps = inner
                .geometry
                .slide_to_steps(SlideUnits::new(delta.abs()))
                .abs();
            (steps, direction)
        };
        self.begin_travel(clamp_steps(steps), direction)
    }

    // ---- stop and wait ----

    /// Abandon the current travel, if any. Remaining steps are dropped
    /// and waiters see the travel as ended.
    pub fn stop(&self) -> Result<()> {
        let mut inner = self.shared.lock.lock()?;
        inner.timer.cancel();
        let ramp = inner.ramp;
        inner.scheduler.cancel(&ramp);
        self.shared.remaining_steps.store(0, Ordering::Release);
        if self.shared.traveling.swap(false, Ordering::AcqRel) {
            if !inner.active_braking {
                let _ = Self::write_enable(&mut inner, false);
            }
            self.shared.flags.set(TRAVEL_ENDED);
        }
        Ok(())
    }

    /// Block until the in-flight travel ends. Returns immediately when
    /// nothing is traveling; `None` waits without limit.
    pub fn wait_for_travel_end(&self, timeout: Option<Duration>) -> Result<()> {
        if !self.shared.traveling.load(Ordering::Acquire) {
            return Ok(());
        }
        match timeout {
            None => {
                self.shared.flags.wait_any_forever(TRAVEL_ENDED);
                Ok(())
            }
            Some(timeout) => match self.shared.flags.wait_any(TRAVEL_ENDED, timeout) {
                Some(_) => Ok(()),
                None => Err(WaitError::TravelWaitTimeout.into()),
            },
        }
    }

    // ---- homing ----

    /// Run toward an endstop at the homing rate and zero the position
    /// when it trips.
    ///
    /// Blocks until the endstop edge arrives or `timeout` expires. On
    /// success the hit latch is cleared automatically and `current_step`
    /// becomes the origin. On timeout the axis winds down on its own.
    pub fn home(&self, timeout: Duration, direction: Direction) -> Result<()> {
        if self
            .shared
            .homing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(StateError::AlreadyHoming.into());
        }
        self.shared.flags.clear(HOMED);

        // One nominal step; the scheduler holds the count while homing,
        // so the run is unbounded until the endstop or the timeout.
        if let Err(error) = self.begin_travel(1, direction) {
            self.shared.homing.store(false, Ordering::Release);
            return Err(error);
        }

        match self.shared.flags.wait_any(HOMED, timeout) {
            Some(_) => {
                self.shared.current_step.store(0, Ordering::Release);
                self.shared.endstop_hit.store(0, Ordering::Release);
                Ok(())
            }
            None => {
                // Releasing the flag lets the held step drain, so the
                // move ends one period later without a cancel.
                self.shared.homing.store(false, Ordering::Release);
                Err(WaitError::HomingTimeout.into())
            }
        }
    }

    /// [`home`](StepperAxis::home) anticlockwise with the 3 s default
    /// timeout.
    pub fn home_default(&self) -> Result<()> {
        self.home(DEFAULT_HOMING_TIMEOUT, Direction::Anticlockwise)
    }

    /// Register an endstop input. The first registration becomes the
    /// lower endstop, the second the upper; a third errors.
    pub fn register_endstop<I>(&self, input: &mut I) -> Result<EndstopId>
    where
        I: EdgeInput,
        EN: Send + 'static,
        STEP: Send + 'static,
        DIR: Send + 'static,
        T: Send + 'static,
    {
        let id = {
            let mut inner = self.shared.lock.lock()?;
            let id = match inner.endstops.registered {
                0 => EndstopId::Lower,
                1 => EndstopId::Upper,
                _ => return Err(crate::error::ResourceError::NoFreeEndstops.into()),
            };
            inner.endstops.registered += 1;
            id
        };

        let axis = self.clone();
        input.subscribe(Box::new(move |edge| axis.on_endstop_edge(id, edge)));
        Ok(id)
    }

    /// Unlatch a recorded endstop hit so travels are accepted again.
    pub fn clear_endstop_hit(&self) -> Result<()> {
        let _inner = self.shared.lock.lock()?;
        self.shared.endstop_hit.store(0, Ordering::Release);
        Ok(())
    }

    /// Install the endstop hit callback, reporting whether a previous
    /// one was displaced.
    pub fn set_endstop_hit_callback<F>(&self, callback: F) -> Result<SlotUpdate>
    where
        F: FnMut(EndstopId) + Send + 'static,
    {
        let mut inner = self.shared.lock.lock()?;
        let previous = inner.endstops.on_hit.replace(Box::new(callback));
        Ok(if previous.is_some() {
            SlotUpdate::Replaced
        } else {
            SlotUpdate::Installed
        })
    }

    /// Install the endstop released callback, reporting whether a
    /// previous one was displaced.
    pub fn set_endstop_released_callback<F>(&self, callback: F) -> Result<SlotUpdate>
    where
        F: FnMut(EndstopId) + Send + 'static,
    {
        let mut inner = self.shared.lock.lock()?;
        let previous = inner.endstops.on_released.replace(Box::new(callback));
        Ok(if previous.is_some() {
            SlotUpdate::Replaced
        } else {
            SlotUpdate::Installed
        })
    }

    // ---- status ----

    /// Shaft angle within the current revolution, in [0°, 360°).
    pub fn degrees(&self) -> Result<Degrees> {
        let inner = self.shared.lock.lock()?;
        let wrapped = wrap_degrees(
            inner
                .geometry
                .revolutions(Steps::new(self.shared.current_step.load(Ordering::Acquire)))
                .degrees_within_revolution()
                .value(),
        );
        Ok(Degrees::new(wrapped))
    }

    /// Signed lifetime angle from the origin, across revolutions.
    pub fn lifetime_degrees(&self) -> Result<Degrees> {
        let inner = self.shared.lock.lock()?;
        Ok(inner
            .geometry
            .revolutions(Steps::new(self.shared.current_step.load(Ordering::Acquire)))
            .to_degrees())
    }

    /// Signed revolutions from the origin.
    pub fn revolutions(&self) -> Result<Revolutions> {
        let inner = self.shared.lock.lock()?;
        Ok(inner
            .geometry
            .revolutions(Steps::new(self.shared.current_step.load(Ordering::Acquire))))
    }

    /// Absolute slide position from the origin.
    pub fn slide_position(&self) -> Result<SlideUnits> {
        let inner = self.shared.lock.lock()?;
        if !inner.geometry.has_slide_units() {
            return Err(StateError::SlideUnitsNotSet.into());
        }
        Ok(inner
            .geometry
            .steps_to_slide(Steps::new(self.shared.current_step.load(Ordering::Acquire))))
    }

    /// Signed step count from the origin. Lock-free.
    pub fn current_step(&self) -> i64 {
        self.shared.current_step.load(Ordering::Acquire)
    }

    /// Steps left in the in-flight travel. Lock-free.
    pub fn steps_remaining(&self) -> u32 {
        self.shared.remaining_steps.load(Ordering::Acquire)
    }

    /// True while a travel is in flight. Lock-free.
    pub fn is_traveling(&self) -> bool {
        self.shared.traveling.load(Ordering::Acquire)
    }

    /// True while a homing run is in flight. Lock-free.
    pub fn is_homing(&self) -> bool {
        self.shared.homing.load(Ordering::Acquire)
    }

    /// Latched endstop hit, until [`clear_endstop_hit`] or a successful
    /// homing run. Lock-free.
    ///
    /// [`clear_endstop_hit`]: StepperAxis::clear_endstop_hit
    pub fn last_endstop_hit(&self) -> Option<EndstopId> {
        EndstopId::from_raw(self.shared.endstop_hit.load(Ordering::Acquire))
    }

    /// Most recently released endstop. Lock-free.
    pub fn last_endstop_released(&self) -> Option<EndstopId> {
        EndstopId::from_raw(self.shared.endstop_released.load(Ordering::Acquire))
    }

    /// Whether the driver is energized.
    pub fn is_enabled(&self) -> Result<bool> {
        let inner = self.shared.lock.lock()?;
        Ok(inner.enabled)
    }

    // ---- runtime configuration ----

    /// Set the peak rate and re-derive the ramp.
    pub fn set_max_rps(&self, max: RevsPerSec) -> Result<()> {
        let mut inner = self.shared.lock.lock()?;
        let min = RevsPerSec::new(inner.ramp.min_rps);
        validate_rate_band(max, min)?;
        inner.ramp = RampParams::derive(max, min, inner.rpss);
        Ok(())
    }

    /// Set both ends of the rate band and re-derive the ramp.
    pub fn set_rps_bounds(&self, max: RevsPerSec, min: RevsPerSec) -> Result<()> {
        let mut inner = self.shared.lock.lock()?;
        validate_rate_band(max, min)?;
        inner.ramp = RampParams::derive(max, min, inner.rpss);
        Ok(())
    }

    /// Set the ramp acceleration and re-derive the ramp.
    pub fn set_rpss(&self, rpss: RevsPerSecSquared) -> Result<()> {
        let mut inner = self.shared.lock.lock()?;
        if rpss.value() <= 0.0 {
            return Err(ConfigError::InvalidAcceleration(rpss.value()).into());
        }
        inner.rpss = rpss;
        let max = RevsPerSec::new(inner.ramp.max_rps);
        let min = RevsPerSec::new(inner.ramp.min_rps);
        inner.ramp = RampParams::derive(max, min, rpss);
        Ok(())
    }

    /// Set the constant rate used while homing.
    pub fn set_homing_rps(&self, rps: RevsPerSec) -> Result<()> {
        let mut inner = self.shared.lock.lock()?;
        if rps.value() <= 0.0 {
            return Err(ConfigError::InvalidHomingRate(rps.value()).into());
        }
        inner.homing_rps = rps.value();
        Ok(())
    }

    /// Set the slide units moved per single step.
    pub fn set_slide_units_per_step(&self, units_per_step: f32) -> Result<()> {
        let mut inner = self.shared.lock.lock()?;
        if units_per_step <= 0.0 {
            return Err(ConfigError::InvalidSlideUnits(units_per_step).into());
        }
        inner.geometry.slide_units_per_step = units_per_step;
        Ok(())
    }

    /// Set the peak rate as linear slide units per second.
    pub fn set_slide_ups(&self, units_per_sec: f32) -> Result<()> {
        let mut inner = self.shared.lock.lock()?;
        let max = slide_rate_to_rps(&inner.geometry, units_per_sec)?;
        let min = RevsPerSec::new(inner.ramp.min_rps);
        validate_rate_band(max, min)?;
        inner.ramp = RampParams::derive(max, min, inner.rpss);
        Ok(())
    }

    /// Set both ends of the rate band as linear slide units per second
    /// and re-derive the ramp.
    pub fn set_slide_ups_bounds(&self, max_ups: f32, min_ups: f32) -> Result<()> {
        let mut inner = self.shared.lock.lock()?;
        let max = slide_rate_to_rps(&inner.geometry, max_ups)?;
        let min = slide_rate_to_rps(&inner.geometry, min_ups)?;
        validate_rate_band(max, min)?;
        inner.ramp = RampParams::derive(max, min, inner.rpss);
        Ok(())
    }

    /// Set the ramp acceleration as linear slide units per second squared.
    pub fn set_slide_upss(&self, units_per_sec_sq: f32) -> Result<()> {
        let mut inner = self.shared.lock.lock()?;
        let rps_equiv = slide_rate_to_rps(&inner.geometry, units_per_sec_sq)?;
        let rpss = RevsPerSecSquared::new(rps_equiv.value());
        inner.rpss = rpss;
        let max = RevsPerSec::new(inner.ramp.max_rps);
        let min = RevsPerSec::new(inner.ramp.min_rps);
        inner.ramp = RampParams::derive(max, min, rpss);
        Ok(())
    }

    /// Set the offset added to absolute slide targets.
    pub fn set_slide_offset(&self, offset: SlideUnits) -> Result<()> {
        let mut inner = self.shared.lock.lock()?;
        inner.slide_offset = offset.value();
        Ok(())
    }

    /// Flip the rotation sense of the direction line.
    pub fn invert_rotation(&self, invert: bool) -> Result<()> {
        let mut inner = self.shared.lock.lock()?;
        inner.invert_rotation = invert;
        Ok(())
    }

    /// Treat endstop inputs as active-low.
    pub fn invert_endstops(&self, invert: bool) -> Result<()> {
        let mut inner = self.shared.lock.lock()?;
        inner.invert_endstops = invert;
        Ok(())
    }

    /// Flip the linear direction mapping of slide moves.
    pub fn invert_slide(&self, invert: bool) -> Result<()> {
        let mut inner = self.shared.lock.lock()?;
        inner.invert_slide = invert;
        Ok(())
    }

    /// Keep the driver energized between travels to hold position.
    pub fn set_active_braking(&self, braking: bool) -> Result<()> {
        let mut inner = self.shared.lock.lock()?;
        inner.active_braking = braking;
        Ok(())
    }

    /// Energize the driver.
    pub fn enable(&self) -> Result<()> {
        let mut inner = self.shared.lock.lock()?;
        Self::write_enable(&mut inner, true)
    }

    /// De-energize the driver. The shaft is free to move.
    pub fn disable(&self) -> Result<()> {
        let mut inner = self.shared.lock.lock()?;
        Self::write_enable(&mut inner, false)
    }
}

/// Saturate a step count into the scheduler's range.
fn clamp_steps(steps: u64) -> u32 {
    steps.min(u32::MAX as u64) as u32
}

/// Normalize an angle into [0°, 360°).
fn wrap_degrees(degrees: f32) -> f32 {
    let wrapped = degrees % 360.0;
    if wrapped < 0.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

fn validate_rate_band(max: RevsPerSec, min: RevsPerSec) -> Result<()> {
    if min.value() <= 0.0 || max.value() < min.value() {
        return Err(ConfigError::InvalidVelocityRange {
            min: min.value(),
            max: max.value(),
        }
        .into());
    }
    Ok(())
}

/// Convert a linear slide rate into the equivalent shaft rate.
fn slide_rate_to_rps(geometry: &AxisGeometry, units_per_sec: f32) -> Result<RevsPerSec> {
    if !geometry.has_slide_units() {
        return Err(StateError::SlideUnitsNotSet.into());
    }
    let units_per_rev = geometry.slide_units_per_step * geometry.steps_per_revolution as f32;
    Ok(RevsPerSec::new(units_per_sec / units_per_rev))
}
