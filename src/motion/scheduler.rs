//! Step scheduling - the per-tick state machine behind the step timer.
//!
//! Each invocation of the hardware timer callback maps to exactly one
//! [`StepScheduler::tick`]. The scheduler never re-arms anything itself; it
//! returns a [`Wake`] effect and the axis layer maps that onto the platform
//! timer. This keeps the Idle/Traveling transition explicit and testable
//! without hardware.

use super::ramp::RampParams;

/// Effect of one scheduler tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// Issue one step pulse, count it, and re-arm the timer.
    Step {
        /// Delay until the next tick, in microseconds.
        rearm_micros: u64,
    },
    /// The move is exhausted: transition Traveling -> Idle, no pulse.
    Idle,
}

/// Runtime state of the active move.
///
/// One instance per axis, owned behind the axis lock. A new move replaces
/// the state wholesale via [`StepScheduler::begin`]; velocity always
/// restarts from the minimum rate, there is no cruise-through between
/// consecutive moves.
#[derive(Debug, Clone, Copy)]
pub struct StepScheduler {
    /// Steps left in the active move.
    remaining: u32,

    /// Current step rate in rev/s.
    velocity: f32,

    /// Remaining-step count at which deceleration begins.
    trigger: u32,
}

impl StepScheduler {
    /// An idle scheduler with no move in flight.
    pub fn idle(params: &RampParams) -> Self {
        Self {
            remaining: 0,
            velocity: params.min_rps,
            trigger: 0,
        }
    }

    /// Arm the scheduler for a move of `steps` physical steps.
    pub fn begin(params: &RampParams, steps: u32) -> Self {
        Self {
            remaining: steps,
            velocity: params.min_rps,
            trigger: params.deceleration_trigger(steps),
        }
    }

    /// Steps left in the active move.
    #[inline]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Current step rate in rev/s.
    #[inline]
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Remaining-step count at which deceleration begins.
    #[inline]
    pub fn trigger(&self) -> u32 {
        self.trigger
    }

    /// True once the active move is exhausted.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Drop the active move, as on stop or an endstop hit.
    pub fn cancel(&mut self, params: &RampParams) {
        self.remaining = 0;
        self.velocity = params.min_rps;
    }

    /// Execute one timer tick.
    ///
    /// While `homing` the remaining-step count is frozen (a homing move is
    /// unbounded) and the re-arm period uses `homing_rps` instead of the
    /// ramped velocity.
    pub fn tick(
        &mut self,
        params: &RampParams,
        steps_per_revolution: u32,
        homing: bool,
        homing_rps: f32,
    ) -> Wake {
        if self.remaining == 0 {
            return Wake::Idle;
        }

        if !homing {
            self.remaining -= 1;
        }

        self.velocity = params.advance(self.velocity, self.remaining, self.trigger);

        let rate = if homing { homing_rps } else { self.velocity };
        let rearm_micros = if rate > 0.0 {
            (1_000_000.0 / (steps_per_revolution as f32 * rate)) as u64
        } else {
            u64::MAX
        };

        Wake::Step { rearm_micros }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPR: u32 = 200;

    fn params(acceleration_steps: u32) -> RampParams {
        RampParams {
            max_rps: 1.0,
            min_rps: 0.005,
            rps_interval: 1.0 / acceleration_steps as f32,
            acceleration_steps,
        }
    }

    #[test]
    fn test_move_runs_to_exhaustion() {
        let p = params(50);
        let mut sched = StepScheduler::begin(&p, 400);
        assert_eq!(sched.trigger(), 50);

        let mut pulses = 0u32;
        loop {
            match sched.tick(&p, SPR, false, 0.25) {
                Wake::Step { .. } => pulses += 1,
                Wake::Idle => break,
            }
        }

        assert_eq!(pulses, 400);
        assert!(sched.is_exhausted());
    }

    #[test]
    fn test_velocity_profile_is_trapezoidal() {
        let p = params(50);
        let mut sched = StepScheduler::begin(&p, 400);

        let mut last = sched.velocity();
        while let Wake::Step { .. } = sched.tick(&p, SPR, false, 0.25) {
            let v = sched.velocity();
            if sched.remaining() > sched.trigger() {
                assert!(v >= last - 1e-6, "velocity fell during acceleration");
            } else {
                assert!(v <= last + 1e-6, "velocity rose during deceleration");
            }
            assert!(v >= p.min_rps - 1e-6 && v <= p.max_rps + 1e-6);
            last = v;
        }

        // Back at the minimum when the move ends.
        assert!((sched.velocity() - p.min_rps).abs() < 1e-3);
    }

    #[test]
    fn test_short_move_peaks_at_midpoint() {
        let p = params(50);
        let sched = StepScheduler::begin(&p, 10);
        assert_eq!(sched.trigger(), 5);
    }

    #[test]
    fn test_homing_freezes_remaining() {
        let p = params(50);
        let mut sched = StepScheduler::begin(&p, 1);

        for _ in 0..100 {
            match sched.tick(&p, SPR, true, 0.25) {
                Wake::Step { rearm_micros } => {
                    // 0.25 rev/s over 200 steps = 20 ms per step
                    assert_eq!(rearm_micros, 20_000);
                }
                Wake::Idle => panic!("homing move must not exhaust"),
            }
        }
        assert_eq!(sched.remaining(), 1);
    }

    #[test]
    fn test_idle_scheduler_reports_idle() {
        let p = params(50);
        let mut sched = StepScheduler::idle(&p);
        assert_eq!(sched.tick(&p, SPR, false, 0.25), Wake::Idle);
    }

    #[test]
    fn test_cancel_drops_move() {
        let p = params(50);
        let mut sched = StepScheduler::begin(&p, 400);
        assert_eq!(sched.remaining(), 400);
        sched.cancel(&p);
        assert!(sched.is_exhausted());
        assert_eq!(sched.tick(&p, SPR, false, 0.25), Wake::Idle);
    }
}
