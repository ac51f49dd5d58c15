//! Host bring-up walkthrough: build an axis on console-logging pins,
//! home against a simulated switch, then run a couple of moves.
//!
//! ```sh
//! cargo run --example bring_up
//! ```

use std::convert::Infallible;
use std::time::Duration;

use embedded_hal::digital::{ErrorType, OutputPin};
use stepdrive::axis::StepperAxisBuilder;
use stepdrive::config::AxisConfig;
use stepdrive::platform::host::{ManualInput, ThreadTimer};
use stepdrive::{Direction, Edge, UnitExt};

/// Output pin that logs level changes, optionally staying quiet for the
/// high-rate step line.
struct ConsolePin {
    name: &'static str,
    level: bool,
    quiet: bool,
}

impl ConsolePin {
    fn new(name: &'static str, quiet: bool) -> Self {
        Self {
            name,
            level: false,
            quiet,
        }
    }

    fn set(&mut self, level: bool) {
        if self.level != level && !self.quiet {
            println!("[pin] {} -> {}", self.name, if level { "high" } else { "low" });
        }
        self.level = level;
    }
}

impl ErrorType for ConsolePin {
    type Error = Infallible;
}

impl OutputPin for ConsolePin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.set(true);
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AxisConfig::with_steps_per_revolution(200);
    config.max_rps = 5.0.rps();
    config.min_rps = 0.5.rps();
    config.rpss = 10.0.rpss();
    config.homing_rps = 2.0.rps();

    let (timer, hook) = ThreadTimer::spawn();
    let axis = StepperAxisBuilder::new(
        ConsolePin::new("enable", false),
        ConsolePin::new("step", true),
        ConsolePin::new("dir", false),
        timer,
    )
    .config(config)
    .build()?;

    let pump = axis.clone();
    hook.connect(move || pump.on_step_timer());

    // A simulated endstop: trips 150 ms into the homing run.
    let mut input = ManualInput::new();
    let switch = input.clone();
    let id = axis.register_endstop(&mut input)?;
    println!("registered endstop {id}");

    axis.set_endstop_hit_callback(|id| println!("[endstop] {id} hit"))?;

    let trip = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(150));
        switch.trigger(Edge::Rise);
    });
    println!("homing...");
    axis.home(Duration::from_secs(3), Direction::Anticlockwise)?;
    trip.join().ok();
    println!("homed, step count {}", axis.current_step());

    println!("rotating 90 degrees clockwise");
    axis.rotate(90.0.degrees(), Direction::Clockwise)?;
    axis.wait_for_travel_end(Some(Duration::from_secs(10)))?;
    println!("at {:.1} degrees", axis.degrees()?.value());

    println!("rotating to 270 degrees by the shortest path");
    axis.rotate_to(270.0.degrees())?;
    axis.wait_for_travel_end(Some(Duration::from_secs(10)))?;
    println!("at {:.1} degrees", axis.degrees()?.value());

    axis.disable()?;
    Ok(())
}
