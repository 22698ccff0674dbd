//! Cycle scheduler.
//!
//! Instructions and timers run on separate clocks. Instructions execute at
//! the configured clock frequency, one per cycle, while the delay and sound
//! timers count down at a fixed rate measured from elapsed time. A slow or
//! fast instruction rate never changes how quickly the timers decay. Only a
//! host stall, a gap well beyond one instruction period, drops timer ticks.
use std::time::{Duration, Instant};

use log::info;

use crate::{
    clock::{Clock, Ticker},
    constants::*,
    devices::Devices,
    error::Chip8Result,
    vm::{Chip8Vm, Flow, Hz},
};

pub struct Scheduler<D> {
    vm: Chip8Vm,
    devices: D,
    /// Throttles the instruction rate. Unthrottled when `None`.
    clock: Option<Clock>,
    /// Counts out 60Hz timer ticks.
    timer: Ticker,
    /// Simulated time per instruction, for headless runs.
    cycle_time: Duration,
}

impl<D: Devices> Scheduler<D> {
    pub fn new(vm: Chip8Vm, devices: D) -> Self {
        let conf = vm.config();
        let clock_frequency = conf.clock_frequency.filter(|hz| hz.0 > 0);

        let clock = clock_frequency.map(|hz| Clock::new(hz.into()));
        let cycle_time: Duration = clock_frequency
            .unwrap_or(Hz(CLOCK_FREQUENCY))
            .into();

        // A normal cycle, however slow, must never count as a stall.
        let stall = Duration::from_millis(TIMER_STALL_MILLIS).max(cycle_time * 2);
        let timer = Ticker::new(conf.timer_frequency.into(), stall, MAX_TIMER_CATCHUP);

        Self {
            vm,
            devices,
            clock,
            timer,
            cycle_time,
        }
    }

    pub fn vm(&self) -> &Chip8Vm {
        &self.vm
    }

    pub fn vm_mut(&mut self) -> &mut Chip8Vm {
        &mut self.vm
    }

    pub fn devices(&self) -> &D {
        &self.devices
    }

    pub fn devices_mut(&mut self) -> &mut D {
        &mut self.devices
    }

    pub fn into_parts(self) -> (Chip8Vm, D) {
        (self.vm, self.devices)
    }

    /// Run one iteration of the machine.
    ///
    /// 1. Poll the host keyboard into the keypad.
    /// 2. Execute one instruction, unless waiting on a key press.
    /// 3. Count down the timers for every whole timer period in `elapsed`.
    /// 4. Hand the screen and buzzer state to the devices if they changed.
    ///
    /// An execution error halts the VM and is returned with the failing
    /// instruction's address and opcode.
    pub fn cycle(&mut self, elapsed: Duration) -> Chip8Result<Flow> {
        let keys = self.devices.poll_keys();
        self.vm.set_keys(keys);

        let flow = self.vm.step()?;

        for _ in 0..self.timer.advance(elapsed) {
            self.vm.tick_timers();
        }

        self.publish();

        Ok(flow)
    }

    fn publish(&mut self) {
        if self.vm.take_redraw() {
            self.devices.draw(self.vm.display_buffer());
        }

        if let Some(state) = self.vm.take_buzzer_change() {
            self.devices.buzz(state);
        }
    }

    /// Run in real time until the devices ask to quit, or the VM faults.
    ///
    /// Each iteration waits out the rest of its instruction time slice.
    pub fn run(&mut self) -> Chip8Result<()> {
        self.timer.reset();
        if let Some(clock) = self.clock.as_mut() {
            clock.reset();
        }

        let mut last = Instant::now();

        loop {
            if self.devices.should_quit() {
                info!("shutdown requested");
                return Ok(());
            }

            let now = Instant::now();
            let elapsed = now.duration_since(last);
            last = now;

            self.cycle(elapsed)?;

            if let Some(clock) = self.clock.as_mut() {
                clock.wait();
            }
        }
    }

    /// Run `cycle_count` cycles as fast as possible, advancing simulated
    /// time by one instruction period each cycle.
    ///
    /// Timers decay as they would when running in real time at the
    /// configured clock frequency.
    pub fn run_simulated(&mut self, cycle_count: usize) -> Chip8Result<Flow> {
        let mut flow = Flow::Ok;

        for _ in 0..cycle_count {
            if self.devices.should_quit() {
                break;
            }
            flow = self.cycle(self.cycle_time)?;
        }

        Ok(flow)
    }
}
