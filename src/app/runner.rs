//! Main loop driver.
//!
//! One iteration = read at most one reader line (bounded wait), then always
//! run one engine tick.  A tick that checked sensors and is still waiting
//! for a gate is followed by a fixed pause so the printer host is not
//! polled in a tight loop.
//!
//! The caller's checkpoint (watchdog feed) runs after the scan is handled
//! and again after the tick, so a scan's baseline query and the tick's
//! check query are never charged to the same watchdog window.
//!
//! A reader error ends the loop; the caller decides what happens next.

use crate::config::SystemConfig;

use super::ports::{CommandSink, EventSink, GateSensorPort, ScanSource, SerialError, TimePort};
use super::service::{CorrelationEngine, TickOutcome};

pub struct GateLoop<R, T> {
    source: R,
    clock: T,
    read_timeout_ms: u32,
    tick_interval_ms: u32,
    iterations: u64,
}

impl<R, T> GateLoop<R, T>
where
    R: ScanSource,
    T: TimePort,
{
    pub fn new(config: &SystemConfig, source: R, clock: T) -> Self {
        Self {
            source,
            clock,
            read_timeout_ms: config.serial_read_timeout_ms,
            tick_interval_ms: config.tick_interval_ms,
            iterations: 0,
        }
    }

    /// Run a single read + tick iteration.
    pub fn step<S, C, E>(
        &mut self,
        engine: &mut CorrelationEngine<S, C, E>,
    ) -> Result<TickOutcome, SerialError>
    where
        S: GateSensorPort,
        C: CommandSink,
        E: EventSink,
    {
        self.step_with(engine, || {})
    }

    /// Like [`step`](Self::step), calling `checkpoint` between the read and
    /// the tick.
    pub fn step_with<S, C, E>(
        &mut self,
        engine: &mut CorrelationEngine<S, C, E>,
        mut checkpoint: impl FnMut(),
    ) -> Result<TickOutcome, SerialError>
    where
        S: GateSensorPort,
        C: CommandSink,
        E: EventSink,
    {
        self.iterations += 1;

        if let Some(line) = self.source.read_line(self.read_timeout_ms)? {
            engine.on_scan_line(&line, self.clock.now_ms());
        }
        checkpoint();

        let outcome = engine.on_tick(self.clock.now_ms());
        if outcome.needs_delay() {
            self.clock.delay_ms(self.tick_interval_ms);
        }
        Ok(outcome)
    }

    /// Iterate until the reader fails.  `checkpoint` runs mid-iteration
    /// and after every iteration.
    pub fn run<S, C, E>(
        &mut self,
        engine: &mut CorrelationEngine<S, C, E>,
        mut checkpoint: impl FnMut(),
    ) -> Result<(), SerialError>
    where
        S: GateSensorPort,
        C: CommandSink,
        E: EventSink,
    {
        loop {
            self.step_with(engine, &mut checkpoint)?;
            checkpoint();
        }
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn clock(&self) -> &T {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut T {
        &mut self.clock
    }

    pub fn source_mut(&mut self) -> &mut R {
        &mut self.source
    }
}
