//! State owners for the LED programs
//!
//! Each controller owns its state exclusively and changes it only in
//! response to a received [`Event`]. Events a controller does not handle are
//! ignored.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal::digital::{OutputPin, PinState};

use crate::channels::CoalescingSlot;
use crate::leds::{WorkerControl, WorkerId};
use crate::types::{BlinkMode, Event, LedState};

/// Worker slot of the 100-tick blinker
pub const FAST_WORKER: WorkerId = WorkerId(0);
/// Worker slot of the 400-tick blinker
pub const SLOW_WORKER: WorkerId = WorkerId(1);

// ===================================================================
// Mode Controller
// ===================================================================

/// Selects which blink worker runs, at most one at a time
pub struct ModeController<'a, W: ?Sized, O> {
    mode: BlinkMode,
    workers: &'a W,
    led: O,
}

impl<'a, W, O> ModeController<'a, W, O>
where
    W: WorkerControl + ?Sized,
    O: OutputPin,
{
    /// Starts stopped; every worker is suspended and the LED is left as is.
    pub fn new(workers: &'a W, led: O) -> Self {
        workers.suspend(FAST_WORKER);
        workers.suspend(SLOW_WORKER);
        Self {
            mode: BlinkMode::Stopped,
            workers,
            led,
        }
    }

    pub fn mode(&self) -> BlinkMode {
        self.mode
    }

    /// Apply one event and return the resulting mode.
    pub fn apply(&mut self, event: Event) -> BlinkMode {
        match event {
            Event::Stop => {
                self.workers.suspend(FAST_WORKER);
                self.workers.suspend(SLOW_WORKER);
                let _ = self.led.set_state(PinState::Low);
                self.mode = BlinkMode::Stopped;
            }
            Event::SlowBlink => {
                self.workers.suspend(FAST_WORKER);
                self.workers.resume(SLOW_WORKER);
                self.mode = BlinkMode::Slow;
            }
            Event::FastBlink => {
                self.workers.suspend(SLOW_WORKER);
                self.workers.resume(FAST_WORKER);
                self.mode = BlinkMode::Fast;
            }
            other => {
                trace!("Mode: ignoring {:?}", other);
                return self.mode;
            }
        }
        info!("Mode: {:?}", self.mode);
        self.mode
    }

    pub async fn run<M: RawMutex>(&mut self, events: &CoalescingSlot<M, Event>) -> ! {
        loop {
            let event = events.wait().await;
            self.apply(event);
        }
    }
}

// ===================================================================
// Toggle Controller
// ===================================================================

/// Flips an LED on every toggle event
pub struct ToggleController<O> {
    state: LedState,
    led: O,
}

impl<O: OutputPin> ToggleController<O> {
    /// Starts off and drives the LED low.
    pub fn new(mut led: O) -> Self {
        let _ = led.set_low();
        Self {
            state: LedState::Off,
            led,
        }
    }

    pub fn state(&self) -> LedState {
        self.state
    }

    pub fn apply(&mut self, event: Event) -> LedState {
        if event != Event::Toggle {
            trace!("Toggle: ignoring {:?}", event);
            return self.state;
        }

        self.state = self.state.flipped();
        let level = match self.state {
            LedState::On => PinState::High,
            LedState::Off => PinState::Low,
        };
        let _ = self.led.set_state(level);
        debug!("Toggle: LED {:?}", self.state);
        self.state
    }

    pub async fn run<M: RawMutex>(&mut self, events: &CoalescingSlot<M, Event>) -> ! {
        loop {
            let event = events.wait().await;
            self.apply(event);
        }
    }
}
