//! Host-side fakes for the external collaborators
//!
//! A shared [`VirtualClock`] ties the fake delay and the scripted button
//! together: every sleep advances the clock, and the button level is a pure
//! function of the clock.

use std::cell::{Cell, RefCell};
use std::convert::Infallible;
use std::rc::Rc;
use std::string::String;
use std::vec::Vec;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin, PinState};
use embedded_hal_async::delay::DelayNs;

use crate::console::SerialPort;

#[derive(Clone, Default)]
pub struct VirtualClock {
    now: Rc<Cell<u64>>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> u64 {
        self.now.get()
    }

    pub fn advance(&self, ticks: u64) {
        self.now.set(self.now.get() + ticks);
    }

    pub fn delay(&self) -> ClockDelay {
        ClockDelay { clock: self.clone() }
    }
}

/// Delay provider that completes immediately after advancing the clock
pub struct ClockDelay {
    clock: VirtualClock,
}

impl DelayNs for ClockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.clock.advance(u64::from(ns) / 1_000_000);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.clock.advance(u64::from(ms));
    }
}

/// Delay provider that never advances any clock
pub struct InstantDelay;

impl DelayNs for InstantDelay {
    async fn delay_ns(&mut self, _ns: u32) {}
}

/// Button that reads "pressed" (high) inside any of its half-open windows
pub struct ScriptedInput {
    clock: VirtualClock,
    windows: Vec<(u64, u64)>,
    limit: u64,
}

impl ScriptedInput {
    pub fn new(clock: &VirtualClock, windows: &[(u64, u64)]) -> Self {
        Self {
            clock: clock.clone(),
            windows: windows.to_vec(),
            limit: 10_000_000,
        }
    }

    /// Button held from `start` for `ticks`.
    pub fn held(clock: &VirtualClock, start: u64, ticks: u64) -> Self {
        Self::new(clock, &[(start, start + ticks)])
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    fn pressed(&self) -> bool {
        let now = self.clock.now();
        assert!(now <= self.limit, "scripted input sampled past tick {}", self.limit);
        self.windows.iter().any(|&(start, end)| now >= start && now < end)
    }
}

impl ErrorType for ScriptedInput {
    type Error = Infallible;
}

impl InputPin for ScriptedInput {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.pressed())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.pressed())
    }
}

/// Output pin that records every level written to it
#[derive(Clone, Default)]
pub struct RecordingOutput {
    writes: Rc<RefCell<Vec<PinState>>>,
}

impl RecordingOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> Vec<PinState> {
        self.writes.borrow().clone()
    }

    pub fn last(&self) -> Option<PinState> {
        self.writes.borrow().last().copied()
    }
}

impl ErrorType for RecordingOutput {
    type Error = Infallible;
}

impl OutputPin for RecordingOutput {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.writes.borrow_mut().push(PinState::Low);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.writes.borrow_mut().push(PinState::High);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialBehavior {
    Ready,
    /// Every other attempt reports busy, starting with the first
    Alternating,
    AlwaysBusy,
    Broken,
}

/// Serial sink that records each accepted write as one line
#[derive(Clone)]
pub struct RecordingSerial {
    lines: Rc<RefCell<Vec<String>>>,
    attempts: Rc<Cell<u32>>,
    behavior: SerialBehavior,
}

impl RecordingSerial {
    pub fn new(behavior: SerialBehavior) -> Self {
        Self {
            lines: Rc::default(),
            attempts: Rc::default(),
            behavior,
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.get()
    }
}

impl SerialPort for RecordingSerial {
    type Error = ();

    fn try_write(&mut self, bytes: &[u8]) -> nb::Result<(), Self::Error> {
        let attempt = self.attempts.get();
        self.attempts.set(attempt + 1);
        match self.behavior {
            SerialBehavior::AlwaysBusy => return Err(nb::Error::WouldBlock),
            SerialBehavior::Alternating if attempt % 2 == 0 => {
                return Err(nb::Error::WouldBlock)
            }
            SerialBehavior::Broken => return Err(nb::Error::Other(())),
            _ => {}
        }
        self.lines
            .borrow_mut()
            .push(String::from_utf8_lossy(bytes).into_owned());
        Ok(())
    }
}
