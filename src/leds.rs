//! LED blink workers and their activation gate
//!
//! A [`BlinkWorker`] toggles one output on a fixed half-period. Workers that
//! are selected by a state owner park on a [`WorkerGate`] while suspended;
//! free-running workers use [`AlwaysActive`].

use core::cell::{Cell, RefCell};

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::signal::Signal;
use embedded_hal::digital::{ErrorType, OutputPin, PinState};
use embedded_hal_async::delay::DelayNs;

use crate::config::BlinkSpec;
use crate::time::{sleep, Ticks};

// ===================================================================
// Shared Output
// ===================================================================

/// Output pin driven by several tasks
///
/// `&SharedOutput` implements [`OutputPin`], so each task holds a plain
/// reference and writes through the inner blocking mutex.
pub struct SharedOutput<M: RawMutex, O> {
    pin: BlockingMutex<M, RefCell<O>>,
}

impl<M: RawMutex, O: OutputPin> SharedOutput<M, O> {
    pub const fn new(pin: O) -> Self {
        Self {
            pin: BlockingMutex::new(RefCell::new(pin)),
        }
    }

    pub fn set(&self, level: PinState) -> Result<(), O::Error> {
        self.pin.lock(|pin| pin.borrow_mut().set_state(level))
    }
}

impl<M: RawMutex, O: OutputPin> ErrorType for &SharedOutput<M, O> {
    type Error = O::Error;
}

impl<M: RawMutex, O: OutputPin> OutputPin for &SharedOutput<M, O> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set(PinState::Low)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set(PinState::High)
    }
}

// ===================================================================
// Worker Activation
// ===================================================================

/// Index of a worker registered with a [`WorkerGate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WorkerId(pub u8);

/// Suspend / resume control over periodic workers
pub trait WorkerControl {
    fn suspend(&self, worker: WorkerId);
    fn resume(&self, worker: WorkerId);
}

/// Run permission as seen from inside a worker
#[allow(async_fn_in_trait)]
pub trait Activation {
    fn is_active(&self) -> bool;

    /// Return once the worker may run.
    async fn wait_active(&self);
}

/// Activation for workers that are never suspended
pub struct AlwaysActive;

impl Activation for AlwaysActive {
    fn is_active(&self) -> bool {
        true
    }

    async fn wait_active(&self) {}
}

/// Per-worker run flags with a wake signal for each parked worker
pub struct WorkerGate<M: RawMutex, const N: usize> {
    active: BlockingMutex<M, Cell<u32>>,
    wake: [Signal<M, ()>; N],
}

impl<M: RawMutex, const N: usize> WorkerGate<M, N> {
    /// All workers start suspended.
    pub const fn new() -> Self {
        assert!(N <= 32, "WorkerGate supports at most 32 workers");
        Self {
            active: BlockingMutex::new(Cell::new(0)),
            wake: [const { Signal::new() }; N],
        }
    }

    fn mask(worker: WorkerId) -> Option<u32> {
        let index = usize::from(worker.0);
        if index < N {
            Some(1 << index)
        } else {
            warn!("Worker {} not registered with gate of {}", worker.0, N);
            None
        }
    }

    pub fn is_active(&self, worker: WorkerId) -> bool {
        match Self::mask(worker) {
            Some(mask) => self.active.lock(|active| active.get() & mask != 0),
            None => false,
        }
    }

    /// Number of workers currently allowed to run
    pub fn active_count(&self) -> u32 {
        self.active.lock(|active| active.get().count_ones())
    }

    pub async fn wait_active(&self, worker: WorkerId) {
        let index = usize::from(worker.0);
        while !self.is_active(worker) {
            match self.wake.get(index) {
                Some(wake) => wake.wait().await,
                None => core::future::pending::<()>().await,
            }
        }
    }

    pub fn handle(&self, worker: WorkerId) -> GateHandle<'_, M, N> {
        GateHandle { gate: self, worker }
    }
}

impl<M: RawMutex, const N: usize> Default for WorkerGate<M, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex, const N: usize> WorkerControl for WorkerGate<M, N> {
    fn suspend(&self, worker: WorkerId) {
        if let Some(mask) = Self::mask(worker) {
            self.active.lock(|active| active.set(active.get() & !mask));
        }
    }

    fn resume(&self, worker: WorkerId) {
        if let Some(mask) = Self::mask(worker) {
            self.active.lock(|active| active.set(active.get() | mask));
            self.wake[usize::from(worker.0)].signal(());
        }
    }
}

/// One worker's view of a [`WorkerGate`]
pub struct GateHandle<'a, M: RawMutex, const N: usize> {
    gate: &'a WorkerGate<M, N>,
    worker: WorkerId,
}

impl<M: RawMutex, const N: usize> Activation for GateHandle<'_, M, N> {
    fn is_active(&self) -> bool {
        self.gate.is_active(self.worker)
    }

    async fn wait_active(&self) {
        self.gate.wait_active(self.worker).await
    }
}

// ===================================================================
// Blink Worker
// ===================================================================

pub struct BlinkWorker<A, O, D> {
    name: &'static str,
    activation: A,
    led: O,
    delay: D,
    half_period: Ticks,
}

impl<A, O, D> BlinkWorker<A, O, D>
where
    A: Activation,
    O: OutputPin,
    D: DelayNs,
{
    pub fn new(name: &'static str, activation: A, led: O, delay: D, half_period: Ticks) -> Self {
        Self {
            name,
            activation,
            led,
            delay,
            half_period,
        }
    }

    pub fn from_spec(spec: &BlinkSpec, activation: A, led: O, delay: D) -> Self {
        Self::new(spec.name, activation, led, delay, spec.half_period)
    }

    pub fn half_period(&self) -> Ticks {
        self.half_period
    }

    /// One on/off cycle. A worker suspended while lit leaves the output to
    /// whoever suspended it.
    pub async fn cycle(&mut self) {
        if !self.activation.is_active() {
            debug!("{} parked", self.name);
            self.activation.wait_active().await;
            debug!("{} resumed", self.name);
        }

        let _ = self.led.set_high();
        sleep(&mut self.delay, self.half_period).await;

        if !self.activation.is_active() {
            return;
        }

        let _ = self.led.set_low();
        sleep(&mut self.delay, self.half_period).await;
    }

    pub async fn run(&mut self) -> ! {
        info!("{} started ({} ticks)", self.name, self.half_period);
        loop {
            self.cycle().await;
        }
    }
}
