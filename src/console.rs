//! Serial console output: arbitration, bursts and queued messages
//!
//! Two ways onto the console:
//!
//! - Several periodic producers share the port through an [`OutputArbiter`];
//!   each burst runs entirely under the arbiter so bursts never interleave.
//! - A single [`ConsoleConsumer`] drains an [`OrderedQueue`] of events and
//!   writes one formatted line per event.
//!
//! A busy device is retried according to a [`RetryPolicy`], yielding to the
//! executor between attempts.

use core::fmt::Write as _;

use embassy_futures::yield_now;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::{Mutex, MutexGuard};
use embedded_hal_async::delay::DelayNs;

use crate::channels::OrderedQueue;
use crate::config::{BurstSpec, MESSAGE_CAPACITY, PERIODIC_SEQUENCE_MODULUS};
use crate::error::{Error, Result};
use crate::time::{sleep, with_timeout, Ticks};
use crate::types::{ButtonId, Event};

/// Fixed-capacity console line
pub type Message = heapless::String<MESSAGE_CAPACITY>;

// ===================================================================
// Serial Port
// ===================================================================

/// Non-blocking serial transmitter
pub trait SerialPort {
    type Error;

    /// Transmit all of `bytes`, or nothing when the device is busy
    /// (`nb::Error::WouldBlock`).
    fn try_write(&mut self, bytes: &[u8]) -> nb::Result<(), Self::Error>;
}

/// How long a busy device is retried before giving up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RetryPolicy {
    #[default]
    Unbounded,
    Attempts(u32),
}

impl RetryPolicy {
    fn exhausted(&self, attempts: u32) -> bool {
        match self {
            RetryPolicy::Unbounded => false,
            RetryPolicy::Attempts(max) => attempts >= *max,
        }
    }
}

/// Write `bytes` once, retrying while the device is busy.
///
/// Returns the number of attempts it took.
pub async fn write_with_retry<P>(port: &mut P, bytes: &[u8], policy: RetryPolicy) -> Result<u32>
where
    P: SerialPort + ?Sized,
{
    let mut attempts = 0u32;
    loop {
        attempts = attempts.saturating_add(1);
        match port.try_write(bytes) {
            Ok(()) => return Ok(attempts),
            Err(nb::Error::WouldBlock) => {
                if policy.exhausted(attempts) {
                    return Err(Error::DeviceBusy { attempts });
                }
                yield_now().await;
            }
            Err(nb::Error::Other(_)) => {
                error!("Serial: device error after {} attempts", attempts);
                return Err(Error::Device);
            }
        }
    }
}

// ===================================================================
// Output Arbiter
// ===================================================================

/// Exclusive access to one serial device shared by several producers
///
/// The device is released when the guard returned by the `acquire` methods
/// is dropped.
pub struct OutputArbiter<M: RawMutex, P> {
    device: Mutex<M, P>,
}

impl<M: RawMutex, P: SerialPort> OutputArbiter<M, P> {
    pub const fn new(device: P) -> Self {
        Self {
            device: Mutex::new(device),
        }
    }

    /// Wait without bound for the device.
    pub async fn acquire(&self) -> MutexGuard<'_, M, P> {
        self.device.lock().await
    }

    /// Wait at most `ticks` for the device.
    pub async fn acquire_timeout<D: DelayNs>(
        &self,
        delay: &mut D,
        ticks: Ticks,
    ) -> Result<MutexGuard<'_, M, P>> {
        with_timeout(delay, ticks, self.device.lock()).await
    }

    pub fn try_acquire(&self) -> Option<MutexGuard<'_, M, P>> {
        self.device.try_lock().ok()
    }

    /// Write `spec.message` `spec.repeats` times under one acquisition,
    /// spinning `spec.load` after each write.
    pub async fn write_burst(&self, spec: &BurstSpec, policy: RetryPolicy) -> Result<()> {
        let mut device = self.acquire().await;
        for _ in 0..spec.repeats {
            write_with_retry(&mut *device, spec.message.as_bytes(), policy).await?;
            spec.load.spin();
        }
        Ok(())
    }
}

/// Periodic producer writing one burst per period
pub struct BurstWriter<'a, M: RawMutex, P, D> {
    arbiter: &'a OutputArbiter<M, P>,
    spec: BurstSpec,
    policy: RetryPolicy,
    delay: D,
    bursts: u32,
}

impl<'a, M, P, D> BurstWriter<'a, M, P, D>
where
    M: RawMutex,
    P: SerialPort,
    D: DelayNs,
{
    pub fn new(arbiter: &'a OutputArbiter<M, P>, spec: BurstSpec, delay: D) -> Self {
        Self {
            arbiter,
            spec,
            policy: RetryPolicy::Unbounded,
            delay,
            bursts: 0,
        }
    }

    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Completed bursts so far
    pub fn bursts(&self) -> u32 {
        self.bursts
    }

    pub async fn fire(&mut self) -> Result<()> {
        self.arbiter.write_burst(&self.spec, self.policy).await?;
        self.bursts = self.bursts.wrapping_add(1);
        Ok(())
    }

    pub async fn run(&mut self) -> ! {
        info!("Burst writer started ({} ticks)", self.spec.period);
        loop {
            if let Err(e) = self.fire().await {
                warn!("Burst writer: {}", e);
            }
            sleep(&mut self.delay, self.spec.period).await;
        }
    }
}

// ===================================================================
// Queued Messages
// ===================================================================

/// Turns console events into lines, numbering periodic ticks modulo 10
#[derive(Debug, Default)]
pub struct MessageFormatter {
    sequence: u8,
}

impl MessageFormatter {
    pub const fn new() -> Self {
        Self { sequence: 0 }
    }

    /// Sequence number the next periodic line will carry
    pub fn next_sequence(&self) -> u8 {
        self.sequence
    }

    /// `Ok(None)` for events that have no console line.
    pub fn format(&mut self, event: Event) -> Result<Option<Message>> {
        let mut line = Message::new();
        let written = match event {
            Event::Press(ButtonId(n)) => writeln!(line, "Button {} pressed", n),
            Event::Release(ButtonId(n)) => writeln!(line, "Button {} released", n),
            Event::PeriodicTick => {
                let sequence = self.sequence;
                self.sequence = (sequence + 1) % PERIODIC_SEQUENCE_MODULUS;
                writeln!(line, "periodic {}", sequence)
            }
            _ => return Ok(None),
        };
        written.map_err(|_| Error::MessageTooLong)?;
        Ok(Some(line))
    }
}

/// Single consumer of the console event queue
pub struct ConsoleConsumer<'a, M: RawMutex, P, const N: usize> {
    queue: &'a OrderedQueue<M, Event, N>,
    port: P,
    formatter: MessageFormatter,
    policy: RetryPolicy,
}

impl<'a, M, P, const N: usize> ConsoleConsumer<'a, M, P, N>
where
    M: RawMutex,
    P: SerialPort,
{
    pub fn new(queue: &'a OrderedQueue<M, Event, N>, port: P) -> Self {
        Self {
            queue,
            port,
            formatter: MessageFormatter::new(),
            policy: RetryPolicy::Unbounded,
        }
    }

    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Receive one event and write its line. Returns the line written.
    pub async fn step(&mut self) -> Result<Option<Message>> {
        let event = self.queue.receive().await;
        let Some(line) = self.formatter.format(event)? else {
            trace!("Console: no line for {:?}", event);
            return Ok(None);
        };
        write_with_retry(&mut self.port, line.as_bytes(), self.policy).await?;
        Ok(Some(line))
    }

    pub async fn run(&mut self) -> ! {
        info!("Console consumer started ({} slots)", N);
        loop {
            if let Err(e) = self.step().await {
                warn!("Console: {}", e);
            }
        }
    }
}

/// Periodic producer feeding ticks into the console queue
pub struct PeriodicNotifier<'a, M: RawMutex, D, const N: usize> {
    queue: &'a OrderedQueue<M, Event, N>,
    delay: D,
    period: Ticks,
}

impl<'a, M, D, const N: usize> PeriodicNotifier<'a, M, D, N>
where
    M: RawMutex,
    D: DelayNs,
{
    pub fn new(queue: &'a OrderedQueue<M, Event, N>, delay: D, period: Ticks) -> Self {
        Self { queue, delay, period }
    }

    /// Send one tick, then wait one period.
    pub async fn tick(&mut self) {
        self.queue.send(Event::PeriodicTick);
        sleep(&mut self.delay, self.period).await;
    }

    pub async fn run(&mut self) -> ! {
        loop {
            self.tick().await;
        }
    }
}
