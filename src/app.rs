//! Per-program contexts
//!
//! Each control program owns one context holding its channels and shared
//! resources. The firmware places it in a `StaticCell` and hands every task a
//! `&'static` reference; tests build it on the stack.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal_async::delay::DelayNs;

use crate::buttons::{ButtonEdge, Debouncer, BLINK_MODE_CLASSIFIER};
use crate::channels::{CoalescingSlot, OrderedQueue};
use crate::config::{BurstSpec, FAST_BLINK, PERIODIC_NOTIFY_TICKS, SLOW_BLINK};
use crate::console::{BurstWriter, ConsoleConsumer, OutputArbiter, PeriodicNotifier, SerialPort};
use crate::controller::{ModeController, ToggleController, FAST_WORKER, SLOW_WORKER};
use crate::leds::{BlinkWorker, GateHandle, SharedOutput, WorkerGate};
use crate::supervisor::ChannelStats;
use crate::time::Ticks;
use crate::types::{ButtonId, Event};

// ===================================================================
// Toggle
// ===================================================================

/// Button release toggles one LED
pub struct ToggleContext<M: RawMutex> {
    pub events: CoalescingSlot<M, Event>,
}

impl<M: RawMutex> ToggleContext<M> {
    pub const fn new() -> Self {
        Self {
            events: CoalescingSlot::new(),
        }
    }

    pub fn controller<O: OutputPin>(&self, led: O) -> ToggleController<O> {
        ToggleController::new(led)
    }

    /// One press cycle; a confirmed release sends `Toggle`.
    pub async fn button_session<I, D>(&self, button: &mut Debouncer<I, D>) -> Option<Event>
    where
        I: InputPin,
        D: DelayNs,
    {
        button.next_session(|_| {}).await?;
        self.events.send(Event::Toggle);
        Some(Event::Toggle)
    }

    pub async fn run_button<I, D>(&self, mut button: Debouncer<I, D>) -> !
    where
        I: InputPin,
        D: DelayNs,
    {
        loop {
            self.button_session(&mut button).await;
        }
    }

    pub fn stats(&self) -> ChannelStats {
        ChannelStats {
            dropped: 0,
            overwritten: self.events.overwritten(),
        }
    }
}

impl<M: RawMutex> Default for ToggleContext<M> {
    fn default() -> Self {
        Self::new()
    }
}

// ===================================================================
// Mode Select
// ===================================================================

/// Hold duration selects stop, slow blink or fast blink on one LED
pub struct ModeSelectContext<M: RawMutex, O> {
    pub events: CoalescingSlot<M, Event>,
    pub workers: WorkerGate<M, 2>,
    pub led: SharedOutput<M, O>,
}

impl<M: RawMutex, O: OutputPin> ModeSelectContext<M, O> {
    pub const fn new(led: O) -> Self {
        Self {
            events: CoalescingSlot::new(),
            workers: WorkerGate::new(),
            led: SharedOutput::new(led),
        }
    }

    pub fn controller(&self) -> ModeController<'_, WorkerGate<M, 2>, &SharedOutput<M, O>> {
        ModeController::new(&self.workers, &self.led)
    }

    pub fn fast_worker<D: DelayNs>(
        &self,
        delay: D,
    ) -> BlinkWorker<GateHandle<'_, M, 2>, &SharedOutput<M, O>, D> {
        BlinkWorker::from_spec(&FAST_BLINK, self.workers.handle(FAST_WORKER), &self.led, delay)
    }

    pub fn slow_worker<D: DelayNs>(
        &self,
        delay: D,
    ) -> BlinkWorker<GateHandle<'_, M, 2>, &SharedOutput<M, O>, D> {
        BlinkWorker::from_spec(&SLOW_BLINK, self.workers.handle(SLOW_WORKER), &self.led, delay)
    }

    /// One press cycle; the held duration is classified and sent on release.
    pub async fn button_session<I, D>(&self, button: &mut Debouncer<I, D>) -> Option<Event>
    where
        I: InputPin,
        D: DelayNs,
    {
        let held = button.next_session(|_| {}).await?;
        let event = BLINK_MODE_CLASSIFIER.classify(held);
        debug!("Mode select: held {} ticks -> {:?}", held, event);
        self.events.send(event);
        Some(event)
    }

    pub async fn run_button<I, D>(&self, mut button: Debouncer<I, D>) -> !
    where
        I: InputPin,
        D: DelayNs,
    {
        loop {
            self.button_session(&mut button).await;
        }
    }

    pub fn stats(&self) -> ChannelStats {
        ChannelStats {
            dropped: 0,
            overwritten: self.events.overwritten(),
        }
    }
}

// ===================================================================
// Console Queue
// ===================================================================

/// Button edges and periodic ticks queued to a single console consumer
pub struct ConsoleQueueContext<M: RawMutex, const N: usize> {
    pub queue: OrderedQueue<M, Event, N>,
}

impl<M: RawMutex, const N: usize> ConsoleQueueContext<M, N> {
    pub const fn new() -> Self {
        Self {
            queue: OrderedQueue::new(),
        }
    }

    pub fn consumer<P: SerialPort>(&self, port: P) -> ConsoleConsumer<'_, M, P, N> {
        ConsoleConsumer::new(&self.queue, port)
    }

    pub fn notifier<D: DelayNs>(&self, delay: D) -> PeriodicNotifier<'_, M, D, N> {
        PeriodicNotifier::new(&self.queue, delay, PERIODIC_NOTIFY_TICKS)
    }

    /// One press cycle of button `id`; both edges are queued.
    pub async fn button_session<I, D>(
        &self,
        id: ButtonId,
        button: &mut Debouncer<I, D>,
    ) -> Option<Ticks>
    where
        I: InputPin,
        D: DelayNs,
    {
        button
            .next_session(|edge| match edge {
                ButtonEdge::Pressed => self.queue.send(Event::Press(id)),
                ButtonEdge::Released { .. } => self.queue.send(Event::Release(id)),
            })
            .await
    }

    pub async fn run_button<I, D>(&self, id: ButtonId, mut button: Debouncer<I, D>) -> !
    where
        I: InputPin,
        D: DelayNs,
    {
        loop {
            self.button_session(id, &mut button).await;
        }
    }

    pub fn stats(&self) -> ChannelStats {
        ChannelStats {
            dropped: self.queue.dropped(),
            overwritten: 0,
        }
    }
}

impl<M: RawMutex, const N: usize> Default for ConsoleQueueContext<M, N> {
    fn default() -> Self {
        Self::new()
    }
}

// ===================================================================
// Console Mutex
// ===================================================================

/// Two burst producers sharing one serial device
pub struct ConsoleMutexContext<M: RawMutex, P> {
    pub arbiter: OutputArbiter<M, P>,
}

impl<M: RawMutex, P: SerialPort> ConsoleMutexContext<M, P> {
    pub const fn new(port: P) -> Self {
        Self {
            arbiter: OutputArbiter::new(port),
        }
    }

    pub fn writer<D: DelayNs>(&self, spec: BurstSpec, delay: D) -> BurstWriter<'_, M, P, D> {
        BurstWriter::new(&self.arbiter, spec, delay)
    }
}
