//! Inter-task event channels
//!
//! Two delivery disciplines feed a single consumer:
//!
//! - [`CoalescingSlot`]: latest value wins. A send never blocks and replaces
//!   whatever is still pending, so the consumer may see fewer values than were
//!   sent. Suited to "current desired mode" signals.
//! - [`OrderedQueue`]: bounded FIFO. A send never blocks; when the queue is
//!   full the value is dropped and counted. Accepted values are delivered once,
//!   in order.
//!
//! [`NotificationBits`] is the multi-class variant of the slot: each class is
//! one bit, so pending classes coexist while repeats of a class coalesce.
//!
//! All three synchronize internally and need no external locking.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::channel::{Channel, TrySendError};
use embassy_sync::signal::Signal;
use embedded_hal_async::delay::DelayNs;
use portable_atomic::{AtomicU32, Ordering};

use crate::error::Result;
use crate::time::{with_timeout, Ticks};

// ===================================================================
// Coalescing Slot
// ===================================================================

/// Single-value mailbox where a new send overwrites a pending unread value
pub struct CoalescingSlot<M: RawMutex, T> {
    signal: Signal<M, T>,
    overwritten: AtomicU32,
}

impl<M: RawMutex, T> CoalescingSlot<M, T> {
    pub const fn new() -> Self {
        Self {
            signal: Signal::new(),
            overwritten: AtomicU32::new(0),
        }
    }

    /// Publish `value`, replacing any value the consumer has not taken yet.
    pub fn send(&self, value: T) {
        if self.signal.signaled() {
            self.overwritten.fetch_add(1, Ordering::Relaxed);
            trace!("Slot: pending value overwritten");
        }
        self.signal.signal(value);
    }

    /// Wait without bound for a value, then take it.
    pub async fn wait(&self) -> T {
        self.signal.wait().await
    }

    /// Wait at most `ticks` for a value.
    pub async fn wait_timeout<D: DelayNs>(&self, delay: &mut D, ticks: Ticks) -> Result<T> {
        with_timeout(delay, ticks, self.signal.wait()).await
    }

    pub fn try_take(&self) -> Option<T> {
        self.signal.try_take()
    }

    pub fn is_pending(&self) -> bool {
        self.signal.signaled()
    }

    /// Number of values replaced before the consumer saw them
    pub fn overwritten(&self) -> u32 {
        self.overwritten.load(Ordering::Relaxed)
    }
}

impl<M: RawMutex, T> Default for CoalescingSlot<M, T> {
    fn default() -> Self {
        Self::new()
    }
}

// ===================================================================
// Notification Bits
// ===================================================================

/// Set of pending event classes, cleared as a whole by the consumer
pub struct NotificationBits<M: RawMutex> {
    pending: BlockingMutex<M, Cell<u32>>,
    wake: Signal<M, ()>,
}

impl<M: RawMutex> NotificationBits<M> {
    pub const fn new() -> Self {
        Self {
            pending: BlockingMutex::new(Cell::new(0)),
            wake: Signal::new(),
        }
    }

    /// Mark every class in `mask` as pending.
    pub fn raise(&self, mask: u32) {
        if mask == 0 {
            return;
        }
        self.pending.lock(|bits| bits.set(bits.get() | mask));
        self.wake.signal(());
    }

    /// Take and clear the pending set, `None` when nothing is pending.
    pub fn try_take(&self) -> Option<u32> {
        let bits = self.pending.lock(|bits| bits.replace(0));
        if bits == 0 {
            None
        } else {
            self.wake.reset();
            Some(bits)
        }
    }

    /// Wait without bound until at least one class is pending.
    pub async fn wait(&self) -> u32 {
        loop {
            if let Some(bits) = self.try_take() {
                return bits;
            }
            self.wake.wait().await;
        }
    }

    pub async fn wait_timeout<D: DelayNs>(&self, delay: &mut D, ticks: Ticks) -> Result<u32> {
        with_timeout(delay, ticks, self.wait()).await
    }
}

impl<M: RawMutex> Default for NotificationBits<M> {
    fn default() -> Self {
        Self::new()
    }
}

// ===================================================================
// Ordered Queue
// ===================================================================

/// Bounded FIFO with non-blocking, drop-on-full sends
pub struct OrderedQueue<M: RawMutex, T, const N: usize> {
    channel: Channel<M, T, N>,
    dropped: AtomicU32,
}

impl<M: RawMutex, T, const N: usize> OrderedQueue<M, T, N> {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
            dropped: AtomicU32::new(0),
        }
    }

    /// Enqueue `value` with zero wait. A full queue drops it.
    pub fn send(&self, value: T) {
        if let Err(TrySendError::Full(_)) = self.channel.try_send(value) {
            let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            warn!("Queue full ({} entries), event dropped ({} total)", N, total);
        }
    }

    /// Wait without bound for the oldest entry.
    pub async fn receive(&self) -> T {
        self.channel.receive().await
    }

    /// Wait at most `ticks` for the oldest entry.
    pub async fn receive_timeout<D: DelayNs>(&self, delay: &mut D, ticks: Ticks) -> Result<T> {
        with_timeout(delay, ticks, self.channel.receive()).await
    }

    pub fn try_receive(&self) -> Option<T> {
        self.channel.try_receive().ok()
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of sends discarded because the queue was full
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl<M: RawMutex, T, const N: usize> Default for OrderedQueue<M, T, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::testing::InstantDelay;
    use crate::types::{ButtonId, Event};
    use embassy_futures::block_on;
    use embassy_futures::join::join;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    #[test]
    fn test_slot_latest_value_wins() {
        let slot: CoalescingSlot<NoopRawMutex, Event> = CoalescingSlot::new();
        slot.send(Event::SlowBlink);
        slot.send(Event::FastBlink);

        assert_eq!(block_on(slot.wait()), Event::FastBlink);
        assert_eq!(slot.try_take(), None);
        assert_eq!(slot.overwritten(), 1);
    }

    #[test]
    fn test_slot_wait_clears_pending_value() {
        let slot: CoalescingSlot<NoopRawMutex, Event> = CoalescingSlot::new();
        slot.send(Event::Toggle);
        assert!(slot.is_pending());
        assert_eq!(block_on(slot.wait()), Event::Toggle);
        assert!(!slot.is_pending());
        slot.send(Event::Toggle);
        assert_eq!(slot.overwritten(), 0);
    }

    #[test]
    fn test_slot_consumer_wakes_on_send() {
        let slot: CoalescingSlot<NoopRawMutex, Event> = CoalescingSlot::new();
        let (received, ()) = block_on(join(slot.wait(), async {
            embassy_futures::yield_now().await;
            slot.send(Event::Stop);
        }));
        assert_eq!(received, Event::Stop);
    }

    #[test]
    fn test_slot_wait_timeout() {
        let slot: CoalescingSlot<NoopRawMutex, Event> = CoalescingSlot::new();
        let mut delay = InstantDelay;
        assert_eq!(block_on(slot.wait_timeout(&mut delay, 10)), Err(Error::Timeout));

        slot.send(Event::Stop);
        assert_eq!(block_on(slot.wait_timeout(&mut delay, 10)), Ok(Event::Stop));
    }

    #[test]
    fn test_notification_bits_coexist_and_coalesce() {
        let bits: NotificationBits<NoopRawMutex> = NotificationBits::new();
        bits.raise(Event::Stop.class_bit());
        bits.raise(Event::PeriodicTick.class_bit());
        bits.raise(Event::Stop.class_bit());

        let pending = block_on(bits.wait());
        assert_eq!(pending, Event::Stop.class_bit() | Event::PeriodicTick.class_bit());
        assert_eq!(bits.try_take(), None);
    }

    #[test]
    fn test_notification_bits_ignore_empty_mask() {
        let bits: NotificationBits<NoopRawMutex> = NotificationBits::new();
        bits.raise(0);
        let mut delay = InstantDelay;
        assert_eq!(block_on(bits.wait_timeout(&mut delay, 5)), Err(Error::Timeout));
    }

    #[test]
    fn test_queue_overflow_drops_newest() {
        const K: usize = 4;
        let queue: OrderedQueue<NoopRawMutex, Event, K> = OrderedQueue::new();
        for n in 1..=K as u8 + 1 {
            queue.send(Event::Press(ButtonId(n)));
        }

        assert_eq!(queue.len(), K);
        assert_eq!(queue.dropped(), 1);
        for n in 1..=K as u8 {
            assert_eq!(queue.try_receive(), Some(Event::Press(ButtonId(n))));
        }
        assert_eq!(queue.try_receive(), None);
    }

    #[test]
    fn test_queue_preserves_order_across_wraparound() {
        let queue: OrderedQueue<NoopRawMutex, u32, 3> = OrderedQueue::new();
        let mut next = 0;
        for _ in 0..5 {
            queue.send(next);
            queue.send(next + 1);
            assert_eq!(block_on(queue.receive()), next);
            assert_eq!(block_on(queue.receive()), next + 1);
            next += 2;
        }
        assert!(queue.is_empty());
        assert_eq!(queue.dropped(), 0);
        assert_eq!(queue.capacity(), 3);
    }

    #[test]
    fn test_queue_receive_timeout() {
        let queue: OrderedQueue<NoopRawMutex, u32, 2> = OrderedQueue::new();
        let mut delay = InstantDelay;
        assert_eq!(block_on(queue.receive_timeout(&mut delay, 1)), Err(Error::Timeout));
        queue.send(9);
        assert_eq!(block_on(queue.receive_timeout(&mut delay, 1)), Ok(9));
    }
}
