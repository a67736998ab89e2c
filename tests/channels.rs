//! Channels and arbiter shared as `static`s between OS threads

use std::sync::Mutex;
use std::thread;

use embassy_futures::block_on;
use embassy_futures::join::join;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use rtcoord::channels::{CoalescingSlot, OrderedQueue};
use rtcoord::config::{BURST_FAST, EVENT_QUEUE_CAPACITY};
use rtcoord::console::{OutputArbiter, RetryPolicy, SerialPort};
use rtcoord::types::{ButtonId, Event};

static QUEUE: OrderedQueue<CriticalSectionRawMutex, Event, EVENT_QUEUE_CAPACITY> = OrderedQueue::new();
static SLOT: CoalescingSlot<CriticalSectionRawMutex, Event> = CoalescingSlot::new();

#[test]
fn test_queue_keeps_per_producer_order() {
    let producers: Vec<_> = (1..=2u8)
        .map(|id| {
            thread::spawn(move || {
                for _ in 0..5 {
                    QUEUE.send(Event::Press(ButtonId(id)));
                    QUEUE.send(Event::Release(ButtonId(id)));
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().unwrap();
    }

    let mut received = Vec::new();
    while let Some(event) = QUEUE.try_receive() {
        received.push(event);
    }

    assert_eq!(received.len(), 20);
    assert_eq!(QUEUE.dropped(), 0);
    for id in 1..=2u8 {
        let own: Vec<_> = received
            .iter()
            .filter(|e| matches!(e, Event::Press(b) | Event::Release(b) if b.0 == id))
            .collect();
        for pair in own.chunks(2) {
            assert_eq!(*pair[0], Event::Press(ButtonId(id)));
            assert_eq!(*pair[1], Event::Release(ButtonId(id)));
        }
    }
}

#[test]
fn test_slot_delivers_value_sent_from_another_thread() {
    thread::spawn(|| SLOT.send(Event::FastBlink)).join().unwrap();
    assert_eq!(block_on(SLOT.wait()), Event::FastBlink);
    assert!(!SLOT.is_pending());
}

/// Accepts every write, reporting busy before each one
struct SlowPort {
    lines: &'static Mutex<Vec<String>>,
    ready: bool,
}

impl SerialPort for SlowPort {
    type Error = ();

    fn try_write(&mut self, bytes: &[u8]) -> nb::Result<(), Self::Error> {
        if !self.ready {
            self.ready = true;
            return Err(nb::Error::WouldBlock);
        }
        self.ready = false;
        self.lines
            .lock()
            .unwrap()
            .push(String::from_utf8_lossy(bytes).into_owned());
        Ok(())
    }
}

#[test]
fn test_arbiter_serializes_bursts() {
    static LINES: Mutex<Vec<String>> = Mutex::new(Vec::new());
    let arbiter: OutputArbiter<CriticalSectionRawMutex, _> = OutputArbiter::new(SlowPort {
        lines: &LINES,
        ready: false,
    });
    let other = rtcoord::config::BurstSpec {
        message: "task 2 hi\n",
        ..BURST_FAST
    };

    let (a, b) = block_on(join(
        arbiter.write_burst(&BURST_FAST, RetryPolicy::Unbounded),
        arbiter.write_burst(&other, RetryPolicy::Unbounded),
    ));
    assert_eq!((a, b), (Ok(()), Ok(())));

    let lines = LINES.lock().unwrap();
    assert_eq!(lines.len(), 20);
    assert!(lines[..10].iter().all(|l| l == "task 1 hello\n"));
    assert!(lines[10..].iter().all(|l| l == "task 2 hi\n"));
}
