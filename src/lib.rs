//! rtcoord - Event-driven coordination for small real-time control programs
//!
//! Producers (debounced buttons, periodic timers) hand typed events to a
//! single state owner through one of two channel disciplines, and periodic
//! workers drive LEDs or a shared serial console.
//!
//! ## Programs
//! - **blink**: three LEDs on independent periods
//! - **toggle**: a button release flips an LED
//! - **mode-select**: hold duration selects stop / slow / fast blink
//! - **console-mutex**: two producers share the UART through an arbiter
//! - **console-queue**: button edges and periodic ticks queued to one consumer
//!
//! ## Architecture
//! - **Async**: Embassy tasks, every wait unbounded unless a `*_timeout`
//!   variant is used
//! - **Channels**: coalescing slot (latest wins) and bounded ordered queue
//!   (drop on full), both counted
//! - **Host testable**: hardware sits behind embedded-hal traits; RP2040
//!   bindings live behind the `rp2040` feature

#![cfg_attr(not(test), no_std)]

// Must stay first so the logging macros are visible to every module
mod fmt;

pub mod app;
pub mod buttons;
pub mod channels;
pub mod config;
pub mod console;
pub mod controller;
pub mod error;
pub mod leds;
pub mod supervisor;
pub mod time;
pub mod types;

#[cfg(feature = "rp2040")]
pub mod hardware;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
