//! Common types and data structures used across the rtcoord programs
//!
//! Events are small `Copy` values; channels hold them by value, never by
//! reference.

use crate::config::{FAST_BLINK_TICKS, SLOW_BLINK_TICKS};
use crate::time::Ticks;

/// Logical button number as printed on the console (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonId(pub u8);

/// Events delivered from producers to a state owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Confirmed press of a button
    Press(ButtonId),
    /// Confirmed release of a button
    Release(ButtonId),
    /// Flip the LED
    Toggle,
    /// Stop blinking and force the LED off
    Stop,
    /// Blink with the 400-tick half-period
    SlowBlink,
    /// Blink with the 100-tick half-period
    FastBlink,
    /// Emitted by a periodic producer
    PeriodicTick,
}

impl Event {
    /// Bit used for this event's class in a `NotificationBits` set
    pub const fn class_bit(&self) -> u32 {
        match self {
            Event::Press(_) => 1 << 0,
            Event::Release(_) => 1 << 1,
            Event::Toggle => 1 << 2,
            Event::Stop => 1 << 3,
            Event::SlowBlink => 1 << 4,
            Event::FastBlink => 1 << 5,
            Event::PeriodicTick => 1 << 6,
        }
    }
}

/// Active output mode of the mode-select program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BlinkMode {
    #[default]
    Stopped,
    Fast,
    Slow,
}

impl BlinkMode {
    /// LED half-period for this mode, `None` while stopped
    pub const fn half_period(&self) -> Option<Ticks> {
        match self {
            BlinkMode::Stopped => None,
            BlinkMode::Fast => Some(FAST_BLINK_TICKS),
            BlinkMode::Slow => Some(SLOW_BLINK_TICKS),
        }
    }
}

/// LED state of the toggle program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedState {
    On,
    #[default]
    Off,
}

impl LedState {
    pub const fn flipped(self) -> Self {
        match self {
            LedState::On => LedState::Off,
            LedState::Off => LedState::On,
        }
    }
}

/// Application version information
pub struct AppVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl AppVersion {
    pub const fn new(major: u8, minor: u8, patch: u8) -> Self {
        Self { major, minor, patch }
    }

    pub fn as_string(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

/// Current application version
pub const APP_VERSION: AppVersion = AppVersion::new(0, 1, 0);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_bits_are_distinct() {
        let events = [
            Event::Press(ButtonId(1)),
            Event::Release(ButtonId(1)),
            Event::Toggle,
            Event::Stop,
            Event::SlowBlink,
            Event::FastBlink,
            Event::PeriodicTick,
        ];
        let mut seen = 0u32;
        for event in events {
            assert_eq!(seen & event.class_bit(), 0);
            seen |= event.class_bit();
        }
        assert_eq!(Event::Press(ButtonId(1)).class_bit(), Event::Press(ButtonId(2)).class_bit());
    }

    #[test]
    fn test_led_state_flip() {
        assert_eq!(LedState::default(), LedState::Off);
        assert_eq!(LedState::Off.flipped(), LedState::On);
        assert_eq!(LedState::On.flipped().flipped(), LedState::On);
    }

    #[test]
    fn test_blink_mode_periods() {
        assert_eq!(BlinkMode::default().half_period(), None);
        assert_eq!(BlinkMode::Fast.half_period(), Some(100));
        assert_eq!(BlinkMode::Slow.half_period(), Some(400));
    }
}
