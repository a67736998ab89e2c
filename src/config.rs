//! Configuration for the rtcoord control programs
//! One tick is one millisecond on the RP2040 firmware

use embedded_hal::digital::PinState;

use crate::time::{CpuLoad, Ticks};

// ===================================================================
// GPIO Pin Assignments - Raspberry Pi Pico
// ===================================================================

pub const BUTTON_1_PIN: u8 = 14; // Pull-down, pressed = high
pub const BUTTON_2_PIN: u8 = 15; // Pull-down, pressed = high
pub const LED_1_PIN: u8 = 25; // Built-in LED on Pico
pub const LED_2_PIN: u8 = 16;
pub const LED_3_PIN: u8 = 17;
pub const UART_TX_PIN: u8 = 0; // UART0 TX
pub const UART_BAUDRATE: u32 = 115_200;

// ===================================================================
// Button Sampling
// ===================================================================

pub const BUTTON_POLL_TICKS: Ticks = 5; // Idle and held re-poll cadence
pub const BUTTON_DEBOUNCE_TICKS: Ticks = 50;
pub const BUTTON_DEBOUNCE_TICKS_TOGGLE: Ticks = 100;

// Hold duration classes, half-open and ascending
pub const HOLD_SLOW_BLINK_TICKS: Ticks = 2_000; // below: stop
pub const HOLD_FAST_BLINK_TICKS: Ticks = 4_000; // below: slow blink, at or above: fast blink

// ===================================================================
// LED Timing
// ===================================================================

pub const FAST_BLINK_TICKS: Ticks = 100;
pub const SLOW_BLINK_TICKS: Ticks = 400;

// Free-running blink program half-periods
pub const BLINK_LED_1_TICKS: Ticks = 100;
pub const BLINK_LED_2_TICKS: Ticks = 500;
pub const BLINK_LED_3_TICKS: Ticks = 1_000;

// ===================================================================
// Console
// ===================================================================

pub const EVENT_QUEUE_CAPACITY: usize = 20;
pub const MESSAGE_CAPACITY: usize = 20; // Longest message is "Button N released\n"
pub const PERIODIC_NOTIFY_TICKS: Ticks = 100;
pub const PERIODIC_SEQUENCE_MODULUS: u8 = 10;

pub const BURST_REPEATS: u16 = 10;
pub const HEAVY_LOAD_ITERATIONS: u32 = 10_000;

// ===================================================================
// Supervision
// ===================================================================

pub const HEARTBEAT_TICKS: Ticks = 10_000;
pub const STATUS_REPORT_TICKS: u64 = 60_000;

/// Debounce sampler tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerConfig {
    /// Re-poll cadence while idle and while held
    pub poll_interval: Ticks,
    /// Settle time between first sighting and confirmation
    pub debounce_delay: Ticks,
    /// Level read from the pin while the button is pressed
    pub pressed_level: PinState,
    /// Emit a press edge as soon as the press is confirmed
    pub report_press: bool,
}

impl SamplerConfig {
    pub const fn new(debounce_delay: Ticks, report_press: bool) -> Self {
        Self {
            poll_interval: BUTTON_POLL_TICKS,
            debounce_delay,
            pressed_level: PinState::High,
            report_press,
        }
    }

    /// Release-only sampling with the long settle time
    pub const TOGGLE: SamplerConfig = SamplerConfig::new(BUTTON_DEBOUNCE_TICKS_TOGGLE, false);

    /// Release-only sampling, hold duration classified on release
    pub const MODE_SELECT: SamplerConfig = SamplerConfig::new(BUTTON_DEBOUNCE_TICKS, false);

    /// Press and release both reported
    pub const EDGES: SamplerConfig = SamplerConfig::new(BUTTON_DEBOUNCE_TICKS, true);

    pub const fn with_pressed_level(mut self, level: PinState) -> Self {
        self.pressed_level = level;
        self
    }
}

/// Blink worker settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlinkSpec {
    pub name: &'static str,
    pub half_period: Ticks,
}

/// Free-running LEDs of the blink program, in pin order
pub const BLINK_LEDS: [BlinkSpec; 3] = [
    BlinkSpec { name: "led1", half_period: BLINK_LED_1_TICKS },
    BlinkSpec { name: "led2", half_period: BLINK_LED_2_TICKS },
    BlinkSpec { name: "led3", half_period: BLINK_LED_3_TICKS },
];

pub const FAST_BLINK: BlinkSpec = BlinkSpec { name: "fast", half_period: FAST_BLINK_TICKS };
pub const SLOW_BLINK: BlinkSpec = BlinkSpec { name: "slow", half_period: SLOW_BLINK_TICKS };

/// Periodic burst producer settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurstSpec {
    pub message: &'static str,
    pub repeats: u16,
    pub period: Ticks,
    pub load: CpuLoad,
}

pub const BURST_FAST: BurstSpec = BurstSpec {
    message: "task 1 hello\n",
    repeats: BURST_REPEATS,
    period: 100,
    load: CpuLoad::NONE,
};

pub const BURST_SLOW: BurstSpec = BurstSpec {
    message: "task 2 hi\n",
    repeats: BURST_REPEATS,
    period: 500,
    load: CpuLoad::new(HEAVY_LOAD_ITERATIONS),
};

/// Control programs built from this crate, one per firmware binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Program {
    Blink,
    Toggle,
    ModeSelect,
    ConsoleMutex,
    ConsoleQueue,
}

impl Program {
    pub fn name(&self) -> &'static str {
        match self {
            Program::Blink => "blink",
            Program::Toggle => "toggle",
            Program::ModeSelect => "mode-select",
            Program::ConsoleMutex => "console-mutex",
            Program::ConsoleQueue => "console-queue",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Program::Blink => "Three LEDs blinking at independent rates",
            Program::Toggle => "Button release toggles the LED",
            Program::ModeSelect => "Hold duration selects LED blink rate",
            Program::ConsoleMutex => "Two producers share the UART under a mutex",
            Program::ConsoleQueue => "Button edges and ticks queued to a UART consumer",
        }
    }
}
