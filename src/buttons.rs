//! Button sampling with debouncing and hold-duration measurement
//!
//! A [`Debouncer`] polls one input on a fixed cadence. A press must still be
//! present after the debounce delay to count; from then on the held duration
//! is accumulated until release, and the release edge carries it. Programs
//! that select a mode by hold time run it through a [`HoldClassifier`].

use embedded_hal::digital::{InputPin, PinState};
use embedded_hal_async::delay::DelayNs;

use crate::config::{SamplerConfig, HOLD_FAST_BLINK_TICKS, HOLD_SLOW_BLINK_TICKS};
use crate::time::{sleep, Ticks};
use crate::types::Event;

// ===================================================================
// Debounce Session
// ===================================================================

/// Phase of the current debounce session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    #[default]
    Idle,
    Debouncing,
    Held,
}

/// Clean edge produced by a confirmed press cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonEdge {
    Pressed,
    Released { held: Ticks },
}

#[derive(Clone, Copy)]
struct Session {
    phase: Phase,
    held: Ticks,
}

impl Session {
    const IDLE: Session = Session { phase: Phase::Idle, held: 0 };

    fn accumulate(&mut self, ticks: Ticks) {
        self.held = self.held.saturating_add(ticks);
    }
}

// ===================================================================
// Debouncer
// ===================================================================

pub struct Debouncer<I, D> {
    pin: I,
    delay: D,
    config: SamplerConfig,
    session: Session,
}

impl<I, D> Debouncer<I, D>
where
    I: InputPin,
    D: DelayNs,
{
    pub fn new(pin: I, delay: D, config: SamplerConfig) -> Self {
        Self {
            pin,
            delay,
            config,
            session: Session::IDLE,
        }
    }

    pub fn phase(&self) -> Phase {
        self.session.phase
    }

    /// Held duration accumulated by the current session
    pub fn held(&self) -> Ticks {
        self.session.held
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Instantaneous sample. A read error counts as not pressed.
    fn is_pressed(&mut self) -> bool {
        let reading = match self.config.pressed_level {
            PinState::High => self.pin.is_high(),
            PinState::Low => self.pin.is_low(),
        };
        reading.unwrap_or(false)
    }

    async fn wait_for_press(&mut self) {
        while !self.is_pressed() {
            sleep(&mut self.delay, self.config.poll_interval).await;
        }
    }

    /// Run one press cycle from idle to release.
    ///
    /// Returns the held duration, or `None` when the press did not survive
    /// the debounce delay. `emit` sees the press edge (if configured) and the
    /// release edge.
    pub async fn next_session<F>(&mut self, mut emit: F) -> Option<Ticks>
    where
        F: FnMut(ButtonEdge),
    {
        self.session = Session::IDLE;
        self.wait_for_press().await;

        self.session = Session {
            phase: Phase::Debouncing,
            held: self.config.debounce_delay,
        };
        sleep(&mut self.delay, self.config.debounce_delay).await;

        if !self.is_pressed() {
            trace!("Button: glitch rejected after {} ticks", self.config.debounce_delay);
            self.session = Session::IDLE;
            return None;
        }

        self.session.phase = Phase::Held;
        if self.config.report_press {
            emit(ButtonEdge::Pressed);
        }

        while self.is_pressed() {
            sleep(&mut self.delay, self.config.poll_interval).await;
            self.session.accumulate(self.config.poll_interval);
        }

        let held = self.session.held;
        debug!("Button: released after {} ticks", held);
        emit(ButtonEdge::Released { held });
        self.session = Session::IDLE;
        Some(held)
    }

    /// Sample forever, handing every edge to `emit`.
    pub async fn run<F>(&mut self, mut emit: F) -> !
    where
        F: FnMut(ButtonEdge),
    {
        loop {
            self.next_session(&mut emit).await;
        }
    }
}

// ===================================================================
// Hold Classification
// ===================================================================

/// One half-open duration class: `held < below` selects `event`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoldClass {
    pub below: Ticks,
    pub event: Event,
}

/// Maps a held duration onto an event through ascending thresholds
#[derive(Debug, Clone, Copy)]
pub struct HoldClassifier<const N: usize> {
    classes: [HoldClass; N],
    longest: Event,
}

impl<const N: usize> HoldClassifier<N> {
    /// `classes` must be sorted by ascending `below`; `longest` applies at
    /// or above the last threshold.
    pub const fn new(classes: [HoldClass; N], longest: Event) -> Self {
        Self { classes, longest }
    }

    /// First matching class wins.
    pub fn classify(&self, held: Ticks) -> Event {
        self.classes
            .iter()
            .find(|class| held < class.below)
            .map(|class| class.event)
            .unwrap_or(self.longest)
    }
}

/// Short press stops, a medium hold selects slow blink, a long hold fast blink
pub const BLINK_MODE_CLASSIFIER: HoldClassifier<2> = HoldClassifier::new(
    [
        HoldClass { below: HOLD_SLOW_BLINK_TICKS, event: Event::Stop },
        HoldClass { below: HOLD_FAST_BLINK_TICKS, event: Event::SlowBlink },
    ],
    Event::FastBlink,
);
