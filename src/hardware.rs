//! RP2040 bindings for the program seams
//!
//! Buttons are wired to 3V3 with the internal pull-down enabled, so a pressed
//! button reads high. LEDs start low. The console is UART0 TX only.

use embassy_rp::gpio::{Input, Level, Output, Pin, Pull};
use embassy_rp::peripherals::{PIN_0, UART0};
use embassy_rp::uart::{self, Blocking, UartTx};
use embassy_rp::Peri;
use embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;
use embassy_time::Delay;

use crate::buttons::Debouncer;
use crate::config::{SamplerConfig, UART_BAUDRATE};
use crate::console::SerialPort;

/// Raw mutex for contexts shared between tasks of the single thread-mode executor
pub type TaskMutex = ThreadModeRawMutex;
pub type Button = Input<'static>;
pub type Led = Output<'static>;
pub type ButtonSampler = Debouncer<Button, Delay>;

pub fn button(pin: Peri<'static, impl Pin>) -> Button {
    Input::new(pin, Pull::Down)
}

pub fn led(pin: Peri<'static, impl Pin>) -> Led {
    Output::new(pin, Level::Low)
}

pub fn sampler(pin: Peri<'static, impl Pin>, config: SamplerConfig) -> ButtonSampler {
    Debouncer::new(button(pin), Delay, config)
}

/// UART transmitter reporting a busy shifter as `WouldBlock`
pub struct UartConsole {
    tx: UartTx<'static, Blocking>,
}

impl UartConsole {
    pub fn new(uart: Peri<'static, UART0>, tx: Peri<'static, PIN_0>) -> Self {
        let mut config = uart::Config::default();
        config.baudrate = UART_BAUDRATE;
        Self {
            tx: UartTx::new_blocking(uart, tx, config),
        }
    }
}

impl SerialPort for UartConsole {
    type Error = uart::Error;

    fn try_write(&mut self, bytes: &[u8]) -> nb::Result<(), Self::Error> {
        if self.tx.busy() {
            return Err(nb::Error::WouldBlock);
        }
        self.tx.blocking_write(bytes).map_err(nb::Error::Other)
    }
}
