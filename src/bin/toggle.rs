//! rtcoord toggle - each debounced release of button 1 flips the LED
//!
//! Button 1 on GPIO 14 (pull-down, pressed = high), LED on GPIO 25.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_time::Delay;
use panic_halt as _;
use defmt_rtt as _;

use rtcoord::app::ToggleContext;
use rtcoord::config::{Program, SamplerConfig};
use rtcoord::hardware::{self, ButtonSampler, Led, TaskMutex};
use rtcoord::supervisor::Supervisor;

static CONTEXT: ToggleContext<TaskMutex> = ToggleContext::new();

#[embassy_executor::task]
async fn button_task(button: ButtonSampler) {
    info!("Button task started");
    CONTEXT.run_button(button).await
}

#[embassy_executor::task]
async fn controller_task(led: Led) {
    info!("Toggle controller started");
    let mut controller = CONTEXT.controller(led);
    controller.run(&CONTEXT.events).await
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let mut supervisor = Supervisor::new(Program::Toggle);
    supervisor.print_startup_banner();

    let p = embassy_rp::init(Default::default());

    unwrap!(spawner.spawn(controller_task(hardware::led(p.PIN_25))));
    unwrap!(spawner.spawn(button_task(hardware::sampler(p.PIN_14, SamplerConfig::TOGGLE))));

    info!("Toggle program initialized");
    supervisor.run(Delay, || CONTEXT.stats()).await
}
