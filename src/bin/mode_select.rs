//! rtcoord mode-select - hold duration of button 1 selects the blink mode
//!
//! - shorter than 2000 ticks: stop, LED off
//! - 2000 to 3999 ticks: slow blink (400 ticks)
//! - 4000 ticks or longer: fast blink (100 ticks)

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_time::Delay;
use panic_halt as _;
use defmt_rtt as _;
use static_cell::StaticCell;

use rtcoord::app::ModeSelectContext;
use rtcoord::config::{Program, SamplerConfig};
use rtcoord::hardware::{self, ButtonSampler, Led, TaskMutex};
use rtcoord::supervisor::Supervisor;

type Context = ModeSelectContext<TaskMutex, Led>;

static CONTEXT: StaticCell<Context> = StaticCell::new();

#[embassy_executor::task]
async fn button_task(ctx: &'static Context, button: ButtonSampler) {
    info!("Button task started");
    ctx.run_button(button).await
}

#[embassy_executor::task]
async fn controller_task(ctx: &'static Context) {
    info!("Mode controller started");
    let mut controller = ctx.controller();
    controller.run(&ctx.events).await
}

#[embassy_executor::task]
async fn fast_blink_task(ctx: &'static Context) {
    let mut worker = ctx.fast_worker(Delay);
    worker.run().await
}

#[embassy_executor::task]
async fn slow_blink_task(ctx: &'static Context) {
    let mut worker = ctx.slow_worker(Delay);
    worker.run().await
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let mut supervisor = Supervisor::new(Program::ModeSelect);
    supervisor.print_startup_banner();

    let p = embassy_rp::init(Default::default());
    let ctx: &'static Context = CONTEXT.init(ModeSelectContext::new(hardware::led(p.PIN_25)));

    unwrap!(spawner.spawn(controller_task(ctx)));
    unwrap!(spawner.spawn(fast_blink_task(ctx)));
    unwrap!(spawner.spawn(slow_blink_task(ctx)));
    unwrap!(spawner.spawn(button_task(
        ctx,
        hardware::sampler(p.PIN_14, SamplerConfig::MODE_SELECT)
    )));

    info!("Mode select program initialized");
    supervisor.run(Delay, || ctx.stats()).await
}
