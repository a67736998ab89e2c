//! rtcoord console-queue - button edges and periodic ticks on UART0
//!
//! Buttons 1 and 2 (GPIO 14 / 15) queue a press and a release event each;
//! a periodic producer queues a tick every 100 ticks. One consumer prints
//! them in arrival order.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_time::Delay;
use panic_halt as _;
use defmt_rtt as _;

use rtcoord::app::ConsoleQueueContext;
use rtcoord::config::{Program, SamplerConfig, EVENT_QUEUE_CAPACITY};
use rtcoord::hardware::{self, ButtonSampler, TaskMutex, UartConsole};
use rtcoord::supervisor::Supervisor;
use rtcoord::types::ButtonId;

static CONTEXT: ConsoleQueueContext<TaskMutex, EVENT_QUEUE_CAPACITY> = ConsoleQueueContext::new();

#[embassy_executor::task(pool_size = 2)]
async fn button_task(id: ButtonId, button: ButtonSampler) {
    info!("Button {} task started", id.0);
    CONTEXT.run_button(id, button).await
}

#[embassy_executor::task]
async fn consumer_task(port: UartConsole) {
    let mut consumer = CONTEXT.consumer(port);
    consumer.run().await
}

#[embassy_executor::task]
async fn periodic_task() {
    info!("Periodic producer started");
    let mut notifier = CONTEXT.notifier(Delay);
    notifier.run().await
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let mut supervisor = Supervisor::new(Program::ConsoleQueue);
    supervisor.print_startup_banner();

    let p = embassy_rp::init(Default::default());

    unwrap!(spawner.spawn(consumer_task(UartConsole::new(p.UART0, p.PIN_0))));
    unwrap!(spawner.spawn(button_task(
        ButtonId(1),
        hardware::sampler(p.PIN_14, SamplerConfig::EDGES)
    )));
    unwrap!(spawner.spawn(button_task(
        ButtonId(2),
        hardware::sampler(p.PIN_15, SamplerConfig::EDGES)
    )));
    unwrap!(spawner.spawn(periodic_task()));

    info!("Console queue program initialized");
    supervisor.run(Delay, || CONTEXT.stats()).await
}
