//! rtcoord console-mutex - two producers share UART0 through the arbiter
//!
//! - "task 1 hello" x10 every 100 ticks
//! - "task 2 hi" x10 every 500 ticks, with a busy loop after each line
//!
//! Bursts never interleave on the wire.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_time::Delay;
use panic_halt as _;
use defmt_rtt as _;
use static_cell::StaticCell;

use rtcoord::app::ConsoleMutexContext;
use rtcoord::config::{BurstSpec, Program, BURST_FAST, BURST_SLOW};
use rtcoord::hardware::{TaskMutex, UartConsole};
use rtcoord::supervisor::{ChannelStats, Supervisor};

type Context = ConsoleMutexContext<TaskMutex, UartConsole>;

static CONTEXT: StaticCell<Context> = StaticCell::new();

#[embassy_executor::task(pool_size = 2)]
async fn burst_task(ctx: &'static Context, spec: BurstSpec) {
    let mut writer = ctx.writer(spec, Delay);
    writer.run().await
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let mut supervisor = Supervisor::new(Program::ConsoleMutex);
    supervisor.print_startup_banner();

    let p = embassy_rp::init(Default::default());
    let ctx: &'static Context =
        CONTEXT.init(ConsoleMutexContext::new(UartConsole::new(p.UART0, p.PIN_0)));

    unwrap!(spawner.spawn(burst_task(ctx, BURST_FAST)));
    unwrap!(spawner.spawn(burst_task(ctx, BURST_SLOW)));

    info!("Console mutex program initialized");
    supervisor.run(Delay, ChannelStats::default).await
}
