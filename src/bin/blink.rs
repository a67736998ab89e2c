//! rtcoord blink - three LEDs on independent periods
//!
//! - LED 1 (GPIO 25): 100 ticks on / 100 off
//! - LED 2 (GPIO 16): 500 ticks on / 500 off
//! - LED 3 (GPIO 17): 1000 ticks on / 1000 off

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_time::Delay;
use panic_halt as _;
use defmt_rtt as _;

use rtcoord::config::{Program, BLINK_LEDS};
use rtcoord::hardware::{self, Led};
use rtcoord::leds::{AlwaysActive, BlinkWorker};
use rtcoord::supervisor::{ChannelStats, Supervisor};

#[embassy_executor::task(pool_size = 3)]
async fn blink_task(mut worker: BlinkWorker<AlwaysActive, Led, Delay>) {
    worker.run().await
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let mut supervisor = Supervisor::new(Program::Blink);
    supervisor.print_startup_banner();

    let p = embassy_rp::init(Default::default());
    let leds = [
        hardware::led(p.PIN_25),
        hardware::led(p.PIN_16),
        hardware::led(p.PIN_17),
    ];

    for (spec, led) in BLINK_LEDS.iter().zip(leds) {
        let worker = BlinkWorker::from_spec(spec, AlwaysActive, led, Delay);
        unwrap!(spawner.spawn(blink_task(worker)));
    }

    info!("Blink program initialized");
    supervisor.run(Delay, ChannelStats::default).await
}
