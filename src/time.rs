//! Tick arithmetic, bounded waits and artificial CPU load
//!
//! All delays in this crate are expressed in scheduler ticks and handed to an
//! [`embedded_hal_async::delay::DelayNs`] provider as milliseconds, which is
//! the tick length of the firmware target.

use core::future::Future;

use embassy_futures::select::{select, Either};
use embedded_hal_async::delay::DelayNs;

use crate::error::{Error, Result};

/// One unit of the scheduler's monotonic time base
pub type Ticks = u32;

/// Suspend the caller for `ticks`.
pub async fn sleep<D: DelayNs>(delay: &mut D, ticks: Ticks) {
    delay.delay_ms(ticks).await;
}

/// Race `fut` against a `ticks`-long delay.
///
/// `fut` is polled first, so a condition that is already satisfied wins even
/// with a zero timeout.
pub async fn with_timeout<D, F>(delay: &mut D, ticks: Ticks, fut: F) -> Result<F::Output>
where
    D: DelayNs,
    F: Future,
{
    match select(fut, delay.delay_ms(ticks)).await {
        Either::First(value) => Ok(value),
        Either::Second(()) => Err(Error::Timeout),
    }
}

/// Busy loop standing in for competing computation inside a critical section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CpuLoad {
    iterations: u32,
}

impl CpuLoad {
    pub const NONE: CpuLoad = CpuLoad::new(0);

    pub const fn new(iterations: u32) -> Self {
        Self { iterations }
    }

    pub const fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Burn `iterations` loop turns. Returns the number actually executed.
    pub fn spin(&self) -> u32 {
        let mut executed = 0u32;
        for i in 0..self.iterations {
            // black_box keeps the loop body observable to the optimizer
            core::hint::black_box(i);
            executed += 1;
        }
        core::hint::black_box(executed)
    }
}
