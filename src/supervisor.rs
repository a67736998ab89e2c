//! Program supervisor and monitoring
//!
//! Prints the startup banner and, on a fixed heartbeat, accounts uptime and
//! reports channel health so that lossy deliveries are visible in the log.

use embedded_hal_async::delay::DelayNs;

use crate::config::{Program, HEARTBEAT_TICKS, STATUS_REPORT_TICKS};
use crate::time::{sleep, Ticks};
use crate::types::APP_VERSION;

/// Loss counters of the channels a program owns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelStats {
    /// Sends discarded by a full ordered queue
    pub dropped: u32,
    /// Pending values replaced in a coalescing slot
    pub overwritten: u32,
}

pub struct Supervisor {
    program: Program,
    uptime: u64,
    last_report: u64,
    reported: ChannelStats,
}

impl Supervisor {
    pub const fn new(program: Program) -> Self {
        Self {
            program,
            uptime: 0,
            last_report: 0,
            reported: ChannelStats {
                dropped: 0,
                overwritten: 0,
            },
        }
    }

    pub fn program(&self) -> Program {
        self.program
    }

    pub fn print_startup_banner(&self) {
        info!("========================================");
        info!("rtcoord {} v{}", self.program.name(), APP_VERSION.as_string());
        info!("{}", self.program.description());
        info!("========================================");
        info!("Hardware: RP2040 (Raspberry Pi Pico)");
        info!("Heartbeat: {} ticks", HEARTBEAT_TICKS);
        info!("========================================");
    }

    /// Account `elapsed` ticks of uptime. Returns true when a status report
    /// was due and printed.
    pub fn heartbeat(&mut self, elapsed: Ticks, stats: ChannelStats) -> bool {
        self.uptime = self.uptime.saturating_add(u64::from(elapsed));
        if self.uptime - self.last_report < STATUS_REPORT_TICKS {
            return false;
        }

        self.print_status(stats);
        self.last_report = self.uptime;
        self.reported = stats;
        true
    }

    fn print_status(&self, stats: ChannelStats) {
        let minutes = self.uptime / 60_000;
        let hours = minutes / 60;

        if hours > 0 {
            info!("Status: Uptime {}h{}m", hours, minutes % 60);
        } else {
            info!("Status: Uptime {}m", minutes);
        }

        let dropped = stats.dropped.wrapping_sub(self.reported.dropped);
        if dropped > 0 {
            warn!("Status: {} queued events dropped ({} total)", dropped, stats.dropped);
        }
        let overwritten = stats.overwritten.wrapping_sub(self.reported.overwritten);
        if overwritten > 0 {
            info!("Status: {} notifications coalesced ({} total)", overwritten, stats.overwritten);
        }
    }

    /// Uptime in ticks
    pub fn uptime(&self) -> u64 {
        self.uptime
    }

    pub async fn run<D, F>(&mut self, mut delay: D, mut stats: F) -> !
    where
        D: DelayNs,
        F: FnMut() -> ChannelStats,
    {
        info!("Supervisor started");
        loop {
            sleep(&mut delay, HEARTBEAT_TICKS).await;
            self.heartbeat(HEARTBEAT_TICKS, stats());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reported_every_minute() {
        let mut supervisor = Supervisor::new(Program::ConsoleQueue);
        let stats = ChannelStats::default();

        let reports: u32 = (0..12)
            .map(|_| supervisor.heartbeat(HEARTBEAT_TICKS, stats) as u32)
            .sum();

        assert_eq!(supervisor.uptime(), 120_000);
        assert_eq!(reports, 2);
    }

    #[test]
    fn test_first_report_after_six_heartbeats() {
        let mut supervisor = Supervisor::new(Program::Blink);
        for _ in 0..5 {
            assert!(!supervisor.heartbeat(HEARTBEAT_TICKS, ChannelStats::default()));
        }
        assert!(supervisor.heartbeat(HEARTBEAT_TICKS, ChannelStats::default()));
    }

    #[test]
    fn test_uptime_saturates() {
        let mut supervisor = Supervisor::new(Program::Toggle);
        supervisor.uptime = u64::MAX - 1;
        supervisor.last_report = u64::MAX - 1;
        assert!(!supervisor.heartbeat(Ticks::MAX, ChannelStats::default()));
        assert_eq!(supervisor.uptime(), u64::MAX);
    }

    #[test]
    fn test_report_tracks_counters() {
        let mut supervisor = Supervisor::new(Program::ConsoleQueue);
        let stats = ChannelStats { dropped: 3, overwritten: 1 };
        assert!(supervisor.heartbeat(STATUS_REPORT_TICKS as Ticks, stats));
        assert_eq!(supervisor.reported, stats);
        assert_eq!(supervisor.program(), Program::ConsoleQueue);
    }
}
