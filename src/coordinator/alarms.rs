//! Timer thread that fires the coordinator's recurring alarms.

use super::CoordinatorHandle;
use crate::clock::Clock;
use crate::config::CoordinatorConfig;
use crate::constants::{ALARM_CHECK_BLOCKING_STATUS, ALARM_DAILY_REPORT, ALARM_RESET_BLOCKED_COUNT};
use chrono::{Duration as ChronoDuration, NaiveDateTime, NaiveTime};
use log::{debug, info, warn};
use std::sync::mpsc::{channel, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alarm {
    CheckBlockingStatus,
    ResetBlockedCount,
    DailyReport,
}

impl Alarm {
    pub fn name(self) -> &'static str {
        match self {
            Alarm::CheckBlockingStatus => ALARM_CHECK_BLOCKING_STATUS,
            Alarm::ResetBlockedCount => ALARM_RESET_BLOCKED_COUNT,
            Alarm::DailyReport => ALARM_DAILY_REPORT,
        }
    }
}

/// How an alarm comes back after firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Repeat {
    Every(Duration),
    /// Next occurrence of this local time of day, recomputed from the wall
    /// clock each time so DST shifts do not carry over.
    DailyAt(NaiveTime),
}

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    alarm: Alarm,
    /// `None` once the alarm can no longer be scheduled.
    next: Option<Instant>,
    repeat: Repeat,
}

/// Time from `now` until the next occurrence of `at`. An occurrence exactly at
/// `now` counts as tomorrow's.
pub fn duration_until(now: NaiveDateTime, at: NaiveTime) -> Duration {
    let mut target = now.date().and_time(at);
    if target <= now {
        target += ChronoDuration::days(1);
    }
    (target - now).to_std().unwrap_or(Duration::ZERO)
}

/// When an alarm that fired at `fired` comes due again.
fn next_fire(repeat: Repeat, fired: Instant, wall: NaiveDateTime) -> Option<Instant> {
    match repeat {
        Repeat::Every(period) => fired.checked_add(period),
        Repeat::DailyAt(at) => fired.checked_add(duration_until(wall, at)),
    }
}

/// Running alarm thread. Dropping the handle without calling [`AlarmThread::stop`]
/// also stops it, since the shutdown channel disconnects.
pub struct AlarmThread {
    shutdown: Sender<()>,
    handle: JoinHandle<()>,
}

impl AlarmThread {
    /// Start the alarms. The status check fires immediately and then every
    /// `recheck_interval`. The reset also fires immediately, covering a midnight
    /// the process slept through, then at every local `reset_at`. The report
    /// fires at every local `report_at`.
    pub fn start(coordinator: CoordinatorHandle, config: &CoordinatorConfig, clock: &Arc<dyn Clock>) -> Self {
        let now = clock.now().naive_local();
        let started = Instant::now();

        let mut alarms = vec![
            Scheduled {
                alarm: Alarm::CheckBlockingStatus,
                next: Some(started),
                repeat: Repeat::Every(config.recheck_interval),
            },
            Scheduled {
                alarm: Alarm::ResetBlockedCount,
                next: Some(started),
                repeat: Repeat::DailyAt(config.reset_at),
            },
            Scheduled {
                alarm: Alarm::DailyReport,
                next: next_fire(Repeat::DailyAt(config.report_at), started, now),
                repeat: Repeat::DailyAt(config.report_at),
            },
        ];

        for scheduled in &alarms {
            info!(
                "Alarm {} first fires in {}s ({:?})",
                scheduled.alarm.name(),
                scheduled.next.map_or(0, |next| next.saturating_duration_since(started).as_secs()),
                scheduled.repeat
            );
        }

        let clock = Arc::clone(clock);
        let (shutdown, shutdown_rx) = channel::<()>();

        let handle = thread::spawn(move || loop {
            let Some(due) = alarms.iter_mut().filter(|s| s.next.is_some()).min_by_key(|s| s.next) else {
                info!("No alarms left to schedule, alarm thread exiting");
                return;
            };
            let Some(at) = due.next else {
                return;
            };

            match shutdown_rx.recv_timeout(at.saturating_duration_since(Instant::now())) {
                Err(RecvTimeoutError::Timeout) => {
                    debug!("Alarm {} fired", due.alarm.name());
                    if !coordinator.fire(due.alarm) {
                        info!("Coordinator stopped, alarm thread exiting");
                        return;
                    }
                    // Missed periods are skipped, not replayed
                    due.next = next_fire(due.repeat, Instant::now(), clock.now().naive_local());
                    if due.next.is_none() {
                        warn!("Alarm {} interval is out of range, disabling it", due.alarm.name());
                    }
                }
                Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
            }
        });

        Self { shutdown, handle }
    }

    pub fn stop(self) {
        let _ = self.shutdown.send(());
        if self.handle.join().is_err() {
            warn!("Alarm thread panicked");
        }
    }
}
