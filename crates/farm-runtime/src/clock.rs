//! Timer that advances the simulation while running.
//!
//! Each start or speed change spawns a fresh ticking task; pausing aborts the
//! task and waits for it to finish, so no advance is pending or in flight
//! once `pause` returns.

use crate::SharedEconomy;
use farm_core::{ClockConfig, GameSpeed};
use farm_econ::DayReport;
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

const REPORT_BUFFER: usize = 64;

#[derive(Debug, Error, PartialEq)]
pub enum ClockError {
    #[error("the clock must be started from within a tokio runtime")]
    NoRuntime,
    #[error("the clock interval must be non-zero")]
    ZeroInterval,
    #[error("the ticking task panicked")]
    TaskPanicked,
}

/// Drives `advance_day` every `base_interval / speed`.
pub struct ClockDriver {
    economy: SharedEconomy,
    base_interval: Duration,
    speed: GameSpeed,
    task: Option<JoinHandle<()>>,
    reports: broadcast::Sender<DayReport>,
}

impl ClockDriver {
    pub fn new(economy: SharedEconomy, cfg: &ClockConfig) -> Self {
        let (reports, _) = broadcast::channel(REPORT_BUFFER);
        Self {
            economy,
            base_interval: cfg.base_interval(),
            speed: cfg.speed,
            task: None,
            reports,
        }
    }

    /// Receive a report after every clock-driven day advance.
    pub fn subscribe(&self) -> broadcast::Receiver<DayReport> {
        self.reports.subscribe()
    }

    /// Whether a ticking task is alive. A task that died on its own no
    /// longer counts as running.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub fn speed(&self) -> GameSpeed {
        self.speed
    }

    /// Current time between two day advances.
    pub fn period(&self) -> Duration {
        self.speed.period(self.base_interval)
    }

    /// Start ticking. The first advance happens one full period from now.
    pub fn start(&mut self) -> Result<(), ClockError> {
        if self.is_running() {
            return Ok(());
        }
        let period = self.period();
        if period.is_zero() {
            return Err(ClockError::ZeroInterval);
        }
        let handle = Handle::try_current().map_err(|_| ClockError::NoRuntime)?;
        let economy = self.economy.clone();
        let reports = self.reports.clone();
        self.task = Some(handle.spawn(tick_loop(economy, reports, period)));
        info!(speed = %self.speed, period_ms = period.as_millis() as u64, "clock started");
        Ok(())
    }

    /// Stop ticking and wait until the ticking task is gone. Reports a
    /// panic the task hit while it was running.
    pub async fn pause(&mut self) -> Result<(), ClockError> {
        let Some(task) = self.task.take() else {
            return Ok(());
        };
        task.abort();
        match task.await {
            Err(e) if e.is_panic() => {
                error!(error = %e, "clock task panicked");
                Err(ClockError::TaskPanicked)
            }
            _ => {
                info!("clock paused");
                Ok(())
            }
        }
    }

    /// Flip between running and paused. Returns whether the clock now runs.
    pub async fn toggle(&mut self) -> Result<bool, ClockError> {
        if self.is_running() {
            self.pause().await?;
            Ok(false)
        } else {
            self.start()?;
            Ok(true)
        }
    }

    /// Change speed. A running clock is cancelled and rescheduled with the
    /// new period; a paused one just remembers it.
    pub async fn set_speed(&mut self, speed: GameSpeed) -> Result<(), ClockError> {
        if speed == self.speed {
            return Ok(());
        }
        self.speed = speed;
        if self.is_running() {
            self.pause().await?;
            self.start()?;
        }
        debug!(%speed, "clock speed changed");
        Ok(())
    }
}

impl Drop for ClockDriver {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn tick_loop(
    economy: SharedEconomy,
    reports: broadcast::Sender<DayReport>,
    period: Duration,
) {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let report = economy.advance_day();
        // No subscribers is fine.
        let _ = reports.send(report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use farm_core::FarmConfig;

    fn setup(speed: GameSpeed) -> (SharedEconomy, ClockDriver) {
        let economy = SharedEconomy::from_config(&FarmConfig::default()).unwrap();
        let cfg = ClockConfig {
            base_interval_ms: 3000,
            speed,
        };
        let clock = ClockDriver::new(economy.clone(), &cfg);
        (economy, clock)
    }

    #[tokio::test(start_paused = true)]
    async fn advances_once_per_period() {
        let (economy, mut clock) = setup(GameSpeed::Normal);
        clock.start().unwrap();
        assert!(clock.is_running());
        time::sleep(Duration::from_millis(9_500)).await;
        assert_eq!(economy.snapshot().day, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_stops_all_advances() {
        let (economy, mut clock) = setup(GameSpeed::Normal);
        clock.start().unwrap();
        time::sleep(Duration::from_millis(3_500)).await;
        clock.pause().await.unwrap();
        assert!(!clock.is_running());
        let day = economy.snapshot().day;
        assert_eq!(day, 2);
        time::sleep(Duration::from_secs(60)).await;
        assert_eq!(economy.snapshot().day, day);
    }

    #[tokio::test(start_paused = true)]
    async fn speed_change_reschedules() {
        let (economy, mut clock) = setup(GameSpeed::Normal);
        clock.start().unwrap();
        time::sleep(Duration::from_millis(3_500)).await;
        assert_eq!(economy.snapshot().day, 2);
        clock.set_speed(GameSpeed::Triple).await.unwrap();
        assert_eq!(clock.period(), Duration::from_millis(1000));
        time::sleep(Duration::from_millis(2_100)).await;
        assert_eq!(economy.snapshot().day, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn speed_change_while_paused_does_not_start() {
        let (economy, mut clock) = setup(GameSpeed::Normal);
        clock.set_speed(GameSpeed::Half).await.unwrap();
        assert!(!clock.is_running());
        assert_eq!(clock.period(), Duration::from_millis(6000));
        time::sleep(Duration::from_secs(30)).await;
        assert_eq!(economy.snapshot().day, 1);
        assert!(clock.toggle().await.unwrap());
        time::sleep(Duration::from_millis(6_100)).await;
        assert_eq!(economy.snapshot().day, 2);
        assert!(!clock.toggle().await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_receive_reports() {
        let (_economy, mut clock) = setup(GameSpeed::Double);
        let mut reports = clock.subscribe();
        clock.start().unwrap();
        let report = reports.recv().await.unwrap();
        assert_eq!(report.day, 2);
        let report = reports.recv().await.unwrap();
        assert_eq!(report.day, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_is_rejected() {
        let economy = SharedEconomy::from_config(&FarmConfig::default()).unwrap();
        let cfg = ClockConfig {
            base_interval_ms: 0,
            speed: GameSpeed::Normal,
        };
        let mut clock = ClockDriver::new(economy.clone(), &cfg);
        assert_eq!(clock.start(), Err(ClockError::ZeroInterval));
        assert!(!clock.is_running());
        assert_eq!(clock.toggle().await, Err(ClockError::ZeroInterval));
        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(economy.snapshot().day, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_reports_a_panicked_task() {
        let (_economy, mut clock) = setup(GameSpeed::Normal);
        clock.task = Some(tokio::spawn(async { panic!("tick failed") }));
        while clock.is_running() {
            tokio::task::yield_now().await;
        }
        assert_eq!(clock.pause().await, Err(ClockError::TaskPanicked));
        assert_eq!(clock.pause().await, Ok(()));
    }

    #[test]
    fn start_outside_runtime_fails() {
        let (_economy, mut clock) = setup(GameSpeed::Normal);
        assert_eq!(clock.start(), Err(ClockError::NoRuntime));
        assert!(!clock.is_running());
    }
}
