//! Per-site failure/recovery tracking.
//!
//! A site is either `Healthy` or `Degraded`. Entering `Degraded` logs one
//! warning; staying there logs nothing above debug; returning to `Healthy`
//! logs one recovery notice. Throttled ticks do not change the state.

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::domain::SiteId;

use super::throttle::FetchStatus;

/// Health of a site's feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    #[default]
    Healthy,
    Degraded,
}

/// What a report did to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthEvent {
    /// No transition.
    None,
    /// Healthy → Degraded.
    Failed,
    /// Degraded → Healthy.
    Recovered,
}

impl HealthEvent {
    pub fn is_new_failure(&self) -> bool {
        matches!(self, HealthEvent::Failed)
    }

    pub fn is_recovery(&self) -> bool {
        matches!(self, HealthEvent::Recovered)
    }
}

/// Health tracker for one site.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SiteHealth {
    state: HealthState,
    consecutive_failures: u32,
    degraded_since: Option<DateTime<Local>>,
}

impl SiteHealth {
    pub fn state(&self) -> HealthState {
        self.state
    }

    /// Failed attempts since the last success.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// When the current degraded spell began.
    pub fn degraded_since(&self) -> Option<DateTime<Local>> {
        self.degraded_since
    }

    /// Feed one fetch status into the state machine.
    pub fn report(&mut self, site: SiteId, status: &FetchStatus, now: DateTime<Local>) -> HealthEvent {
        match (self.state, status) {
            (_, FetchStatus::Throttled) => HealthEvent::None,

            (HealthState::Healthy, FetchStatus::Fresh) => HealthEvent::None,

            (HealthState::Healthy, FetchStatus::Failed(err)) => {
                tracing::warn!(%site, "SL departures unavailable: {err}");
                self.state = HealthState::Degraded;
                self.consecutive_failures = 1;
                self.degraded_since = Some(now);
                HealthEvent::Failed
            }

            (HealthState::Degraded, FetchStatus::Failed(err)) => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                tracing::debug!(
                    %site,
                    failures = self.consecutive_failures,
                    "SL departures still unavailable: {err}"
                );
                HealthEvent::None
            }

            (HealthState::Degraded, FetchStatus::Fresh) => {
                tracing::info!(
                    %site,
                    failures = self.consecutive_failures,
                    "SL departures recovered"
                );
                self.state = HealthState::Healthy;
                self.consecutive_failures = 0;
                self.degraded_since = None;
                HealthEvent::Recovered
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sl::SlError;
    use chrono::{Duration, TimeZone};

    fn site() -> SiteId {
        SiteId::parse("9192").unwrap()
    }

    fn t0() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 15, 14, 0, 0).unwrap()
    }

    fn quota() -> FetchStatus {
        FetchStatus::Failed(SlError::Api {
            code: 1007,
            message: "Monthly quota exceeded".into(),
        })
    }

    #[test]
    fn starts_healthy() {
        let health = SiteHealth::default();
        assert_eq!(health.state(), HealthState::Healthy);
        assert_eq!(health.consecutive_failures(), 0);
        assert!(health.degraded_since().is_none());
    }

    #[test]
    fn first_failure_at_startup_is_reported() {
        let mut health = SiteHealth::default();
        let event = health.report(site(), &quota(), t0());
        assert!(event.is_new_failure());
        assert_eq!(health.state(), HealthState::Degraded);
        assert_eq!(health.degraded_since(), Some(t0()));
    }

    #[test]
    fn repeated_failure_is_suppressed() {
        let mut health = SiteHealth::default();
        health.report(site(), &quota(), t0());

        let event = health.report(site(), &quota(), t0() + Duration::seconds(60));
        assert_eq!(event, HealthEvent::None);
        assert_eq!(health.consecutive_failures(), 2);

        // A different failure while degraded is also not a new transition
        let other = FetchStatus::Failed(SlError::Transport {
            message: "timeout".into(),
        });
        assert_eq!(
            health.report(site(), &other, t0() + Duration::seconds(120)),
            HealthEvent::None
        );
        assert_eq!(health.consecutive_failures(), 3);
        assert_eq!(health.degraded_since(), Some(t0()));
    }

    #[test]
    fn success_after_failure_is_recovery() {
        let mut health = SiteHealth::default();
        health.report(site(), &quota(), t0());
        health.report(site(), &quota(), t0());

        let event = health.report(site(), &FetchStatus::Fresh, t0());
        assert!(event.is_recovery());
        assert_eq!(health.state(), HealthState::Healthy);
        assert_eq!(health.consecutive_failures(), 0);
        assert!(health.degraded_since().is_none());

        // And only once
        assert_eq!(
            health.report(site(), &FetchStatus::Fresh, t0()),
            HealthEvent::None
        );
    }

    #[test]
    fn throttled_is_neutral() {
        let mut health = SiteHealth::default();
        assert_eq!(
            health.report(site(), &FetchStatus::Throttled, t0()),
            HealthEvent::None
        );
        assert_eq!(health.state(), HealthState::Healthy);

        health.report(site(), &quota(), t0());
        assert_eq!(
            health.report(site(), &FetchStatus::Throttled, t0()),
            HealthEvent::None
        );
        assert_eq!(health.state(), HealthState::Degraded);
        assert_eq!(health.consecutive_failures(), 1);
    }

    #[test]
    fn fail_recover_fail_reports_again() {
        let mut health = SiteHealth::default();
        assert!(health.report(site(), &quota(), t0()).is_new_failure());
        assert!(health.report(site(), &FetchStatus::Fresh, t0()).is_recovery());
        assert!(health.report(site(), &quota(), t0()).is_new_failure());
    }
}
