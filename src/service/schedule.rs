//! Cron-style recurring jobs on top of tokio tasks.

use std::{future::Future, str::FromStr};

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info, warn};

use crate::base::types::Res;

/// A parsed cron expression.
///
/// Standard five-field expressions (`min hour dom mon dow`) are accepted, as are the
/// six and seven field forms with leading seconds and trailing years.
#[derive(Debug, Clone)]
pub struct CronSchedule {
    expression: String,
    schedule: cron::Schedule,
}

impl CronSchedule {
    /// Parses a cron expression.
    pub fn parse(expression: &str) -> Res<Self> {
        let expression = expression.trim();

        let normalized = match expression.split_whitespace().count() {
            5 => format!("0 {expression}"),
            6 | 7 => expression.to_string(),
            n => return Err(anyhow::anyhow!("Cron expression `{}` has {} fields; expected 5, 6, or 7.", expression, n)),
        };

        let schedule = cron::Schedule::from_str(&normalized).map_err(|e| anyhow::anyhow!("Invalid cron expression `{}`: {}", expression, e))?;

        Ok(Self {
            expression: expression.to_string(),
            schedule,
        })
    }

    /// The expression as configured.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// The first occurrence strictly after `after`.
    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule.after(&after).next()
    }
}

/// Spawns a task that runs `job` at every occurrence of `schedule`.
///
/// Occurrences are handled one at a time; an occurrence that passes while the job is still
/// running is skipped. The task ends if the schedule has no further occurrences.
pub fn spawn_recurring<F, Fut>(name: &str, schedule: CronSchedule, job: F) -> JoinHandle<()>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let span = tracing::info_span!("recurring_job", job = %name, schedule = %schedule.expression());

    tokio::spawn(
        async move {
            info!("Scheduled recurring job.");

            let mut last = None;

            loop {
                let now = Utc::now();
                let Some(next) = next_occurrence(&schedule, last, now) else {
                    warn!("Schedule has no further occurrences; stopping.");
                    break;
                };

                debug!("Next run at {}.", next);

                let delay = (next - now).to_std().unwrap_or_default();
                tokio::time::sleep(delay).await;

                job().await;
                last = Some(next);
            }
        }
        .instrument(span),
    )
}

/// The occurrence to wait for next.
///
/// Counting from the later of `last` and `now` keeps an early timer wake-up from
/// running the same occurrence twice.
fn next_occurrence(schedule: &CronSchedule, last: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let after = last.map_or(now, |last| last.max(now));
    schedule.next_after(after)
}

// Tests.

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    use chrono::{TimeZone, Timelike};

    use super::*;

    #[test]
    fn five_field_default_runs_at_minute_ten() {
        let schedule = CronSchedule::parse("10 * * * *").unwrap();
        let after = Utc.with_ymd_and_hms(2026, 2, 22, 10, 30, 0).unwrap();

        let next = schedule.next_after(after).unwrap();

        assert_eq!(next.hour(), 11);
        assert_eq!(next.minute(), 10);
        assert_eq!(next.second(), 0);
    }

    #[test]
    fn next_is_strictly_after() {
        let schedule = CronSchedule::parse("10 * * * *").unwrap();
        let after = Utc.with_ymd_and_hms(2026, 2, 22, 10, 10, 0).unwrap();

        let next = schedule.next_after(after).unwrap();

        assert_eq!(next.hour(), 11);
    }

    #[test]
    fn six_field_expression_is_accepted() {
        let schedule = CronSchedule::parse("30 */15 * * * *").unwrap();
        let after = Utc.with_ymd_and_hms(2026, 2, 22, 10, 2, 0).unwrap();

        let next = schedule.next_after(after).unwrap();

        assert_eq!(next.minute(), 15);
        assert_eq!(next.second(), 30);
    }

    #[test]
    fn invalid_expressions_are_rejected() {
        assert!(CronSchedule::parse("bad").is_err());
        assert!(CronSchedule::parse("61 * * * *").is_err());
        assert!(CronSchedule::parse("").is_err());
    }

    #[test]
    fn expression_is_kept_as_configured() {
        let schedule = CronSchedule::parse(" 10 * * * * ").unwrap();

        assert_eq!(schedule.expression(), "10 * * * *");
    }

    #[test]
    fn early_wake_does_not_repeat_an_occurrence() {
        let schedule = CronSchedule::parse("10 * * * *").unwrap();
        let last = Utc.with_ymd_and_hms(2026, 2, 22, 10, 10, 0).unwrap();
        let early = last - chrono::Duration::milliseconds(200);

        let next = next_occurrence(&schedule, Some(last), early).unwrap();

        assert_eq!(next, Utc.with_ymd_and_hms(2026, 2, 22, 11, 10, 0).unwrap());
    }

    #[test]
    fn first_occurrence_counts_from_now() {
        let schedule = CronSchedule::parse("10 * * * *").unwrap();
        let now = Utc.with_ymd_and_hms(2026, 2, 22, 10, 5, 0).unwrap();

        let next = next_occurrence(&schedule, None, now).unwrap();

        assert_eq!(next, Utc.with_ymd_and_hms(2026, 2, 22, 10, 10, 0).unwrap());
    }

    #[tokio::test]
    async fn recurring_job_runs_on_every_occurrence() {
        let schedule = CronSchedule::parse("* * * * * *").unwrap();
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();

        let handle = spawn_recurring("every-second", schedule, move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        let waited = tokio::time::timeout(Duration::from_secs(10), async {
            while runs.load(Ordering::SeqCst) < 2 {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        })
        .await;

        handle.abort();

        assert!(waited.is_ok(), "job should have run twice");
    }
}
