use std::time::Duration;

use tokio::time::{Instant, sleep, timeout_at};
use tracing::{debug, info, warn};

use crate::error::RelayError;
use crate::provider::{Job, JobStatus, PredictionApi};

/// Where a fetched job leaves the poll loop.
#[derive(Debug)]
pub enum Transition {
    /// Job succeeded; stop polling.
    Complete(Job),
    /// Provider reported failure or cancellation; authoritative, stop polling.
    Failed(Job),
    /// Still pending or processing.
    Running(Job),
}

impl Transition {
    pub fn from_job(job: Job) -> Self {
        match job.status {
            JobStatus::Succeeded => Transition::Complete(job),
            JobStatus::Failed | JobStatus::Canceled => Transition::Failed(job),
            JobStatus::Pending | JobStatus::Processing => Transition::Running(job),
        }
    }
}

fn job_failed(job: Job) -> RelayError {
    warn!(job_id = %job.id, status = %job.status, "prediction ended without success");
    RelayError::JobFailed {
        status: job.status,
        job: Box::new(job),
    }
}

fn job_timeout(job: Job, polls: u32) -> RelayError {
    warn!(job_id = %job.id, status = %job.status, polls, "prediction deadline reached");
    RelayError::JobTimeout {
        last_status: job.status,
        job: Box::new(job),
    }
}

/// Poll `job` at a fixed interval until it reaches a terminal state.
///
/// `job` is the last observed snapshot, normally the one returned by
/// creation. A timeout reports it when no fetch completes in time.
///
/// No fetch is issued once `deadline` has passed, and a fetch still in
/// flight at `deadline` is abandoned. After a non-terminal fetch the poller
/// sleeps `poll_interval`, unless waking up would land at or past `deadline`.
/// Fetches for one job never overlap.
pub async fn wait_for_terminal(
    api: &impl PredictionApi,
    job: Job,
    deadline: Instant,
    poll_interval: Duration,
) -> Result<Job, RelayError> {
    let mut last = job;
    let mut polls: u32 = 0;

    loop {
        if Instant::now() >= deadline {
            return Err(job_timeout(last, polls));
        }

        let fetched = match timeout_at(deadline, api.get_job(&last.id)).await {
            Ok(fetched) => fetched?,
            Err(_) => return Err(job_timeout(last, polls)),
        };
        polls += 1;
        debug!(job_id = %fetched.id, status = %fetched.status, polls, "polled prediction");

        match Transition::from_job(fetched) {
            Transition::Complete(job) => {
                info!(job_id = %job.id, polls, "prediction succeeded");
                return Ok(job);
            }
            Transition::Failed(job) => return Err(job_failed(job)),
            Transition::Running(job) => {
                if Instant::now() + poll_interval >= deadline {
                    return Err(job_timeout(job, polls));
                }
                last = job;
            }
        }

        sleep(poll_interval).await;
    }
}

/// Drive a just-created job to completion.
///
/// A job that is already terminal when created is settled without polling.
pub async fn settle(
    api: &impl PredictionApi,
    created: Job,
    deadline: Instant,
    poll_interval: Duration,
) -> Result<Job, RelayError> {
    match Transition::from_job(created) {
        Transition::Complete(job) => Ok(job),
        Transition::Failed(job) => Err(job_failed(job)),
        Transition::Running(job) => wait_for_terminal(api, job, deadline, poll_interval).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::testing::ScriptedApi;
    use serde_json::json;

    const INTERVAL: Duration = Duration::from_millis(1500);

    fn created(status: &str) -> Job {
        Job::from_value(json!({"id": "job1", "status": status})).unwrap()
    }

    async fn poll_job1(api: &ScriptedApi, deadline: Instant) -> Result<Job, RelayError> {
        wait_for_terminal(api, created("starting"), deadline, INTERVAL).await
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_pending_polls() {
        let api = ScriptedApi::new()
            .poll_ok(json!({"id": "job1", "status": "starting"}))
            .poll_ok(json!({"id": "job1", "status": "processing"}))
            .poll_ok(json!({"id": "job1", "status": "succeeded", "output": ["https://x/a.png"]}));

        let start = Instant::now();
        let job = poll_job1(&api, start + Duration::from_secs(120)).await.unwrap();

        assert_eq!(job.status, JobStatus::Succeeded);
        assert_eq!(job.output, Some(json!(["https://x/a.png"])));
        assert_eq!(api.poll_count(), 3);
        assert_eq!(api.polled_ids(), vec!["job1", "job1", "job1"]);
        assert!(start.elapsed() >= INTERVAL * 2 && start.elapsed() < INTERVAL * 3);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_on_first_poll_stops_immediately() {
        let api = ScriptedApi::new().poll_ok(json!({
            "id": "job1",
            "status": "failed",
            "error": "CUDA out of memory"
        }));

        let start = Instant::now();
        let err = poll_job1(&api, start + Duration::from_secs(120)).await.unwrap_err();

        match err {
            RelayError::JobFailed { status, job } => {
                assert_eq!(status, JobStatus::Failed);
                assert_eq!(job.error_detail, Some(json!("CUDA out of memory")));
            }
            other => panic!("expected JobFailed, got {other:?}"),
        }
        assert_eq!(api.poll_count(), 1);
        assert!(start.elapsed() < INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn canceled_is_a_job_failure() {
        let api = ScriptedApi::new()
            .poll_ok(json!({"id": "job1", "status": "processing"}))
            .poll_ok(json!({"id": "job1", "status": "canceled"}));

        let err = poll_job1(&api, Instant::now() + Duration::from_secs(120))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RelayError::JobFailed {
                status: JobStatus::Canceled,
                ..
            }
        ));
        assert_eq!(err.status_code(), 500);
        assert_eq!(api.poll_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_stops_polling_before_it_would_be_exceeded() {
        let api = ScriptedApi::new().poll_forever(json!({"id": "job1", "status": "processing"}));

        let start = Instant::now();
        let err = poll_job1(&api, start + Duration::from_millis(3000)).await.unwrap_err();

        match &err {
            RelayError::JobTimeout { last_status, job } => {
                assert_eq!(*last_status, JobStatus::Processing);
                assert_eq!(job.id, "job1");
            }
            other => panic!("expected JobTimeout, got {other:?}"),
        }
        assert_eq!(err.status_code(), 504);
        // Polls at t=0 and t=1500; the one at t=3000 is never issued.
        assert_eq!(api.poll_count(), 2);
        assert!(start.elapsed() >= INTERVAL && start.elapsed() < INTERVAL * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn no_fetch_is_issued_after_the_deadline() {
        let api = ScriptedApi::new().poll_forever(json!({"id": "job1", "status": "succeeded"}));

        let deadline = Instant::now();
        sleep(Duration::from_millis(500)).await;
        let err = poll_job1(&api, deadline).await.unwrap_err();

        match &err {
            RelayError::JobTimeout { last_status, .. } => {
                assert_eq!(*last_status, JobStatus::Pending);
            }
            other => panic!("expected JobTimeout, got {other:?}"),
        }
        assert_eq!(api.poll_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_fetch_is_cut_off_at_the_deadline() {
        let api = ScriptedApi::new()
            .poll_stalled(Duration::from_secs(20), json!({"id": "job1", "status": "succeeded"}));

        let start = Instant::now();
        let err = poll_job1(&api, start + Duration::from_millis(3000)).await.unwrap_err();

        match &err {
            RelayError::JobTimeout { last_status, job } => {
                assert_eq!(*last_status, JobStatus::Pending);
                assert_eq!(job.id, "job1");
            }
            other => panic!("expected JobTimeout, got {other:?}"),
        }
        assert_eq!(api.poll_count(), 1);
        assert!(start.elapsed() >= Duration::from_millis(3000));
        assert!(start.elapsed() < Duration::from_millis(3500));
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_later_fetch_reports_last_observed_status() {
        let api = ScriptedApi::new()
            .poll_ok(json!({"id": "job1", "status": "processing"}))
            .poll_stalled(Duration::from_secs(20), json!({"id": "job1", "status": "succeeded"}));

        let start = Instant::now();
        let err = poll_job1(&api, start + Duration::from_millis(3000)).await.unwrap_err();

        assert!(matches!(
            err,
            RelayError::JobTimeout {
                last_status: JobStatus::Processing,
                ..
            }
        ));
        assert!(start.elapsed() < Duration::from_millis(3500));
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_error_propagates_without_retry() {
        let api = ScriptedApi::new()
            .poll_ok(json!({"id": "job1", "status": "processing"}))
            .poll_rejected(404, r#"{"detail":"Not found."}"#);

        let err = poll_job1(&api, Instant::now() + Duration::from_secs(120))
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::Provider(_)));
        assert_eq!(err.status_code(), 404);
        assert_eq!(api.poll_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn settle_returns_already_succeeded_job_without_polling() {
        let api = ScriptedApi::new();
        let job = Job::from_value(json!({"id": "job1", "status": "succeeded", "output": "done"}))
            .unwrap();

        let settled = settle(&api, job, Instant::now() + INTERVAL, INTERVAL)
            .await
            .unwrap();

        assert_eq!(settled.output, Some(json!("done")));
        assert_eq!(api.poll_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn settle_fails_already_failed_job_without_polling() {
        let api = ScriptedApi::new();
        let err = settle(&api, created("failed"), Instant::now() + INTERVAL, INTERVAL)
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::JobFailed { .. }));
        assert_eq!(api.poll_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn settle_polls_pending_job() {
        let api = ScriptedApi::new().poll_ok(json!({"id": "job1", "status": "succeeded"}));
        let job = settle(
            &api,
            created("starting"),
            Instant::now() + Duration::from_secs(120),
            INTERVAL,
        )
        .await
        .unwrap();

        assert_eq!(job.status, JobStatus::Succeeded);
        assert_eq!(api.poll_count(), 1);
    }

    #[test]
    fn transition_classifies_statuses() {
        assert!(matches!(Transition::from_job(created("succeeded")), Transition::Complete(_)));
        assert!(matches!(Transition::from_job(created("failed")), Transition::Failed(_)));
        assert!(matches!(Transition::from_job(created("canceled")), Transition::Failed(_)));
        assert!(matches!(Transition::from_job(created("starting")), Transition::Running(_)));
        assert!(matches!(Transition::from_job(created("processing")), Transition::Running(_)));
    }
}
