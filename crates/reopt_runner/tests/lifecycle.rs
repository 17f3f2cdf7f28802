use reopt_core::prelude::*;
use reopt_mock::{MemoryStore, RecordingHook, RecordingTimer, ScriptedJobService};
use reopt_runner::{JobRunner, RunOptions, StoreHook};
use serde_json::json;
use std::time::Duration;

fn sample_request() -> JobRequest {
    JobRequest::new(json!({
        "Site": { "lat": 34.58, "lon": -118.12 },
        "ElectricLoad": { "annual_kwh": 100000 }
    }))
}

fn optimal() -> JobStatus {
    JobStatus::from_document(json!({
        "status": "optimal",
        "outputs": { "Financial": { "npv": 50000 } }
    }))
    .unwrap()
}

fn options() -> RunOptions {
    RunOptions::default().with_poll_interval(Duration::from_millis(250))
}

#[tokio::test]
async fn immediate_success_submits_and_fetches_once() {
    let service = ScriptedJobService::new("abc-123").then_status(optimal());
    let timer = RecordingTimer::new();
    let runner = JobRunner::new(service.clone()).with_timer(timer.clone());

    let result = runner.run(&sample_request(), &options()).await.unwrap();

    assert!(result.is_success());
    assert_eq!(runner.service().submit_calls(), 1);
    assert_eq!(service.fetch_calls(), 1);
    assert_eq!(timer.count(), 0);
    assert_eq!(service.submitted(), [sample_request()]);
}

#[tokio::test]
async fn k_running_polls_then_success() {
    for k in [0usize, 1, 4, 9] {
        let service = ScriptedJobService::new("abc-123")
            .then_running(k)
            .then_status(optimal());
        let timer = RecordingTimer::new();
        let runner = JobRunner::new(service.clone()).with_timer(timer.clone());

        runner.run(&sample_request(), &options()).await.unwrap();

        assert_eq!(service.fetch_calls(), k + 1, "k = {k}");
        assert_eq!(timer.count(), k, "k = {k}");
        assert!(timer.sleeps().iter().all(|d| *d == Duration::from_millis(250)));
    }
}

#[tokio::test]
async fn pending_counts_as_not_terminal() {
    let service = ScriptedJobService::new("abc-123")
        .then_status(JobStatus::Pending)
        .then_status(JobStatus::Running)
        .then_status(optimal());
    let timer = RecordingTimer::new();
    let runner = JobRunner::new(service.clone()).with_timer(timer.clone());

    runner.run(&sample_request(), &options()).await.unwrap();
    assert_eq!(service.fetch_calls(), 3);
    assert_eq!(timer.count(), 2);
}

#[tokio::test]
async fn times_out_after_max_attempts_with_handle() {
    let service = ScriptedJobService::new("abc-123");
    let timer = RecordingTimer::new();
    let runner = JobRunner::new(service.clone()).with_timer(timer.clone());

    let err = runner
        .run(&sample_request(), &options().with_max_attempts(7))
        .await
        .unwrap_err();

    let JobError::PollingTimeout { handle, attempts } = &err else {
        panic!("expected timeout, got {err:?}");
    };
    assert_eq!(handle, &JobHandle::from("abc-123"));
    assert_eq!(*attempts, 7);
    assert_eq!(err.handle(), Some(&JobHandle::from("abc-123")));
    assert_eq!(service.fetch_calls(), 7);
    assert_eq!(timer.count(), 6);
}

#[tokio::test]
async fn zero_attempts_times_out_without_fetching() {
    let service = ScriptedJobService::new("abc-123").then_status(optimal());
    let runner = JobRunner::new(service.clone()).with_timer(RecordingTimer::new());

    let err = runner
        .run(&sample_request(), &options().with_max_attempts(0))
        .await
        .unwrap_err();

    assert!(matches!(err, JobError::PollingTimeout { attempts: 0, .. }));
    assert_eq!(service.submit_calls(), 1);
    assert_eq!(service.fetch_calls(), 0);
}

#[tokio::test]
async fn resume_never_submits() {
    let service = ScriptedJobService::new("ignored")
        .then_running(1)
        .then_status(optimal());
    let runner = JobRunner::new(service.clone()).with_timer(RecordingTimer::new());

    let result = runner
        .run(&sample_request(), &options().resume_from("abc-123"))
        .await
        .unwrap();

    assert_eq!(result.handle, JobHandle::from("abc-123"));
    assert_eq!(service.submit_calls(), 0);
    let resumed = JobHandle::from("abc-123");
    assert_eq!(service.fetched_handles(), [resumed.clone(), resumed]);
}

#[tokio::test]
async fn resume_after_timeout_picks_up_the_same_job() {
    let service = ScriptedJobService::new("abc-123")
        .then_running(3)
        .then_status(optimal());
    let runner = JobRunner::new(service.clone()).with_timer(RecordingTimer::new());

    let err = runner
        .run(&sample_request(), &options().with_max_attempts(2))
        .await
        .unwrap_err();
    let handle = err.handle().cloned().unwrap();

    let result = runner.resume(&handle, &options()).await.unwrap();

    assert!(result.is_success());
    assert_eq!(service.submit_calls(), 1);
    assert_eq!(service.fetch_calls(), 4);
}

#[tokio::test]
async fn terminal_read_is_idempotent() {
    let service = ScriptedJobService::new("abc-123").otherwise(optimal());
    let runner = JobRunner::new(service.clone()).with_timer(RecordingTimer::new());
    let handle = JobHandle::from("abc-123");

    let first = runner.resume(&handle, &options()).await.unwrap();
    let second = runner.resume(&handle, &options()).await.unwrap();

    assert_eq!(first.outcome, second.outcome);
    assert_eq!(service.submit_calls(), 0);
    assert_eq!(service.fetch_calls(), 2);
}

#[tokio::test]
async fn failed_job_is_a_terminal_result() {
    let service = ScriptedJobService::new("abc-123").then_document(json!({
        "status": "error",
        "messages": { "errors": "Site.latitude out of range" }
    }));
    let hook = RecordingHook::new();
    let runner = JobRunner::new(service.clone())
        .with_timer(RecordingTimer::new())
        .with_hook(hook.clone());

    let result = runner.run(&sample_request(), &options()).await.unwrap();

    assert_eq!(
        result.outcome,
        JobOutcome::Failed("Site.latitude out of range".into())
    );
    assert_eq!(service.fetch_calls(), 1);
    assert_eq!(hook.completed().len(), 1);
    assert!(summarize(&result).is_empty());
}

#[tokio::test]
async fn unknown_statuses_keep_polling() {
    let service = ScriptedJobService::new("abc-123")
        .then_document(json!({ "status": "Optimizing..." }))
        .then_document(json!({ "status": "warming-up" }))
        .then_status(optimal());
    let runner = JobRunner::new(service.clone()).with_timer(RecordingTimer::new());

    runner.run(&sample_request(), &options()).await.unwrap();
    assert_eq!(service.fetch_calls(), 3);
}

#[tokio::test]
async fn submit_failure_is_terminal_for_the_run() {
    let service = ScriptedJobService::new("abc-123").fail_submit(JobError::Rejected {
        status: 400,
        payload: "{\"messages\":{\"errors\":\"bad input\"}}".into(),
    });
    let hook = RecordingHook::new();
    let runner = JobRunner::new(service.clone())
        .with_timer(RecordingTimer::new())
        .with_hook(hook.clone());

    let err = runner.run(&sample_request(), &options()).await.unwrap_err();

    assert!(matches!(err, JobError::Rejected { status: 400, .. }));
    assert_eq!(service.submit_calls(), 1);
    assert_eq!(service.fetch_calls(), 0);
    assert!(hook.submitted().is_empty());
}

#[tokio::test]
async fn transport_error_while_polling_propagates() {
    let service = ScriptedJobService::new("abc-123")
        .then_running(1)
        .then_error(JobError::Transport("connection reset".into()))
        .then_status(optimal());
    let timer = RecordingTimer::new();
    let runner = JobRunner::new(service.clone()).with_timer(timer.clone());

    let err = runner.run(&sample_request(), &options()).await.unwrap_err();

    assert!(matches!(err, JobError::Transport(_)));
    assert_eq!(service.fetch_calls(), 2);
    assert_eq!(timer.count(), 1);
}

#[tokio::test]
async fn hook_sees_submission_and_completion() {
    let service = ScriptedJobService::new("abc-123").then_status(optimal());
    let hook = RecordingHook::new();
    let runner = JobRunner::new(service)
        .with_timer(RecordingTimer::new())
        .with_hook(hook.clone());

    runner.run(&sample_request(), &options()).await.unwrap();

    assert_eq!(hook.submitted(), [JobHandle::from("abc-123")]);
    assert_eq!(hook.completed()[0].handle, JobHandle::from("abc-123"));
}

#[tokio::test]
async fn completion_hook_failure_propagates() {
    let service = ScriptedJobService::new("abc-123").then_status(optimal());
    let runner = JobRunner::new(service)
        .with_timer(RecordingTimer::new())
        .with_hook(RecordingHook::failing());

    let err = runner.run(&sample_request(), &options()).await.unwrap_err();
    assert!(matches!(err, JobError::Hook(_)));
}

#[tokio::test]
async fn store_hook_persists_request_and_result() {
    let store = MemoryStore::new();
    let service = ScriptedJobService::new("abc-123").then_status(optimal());
    let runner = JobRunner::new(service)
        .with_timer(RecordingTimer::new())
        .with_hook(StoreHook::new(store.clone()));

    let result = runner.run(&sample_request(), &options()).await.unwrap();

    let request = store.load(Category::Request, "abc-123").await.unwrap();
    assert_eq!(&request, sample_request().as_value());

    let cached = runner
        .hook()
        .cached(&"abc-123".into())
        .await
        .unwrap()
        .expect("result should be stored");
    assert_eq!(cached.outcome, result.outcome);
    assert_eq!(cached.finished_at, result.finished_at);

    assert!(runner.hook().cached(&"other".into()).await.unwrap().is_none());
}

#[tokio::test]
async fn stored_result_is_scoped_to_its_service() {
    let store = MemoryStore::new();
    let service = ScriptedJobService::new("abc-123").then_status(optimal());
    let runner = JobRunner::new(service)
        .with_timer(RecordingTimer::new())
        .with_hook(StoreHook::new(store.clone()).for_service("https://a.example/api"));

    runner.run(&sample_request(), &options()).await.unwrap();

    let same = StoreHook::new(store.clone()).for_service("https://a.example/api");
    assert!(same.cached(&"abc-123".into()).await.unwrap().is_some());

    let other = StoreHook::new(store.clone()).for_service("https://b.example/api");
    assert!(other.cached(&"abc-123".into()).await.unwrap().is_none());

    let unscoped = StoreHook::new(store);
    assert!(unscoped.cached(&"abc-123".into()).await.unwrap().is_none());
}

#[tokio::test]
async fn example_scenario() {
    let service = ScriptedJobService::new("abc-123")
        .then_document(json!({ "status": "Running" }))
        .then_document(json!({ "status": "Running" }))
        .then_document(json!({
            "status": "optimal",
            "outputs": { "Financial": { "npv": 50000 } }
        }));
    let timer = RecordingTimer::new();
    let runner = JobRunner::new(service.clone()).with_timer(timer.clone());

    let result = runner.run(&sample_request(), &options()).await.unwrap();

    assert_eq!(result.handle, JobHandle::from("abc-123"));
    assert!(matches!(result.outcome, JobOutcome::Completed(_)));
    assert_eq!(summarize(&result).get("npv"), Some(50000.0));
    assert_eq!(service.fetch_calls(), 3);
    assert_eq!(timer.count(), 2);
}
