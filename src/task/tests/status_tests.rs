//! Unit tests for task status transition rules.

use crate::task::domain::{TaskDomainError, TaskId, TaskKind, TaskRecord, TaskStatus};
use eyre::{bail, ensure};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use serde_json::json;
use uuid::Uuid;

const ALL_STATUSES: [TaskStatus; 4] = [
    TaskStatus::Pending,
    TaskStatus::Success,
    TaskStatus::Failure,
    TaskStatus::Revoked,
];

#[fixture]
fn clock() -> DefaultClock {
    DefaultClock
}

#[fixture]
fn pending_record(clock: DefaultClock) -> TaskRecord {
    TaskRecord::new(
        TaskId::new(),
        TaskKind::PackageIngestion {
            package_id: Uuid::new_v4(),
        },
        &clock,
    )
}

#[rstest]
#[case(TaskStatus::Pending, TaskStatus::Pending, false)]
#[case(TaskStatus::Pending, TaskStatus::Success, true)]
#[case(TaskStatus::Pending, TaskStatus::Failure, true)]
#[case(TaskStatus::Pending, TaskStatus::Revoked, true)]
#[case(TaskStatus::Success, TaskStatus::Failure, false)]
#[case(TaskStatus::Success, TaskStatus::Revoked, false)]
#[case(TaskStatus::Failure, TaskStatus::Success, false)]
#[case(TaskStatus::Revoked, TaskStatus::Success, false)]
#[case(TaskStatus::Revoked, TaskStatus::Pending, false)]
fn can_transition_to_returns_expected(
    #[case] from: TaskStatus,
    #[case] to: TaskStatus,
    #[case] expected: bool,
) {
    assert_eq!(from.can_transition_to(to), expected);
}

#[rstest]
#[case("pending", TaskStatus::Pending)]
#[case(" SUCCESS ", TaskStatus::Success)]
#[case("failure", TaskStatus::Failure)]
#[case("Revoked", TaskStatus::Revoked)]
fn status_parses_from_storage_value(#[case] raw: &str, #[case] expected: TaskStatus) {
    assert_eq!(TaskStatus::try_from(raw), Ok(expected));
}

#[rstest]
fn unknown_status_string_is_rejected() {
    assert!(TaskStatus::try_from("running").is_err());
}

#[rstest]
fn new_record_is_pending_without_completion_time(pending_record: TaskRecord) {
    assert_eq!(pending_record.status(), TaskStatus::Pending);
    assert!(pending_record.completed_at().is_none());
    assert!(pending_record.result().is_none());
}

#[rstest]
fn complete_stores_payload_verbatim(
    clock: DefaultClock,
    mut pending_record: TaskRecord,
) -> eyre::Result<()> {
    let payload = json!({"package_id": "abc", "nested": {"n": 1}});

    pending_record.complete(true, payload.clone(), &clock)?;

    ensure!(pending_record.status() == TaskStatus::Success);
    ensure!(pending_record.result() == Some(&payload));
    ensure!(pending_record.completed_at().is_some());
    Ok(())
}

#[rstest]
#[case(TaskStatus::Success)]
#[case(TaskStatus::Failure)]
#[case(TaskStatus::Revoked)]
fn terminal_record_rejects_every_transition(
    #[case] terminal: TaskStatus,
    clock: DefaultClock,
    mut pending_record: TaskRecord,
) -> eyre::Result<()> {
    match terminal {
        TaskStatus::Revoked => pending_record.mark_revoked(&clock)?,
        other => pending_record.complete(other == TaskStatus::Success, json!({}), &clock)?,
    }
    let completed_at = pending_record.completed_at();

    for target in ALL_STATUSES {
        let result = match target {
            TaskStatus::Revoked => pending_record.mark_revoked(&clock),
            TaskStatus::Pending => continue,
            other => pending_record.complete(other == TaskStatus::Success, json!({}), &clock),
        };
        let expected = Err(TaskDomainError::InvalidTransition {
            task_id: pending_record.id(),
            from: terminal,
            to: target,
        });
        if result != expected {
            bail!("expected {expected:?}, got {result:?}");
        }
    }

    ensure!(pending_record.status() == terminal);
    ensure!(pending_record.completed_at() == completed_at);
    Ok(())
}
