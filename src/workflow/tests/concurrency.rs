use std::sync::Barrier;
use std::thread;

use chrono::Utc;
use futures::executor::block_on;

use super::common::*;
use crate::model::leave_application::{
    ApplicationStatus, LeaveApplication, NewLeaveApplication,
};
use crate::workflow::{
    Actor, ApplicationScope, ApplicationStore, LeaveAction, LeaveWorkflow, StatusPatch,
    StoreError, WorkflowError,
};

#[test]
fn concurrent_approvals_apply_exactly_once() {
    const CONTENDERS: usize = 8;

    let workflow = workflow();
    let app = block_on(workflow.create_application(
        &Actor::student(STUDENT, "CSE", 2, "A"),
        STUDENT,
        request(date(2024, 3, 1), date(2024, 3, 3)),
    ))
    .expect("create");

    let barrier = Barrier::new(CONTENDERS);
    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..CONTENDERS)
            .map(|_| {
                scope.spawn(|| {
                    let faculty = Actor::faculty(FACULTY, "CSE", 2, "A");
                    barrier.wait();
                    block_on(workflow.transition(&faculty, app.id, LeaveAction::Approve, None))
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("thread panicked"))
            .collect()
    });

    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1, "results: {results:?}");
    assert!(
        results
            .iter()
            .filter(|r| r.is_err())
            .all(|r| matches!(r, Err(WorkflowError::InvalidTransition { .. })))
    );
    assert_eq!(
        workflow.store().snapshot(app.id).unwrap().status,
        ApplicationStatus::PendingHod
    );
}

#[test]
fn conditional_update_rejects_stale_precondition() {
    let store = MemoryStore::default();
    store.overwrite(application(1, STUDENT, FACULTY, HOD, "CSE"));
    let patch = StatusPatch {
        status: ApplicationStatus::PendingHod,
        rejection_reason: None,
        updated_at: Utc::now(),
    };

    let first = block_on(store.conditional_update(1, ApplicationStatus::PendingFaculty, &patch));
    let second = block_on(store.conditional_update(1, ApplicationStatus::PendingFaculty, &patch));

    assert!(first.unwrap());
    assert!(!second.unwrap());
}

/// Lets another reviewer's decision land between the engine's read and its write.
struct RacingStore {
    inner: MemoryStore,
    interloper: StatusPatch,
}

impl ApplicationStore for RacingStore {
    async fn insert(&self, new: NewLeaveApplication) -> Result<LeaveApplication, StoreError> {
        self.inner.insert(new).await
    }

    async fn get(&self, id: u64) -> Result<Option<LeaveApplication>, StoreError> {
        self.inner.get(id).await
    }

    async fn find(&self, scope: &ApplicationScope) -> Result<Vec<LeaveApplication>, StoreError> {
        self.inner.find(scope).await
    }

    async fn conditional_update(
        &self,
        id: u64,
        expected: ApplicationStatus,
        patch: &StatusPatch,
    ) -> Result<bool, StoreError> {
        self.inner
            .conditional_update(id, expected, &self.interloper)
            .await?;
        self.inner.conditional_update(id, expected, patch).await
    }
}

/// Lets the next reviewer act right after a successful write, before the
/// engine has answered.
struct EagerHodStore {
    inner: MemoryStore,
}

impl ApplicationStore for EagerHodStore {
    async fn insert(&self, new: NewLeaveApplication) -> Result<LeaveApplication, StoreError> {
        self.inner.insert(new).await
    }

    async fn get(&self, id: u64) -> Result<Option<LeaveApplication>, StoreError> {
        self.inner.get(id).await
    }

    async fn find(&self, scope: &ApplicationScope) -> Result<Vec<LeaveApplication>, StoreError> {
        self.inner.find(scope).await
    }

    async fn conditional_update(
        &self,
        id: u64,
        expected: ApplicationStatus,
        patch: &StatusPatch,
    ) -> Result<bool, StoreError> {
        let applied = self.inner.conditional_update(id, expected, patch).await?;
        if applied && patch.status == ApplicationStatus::PendingHod {
            let approval = StatusPatch {
                status: ApplicationStatus::Approved,
                rejection_reason: None,
                updated_at: patch.updated_at + chrono::Duration::seconds(1),
            };
            self.inner
                .conditional_update(id, ApplicationStatus::PendingHod, &approval)
                .await?;
        }
        Ok(applied)
    }
}

#[actix_web::test]
async fn lost_race_reports_invalid_transition_and_keeps_winner() {
    let store = RacingStore {
        inner: MemoryStore::default(),
        interloper: StatusPatch {
            status: ApplicationStatus::Rejected,
            rejection_reason: Some("duplicate request".to_string()),
            updated_at: Utc::now(),
        },
    };
    let workflow = LeaveWorkflow::new(store, directory());
    let app = workflow
        .create_application(
            &Actor::student(STUDENT, "CSE", 2, "A"),
            STUDENT,
            request(date(2024, 3, 1), date(2024, 3, 1)),
        )
        .await
        .unwrap();

    let result = workflow
        .transition(
            &Actor::faculty(FACULTY, "CSE", 2, "A"),
            app.id,
            LeaveAction::Approve,
            None,
        )
        .await;

    assert!(matches!(
        result,
        Err(WorkflowError::InvalidTransition {
            from: ApplicationStatus::PendingFaculty,
            action: LeaveAction::Approve,
        })
    ));
    let stored = workflow.store().inner.snapshot(app.id).unwrap();
    assert_eq!(stored.status, ApplicationStatus::Rejected);
    assert_eq!(stored.rejection_reason.as_deref(), Some("duplicate request"));
    assert_status_invariant(&stored);
}

#[actix_web::test]
async fn transition_answers_with_its_own_write() {
    let workflow = LeaveWorkflow::new(
        EagerHodStore {
            inner: MemoryStore::default(),
        },
        directory(),
    );
    let app = workflow
        .create_application(
            &Actor::student(STUDENT, "CSE", 2, "A"),
            STUDENT,
            request(date(2024, 3, 1), date(2024, 3, 2)),
        )
        .await
        .unwrap();

    let forwarded = workflow
        .transition(
            &Actor::faculty(FACULTY, "CSE", 2, "A"),
            app.id,
            LeaveAction::Approve,
            None,
        )
        .await
        .unwrap();

    assert_eq!(forwarded.status, ApplicationStatus::PendingHod);
    assert_eq!(forwarded.reason, app.reason);
    assert_eq!(forwarded.created_at, app.created_at);
    assert_status_invariant(&forwarded);

    let stored = workflow.store().inner.snapshot(app.id).unwrap();
    assert_eq!(stored.status, ApplicationStatus::Approved);
    assert!(stored.updated_at > forwarded.updated_at);
}
