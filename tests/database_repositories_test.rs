// ABOUTME: Integration tests for the SQLite repositories and their guarded updates
// ABOUTME: Covers workload bounds, request transitions, ordering, and transactional assignment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use mentorship_server::{
    database::repositories::{
        LearningRepository, LearningRepositoryImpl, MentorRepository, MentorRepositoryImpl,
        RequestRepository, RequestRepositoryImpl, UserRepository, UserRepositoryImpl,
    },
    errors::ErrorCode,
    models::{LearningProcess, NewMentor, NewUser, RequestStatus, TrainingRequest, User},
    permissions::UserRole,
};
use uuid::Uuid;

fn new_user(email: &str) -> User {
    NewUser::new("Repo User", email, UserRole::Employee, None, None, None)
        .unwrap()
        .into_user("$2b$04$not-a-real-hash".to_owned())
}

fn new_mentor(name: &str) -> mentorship_server::models::Mentor {
    NewMentor {
        name: name.to_owned(),
        job_title: "Staff Engineer".to_owned(),
        experience: None,
        email: format!("{}@example.com", name.to_lowercase()),
        telegram: None,
    }
    .validated()
    .unwrap()
    .into_mentor()
}

#[tokio::test]
async fn test_user_email_is_unique() {
    let db = common::create_test_database().await.unwrap();
    let users = UserRepositoryImpl::new(db);

    users.create(&new_user("dup@example.com")).await.unwrap();
    let err = users
        .create(&new_user("dup@example.com"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::UserAlreadyExists);

    let found = users.get_by_email("dup@example.com").await.unwrap().unwrap();
    assert_eq!(found.name, "Repo User");
    assert_eq!(found.role, UserRole::Employee);
}

#[tokio::test]
async fn test_user_update_unknown_is_not_found() {
    let db = common::create_test_database().await.unwrap();
    let users = UserRepositoryImpl::new(db);

    let err = users.update(&new_user("ghost@example.com")).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_workload_stays_within_bounds() {
    let db = common::create_test_database().await.unwrap();
    let mentors = MentorRepositoryImpl::new(db);
    let mentor = new_mentor("Bounded");
    mentors.create(&mentor).await.unwrap();

    for expected in 1..=5 {
        assert_eq!(mentors.increment_workload(mentor.id).await.unwrap(), expected);
    }

    let err = mentors.increment_workload(mentor.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::MentorNotAvailable);
    assert_eq!(mentors.get_by_id(mentor.id).await.unwrap().unwrap().workload, 5);

    for expected in (0..5).rev() {
        assert_eq!(mentors.decrement_workload(mentor.id).await.unwrap(), expected);
    }
    assert_eq!(mentors.decrement_workload(mentor.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_workload_on_unknown_mentor_is_not_found() {
    let db = common::create_test_database().await.unwrap();
    let mentors = MentorRepositoryImpl::new(db);

    let err = mentors.increment_workload(Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_mentor_list_ordering_and_ceiling() {
    let db = common::create_test_database().await.unwrap();
    let mentors = MentorRepositoryImpl::new(db);

    let mut busy = new_mentor("Busy");
    busy.workload = 5;
    let mut zed = new_mentor("Zed");
    zed.workload = 1;
    let mut amy = new_mentor("Amy");
    amy.workload = 1;
    let idle = new_mentor("Idle");
    for m in [&busy, &zed, &amy, &idle] {
        mentors.create(m).await.unwrap();
    }

    let all: Vec<String> = mentors
        .list(None)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.name)
        .collect();
    assert_eq!(all, ["Idle", "Amy", "Zed", "Busy"]);

    let available: Vec<String> = mentors
        .list(Some(4))
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.name)
        .collect();
    assert_eq!(available, ["Idle", "Amy", "Zed"]);
}

#[tokio::test]
async fn test_request_transition_is_guarded() {
    let db = common::create_test_database().await.unwrap();
    let users = UserRepositoryImpl::new(db.clone());
    let requests = RequestRepositoryImpl::new(db);

    let user = new_user("req@example.com");
    users.create(&user).await.unwrap();
    let request = TrainingRequest::new(user.id, "Rust", "ownership").unwrap();
    requests.create(&request).await.unwrap();

    requests
        .transition_from_pending(request.id, RequestStatus::Approved)
        .await
        .unwrap();
    let err = requests
        .transition_from_pending(request.id, RequestStatus::Rejected)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidStateTransition);

    let stored = requests.get_by_id(request.id).await.unwrap().unwrap();
    assert_eq!(stored.status, RequestStatus::Approved);
}

#[tokio::test]
async fn test_requests_listed_newest_first() {
    let db = common::create_test_database().await.unwrap();
    let users = UserRepositoryImpl::new(db.clone());
    let requests = RequestRepositoryImpl::new(db);

    let user = new_user("order@example.com");
    users.create(&user).await.unwrap();
    let first = TrainingRequest::new(user.id, "First", "one").unwrap();
    let second = TrainingRequest::new(user.id, "Second", "two").unwrap();
    requests.create(&first).await.unwrap();
    requests.create(&second).await.unwrap();

    let mine = requests.list_by_user(user.id).await.unwrap();
    assert_eq!(mine.len(), 2);
    assert_eq!(mine[0].id, second.id);
    assert_eq!(mine[1].id, first.id);

    requests
        .transition_from_pending(first.id, RequestStatus::Rejected)
        .await
        .unwrap();
    let pending = requests.list(Some(RequestStatus::Pending)).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, second.id);
}

#[tokio::test]
async fn test_assignment_rolls_back_when_mentor_is_full() {
    let db = common::create_test_database().await.unwrap();
    let users = UserRepositoryImpl::new(db.clone());
    let mentors = MentorRepositoryImpl::new(db.clone());
    let requests = RequestRepositoryImpl::new(db.clone());
    let learnings = LearningRepositoryImpl::new(db);

    let user = new_user("rollback@example.com");
    users.create(&user).await.unwrap();
    let mut mentor = new_mentor("Full");
    mentor.workload = 5;
    mentors.create(&mentor).await.unwrap();
    let request = TrainingRequest::new(user.id, "Go", "basics").unwrap();
    requests.create(&request).await.unwrap();

    let learning = LearningProcess::start(request.id, user.id, mentor.id);
    let err = learnings
        .create_with_assignment(&learning, true)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::MentorNotAvailable);

    // Approval and insert were both rolled back
    let stored = requests.get_by_id(request.id).await.unwrap().unwrap();
    assert_eq!(stored.status, RequestStatus::Pending);
    assert!(learnings.get_by_request_id(request.id).await.unwrap().is_none());
    assert_eq!(mentors.get_by_id(mentor.id).await.unwrap().unwrap().workload, 5);
}

#[tokio::test]
async fn test_assignment_and_completion_commit_together() {
    let db = common::create_test_database().await.unwrap();
    let users = UserRepositoryImpl::new(db.clone());
    let mentors = MentorRepositoryImpl::new(db.clone());
    let requests = RequestRepositoryImpl::new(db.clone());
    let learnings = LearningRepositoryImpl::new(db);

    let user = new_user("commit@example.com");
    users.create(&user).await.unwrap();
    let mentor = new_mentor("Commit");
    mentors.create(&mentor).await.unwrap();
    let request = TrainingRequest::new(user.id, "Go", "basics").unwrap();
    requests.create(&request).await.unwrap();

    let mut learning = LearningProcess::start(request.id, user.id, mentor.id);
    assert_eq!(learnings.create_with_assignment(&learning, true).await.unwrap(), 1);
    assert_eq!(
        requests.get_by_id(request.id).await.unwrap().unwrap().status,
        RequestStatus::Approved
    );

    // A second process for the same request violates the unique constraint
    let duplicate = LearningProcess::start(request.id, user.id, mentor.id);
    let err = learnings
        .create_with_assignment(&duplicate, false)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::LearningAlreadyExists);
    assert_eq!(mentors.get_by_id(mentor.id).await.unwrap().unwrap().workload, 1);

    learning.complete(4, "useful").unwrap();
    assert_eq!(learnings.complete(&learning).await.unwrap(), 0);

    // Completing twice hits the status guard
    let err = learnings.complete(&learning).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::LearningNotActive);
    assert_eq!(mentors.get_by_id(mentor.id).await.unwrap().unwrap().workload, 0);

    let stored = learnings.get_by_id(learning.id).await.unwrap().unwrap();
    assert!(!stored.is_active());
    assert_eq!(stored.feedback.unwrap().rating, 4);
    assert!(stored.end_date.is_some());
}

#[tokio::test]
async fn test_plan_update_on_completed_process_is_rejected() {
    let db = common::create_test_database().await.unwrap();
    let users = UserRepositoryImpl::new(db.clone());
    let mentors = MentorRepositoryImpl::new(db.clone());
    let requests = RequestRepositoryImpl::new(db.clone());
    let learnings = LearningRepositoryImpl::new(db);

    let user = new_user("plan@example.com");
    users.create(&user).await.unwrap();
    let mentor = new_mentor("Planner");
    mentors.create(&mentor).await.unwrap();
    let request = TrainingRequest::new(user.id, "Go", "basics").unwrap();
    requests.create(&request).await.unwrap();

    let mut learning = LearningProcess::start(request.id, user.id, mentor.id);
    learnings.create_with_assignment(&learning, true).await.unwrap();

    learning.add_plan_item("read the book").unwrap();
    learnings.update_plan(learning.id, &learning.plan).await.unwrap();

    let details = learnings.get_details(learning.id).await.unwrap().unwrap();
    assert_eq!(details.learning.plan.len(), 1);
    assert_eq!(details.request.topic, "Go");
    assert_eq!(details.user.name, "Repo User");
    assert_eq!(details.mentor.name, "Planner");

    learning.complete(5, "done").unwrap();
    learnings.complete(&learning).await.unwrap();

    let err = learnings.update_plan(learning.id, &[]).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::LearningNotActive);
    let err = learnings
        .update_notes(learning.id, Some("late"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::LearningNotActive);

    let err = learnings.update_plan(Uuid::new_v4(), &[]).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);

    let stored = learnings.get_by_id(learning.id).await.unwrap().unwrap();
    assert_eq!(stored.plan.len(), 1);
    assert!(stored.notes.is_none());
}
