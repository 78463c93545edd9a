// ABOUTME: Integration tests for training request creation, review, and editing
// ABOUTME: Only pending requests can be approved or rejected; failures leave status unchanged
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use mentorship_server::{errors::ErrorCode, models::RequestStatus};
use uuid::Uuid;

#[tokio::test]
async fn test_create_request_is_pending_and_trimmed() {
    let (_db, services) = common::create_test_services().await.unwrap();
    let user = common::create_test_user(&services, "a@example.com").await.unwrap();

    let request = services
        .requests
        .create(user.id, "  Go  ", " basics ")
        .await
        .unwrap();
    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(request.topic, "Go");
    assert_eq!(request.description, "basics");
    assert_eq!(request.user_id, user.id);

    let err = services
        .requests
        .create(user.id, "   ", "basics")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingRequiredField);

    let err = services
        .requests
        .create(Uuid::new_v4(), "Go", "basics")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_review_transitions() {
    let (_db, services) = common::create_test_services().await.unwrap();
    let user = common::create_test_user(&services, "a@example.com").await.unwrap();

    let approved = common::create_test_request(&services, &user).await.unwrap();
    services.requests.approve(approved.id).await.unwrap();

    let err = services.requests.approve(approved.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::RequestAlreadyApproved);
    let err = services.requests.reject(approved.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidStateTransition);
    assert_eq!(err.message, "cannot reject an approved request");
    assert_eq!(
        services.requests.get(approved.id).await.unwrap().status,
        RequestStatus::Approved
    );

    let rejected = common::create_test_request(&services, &user).await.unwrap();
    services.requests.reject(rejected.id).await.unwrap();

    let err = services.requests.reject(rejected.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::RequestAlreadyRejected);
    let err = services.requests.approve(rejected.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidStateTransition);
    assert_eq!(
        services.requests.get(rejected.id).await.unwrap().status,
        RequestStatus::Rejected
    );
}

#[tokio::test]
async fn test_update_content_in_any_status() {
    let (_db, services) = common::create_test_services().await.unwrap();
    let user = common::create_test_user(&services, "a@example.com").await.unwrap();
    let request = common::create_test_request(&services, &user).await.unwrap();
    services.requests.approve(request.id).await.unwrap();

    let updated = services
        .requests
        .update(request.id, "Rust", "async")
        .await
        .unwrap();
    assert_eq!(updated.topic, "Rust");
    assert_eq!(updated.status, RequestStatus::Approved);

    let stored = services.requests.get(request.id).await.unwrap();
    assert_eq!(stored.description, "async");
}

#[tokio::test]
async fn test_list_filters() {
    let (_db, services) = common::create_test_services().await.unwrap();
    let alice = common::create_test_user(&services, "alice@example.com")
        .await
        .unwrap();
    let bob = common::create_test_user(&services, "bob@example.com").await.unwrap();

    let a1 = common::create_test_request(&services, &alice).await.unwrap();
    common::create_test_request(&services, &bob).await.unwrap();
    services.requests.approve(a1.id).await.unwrap();

    assert_eq!(services.requests.list_for_user(alice.id).await.unwrap().len(), 1);
    assert_eq!(services.requests.list_all(None).await.unwrap().len(), 2);

    let approved = services
        .requests
        .list_all(Some(RequestStatus::Approved))
        .await
        .unwrap();
    assert_eq!(approved.len(), 1);
    assert_eq!(approved[0].id, a1.id);
}
