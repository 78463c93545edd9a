// ABOUTME: Integration tests for registration, login, tokens, and user administration
// ABOUTME: Validates credential handling, generic login failures, and role changes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use mentorship_server::{
    errors::ErrorCode,
    models::UserProfileUpdate,
    permissions::UserRole,
    services::RegisterInput,
};

#[tokio::test]
async fn test_register_and_login() {
    let (_db, services) = common::create_test_services().await.unwrap();

    let user = services
        .auth
        .register(common::register_input(
            "Alice",
            " Alice@Example.com ",
            UserRole::Employee,
        ))
        .await
        .unwrap();
    assert_eq!(user.email, "alice@example.com");
    assert_ne!(user.password_hash, common::TEST_PASSWORD);

    let login = services
        .auth
        .login("alice@example.com", common::TEST_PASSWORD)
        .await
        .unwrap();
    assert_eq!(login.user.id, user.id);

    let auth = services.auth.validate_token(&login.token).unwrap();
    assert_eq!(auth.user_id, user.id);
    assert_eq!(auth.email, "alice@example.com");
    assert_eq!(auth.role, UserRole::Employee);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let (_db, services) = common::create_test_services().await.unwrap();
    common::create_test_user(&services, "known@example.com")
        .await
        .unwrap();

    let wrong_password = services
        .auth
        .login("known@example.com", "not-the-password")
        .await
        .unwrap_err();
    let unknown_email = services
        .auth
        .login("nobody@example.com", common::TEST_PASSWORD)
        .await
        .unwrap_err();

    assert_eq!(wrong_password.code, ErrorCode::InvalidCredentials);
    assert_eq!(unknown_email.code, wrong_password.code);
    assert_eq!(unknown_email.message, wrong_password.message);

    let malformed_email = services
        .auth
        .login("not-an-email", common::TEST_PASSWORD)
        .await
        .unwrap_err();
    assert_eq!(malformed_email.code, ErrorCode::InvalidCredentials);
    assert_eq!(malformed_email.message, wrong_password.message);
}

#[tokio::test]
async fn test_register_validation() {
    let (_db, services) = common::create_test_services().await.unwrap();
    common::create_test_user(&services, "taken@example.com")
        .await
        .unwrap();

    let duplicate = services
        .auth
        .register(common::register_input(
            "Other",
            "TAKEN@example.com",
            UserRole::Employee,
        ))
        .await
        .unwrap_err();
    assert_eq!(duplicate.code, ErrorCode::UserAlreadyExists);

    let weak = services
        .auth
        .register(RegisterInput {
            password: "short".to_owned(),
            ..common::register_input("Weak", "weak@example.com", UserRole::Employee)
        })
        .await
        .unwrap_err();
    assert_eq!(weak.code, ErrorCode::WeakPassword);

    let bad_email = services
        .auth
        .register(common::register_input("Bad", "not-an-email", UserRole::Employee))
        .await
        .unwrap_err();
    assert_eq!(bad_email.code, ErrorCode::InvalidEmail);

    let blank_name = services
        .auth
        .register(common::register_input("  ", "blank@example.com", UserRole::Employee))
        .await
        .unwrap_err();
    assert_eq!(blank_name.code, ErrorCode::MissingRequiredField);
}

#[tokio::test]
async fn test_unknown_role_registers_as_employee() {
    let (_db, services) = common::create_test_services().await.unwrap();
    let user = services
        .auth
        .register(RegisterInput {
            role: Some("superuser".to_owned()),
            ..common::register_input("Role", "role@example.com", UserRole::Employee)
        })
        .await
        .unwrap();
    assert_eq!(user.role, UserRole::Employee);
}

#[tokio::test]
async fn test_profile_update_cannot_change_role() {
    let (_db, services) = common::create_test_services().await.unwrap();
    let user = common::create_test_user(&services, "self@example.com")
        .await
        .unwrap();

    let updated = services
        .auth
        .update_profile(
            user.id,
            UserProfileUpdate {
                name: Some("Renamed".to_owned()),
                department: Some(String::new()),
                role: Some("admin".to_owned()),
                ..UserProfileUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Renamed");
    assert!(updated.department.is_none());
    assert_eq!(updated.role, UserRole::Employee);

    let promoted = services
        .auth
        .admin_update_user(
            user.id,
            UserProfileUpdate {
                role: Some("admin".to_owned()),
                ..UserProfileUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(promoted.role, UserRole::Admin);
    assert_eq!(
        services.auth.get_user(user.id).await.unwrap().role,
        UserRole::Admin
    );
}
