// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trainer and student account creation.

use trainhub::db::collections;
use trainhub::error::{AppError, AuthError};
use trainhub::services::ids::{is_student_id, is_trainer_id};
use trainhub::services::validation::{StudentSignUpForm, TrainerSignUpForm, ValidationError};
use trainhub::services::AuthProvider;

mod common;
use common::{create_test_app, seed_trainer};

fn trainer_form(email: &str, trainer_id: &str) -> TrainerSignUpForm {
    TrainerSignUpForm {
        name: "Coach Carter".to_string(),
        age: "42".to_string(),
        sports: "Basketball".to_string(),
        mobile: "+15551234567".to_string(),
        email: email.to_string(),
        password: "hoops42".to_string(),
        confirm_password: "hoops42".to_string(),
        gender: "Male".to_string(),
        about_me: "Richmond High".to_string(),
        experience: "12".to_string(),
        trainer_id: trainer_id.to_string(),
        latitude: "37.9358".to_string(),
        longitude: "-122.3477".to_string(),
        radius: "500".to_string(),
    }
}

fn student_form(email: &str, trainer_id: &str) -> StudentSignUpForm {
    StudentSignUpForm {
        full_name: "Timo Cruz".to_string(),
        age: "17".to_string(),
        email: email.to_string(),
        password: "layup17".to_string(),
        confirm_password: "layup17".to_string(),
        trainer_id: trainer_id.to_string(),
        sport: "Basketball".to_string(),
        gender: "Male".to_string(),
        emergency_contact: "5559876543".to_string(),
        student_id: "246810".to_string(),
    }
}

#[tokio::test]
async fn test_trainer_sign_up_writes_full_profile() {
    let app = create_test_app();
    let trainer_id = app.state.signup.generate_trainer_id().await.unwrap();
    assert!(is_trainer_id(&trainer_id));

    let created = app
        .state
        .signup
        .sign_up_trainer(&trainer_form("carter@example.com", &trainer_id))
        .await
        .unwrap();

    let stored = app.store.document(collections::TRAINERS, &created.uid).unwrap();
    assert_eq!(stored["trainerID"], trainer_id.as_str());
    assert_eq!(stored["sports"], "Basketball");
    assert_eq!(stored["experience"], 12);
    assert_eq!(stored["location"]["radius"], 500.0);
    assert!(app.store.document(collections::STUDENTS, &created.uid).is_none());
    assert_eq!(created.profile.name, "Coach Carter");
}

#[tokio::test]
async fn test_student_with_unknown_trainer_creates_no_identity() {
    let app = create_test_app();
    seed_trainer(&app.store, "uid-t", "TR100200", "Coach");

    let result = app
        .state
        .signup
        .sign_up_student(&student_form("timo@example.com", "TR999999"))
        .await;

    let err = result.unwrap_err();
    assert!(matches!(
        err,
        AppError::Validation(ValidationError::TrainerNotFound)
    ));
    assert_eq!(
        err.user_message(),
        "Trainer ID not found. Please check and try again."
    );
    assert!(app.auth.current_identity().is_none());
    assert!(app.auth.sign_in("timo@example.com", "layup17").await.is_err());
}

#[tokio::test]
async fn test_student_sign_up_records_trainer_name() {
    let app = create_test_app();
    seed_trainer(&app.store, "uid-t", "TR100200", "Coach Carter");

    let created = app
        .state
        .signup
        .sign_up_student(&student_form("timo@example.com", "TR100200"))
        .await
        .unwrap();

    assert_eq!(created.profile.trainer_name, "Coach Carter");
    let stored = app.store.document(collections::STUDENTS, &created.uid).unwrap();
    assert_eq!(stored["trainerID"], "TR100200");
    assert_eq!(stored["studentID"], "246810");
    assert_eq!(stored["trainerName"], "Coach Carter");
}

#[tokio::test]
async fn test_invalid_form_stops_before_auth() {
    let app = create_test_app();
    let mut form = trainer_form("carter@example.com", "TR100200");
    form.age = "3".to_string();
    form.confirm_password = "different".to_string();

    let err = app.state.signup.sign_up_trainer(&form).await.unwrap_err();

    assert!(matches!(
        err,
        AppError::Validation(ValidationError::Age { min: 18, max: 100 })
    ));
    assert!(app.auth.current_identity().is_none());
}

#[tokio::test]
async fn test_email_in_use() {
    let app = create_test_app();
    app.auth.register("carter@example.com", "whatever");

    let err = app
        .state
        .signup
        .sign_up_trainer(&trainer_form("carter@example.com", "TR100200"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Auth(AuthError::EmailInUse)));
    assert_eq!(
        err.user_message(),
        "This email is already registered. Please log in instead."
    );
}

#[tokio::test]
async fn test_profile_write_failure_leaves_identity() {
    let app = create_test_app();
    app.store.set_fail_writes(true);

    let err = app
        .state
        .signup
        .sign_up_trainer(&trainer_form("carter@example.com", "TR100200"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Database(_)));
    // The identity was created and stays signed in without a profile
    let identity = app.auth.current_identity().unwrap();
    assert!(app.store.document(collections::TRAINERS, &identity.uid).is_none());
}

#[tokio::test]
async fn test_generated_student_id_pattern() {
    let app = create_test_app();
    for _ in 0..20 {
        let id = app.state.signup.generate_student_id().await.unwrap();
        assert!(is_student_id(&id));
    }
}
