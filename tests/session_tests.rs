// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Startup routing: which screen an identity state lands on.

use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use trainhub::config::Config;
use trainhub::db::{collections, ProfileStore};
use trainhub::models::Profile;
use trainhub::services::{AuthProvider, ContextState, MemoryAuth, ProfileDirectory, Route};

mod common;
use common::{create_test_app, create_test_app_with, eventually, seed_student, seed_trainer, RecordingNavigator};

#[tokio::test]
async fn test_signed_out_routes_to_sign_in_after_splash() {
    let config = Config {
        splash_delay: Duration::from_millis(50),
        ..Config::default()
    };
    let app = create_test_app_with(config);
    let resolver = app.state.resolver();

    let started = Instant::now();
    let route = resolver.resolve(None).await;

    assert_eq!(route, Route::SignIn);
    assert!(started.elapsed() >= Duration::from_millis(50));
    assert_eq!(app.store.read_count(), 0, "No profile lookups without an identity");
}

#[tokio::test]
async fn test_trainer_sign_in_routes_to_trainer_home() {
    let app = create_test_app();
    let uid = app.auth.register("coach@example.com", "secret1");
    seed_trainer(&app.store, &uid, "TR100200", "Coach Carter");

    let identity = app.auth.sign_in("coach@example.com", "secret1").await.unwrap();
    let route = app.state.resolver().resolve(Some(&identity)).await;

    let Route::TrainerHome(profile) = route else {
        panic!("expected trainer home, got {:?}", route);
    };
    assert_eq!(profile.trainer_id, "TR100200");
    assert_eq!(profile.sports, "Football");

    // The home screen starts from the same snapshot
    assert_eq!(app.state.trainers.snapshot(), Some(profile));
    assert_eq!(app.state.students.snapshot(), None);
}

#[tokio::test]
async fn test_student_found_after_trainer_miss() {
    let app = create_test_app();
    seed_student(&app.store, "uid-s", "123456", "TR100200", "Sam");
    let identity = MemoryAuth::identity_for("uid-s", "sam@example.com");

    let route = app.state.resolver().resolve(Some(&identity)).await;

    assert!(matches!(route, Route::StudentHome(ref p) if p.student_id == "123456"));
    assert_eq!(app.store.read_count(), 2, "Trainer partition is checked first");
    assert!(matches!(app.state.students.state(), ContextState::Populated(_)));
}

#[tokio::test]
async fn test_identity_without_profile_routes_to_sign_in() {
    let app = create_test_app();
    let identity = MemoryAuth::identity_for("uid-orphan", "orphan@example.com");

    let route = app.state.resolver().resolve(Some(&identity)).await;

    assert_eq!(route, Route::SignIn);
    assert_eq!(app.state.trainers.snapshot(), None);
    assert_eq!(app.state.students.snapshot(), None);
}

#[tokio::test]
async fn test_lookup_failure_routes_to_sign_in() {
    let app = create_test_app();
    seed_trainer(&app.store, "uid-t", "TR100200", "Coach");
    app.store.set_fail_reads(true);
    let identity = MemoryAuth::identity_for("uid-t", "t@example.com");

    let route = app.state.resolver().resolve(Some(&identity)).await;

    assert_eq!(route, Route::SignIn);
}

#[tokio::test]
async fn test_directory_returns_exactly_one_partition() {
    let app = create_test_app();
    seed_trainer(&app.store, "uid-t", "TR100200", "Coach");
    seed_student(&app.store, "uid-s", "654321", "TR100200", "Sam");
    let directory = ProfileDirectory::new(std::sync::Arc::new(app.store.clone()));

    for (uid, want_trainer) in [("uid-t", true), ("uid-s", false)] {
        let profile = directory.find_profile(uid).await.unwrap().unwrap();
        assert_eq!(matches!(profile, Profile::Trainer(_)), want_trainer);

        let in_trainers = app.store.get_document(collections::TRAINERS, uid).await.unwrap().is_some();
        let in_students = app.store.get_document(collections::STUDENTS, uid).await.unwrap().is_some();
        assert!(in_trainers ^ in_students);
    }
    assert!(directory.find_profile("uid-nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn test_run_follows_sign_in_and_sign_out() {
    let app = create_test_app();
    let uid = app.auth.register("coach@example.com", "secret1");
    seed_trainer(&app.store, &uid, "TR100200", "Coach");

    let resolver = app.state.resolver();
    let navigator = RecordingNavigator::default();
    let cancel = CancellationToken::new();
    let watch = app.auth.subscribe();

    let run = resolver.run(watch, &navigator, cancel.clone());
    let drive = async {
        assert!(eventually(|| navigator.len() == 1).await);
        app.auth.sign_in("coach@example.com", "secret1").await.unwrap();
        assert!(eventually(|| navigator.len() == 2).await);
        app.auth.sign_out().await.unwrap();
        assert!(eventually(|| navigator.len() == 3).await);
        cancel.cancel();
    };
    tokio::join!(run, drive);

    let names: Vec<_> = navigator.routes().iter().map(|r| r.name()).collect();
    assert_eq!(names, vec!["sign_in", "trainer_home", "sign_in"]);
}

#[tokio::test]
async fn test_cancelled_run_never_navigates() {
    let config = Config {
        splash_delay: Duration::from_secs(30),
        ..Config::default()
    };
    let app = create_test_app_with(config);
    let resolver = app.state.resolver();
    let navigator = RecordingNavigator::default();
    let cancel = CancellationToken::new();

    let run = resolver.run(app.auth.subscribe(), &navigator, cancel.clone());
    let stop = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();
    };
    tokio::join!(run, stop);

    assert_eq!(navigator.len(), 0);
}

#[tokio::test]
async fn test_sign_out_clears_both_contexts() {
    let app = create_test_app();
    seed_trainer(&app.store, "uid-t", "TR100200", "Coach");
    let identity = MemoryAuth::identity_for("uid-t", "t@example.com");
    let resolver = app.state.resolver();

    resolver.resolve(Some(&identity)).await;
    assert!(app.state.trainers.snapshot().is_some());

    let route = resolver.resolve(None).await;

    assert_eq!(route, Route::SignIn);
    assert_eq!(app.state.trainers.snapshot(), None);
    assert_eq!(app.state.students.snapshot(), None);
    assert_eq!(app.state.trainers.state(), ContextState::Empty);
    assert_eq!(app.state.students.state(), ContextState::Empty);
}
