// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trainer rosters and nearby-trainer discovery.

use geo::Point;

mod common;
use common::{create_test_app, seed_student, seed_trainer};

#[tokio::test]
async fn test_roster_lists_only_own_students() {
    let app = create_test_app();
    seed_trainer(&app.store, "uid-t1", "TR100200", "Coach One");
    seed_trainer(&app.store, "uid-t2", "TR300400", "Coach Two");
    seed_student(&app.store, "uid-s1", "111111", "TR100200", "Zoe");
    seed_student(&app.store, "uid-s2", "222222", "TR100200", "Ana");
    seed_student(&app.store, "uid-s3", "333333", "TR300400", "Raj");

    let roster = app.state.roster.students_for_trainer("TR100200").await.unwrap();

    let names: Vec<_> = roster.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Ana", "Zoe"]);
    assert!(app
        .state
        .roster
        .students_for_trainer("TR999999")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_nearby_trainers_within_radius() {
    let app = create_test_app();
    // Both seeded at downtown Palo Alto
    seed_trainer(&app.store, "uid-t1", "TR100200", "Coach One");
    seed_trainer(&app.store, "uid-t2", "TR300400", "Coach Two");

    let close = Point::new(-122.1450, 37.4430);
    let nearby = app.state.roster.nearby_trainers(close, 1_000.0).await.unwrap();
    assert_eq!(nearby.len(), 2);
    assert!(nearby.iter().all(|t| t.distance_m < 1_000.0));

    // San Francisco is ~45 km away
    let far = Point::new(-122.4194, 37.7749);
    assert!(app.state.roster.nearby_trainers(far, 5_000.0).await.unwrap().is_empty());
}
