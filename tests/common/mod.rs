// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use serde_json::json;
use std::sync::{Arc, Mutex};
use trainhub::config::Config;
use trainhub::db::{collections, Document, FirestoreDb, MemoryCache, MemoryStore};
use trainhub::services::{MemoryAuth, Navigator, Route};
use trainhub::AppState;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// In-memory collaborators plus the app state built on them.
#[allow(dead_code)]
pub struct TestApp {
    pub store: MemoryStore,
    pub auth: MemoryAuth,
    pub cache: Arc<MemoryCache>,
    pub state: AppState,
}

/// Create a test app with in-memory dependencies.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    create_test_app_with(Config::default())
}

#[allow(dead_code)]
pub fn create_test_app_with(config: Config) -> TestApp {
    let store = MemoryStore::new();
    let auth = MemoryAuth::new();
    let cache = Arc::new(MemoryCache::new());
    let state = AppState::new(
        config,
        Arc::new(store.clone()),
        Arc::new(auth.clone()),
        cache.clone(),
    );
    TestApp {
        store,
        auth,
        cache,
        state,
    }
}

#[allow(dead_code)]
fn doc(value: serde_json::Value) -> Document {
    value.as_object().cloned().expect("fixture must be an object")
}

/// Seed a trainer profile under `uid`.
#[allow(dead_code)]
pub fn seed_trainer(store: &MemoryStore, uid: &str, trainer_id: &str, name: &str) {
    store.insert(
        collections::TRAINERS,
        uid,
        doc(json!({
            "name": name,
            "age": 35,
            "sports": "Football",
            "mobile": "5551234567",
            "email": format!("{}@example.com", uid),
            "gender": "Female",
            "aboutMe": "",
            "trainerID": trainer_id,
            "location": {"latitude": 37.4419, "longitude": -122.1430, "radius": 100.0},
            "profileImage": "https://via.placeholder.com/150",
        })),
    );
}

/// Seed a student profile under `uid`.
#[allow(dead_code)]
pub fn seed_student(store: &MemoryStore, uid: &str, student_id: &str, trainer_id: &str, name: &str) {
    store.insert(
        collections::STUDENTS,
        uid,
        doc(json!({
            "name": name,
            "age": 16,
            "email": format!("{}@example.com", uid),
            "trainerID": trainer_id,
            "studentID": student_id,
            "sport": "Cricket",
            "gender": "Male",
            "emergencyContact": "5559876543",
            "image": "https://via.placeholder.com/150",
        })),
    );
}

/// Navigator that records every route it is asked to show.
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

#[allow(dead_code)]
impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.routes.lock().unwrap().len()
    }
}

impl Navigator for RecordingNavigator {
    fn replace(&self, route: Route) {
        self.routes.lock().unwrap().push(route);
    }
}

/// Poll `check` until it holds or a second has passed.
#[allow(dead_code)]
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    check()
}
