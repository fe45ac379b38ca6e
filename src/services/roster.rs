// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trainer rosters and location-based trainer discovery.

use geo::{Distance, Haversine, Point};
use std::sync::Arc;

use crate::db::{collections, from_document, ProfileStore};
use crate::error::Result;
use crate::models::{StudentProfile, TrainerProfile};

/// A trainer and how far they are from the search point.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyTrainer {
    pub profile: TrainerProfile,
    pub distance_m: f64,
}

#[derive(Clone)]
pub struct RosterService {
    store: Arc<dyn ProfileStore>,
}

impl RosterService {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    /// Students who signed up with `trainer_id`, by name.
    pub async fn students_for_trainer(&self, trainer_id: &str) -> Result<Vec<StudentProfile>> {
        let docs = self
            .store
            .query_by_field(collections::STUDENTS, "trainerID", trainer_id)
            .await?;

        let mut students = Vec::with_capacity(docs.len());
        for (key, doc) in docs {
            match from_document::<StudentProfile>(doc) {
                Ok(student) => students.push(student),
                Err(e) => tracing::warn!(key = %key, error = %e, "Skipping unreadable student profile"),
            }
        }
        students.sort_by(|a, b| a.name.cmp(&b.name));

        tracing::debug!(trainer_id, count = students.len(), "Loaded roster");
        Ok(students)
    }

    /// Trainers within `radius_m` meters of `origin` (x = longitude), nearest first.
    pub async fn nearby_trainers(&self, origin: Point<f64>, radius_m: f64) -> Result<Vec<NearbyTrainer>> {
        let docs = self.store.list_documents(collections::TRAINERS).await?;
        let trainers = docs
            .into_iter()
            .filter_map(|(key, doc)| match from_document::<TrainerProfile>(doc) {
                Ok(t) => Some(t),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Skipping unreadable trainer profile");
                    None
                }
            })
            .collect();

        let nearby = rank_by_distance(trainers, origin, radius_m);
        tracing::debug!(count = nearby.len(), radius_m, "Trainer discovery");
        Ok(nearby)
    }
}

/// Keep trainers inside `radius_m` of `origin` and sort by distance.
pub fn rank_by_distance(
    trainers: Vec<TrainerProfile>,
    origin: Point<f64>,
    radius_m: f64,
) -> Vec<NearbyTrainer> {
    let mut nearby: Vec<NearbyTrainer> = trainers
        .into_iter()
        .filter_map(|profile| {
            let at = Point::new(profile.location.longitude, profile.location.latitude);
            let distance_m = Haversine.distance(origin, at);
            (distance_m <= radius_m).then_some(NearbyTrainer { profile, distance_m })
        })
        .collect();
    nearby.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
    nearby
}
