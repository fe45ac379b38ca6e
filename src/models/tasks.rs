// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Student task and attendance records (local cache only).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Task lists shown on the student page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TaskCategory {
    Exercise,
    Practice,
}

impl TaskCategory {
    pub const ALL: [TaskCategory; 2] = [TaskCategory::Exercise, TaskCategory::Practice];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub completed: bool,
}

/// Ordered tasks per category, serialized as `{"Exercise": [...], "Practice": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskBoard(BTreeMap<TaskCategory, Vec<Task>>);

impl Default for TaskBoard {
    fn default() -> Self {
        Self(
            TaskCategory::ALL
                .into_iter()
                .map(|category| (category, Vec::new()))
                .collect(),
        )
    }
}

impl TaskBoard {
    pub fn tasks(&self, category: TaskCategory) -> &[Task] {
        self.0.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn tasks_mut(&mut self, category: TaskCategory) -> &mut Vec<Task> {
        self.0.entry(category).or_default()
    }
}

/// Calendar marking for one attended day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkedDay {
    pub marked: bool,
    pub selected: bool,
}

impl Default for MarkedDay {
    fn default() -> Self {
        Self {
            marked: true,
            selected: true,
        }
    }
}

/// Attended days keyed by `YYYY-MM-DD`.
pub type MarkedDates = BTreeMap<NaiveDate, MarkedDay>;
