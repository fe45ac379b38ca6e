// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Student task lists and attendance calendar.
//!
//! Everything here lives in the local cache only. Each mutation is written
//! back immediately under the `tasks`, `markedDates` and `streak` keys.

use chrono::{Days, NaiveDate};
use std::sync::Arc;

use crate::db::{load_json, store_json, LocalCache};
use crate::error::Result;
use crate::models::{MarkedDates, MarkedDay, Task, TaskBoard, TaskCategory};

pub const TASKS_KEY: &str = "tasks";
pub const STREAK_KEY: &str = "streak";
pub const MARKED_DATES_KEY: &str = "markedDates";

pub struct TaskTracker {
    cache: Arc<dyn LocalCache>,
    board: TaskBoard,
    marked: MarkedDates,
    streak: u32,
}

impl TaskTracker {
    /// Load saved tasks and attendance. Missing keys start empty.
    pub async fn load(cache: Arc<dyn LocalCache>) -> Result<Self> {
        let board: TaskBoard = load_json(cache.as_ref(), TASKS_KEY).await?.unwrap_or_default();
        let marked: MarkedDates = load_json(cache.as_ref(), MARKED_DATES_KEY)
            .await?
            .unwrap_or_default();
        let streak: u32 = load_json(cache.as_ref(), STREAK_KEY).await?.unwrap_or(0);

        tracing::debug!(marked_days = marked.len(), streak, "Loaded task tracker");
        Ok(Self {
            cache,
            board,
            marked,
            streak,
        })
    }

    pub fn board(&self) -> &TaskBoard {
        &self.board
    }

    pub fn tasks(&self, category: TaskCategory) -> &[Task] {
        self.board.tasks(category)
    }

    pub fn marked_dates(&self) -> &MarkedDates {
        &self.marked
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    /// Append a task. Blank names are ignored and return `None`.
    pub async fn add_task(&mut self, category: TaskCategory, name: &str) -> Result<Option<Task>> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(None);
        }

        let tasks = self.board.tasks_mut(category);
        let next_id = tasks
            .iter()
            .filter_map(|t| t.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        let task = Task {
            id: next_id.to_string(),
            name: name.to_string(),
            completed: false,
        };
        tasks.push(task.clone());

        self.save_tasks().await?;
        Ok(Some(task))
    }

    /// Flip a task's completed flag. Returns false if no such task.
    pub async fn toggle_task(&mut self, category: TaskCategory, id: &str) -> Result<bool> {
        let Some(task) = self.board.tasks_mut(category).iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        task.completed = !task.completed;
        self.save_tasks().await?;
        Ok(true)
    }

    /// Delete a task. Returns false if no such task.
    pub async fn remove_task(&mut self, category: TaskCategory, id: &str) -> Result<bool> {
        let tasks = self.board.tasks_mut(category);
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return Ok(false);
        }
        self.save_tasks().await?;
        Ok(true)
    }

    /// Mark `date` as attended and return the updated streak.
    pub async fn mark_attendance(&mut self, date: NaiveDate) -> Result<u32> {
        self.marked.insert(date, MarkedDay::default());
        self.save_attendance().await?;
        Ok(self.streak)
    }

    /// Clear attendance for `date` and return the updated streak.
    pub async fn unmark_attendance(&mut self, date: NaiveDate) -> Result<u32> {
        if self.marked.remove(&date).is_some() {
            self.save_attendance().await?;
        }
        Ok(self.streak)
    }

    async fn save_tasks(&self) -> Result<()> {
        store_json(self.cache.as_ref(), TASKS_KEY, &self.board).await?;
        Ok(())
    }

    async fn save_attendance(&mut self) -> Result<()> {
        self.streak = current_streak(&self.marked);
        store_json(self.cache.as_ref(), MARKED_DATES_KEY, &self.marked).await?;
        store_json(self.cache.as_ref(), STREAK_KEY, &self.streak).await?;
        tracing::debug!(streak = self.streak, "Attendance saved");
        Ok(())
    }
}

/// Consecutive marked days ending at the latest marked day.
pub fn current_streak(marked: &MarkedDates) -> u32 {
    let Some((&last, _)) = marked.iter().rev().find(|(_, day)| day.marked) else {
        return 0;
    };

    let mut streak = 1;
    let mut day = last;
    while let Some(prev) = day.checked_sub_days(Days::new(1)) {
        match marked.get(&prev) {
            Some(d) if d.marked => {
                streak += 1;
                day = prev;
            }
            _ => break,
        }
    }
    streak
}
