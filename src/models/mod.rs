// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod profile;
pub mod tasks;

pub use profile::{
    Gender, Profile, Role, RoleKind, Sport, Student, StudentProfile, StudentUpdate, Trainer,
    TrainerLocation, TrainerProfile, TrainerUpdate,
};
pub use tasks::{MarkedDates, MarkedDay, Task, TaskBoard, TaskCategory};
