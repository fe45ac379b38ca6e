// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trainer and student profiles as stored in the document store.
//!
//! Field names on the wire follow the documents the mobile app has always
//! written (`trainerID`, `aboutMe`, `emergencyContact`), so existing
//! accounts keep deserializing.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::db::collections;

/// Placeholder avatar stored on freshly created profiles.
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/150";

/// Default trainer coverage radius when none was entered at sign-up.
pub const DEFAULT_RADIUS: f64 = 100.0;

/// The two account kinds. Each owns one partition of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Trainer,
    Student,
}

impl Role {
    /// Collection holding this role's profiles.
    pub fn partition(self) -> &'static str {
        match self {
            Role::Trainer => collections::TRAINERS,
            Role::Student => collections::STUDENTS,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Trainer => f.write_str("trainer"),
            Role::Student => f.write_str("student"),
        }
    }
}

/// Sports offered in the sign-up pickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sport {
    Badminton,
    Basketball,
    Cricket,
    Cycling,
    Football,
    Swimming,
    Volleyball,
}

impl Sport {
    pub const ALL: [Sport; 7] = [
        Sport::Badminton,
        Sport::Basketball,
        Sport::Cricket,
        Sport::Cycling,
        Sport::Football,
        Sport::Swimming,
        Sport::Volleyball,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Sport::Badminton => "Badminton",
            Sport::Basketball => "Basketball",
            Sport::Cricket => "Cricket",
            Sport::Cycling => "Cycling",
            Sport::Football => "Football",
            Sport::Swimming => "Swimming",
            Sport::Volleyball => "Volleyball",
        }
    }

    /// Whether students can pick this sport. Volleyball is trainer-only.
    pub fn offered_to_students(self) -> bool {
        self != Sport::Volleyball
    }
}

impl FromStr for Sport {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sport::ALL
            .into_iter()
            .find(|sport| sport.as_str() == s)
            .ok_or(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
    PreferNotToSay,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::PreferNotToSay => "Prefer not to say",
        }
    }
}

impl FromStr for Gender {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Male" => Ok(Gender::Male),
            "Female" => Ok(Gender::Female),
            "Prefer not to say" => Ok(Gender::PreferNotToSay),
            _ => Err(()),
        }
    }
}

/// Where a trainer coaches and how far they travel (meters).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainerLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_radius")]
    pub radius: f64,
}

fn default_radius() -> f64 {
    DEFAULT_RADIUS
}

impl Default for TrainerLocation {
    fn default() -> Self {
        Self {
            latitude: 0.0,
            longitude: 0.0,
            radius: DEFAULT_RADIUS,
        }
    }
}

/// Trainer profile stored in `trainers/{uid}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrainerProfile {
    pub name: String,
    pub age: u32,
    /// Sport coached (older documents call it `sport`)
    #[serde(alias = "sport")]
    pub sports: String,
    pub mobile: String,
    pub email: String,
    pub gender: String,
    pub about_me: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<u32>,
    /// Generated human-readable ID ("TR" + 6 digits)
    #[serde(rename = "trainerID")]
    pub trainer_id: String,
    pub location: TrainerLocation,
    pub profile_image: String,
}

/// Student profile stored in `students/{uid}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentProfile {
    pub name: String,
    pub age: u32,
    pub email: String,
    /// Human-readable ID of the student's trainer
    #[serde(rename = "trainerID")]
    pub trainer_id: String,
    /// Generated human-readable ID (6 digits)
    #[serde(rename = "studentID")]
    pub student_id: String,
    pub sport: String,
    pub gender: String,
    pub emergency_contact: String,
    pub image: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub address: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub trainer_name: String,
}

/// A profile in exactly one partition.
#[derive(Debug, Clone, PartialEq)]
pub enum Profile {
    Trainer(TrainerProfile),
    Student(StudentProfile),
}

impl Profile {
    pub fn role(&self) -> Role {
        match self {
            Profile::Trainer(_) => Role::Trainer,
            Profile::Student(_) => Role::Student,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Profile::Trainer(p) => &p.name,
            Profile::Student(p) => &p.name,
        }
    }
}

/// Partial trainer update. Only `Some` fields are merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainerUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sports: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about_me: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<TrainerLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
}

impl TrainerUpdate {
    /// Shallow merge into `profile`: named fields replace, others stay.
    pub fn apply_to(&self, profile: &mut TrainerProfile) {
        merge(&mut profile.name, &self.name);
        merge(&mut profile.age, &self.age);
        merge(&mut profile.sports, &self.sports);
        merge(&mut profile.mobile, &self.mobile);
        merge(&mut profile.email, &self.email);
        merge(&mut profile.gender, &self.gender);
        merge(&mut profile.about_me, &self.about_me);
        if self.experience.is_some() {
            profile.experience = self.experience;
        }
        merge(&mut profile.location, &self.location);
        merge(&mut profile.profile_image, &self.profile_image);
    }
}

/// Partial student update. Only `Some` fields are merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "trainerID", skip_serializing_if = "Option::is_none")]
    pub trainer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sport: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trainer_name: Option<String>,
}

impl StudentUpdate {
    /// Shallow merge into `profile`: named fields replace, others stay.
    pub fn apply_to(&self, profile: &mut StudentProfile) {
        merge(&mut profile.name, &self.name);
        merge(&mut profile.age, &self.age);
        merge(&mut profile.email, &self.email);
        merge(&mut profile.trainer_id, &self.trainer_id);
        merge(&mut profile.sport, &self.sport);
        merge(&mut profile.gender, &self.gender);
        merge(&mut profile.emergency_contact, &self.emergency_contact);
        merge(&mut profile.image, &self.image);
        merge(&mut profile.address, &self.address);
        merge(&mut profile.trainer_name, &self.trainer_name);
    }
}

fn merge<T: Clone>(field: &mut T, value: &Option<T>) {
    if let Some(v) = value {
        *field = v.clone();
    }
}

/// Ties a role to its profile and update types.
pub trait RoleKind: Send + Sync + 'static {
    const ROLE: Role;
    type Profile: Serialize + DeserializeOwned + Default + Clone + PartialEq + fmt::Debug + Send + Sync;
    type Update: Serialize + Clone + fmt::Debug + Send + Sync;

    fn apply(profile: &mut Self::Profile, update: &Self::Update);
}

/// Marker for the trainer role.
#[derive(Debug, Clone, Copy)]
pub struct Trainer;

/// Marker for the student role.
#[derive(Debug, Clone, Copy)]
pub struct Student;

impl RoleKind for Trainer {
    const ROLE: Role = Role::Trainer;
    type Profile = TrainerProfile;
    type Update = TrainerUpdate;

    fn apply(profile: &mut TrainerProfile, update: &TrainerUpdate) {
        update.apply_to(profile);
    }
}

impl RoleKind for Student {
    const ROLE: Role = Role::Student;
    type Profile = StudentProfile;
    type Update = StudentUpdate;

    fn apply(profile: &mut StudentProfile, update: &StudentUpdate) {
        update.apply_to(profile);
    }
}
