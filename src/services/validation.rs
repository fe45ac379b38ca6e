// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sign-up and login form validation.
//!
//! Checks run in a fixed order and stop at the first violation: each field's
//! presence and format/range (in form order), then the password
//! confirmation, then (students only) the trainer ID lookup. A form that
//! passes comes back as a typed profile draft ready to be written.

use validator::{ValidateEmail, ValidateLength, ValidateRange};

use crate::db::{collections, from_document, ProfileStore};
use crate::error::AppError;
use crate::models::profile::{PLACEHOLDER_IMAGE, DEFAULT_RADIUS};
use crate::models::{Gender, Sport, StudentProfile, TrainerLocation, TrainerProfile};

pub const MIN_NAME_CHARS: u64 = 2;
pub const MIN_PASSWORD_CHARS: u64 = 6;
pub const MIN_PHONE_DIGITS: usize = 10;
pub const STUDENT_AGE: (u32, u32) = (5, 100);
pub const TRAINER_AGE: (u32, u32) = (18, 100);
pub const MAX_EXPERIENCE_YEARS: u32 = 50;

/// First failed constraint, carrying the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter a valid name (at least 2 characters).")]
    Name,

    #[error("Please enter a valid age ({min}-{max}).")]
    Age { min: u32, max: u32 },

    #[error("Please select a sport.")]
    Sport,

    #[error("Please select your gender.")]
    Gender,

    #[error("Please enter a valid email address.")]
    Email,

    #[error("Password must be at least 6 characters long.")]
    PasswordTooShort,

    #[error("Passwords do not match.")]
    PasswordMismatch,

    #[error("Please enter a valid latitude (-90 to 90).")]
    Latitude,

    #[error("Please enter a valid longitude (-180 to 180).")]
    Longitude,

    #[error("Please enter a valid coverage radius in meters.")]
    Radius,

    #[error("Please enter a valid mobile number (at least 10 digits).")]
    Mobile,

    #[error("Please enter a valid emergency contact number (at least 10 digits).")]
    EmergencyContact,

    #[error("Please enter valid years of experience (0-50).")]
    Experience,

    #[error("Please generate a Trainer ID first.")]
    TrainerIdNotGenerated,

    #[error("Please enter your trainer ID.")]
    TrainerIdMissing,

    #[error("Please generate a student ID.")]
    StudentIdNotGenerated,

    #[error("Trainer ID not found. Please check and try again.")]
    TrainerNotFound,

    #[error("Please fill in all fields before logging in.")]
    MissingCredentials,
}

/// Raw trainer sign-up input, as typed.
#[derive(Debug, Clone, Default)]
pub struct TrainerSignUpForm {
    pub name: String,
    pub age: String,
    pub sports: String,
    pub mobile: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub gender: String,
    pub about_me: String,
    pub experience: String,
    pub trainer_id: String,
    pub latitude: String,
    pub longitude: String,
    pub radius: String,
}

/// Raw student sign-up input, as typed.
#[derive(Debug, Clone, Default)]
pub struct StudentSignUpForm {
    pub full_name: String,
    pub age: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub trainer_id: String,
    pub sport: String,
    pub gender: String,
    pub emergency_contact: String,
    pub student_id: String,
}

/// A validated sign-up: credentials plus the profile to store.
#[derive(Debug, Clone)]
pub struct SignUpDraft<P> {
    pub email: String,
    pub password: String,
    pub profile: P,
}

/// Validate a trainer sign-up form.
pub fn validate_trainer(
    form: &TrainerSignUpForm,
) -> Result<SignUpDraft<TrainerProfile>, ValidationError> {
    let name = check_name(&form.name)?;
    let age = check_age(&form.age, TRAINER_AGE)?;
    let sport = check_sport(&form.sports, true)?;
    let gender = check_gender(&form.gender)?;
    check_email(&form.email)?;
    check_password(&form.password)?;
    let latitude = check_coordinate(&form.latitude, 90.0, ValidationError::Latitude)?;
    let longitude = check_coordinate(&form.longitude, 180.0, ValidationError::Longitude)?;
    let radius = check_radius(&form.radius)?;
    check_phone(&form.mobile, ValidationError::Mobile)?;
    let experience = check_experience(&form.experience)?;
    if form.trainer_id.trim().is_empty() {
        return Err(ValidationError::TrainerIdNotGenerated);
    }
    check_confirmation(&form.password, &form.confirm_password)?;

    Ok(SignUpDraft {
        email: form.email.trim().to_string(),
        password: form.password.clone(),
        profile: TrainerProfile {
            name,
            age,
            sports: sport.as_str().to_string(),
            mobile: form.mobile.trim().to_string(),
            email: form.email.trim().to_string(),
            gender: gender.as_str().to_string(),
            about_me: form.about_me.trim().to_string(),
            experience,
            trainer_id: form.trainer_id.trim().to_string(),
            location: TrainerLocation {
                latitude,
                longitude,
                radius,
            },
            profile_image: PLACEHOLDER_IMAGE.to_string(),
        },
    })
}

/// Validate a student sign-up form without touching the store.
pub fn validate_student_fields(
    form: &StudentSignUpForm,
) -> Result<SignUpDraft<StudentProfile>, ValidationError> {
    let name = check_name(&form.full_name)?;
    let age = check_age(&form.age, STUDENT_AGE)?;
    let gender = check_gender(&form.gender)?;
    check_email(&form.email)?;
    check_password(&form.password)?;
    if form.trainer_id.trim().is_empty() {
        return Err(ValidationError::TrainerIdMissing);
    }
    if form.student_id.trim().is_empty() {
        return Err(ValidationError::StudentIdNotGenerated);
    }
    let sport = check_sport(&form.sport, false)?;
    check_phone(&form.emergency_contact, ValidationError::EmergencyContact)?;
    check_confirmation(&form.password, &form.confirm_password)?;

    Ok(SignUpDraft {
        email: form.email.trim().to_string(),
        password: form.password.clone(),
        profile: StudentProfile {
            name,
            age,
            email: form.email.trim().to_string(),
            trainer_id: form.trainer_id.trim().to_string(),
            student_id: form.student_id.trim().to_string(),
            sport: sport.as_str().to_string(),
            gender: gender.as_str().to_string(),
            emergency_contact: form.emergency_contact.trim().to_string(),
            image: PLACEHOLDER_IMAGE.to_string(),
            ..Default::default()
        },
    })
}

/// Full student validation, ending with the trainer ID lookup.
///
/// On success the draft also carries the trainer's display name.
pub async fn validate_student(
    form: &StudentSignUpForm,
    store: &dyn ProfileStore,
) -> Result<SignUpDraft<StudentProfile>, AppError> {
    let mut draft = validate_student_fields(form)?;
    let trainer = find_trainer_by_public_id(store, &draft.profile.trainer_id)
        .await?
        .ok_or(ValidationError::TrainerNotFound)?;
    draft.profile.trainer_name = trainer.name;
    Ok(draft)
}

/// Look up a trainer by generated ID (`trainerID` field).
pub async fn find_trainer_by_public_id(
    store: &dyn ProfileStore,
    trainer_id: &str,
) -> Result<Option<TrainerProfile>, AppError> {
    let hits = store
        .query_by_field(collections::TRAINERS, "trainerID", trainer_id)
        .await?;
    if hits.len() > 1 {
        tracing::warn!(trainer_id, count = hits.len(), "Duplicate trainer IDs in store");
    }
    match hits.into_iter().next() {
        Some((_, doc)) => Ok(Some(from_document(doc)?)),
        None => Ok(None),
    }
}

/// Login only requires both fields to be filled in.
pub fn validate_login(email: &str, password: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(ValidationError::MissingCredentials);
    }
    Ok(())
}

fn check_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if !trimmed.validate_length(Some(MIN_NAME_CHARS), None, None) {
        return Err(ValidationError::Name);
    }
    Ok(trimmed.to_string())
}

fn check_age(age: &str, (min, max): (u32, u32)) -> Result<u32, ValidationError> {
    let err = ValidationError::Age { min, max };
    let value: u32 = age.trim().parse().map_err(|_| err.clone())?;
    if !value.validate_range(Some(min), Some(max), None, None) {
        return Err(err);
    }
    Ok(value)
}

fn check_sport(sport: &str, trainer: bool) -> Result<Sport, ValidationError> {
    let sport: Sport = sport.parse().map_err(|_| ValidationError::Sport)?;
    if !trainer && !sport.offered_to_students() {
        return Err(ValidationError::Sport);
    }
    Ok(sport)
}

fn check_gender(gender: &str) -> Result<Gender, ValidationError> {
    gender.parse().map_err(|_| ValidationError::Gender)
}

fn check_email(email: &str) -> Result<(), ValidationError> {
    if is_valid_email(email.trim()) {
        Ok(())
    } else {
        Err(ValidationError::Email)
    }
}

/// `local@domain.tld`: a well-formed address whose domain has a dot.
pub fn is_valid_email(email: &str) -> bool {
    if !email.validate_email() {
        return false;
    }
    match email.rsplit_once('@') {
        Some((_, domain)) => {
            let labels: Vec<&str> = domain.split('.').collect();
            labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
        }
        None => false,
    }
}

fn check_password(password: &str) -> Result<(), ValidationError> {
    if !password.validate_length(Some(MIN_PASSWORD_CHARS), None, None) {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

fn check_confirmation(password: &str, confirm: &str) -> Result<(), ValidationError> {
    if password != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

fn check_coordinate(raw: &str, bound: f64, err: ValidationError) -> Result<f64, ValidationError> {
    let value: f64 = raw.trim().parse().map_err(|_| err.clone())?;
    if !value.is_finite() || !value.validate_range(Some(-bound), Some(bound), None, None) {
        return Err(err);
    }
    Ok(value)
}

fn check_radius(raw: &str) -> Result<f64, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(DEFAULT_RADIUS);
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Ok(value),
        _ => Err(ValidationError::Radius),
    }
}

/// Optional phone field: empty is fine, otherwise digits (leading `+` allowed).
fn check_phone(raw: &str, err: ValidationError) -> Result<(), ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(());
    }
    let digits = raw.strip_prefix('+').unwrap_or(raw);
    if raw.len() < MIN_PHONE_DIGITS || digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(err);
    }
    Ok(())
}

fn check_experience(raw: &str) -> Result<Option<u32>, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let years: u32 = raw.parse().map_err(|_| ValidationError::Experience)?;
    if years > MAX_EXPERIENCE_YEARS {
        return Err(ValidationError::Experience);
    }
    Ok(Some(years))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trainer_form() -> TrainerSignUpForm {
        TrainerSignUpForm {
            name: "Maja Lind".to_string(),
            age: "34".to_string(),
            sports: "Football".to_string(),
            mobile: "0701234567".to_string(),
            email: "maja@example.com".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
            gender: "Female".to_string(),
            about_me: "UEFA B licence".to_string(),
            experience: "8".to_string(),
            trainer_id: "TR123456".to_string(),
            latitude: "56.1971946".to_string(),
            longitude: "15.6188414".to_string(),
            radius: String::new(),
        }
    }

    fn student_form() -> StudentSignUpForm {
        StudentSignUpForm {
            full_name: "Oskar Berg".to_string(),
            age: "12".to_string(),
            email: "oskar@example.com".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
            trainer_id: "TR123456".to_string(),
            sport: "Football".to_string(),
            gender: "Male".to_string(),
            emergency_contact: String::new(),
            student_id: "654321".to_string(),
        }
    }

    #[test]
    fn test_valid_trainer_form_builds_profile() {
        let draft = validate_trainer(&trainer_form()).unwrap();
        assert_eq!(draft.profile.age, 34);
        assert_eq!(draft.profile.experience, Some(8));
        assert_eq!(draft.profile.location.radius, DEFAULT_RADIUS);
        assert_eq!(draft.profile.profile_image, PLACEHOLDER_IMAGE);
    }

    #[test]
    fn test_name_is_trimmed_before_length_check() {
        let mut form = trainer_form();
        form.name = "  A  ".to_string();
        assert_eq!(validate_trainer(&form).unwrap_err(), ValidationError::Name);
    }

    #[test]
    fn test_age_bounds_differ_by_role() {
        let mut form = student_form();
        form.age = "5".to_string();
        assert!(validate_student_fields(&form).is_ok());
        form.age = "4".to_string();
        assert_eq!(
            validate_student_fields(&form).unwrap_err(),
            ValidationError::Age { min: 5, max: 100 }
        );

        let mut form = trainer_form();
        form.age = "17".to_string();
        assert_eq!(
            validate_trainer(&form).unwrap_err(),
            ValidationError::Age { min: 18, max: 100 }
        );
        form.age = "abc".to_string();
        assert_eq!(
            validate_trainer(&form).unwrap_err(),
            ValidationError::Age { min: 18, max: 100 }
        );
    }

    #[test]
    fn test_age_reported_before_password_mismatch() {
        let mut form = student_form();
        form.age = "3".to_string();
        form.confirm_password = "different".to_string();
        assert_eq!(
            validate_student_fields(&form).unwrap_err(),
            ValidationError::Age { min: 5, max: 100 }
        );
    }

    #[test]
    fn test_mismatch_reported_after_range_checks() {
        let mut form = trainer_form();
        form.confirm_password = "different".to_string();
        form.latitude = "91".to_string();
        assert_eq!(validate_trainer(&form).unwrap_err(), ValidationError::Latitude);

        form.latitude = "45".to_string();
        assert_eq!(
            validate_trainer(&form).unwrap_err(),
            ValidationError::PasswordMismatch
        );
    }

    #[test]
    fn test_email_shape() {
        assert!(is_valid_email("a@b.se"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.se"));
        assert!(!is_valid_email("@c.se"));
        assert!(!is_valid_email("a@.se"));
    }

    #[test]
    fn test_phone_rules() {
        assert!(check_phone("", ValidationError::Mobile).is_ok());
        assert!(check_phone("0701234567", ValidationError::Mobile).is_ok());
        assert!(check_phone("+46701234567", ValidationError::Mobile).is_ok());
        assert_eq!(
            check_phone("070123", ValidationError::Mobile),
            Err(ValidationError::Mobile)
        );
        assert_eq!(
            check_phone("07012345ab", ValidationError::EmergencyContact),
            Err(ValidationError::EmergencyContact)
        );
    }

    #[test]
    fn test_longitude_range() {
        let mut form = trainer_form();
        form.longitude = "-180".to_string();
        assert!(validate_trainer(&form).is_ok());
        form.longitude = "180.5".to_string();
        assert_eq!(validate_trainer(&form).unwrap_err(), ValidationError::Longitude);
    }

    #[test]
    fn test_students_cannot_pick_volleyball() {
        let mut form = student_form();
        form.sport = "Volleyball".to_string();
        assert_eq!(validate_student_fields(&form).unwrap_err(), ValidationError::Sport);

        let mut form = trainer_form();
        form.sports = "Volleyball".to_string();
        assert!(validate_trainer(&form).is_ok());
    }

    #[test]
    fn test_generated_ids_required() {
        let mut form = trainer_form();
        form.trainer_id.clear();
        assert_eq!(
            validate_trainer(&form).unwrap_err(),
            ValidationError::TrainerIdNotGenerated
        );

        let mut form = student_form();
        form.student_id.clear();
        assert_eq!(
            validate_student_fields(&form).unwrap_err(),
            ValidationError::StudentIdNotGenerated
        );
    }

    #[test]
    fn test_experience_optional_but_bounded() {
        let mut form = trainer_form();
        form.experience.clear();
        assert_eq!(validate_trainer(&form).unwrap().profile.experience, None);
        form.experience = "51".to_string();
        assert_eq!(validate_trainer(&form).unwrap_err(), ValidationError::Experience);
    }

    #[test]
    fn test_login_requires_both_fields() {
        assert_eq!(
            validate_login("", "pw"),
            Err(ValidationError::MissingCredentials)
        );
        assert!(validate_login("a@b.se", "pw").is_ok());
    }
}
