//! Form validation
//!
//! Runs before anything reaches the coordinator. Lengths count characters,
//! not bytes.

use std::fmt;

use thiserror::Error;

use crate::domain::{CreateTaskInput, DomainError, UpdateTaskInput};

pub const TITLE_MAX_CHARS: usize = 25;
pub const DESCRIPTION_MAX_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// All field problems found in one input
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", join_errors(.errors))]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// First message for `field`, for display next to the input
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationErrors> for DomainError {
    fn from(errors: ValidationErrors) -> Self {
        DomainError::Validation(errors.to_string())
    }
}

fn check_title(title: &str, errors: &mut ValidationErrors) {
    let title = title.trim();
    if title.is_empty() {
        errors.push("title", "Title is required");
    } else if title.chars().count() > TITLE_MAX_CHARS {
        errors.push(
            "title",
            format!("Title must be at most {} characters", TITLE_MAX_CHARS),
        );
    }
}

fn check_description(description: Option<&str>, errors: &mut ValidationErrors) {
    if let Some(description) = description {
        if description.chars().count() > DESCRIPTION_MAX_CHARS {
            errors.push(
                "description",
                format!("Description must be at most {} characters", DESCRIPTION_MAX_CHARS),
            );
        }
    }
}

pub fn validate_create_input(input: &CreateTaskInput) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    check_title(&input.title, &mut errors);
    check_description(input.description.as_deref(), &mut errors);
    errors.into_result()
}

pub fn validate_update_input(input: &UpdateTaskInput) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if let Some(title) = &input.title {
        check_title(title, &mut errors);
    }
    check_description(input.description.as_ref().and_then(Option::as_deref), &mut errors);
    errors.into_result()
}
