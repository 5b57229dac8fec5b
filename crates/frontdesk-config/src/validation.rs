//! Configuration validation

use crate::schema::{RawConfig, RawStaff};
use std::collections::HashSet;
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Staff #{index} ({email}): {message}")]
    StaffError {
        index: usize,
        email: String,
        message: String,
    },

    #[error("Duplicate staff email: {0}")]
    DuplicateEmail(String),

    #[error("tick_interval_seconds must be greater than zero")]
    ZeroTickInterval,
}

/// Validate a raw configuration, collecting every problem
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.service.tick_interval_seconds == Some(0) {
        errors.push(ValidationError::ZeroTickInterval);
    }

    let mut seen = HashSet::new();
    for (index, staff) in config.staff.iter().enumerate() {
        if !seen.insert(staff.email.trim().to_lowercase()) {
            errors.push(ValidationError::DuplicateEmail(staff.email.clone()));
        }
        errors.extend(validate_staff(index, staff));
    }

    errors
}

fn validate_staff(index: usize, staff: &RawStaff) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut fail = |message: &str| {
        errors.push(ValidationError::StaffError {
            index,
            email: staff.email.clone(),
            message: message.into(),
        })
    };

    if staff.first_name.trim().is_empty() {
        fail("first_name cannot be empty");
    }
    if staff.last_name.trim().is_empty() {
        fail("last_name cannot be empty");
    }
    if !is_plausible_email(&staff.email) {
        fail("email must look like name@domain");
    }

    errors
}

fn is_plausible_email(email: &str) -> bool {
    match email.trim().split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::RawServiceConfig;

    fn staff(first: &str, email: &str) -> RawStaff {
        RawStaff {
            first_name: first.into(),
            last_name: "Lee".into(),
            photo: None,
            email: email.into(),
        }
    }

    #[test]
    fn test_duplicate_email_detection() {
        let config = RawConfig {
            config_version: 1,
            service: Default::default(),
            staff: vec![staff("Ann", "ann@example.org"), staff("Anne", "ANN@example.org")],
        };

        let errors = validate_config(&config);
        assert!(errors.iter().any(|e| matches!(e, ValidationError::DuplicateEmail(_))));
    }

    #[test]
    fn test_zero_tick_interval() {
        let config = RawConfig {
            config_version: 1,
            service: RawServiceConfig {
                socket_path: None,
                tick_interval_seconds: Some(0),
            },
            staff: vec![],
        };

        let errors = validate_config(&config);
        assert!(matches!(errors.as_slice(), [ValidationError::ZeroTickInterval]));
    }

    #[test]
    fn test_collects_every_staff_error() {
        let config = RawConfig {
            config_version: 1,
            service: Default::default(),
            staff: vec![staff(" ", "not-an-email")],
        };

        let errors = validate_config(&config);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_email_plausibility() {
        assert!(is_plausible_email("ann@example.org"));
        assert!(!is_plausible_email("@example.org"));
        assert!(!is_plausible_email("ann@"));
        assert!(!is_plausible_email("ann@a@b"));
    }
}
