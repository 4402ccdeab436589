//! Client-side form checks, run before any request is dispatched.

use aumryx_shared::protocol::{
    AdminLoginRequest, AssignmentCreate, ClassCreate, HourlyRateQuery, LoginRequest, NoteCreate,
    PostCreate, RatingCreate, SignupRequest,
};

use crate::error::ValidationError;

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

fn required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Missing { field })
    } else {
        Ok(())
    }
}

/// Shape check only; the backend is the authority on deliverability.
fn email(value: &str) -> Result<(), ValidationError> {
    required("email", value)?;
    let value = value.trim();
    let well_formed = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.contains(char::is_whitespace)
        }
        None => false,
    };
    if well_formed {
        Ok(())
    } else {
        Err(ValidationError::invalid("email", "not a valid email address"))
    }
}

impl Validate for SignupRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        required("name", &self.name)?;
        email(&self.email)?;
        required("password", &self.password)?;
        if let Some(rate) = self.hourly_rate {
            non_negative("hourly_rate", rate)?;
        }
        Ok(())
    }
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        required("email", &self.email)?;
        required("password", &self.password)
    }
}

impl Validate for AdminLoginRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        required("email", &self.email)?;
        required("password", &self.password)
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::invalid(field, "must be zero or more"))
    }
}

impl Validate for ClassCreate {
    fn validate(&self) -> Result<(), ValidationError> {
        required("title", &self.title)?;
        required("subject", &self.subject)?;
        if self.max_students == 0 {
            return Err(ValidationError::invalid("max_students", "must be at least 1"));
        }
        non_negative("price", self.price)
    }
}

impl Validate for NoteCreate {
    fn validate(&self) -> Result<(), ValidationError> {
        required("title", &self.title)?;
        required("content", &self.content)
    }
}

impl Validate for AssignmentCreate {
    fn validate(&self) -> Result<(), ValidationError> {
        required("title", &self.title)?;
        required("description", &self.description)?;
        required("class_id", &self.class_id)
    }
}

impl Validate for PostCreate {
    fn validate(&self) -> Result<(), ValidationError> {
        required("title", &self.title)?;
        required("content", &self.content)
    }
}

impl Validate for RatingCreate {
    fn validate(&self) -> Result<(), ValidationError> {
        required("teacher_id", &self.teacher_id)?;
        if (1..=5).contains(&self.rating) {
            Ok(())
        } else {
            Err(ValidationError::invalid("rating", "must be between 1 and 5"))
        }
    }
}

impl Validate for HourlyRateQuery {
    fn validate(&self) -> Result<(), ValidationError> {
        non_negative("hourly_rate", self.hourly_rate)
    }
}
