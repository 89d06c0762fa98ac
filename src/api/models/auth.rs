//! API models for registration, login, logout, and CSRF.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::PasswordConfig;
use crate::errors::{Error, ValidationErrors};
use crate::types::MaintainerId;

/// Request to register a new maintainer.
///
/// Fields are optional at the serde level so that missing ones surface as
/// field-level validation errors rather than body rejections.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// Email address (must be unique)
    pub email: Option<String>,
    /// Display name
    pub name: Option<String>,
    /// Password (will be hashed)
    pub password: Option<String>,
}

/// Validated registration fields.
#[derive(Debug, Clone)]
pub struct RegistrationData {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Request to log in.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Email address. The field keeps its historical name; clients send the
    /// email under `username`.
    pub username: Option<String>,
    /// Password
    pub password: Option<String>,
}

/// Validated login fields.
#[derive(Debug, Clone)]
pub struct LoginData {
    pub username: String,
    pub password: String,
}

fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !email.contains(char::is_whitespace),
        None => false,
    }
}

impl RegisterRequest {
    /// Check required fields, email shape, and password length.
    pub fn validate(self, config: &PasswordConfig) -> Result<RegistrationData, Error> {
        let mut errors = ValidationErrors::new();

        if let Some(email) = &self.email {
            if !is_valid_email(email) {
                errors.add("email", "Enter a valid email address.");
            }
        } else {
            errors.add("email", "This field is required.");
        }

        if let Some(name) = &self.name {
            if name.chars().count() > 200 {
                errors.add("name", "Ensure this field has no more than 200 characters.");
            }
        } else {
            errors.add("name", "This field is required.");
        }

        if let Some(password) = &self.password {
            if password.chars().count() < config.min_length {
                errors.add("password", format!("Ensure this field has at least {} characters.", config.min_length));
            } else if password.chars().count() > config.max_length {
                errors.add(
                    "password",
                    format!("Ensure this field has no more than {} characters.", config.max_length),
                );
            }
        } else {
            errors.add("password", "This field is required.");
        }

        match (self.email, self.name, self.password) {
            (Some(email), Some(name), Some(password)) if errors.is_empty() => Ok(RegistrationData { email, name, password }),
            _ => Err(Error::Validation { errors }),
        }
    }
}

impl LoginRequest {
    /// Check that both credential fields are present.
    pub fn validate(self) -> Result<LoginData, Error> {
        let mut errors = ValidationErrors::new();

        if self.username.is_none() {
            errors.add("username", "This field is required.");
        }
        if self.password.is_none() {
            errors.add("password", "This field is required.");
        }

        match (self.username, self.password) {
            (Some(username), Some(password)) if errors.is_empty() => Ok(LoginData { username, password }),
            _ => Err(Error::Validation { errors }),
        }
    }
}

/// Body of a successful registration
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterInfo {
    /// Success message
    pub message: String,
    /// ID of the new maintainer
    pub maintainer_id: MaintainerId,
}

/// Body of a successful login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginInfo {
    /// Success message
    pub message: String,
    /// ID of the authenticated maintainer
    pub maintainer_id: MaintainerId,
    /// Email of the authenticated maintainer
    pub email: String,
}

/// Body of a successful logout
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LogoutInfo {
    /// Success message
    pub message: String,
}

/// Body of the CSRF cookie endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CsrfInfo {
    /// Status message
    pub detail: String,
}

/// Response models that implement IntoResponse for cleaner handler code
use axum::{
    Json,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};

/// Structured response for successful registration
pub struct RegisterResponse {
    pub info: RegisterInfo,
    pub cookie: String,
}

impl IntoResponse for RegisterResponse {
    fn into_response(self) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert(header::SET_COOKIE, self.cookie.parse().unwrap());
        (StatusCode::OK, headers, Json(self.info)).into_response()
    }
}

/// Structured response for successful login
pub struct LoginResponse {
    pub info: LoginInfo,
    pub cookie: String,
}

impl IntoResponse for LoginResponse {
    fn into_response(self) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert(header::SET_COOKIE, self.cookie.parse().unwrap());
        (StatusCode::OK, headers, Json(self.info)).into_response()
    }
}

/// Structured response for successful logout
pub struct LogoutResponse {
    pub info: LogoutInfo,
    pub cookie: String,
}

impl IntoResponse for LogoutResponse {
    fn into_response(self) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert(header::SET_COOKIE, self.cookie.parse().unwrap());
        (StatusCode::OK, headers, Json(self.info)).into_response()
    }
}

/// Structured response for the CSRF cookie endpoint
pub struct CsrfResponse {
    pub info: CsrfInfo,
    pub cookie: String,
}

impl IntoResponse for CsrfResponse {
    fn into_response(self) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert(header::SET_COOKIE, self.cookie.parse().unwrap());
        (StatusCode::OK, headers, Json(self.info)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_reports_all_missing_fields() {
        let request = RegisterRequest {
            email: None,
            name: Some("A Name".to_string()),
            password: None,
        };

        let err = request.validate(&PasswordConfig::default()).unwrap_err();
        let Error::Validation { errors } = err else {
            panic!("expected validation error");
        };

        let body = serde_json::to_value(&errors).unwrap();
        assert_eq!(body["email"][0], "This field is required.");
        assert_eq!(body["password"][0], "This field is required.");
        assert!(body.get("name").is_none());
    }

    #[test]
    fn test_register_password_length() {
        let request = RegisterRequest {
            email: Some("a@example.com".to_string()),
            name: Some("A".to_string()),
            password: Some("short".to_string()),
        };

        let err = request.validate(&PasswordConfig::default()).unwrap_err();
        let Error::Validation { errors } = err else {
            panic!("expected validation error");
        };
        let body = serde_json::to_value(&errors).unwrap();
        assert_eq!(body["password"][0], "Ensure this field has at least 8 characters.");
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("user@localhost"));
        assert!(!is_valid_email("userexample.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("us er@example.com"));
    }

    #[test]
    fn test_login_requires_both_fields() {
        let request = LoginRequest {
            username: Some("a@example.com".to_string()),
            password: None,
        };

        assert!(request.validate().is_err());

        let request = LoginRequest {
            username: Some("a@example.com".to_string()),
            password: Some("pw".to_string()),
        };
        let data = request.validate().unwrap();
        assert_eq!(data.username, "a@example.com");
    }
}
