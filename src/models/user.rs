//! User model and related types

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Passwords are at least 8 ASCII letters or digits
static PASSWORD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]{8,}$").expect("valid password pattern"));

/// Top-level domains accepted at registration
const ALLOWED_EMAIL_TLDS: [&str; 2] = ["com", "net"];

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "USER" => Ok(Role::User),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// Internal row structure for user queries (role joined by name)
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i32,
    pub email: String,
    pub password: String,
    pub role: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            password: row.password,
            role: row.role.parse().unwrap_or(Role::User),
        }
    }
}

/// Stored user
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i32,
    pub email: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,
}

/// Identity attached to an authenticated request, without credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    pub id: i32,
    pub email: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        CurrentUser {
            id: user.id,
            email: user.email,
            role: user.role,
        }
    }
}

fn email_has_allowed_tld(email: &str) -> Result<(), ValidationError> {
    let allowed = email
        .rsplit_once('.')
        .map(|(_, tld)| ALLOWED_EMAIL_TLDS.contains(&tld.to_lowercase().as_str()))
        .unwrap_or(false);

    if allowed {
        Ok(())
    } else {
        let mut error = ValidationError::new("email_tld");
        error.message = Some("Email must end with .com or .net".into());
        Err(error)
    }
}

/// Registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUser {
    #[validate(
        email(message = "Email must be a valid email"),
        custom(function = "email_has_allowed_tld")
    )]
    pub email: String,
    #[validate(regex(
        path = *PASSWORD_PATTERN,
        message = "Password must be at least 8 letters or digits"
    ))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
}

/// Registration response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisteredUser {
    pub id: i32,
    pub email: String,
}

impl From<User> for RegisteredUser {
    fn from(user: User) -> Self {
        RegisteredUser {
            id: user.id,
            email: user.email,
        }
    }
}

/// Login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Issued session token
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    pub access_token: String,
}

/// Normalized form used for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(email: &str, password: &str, confirm: &str) -> RegisterUser {
        RegisterUser {
            email: email.to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    #[test]
    fn test_register_accepts_valid_payload() {
        assert!(register("reader@example.com", "password123", "password123")
            .validate()
            .is_ok());
        assert!(register("reader@example.net", "ABCdef12", "ABCdef12")
            .validate()
            .is_ok());
    }

    #[test]
    fn test_register_rejects_other_tlds() {
        let errors = register("reader@example.org", "password123", "password123")
            .validate()
            .unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_register_rejects_weak_password() {
        for password in ["short1", "with space1", "symbols!!!"] {
            let errors = register("reader@example.com", password, password)
                .validate()
                .unwrap_err();
            assert!(errors.field_errors().contains_key("password"), "{}", password);
        }
    }

    #[test]
    fn test_register_rejects_mismatched_confirmation() {
        let errors = register("reader@example.com", "password123", "password124")
            .validate()
            .unwrap_err();
        assert!(errors.field_errors().contains_key("confirm_password"));
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("ADMIN".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("user".parse::<Role>(), Ok(Role::User));
        assert!("LIBRARIAN".parse::<Role>().is_err());
    }

    #[test]
    fn test_unknown_role_row_falls_back_to_user() {
        let user = User::from(UserRow {
            id: 1,
            email: "a@example.com".to_string(),
            password: "hash".to_string(),
            role: "SUPERUSER".to_string(),
        });
        assert_eq!(user.role, Role::User);
    }

    #[test]
    fn test_password_is_never_serialized() {
        let user = User {
            id: 1,
            email: "a@example.com".to_string(),
            password: "secret-hash".to_string(),
            role: Role::User,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
    }
}
