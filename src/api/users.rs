//! Registration and login. No sessions or tokens; login only verifies
//! credentials and reports the account.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use sqlx::{Pool, Sqlite};

use crate::api::error::ApiError;
use crate::dal;
use crate::model::api_model::{
    CreateUserRequest, LoginRequest, LoginResponse, UserCreatedResponse,
};

/// Symbols that satisfy the special-character requirement.
pub const PASSWORD_SYMBOLS: &str = "!@#$%^&*()_+";

/// Password policy: at least 8 characters, one digit and one symbol. Returns
/// every violated rule; empty means the password is acceptable.
pub fn validate_password(password: &str) -> Vec<String> {
    let mut violations = Vec::new();

    if password.chars().count() < 8 {
        violations.push("Password must be at least 8 characters.".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        violations.push("Password must contain at least one number.".to_string());
    }
    if !password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
        violations.push("Password must contain at least one special character.".to_string());
    }

    violations
}

pub fn validate_email(email: &str) -> Vec<String> {
    let well_formed = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));

    if well_formed {
        Vec::new()
    } else {
        vec!["Enter a valid email address.".to_string()]
    }
}

pub async fn create_user(
    State(pool): State<Pool<Sqlite>>,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserCreatedResponse>), ApiError> {
    let mut violations: BTreeMap<String, Vec<String>> = BTreeMap::new();

    if body.username.trim().is_empty() {
        violations
            .entry("username".to_string())
            .or_default()
            .push("This field may not be blank.".to_string());
    }

    let email_violations = validate_email(&body.email);
    if !email_violations.is_empty() {
        violations
            .entry("email".to_string())
            .or_default()
            .extend(email_violations);
    } else if dal::email_exists(&body.email, &pool).await? {
        violations
            .entry("email".to_string())
            .or_default()
            .push("Email is already registered.".to_string());
    }

    let password_violations = validate_password(&body.password);
    if !password_violations.is_empty() {
        violations
            .entry("password".to_string())
            .or_default()
            .extend(password_violations);
    }

    if !violations.is_empty() {
        return Err(ApiError::Validation(violations));
    }

    let password_hash =
        bcrypt::hash(&body.password, bcrypt::DEFAULT_COST).map_err(anyhow::Error::from)?;

    let user = dal::insert_user(
        &body.username,
        &body.email,
        &password_hash,
        body.gdpr_consent,
        &pool,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(UserCreatedResponse {
            id: user.id,
            username: user.username,
            email: user.email,
        }),
    ))
}

pub async fn login(
    State(pool): State<Pool<Sqlite>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Some(user) = dal::get_user_by_email(&body.email, &pool).await? else {
        return Err(ApiError::InvalidCredentials);
    };

    let verified =
        bcrypt::verify(&body.password, &user.password_hash).map_err(anyhow::Error::from)?;
    if !verified {
        return Err(ApiError::InvalidCredentials);
    }

    Ok(Json(LoginResponse {
        message: "Login successful",
        user_id: user.id,
        username: user.username,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_password_without_symbol_is_rejected() {
        let violations = validate_password("short1");
        assert_eq!(violations.len(), 2);
    }

    #[test]
    fn policy_compliant_password_is_accepted() {
        assert!(validate_password("Valid1!pass").is_empty());
    }

    #[test]
    fn password_missing_only_a_digit_gets_one_violation() {
        let violations = validate_password("NoDigits!here");
        assert_eq!(violations, vec!["Password must contain at least one number."]);
    }

    #[test]
    fn email_shape_is_checked() {
        assert!(validate_email("rider@example.com").is_empty());
        assert!(!validate_email("not-an-email").is_empty());
        assert!(!validate_email("@example.com").is_empty());
    }
}
