use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use infra::repos::{CreateUser, UserRepo};

use crate::auth::PasswordService;
use crate::error::AppError;
use crate::state::AppState;
use crate::types::PublicUser;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct SignupResponse {
    pub user: PublicUser,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: PublicUser,
}

pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), AppError> {
    validate_signup(&body)?;

    let password_hash = PasswordService::hash_password(&body.password)?;

    let repo = UserRepo::new(state.db.clone());
    let user = repo
        .create(CreateUser {
            email: body.email,
            username: body.username,
            password_hash,
        })
        .await
        .map_err(|e| {
            AppError::on_unique_violation(
                e,
                AppError::Conflict("user with this email or username already exists".into()),
            )
        })?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse { user: user.into() }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let repo = UserRepo::new(state.db.clone());

    // A uniform error for unknown email and wrong password keeps account
    // enumeration off the table.
    let user = repo
        .get_by_email(&body.email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !PasswordService::verify_password(&body.password, &user.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    let token = state
        .jwt_service()
        .create_token(user.id, user.email.clone(), user.is_admin)?;

    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}

fn validate_signup(body: &SignupRequest) -> Result<(), AppError> {
    if !is_valid_email(&body.email) {
        return Err(AppError::Validation("invalid email address".into()));
    }
    if body.username.chars().count() < 3 {
        return Err(AppError::Validation(
            "username must be at least 3 characters".into(),
        ));
    }
    if body.password.chars().count() < 6 {
        return Err(AppError::Validation(
            "password must be at least 6 characters".into(),
        ));
    }
    Ok(())
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_addresses() {
        assert!(is_valid_email("john@example.com"));
        assert!(is_valid_email("a.b+c@mail.example.org"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("john@"));
        assert!(!is_valid_email("john@nodot"));
        assert!(!is_valid_email("john doe@example.com"));
    }

    #[test]
    fn signup_validation_bounds() {
        let ok = SignupRequest {
            email: "a@b.co".into(),
            username: "abc".into(),
            password: "secret".into(),
        };
        assert!(validate_signup(&ok).is_ok());

        let short_name = SignupRequest {
            username: "ab".into(),
            ..ok_clone(&ok)
        };
        assert!(validate_signup(&short_name).is_err());

        let short_pass = SignupRequest {
            password: "12345".into(),
            ..ok_clone(&ok)
        };
        assert!(validate_signup(&short_pass).is_err());
    }

    fn ok_clone(r: &SignupRequest) -> SignupRequest {
        SignupRequest {
            email: r.email.clone(),
            username: r.username.clone(),
            password: r.password.clone(),
        }
    }
}
