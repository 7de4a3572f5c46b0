use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::issue_token;
use crate::error::{is_unique_violation, AppError, AppJson};
use crate::models::{User, UserView};
use crate::password::{hash_password, verify_password};
use crate::AppState;

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Deserialize)]
pub struct SignupBody {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

#[derive(Deserialize)]
pub struct SigninBody {
    email: Option<String>,
    password: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/signin", post(signin))
}

async fn signup(
    State(state): State<AppState>,
    AppJson(body): AppJson<SignupBody>,
) -> Result<impl IntoResponse, AppError> {
    let username = body.username.as_deref().unwrap_or("").trim().to_string();
    let email = body.email.as_deref().unwrap_or("").trim().to_lowercase();
    let password = body.password.unwrap_or_default();

    if username.is_empty() || email.is_empty() || password.is_empty() {
        return Err(AppError::Validation(
            "Username, email and password are required".to_string(),
        ));
    }
    if !email.contains('@') {
        return Err(AppError::Validation(
            "Please provide a valid email".to_string(),
        ));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let password_hash = hash_password(&password)?;
    let now = Utc::now().to_rfc3339();
    let id = Uuid::new_v4().to_string();

    let result = sqlx::query(
        r#"
        INSERT INTO users (id, username, email, password_hash, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&username)
    .bind(&email)
    .bind(&password_hash)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await;

    if let Err(e) = result {
        if is_unique_violation(&e) {
            return Err(AppError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }
        return Err(e.into());
    }

    let token = issue_token(&id, &state.jwt)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "User created successfully",
            "token": token,
            "user": UserView { id, username, email },
        })),
    ))
}

async fn signin(
    State(state): State<AppState>,
    AppJson(body): AppJson<SigninBody>,
) -> Result<impl IntoResponse, AppError> {
    let email = body.email.as_deref().unwrap_or("").trim().to_lowercase();
    let password = body.password.unwrap_or_default();

    if email.is_empty() || password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?;

    // Unknown email and wrong password share one rejection so the endpoint
    // cannot be used to probe for accounts.
    let Some(user) = user else {
        return Err(AppError::InvalidCredentials);
    };
    if !verify_password(&password, &user.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    let token = issue_token(&user.id, &state.jwt)?;

    Ok(Json(json!({
        "success": true,
        "message": "Signed in successfully",
        "token": token,
        "user": UserView::from(user),
    })))
}
