//! Authentication route handlers.
//!
//! JSON endpoints for customer registration and login.

use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use brightspoke_core::{AccountId, CartId, CustomerId, Email, Role};

use crate::error::{AppJson, Result, set_sentry_user};
use crate::services::auth::{AuthService, NewAccount};
use crate::state::AppState;
use crate::store::Account;

// =============================================================================
// Request Types
// =============================================================================

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// =============================================================================
// Response Types
// =============================================================================

/// Account payload included in auth responses: the stored account without
/// its password hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub id: AccountId,
    pub username: String,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for UserPayload {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            username: account.username,
            email: account.email,
            first_name: account.first_name,
            last_name: account.last_name,
            role: account.role,
            created_at: account.created_at,
        }
    }
}

/// Registration response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
    pub user: UserPayload,
    pub customer_id: CustomerId,
    pub cart_id: CartId,
}

/// Login response body.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserPayload,
}

// =============================================================================
// Handlers
// =============================================================================

/// Register a new customer.
///
/// POST /auth/register
///
/// Provisions the account, its customer profile, and an empty cart in one
/// all-or-nothing step.
///
/// # Errors
///
/// Returns 400 for validation failures and duplicate emails, 5xx when the
/// store cannot persist the chain.
pub async fn register(
    State(state): State<AppState>,
    AppJson(body): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    let auth = AuthService::new(state.store(), state.sessions());

    let provisioned = auth
        .register(NewAccount {
            username: body.username,
            email: body.email,
            password: SecretString::from(body.password),
            first_name: body.firstname,
            last_name: body.lastname,
        })
        .await?;

    set_sentry_user(
        provisioned.account.id,
        Some(provisioned.account.email.as_str()),
    );

    let response = RegisterResponse {
        message: "User registered successfully".to_owned(),
        user: provisioned.account.into(),
        customer_id: provisioned.customer_id,
        cart_id: provisioned.cart_id,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Login with email and password.
///
/// POST /auth/login
///
/// # Errors
///
/// Returns 400 with `User not found` or `Invalid password` when the
/// credentials do not match a stored account.
pub async fn login(
    State(state): State<AppState>,
    AppJson(body): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let auth = AuthService::new(state.store(), state.sessions());

    let session = auth
        .login(&body.email, &SecretString::from(body.password))
        .await?;

    set_sentry_user(session.account.id, Some(session.account.email.as_str()));

    Ok(Json(LoginResponse {
        token: session.token,
        user: session.account.into(),
    }))
}
