//! Account lifecycle: registration, email verification, password and Google
//! sign-in, password reset.

use crate::app_config::AppConfig;
use crate::auth::google::{GoogleAuthError, IdTokenVerifier};
use crate::auth::jwt::JwtKeys;
use crate::auth::{generate_token, hash_password, verify_password};
use crate::email::{templates, Mailer};
use crate::error::{is_unique_violation, ApiError, ApiResult};
use crate::orm::users::Role;
use crate::orm::{email_verifications, password_resets, users};
use chrono::{Duration, NaiveDateTime, Utc};
use sea_orm::{
    entity::*, query::*, ActiveValue::Set, ConnectionTrait, DatabaseConnection, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Link and expiry settings for the mailed tokens.
#[derive(Clone, Debug)]
pub struct AccountSettings {
    pub frontend_url: String,
    pub verification_ttl_hours: i64,
    pub reset_ttl_minutes: i64,
}

impl AccountSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            frontend_url: config.site.frontend_url.trim_end_matches('/').to_string(),
            verification_ttl_hours: config.auth.verification_ttl_hours,
            reset_ttl_minutes: config.auth.reset_ttl_minutes,
        }
    }

    fn verification_link(&self, token: &str) -> String {
        format!("{}/auth/verify-email?token={}", self.frontend_url, token)
    }

    fn reset_link(&self, token: &str) -> String {
        format!("{}/auth/reset-password?token={}", self.frontend_url, token)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 1, max = 255))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordInput {
    pub token: String,
    #[serde(alias = "newPassword")]
    #[validate(length(min = 8))]
    pub new_password: String,
}

/// User as returned to clients. Never carries the password hash.
#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub verified: bool,
    pub created_at: NaiveDateTime,
}

impl From<users::Model> for UserView {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            verified: user.verified,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserView,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

async fn find_by_email(db: &DatabaseConnection, email: &str) -> ApiResult<Option<users::Model>> {
    Ok(users::Entity::find()
        .filter(users::Column::Email.eq(normalize_email(email)))
        .one(db)
        .await?)
}

fn issue_token(keys: &JwtKeys, user: users::Model) -> ApiResult<AuthResponse> {
    let token = keys.issue(&user).map_err(|e| {
        log::error!("Failed to sign token for user_id {}: {}", user.id, e);
        ApiError::internal(e.to_string())
    })?;

    Ok(AuthResponse {
        token,
        user: user.into(),
    })
}

/// Stores a fresh verification token on the caller's connection.
async fn store_verification_token<C>(
    conn: &C,
    settings: &AccountSettings,
    user_id: i32,
) -> ApiResult<String>
where
    C: ConnectionTrait,
{
    let token = generate_token();
    let expires_at = Utc::now().naive_utc() + Duration::hours(settings.verification_ttl_hours);

    email_verifications::ActiveModel {
        user_id: Set(user_id),
        token: Set(token.clone()),
        expires_at: Set(expires_at),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    Ok(token)
}

/// Mail failures are logged and swallowed.
async fn mail_verification(
    mailer: &Mailer,
    settings: &AccountSettings,
    user: &users::Model,
    token: &str,
) {
    if let Err(e) = templates::send_verification_email(
        mailer,
        &user.email,
        &user.username,
        &settings.verification_link(token),
        settings.verification_ttl_hours,
    )
    .await
    {
        log::error!("Failed to send verification email to {}: {}", user.email, e);
    }
}

/// The user row and its first verification token are written together.
pub async fn register(
    db: &DatabaseConnection,
    mailer: &Mailer,
    settings: &AccountSettings,
    mut input: RegisterInput,
) -> ApiResult<users::Model> {
    input.email = normalize_email(&input.email);
    input.username = input.username.trim().to_string();
    input.validate()?;

    if find_by_email(db, &input.email).await?.is_some() {
        return Err(ApiError::bad_request("User already exists"));
    }

    let password_hash = hash_password(&input.password).map_err(|e| {
        log::error!("Failed to hash password: {}", e);
        ApiError::internal(e.to_string())
    })?;

    let txn = db.begin().await?;
    let user = users::ActiveModel {
        username: Set(input.username),
        email: Set(input.email),
        password_hash: Set(Some(password_hash)),
        role: Set(Role::User),
        verified: Set(false),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::bad_request("User already exists")
        } else {
            e.into()
        }
    })?;
    let token = store_verification_token(&txn, settings, user.id).await?;
    txn.commit().await?;

    log::info!("Registered user_id {} ({})", user.id, user.email);

    mail_verification(mailer, settings, &user, &token).await;
    Ok(user)
}

/// Finds a verification token that has not expired.
async fn validate_verification_token(
    db: &DatabaseConnection,
    token: &str,
) -> ApiResult<Option<email_verifications::Model>> {
    Ok(email_verifications::Entity::find()
        .filter(email_verifications::Column::Token.eq(token))
        .filter(email_verifications::Column::ExpiresAt.gt(Utc::now().naive_utc()))
        .one(db)
        .await?)
}

pub async fn verify_email(db: &DatabaseConnection, token: &str) -> ApiResult<users::Model> {
    let entry = validate_verification_token(db, token.trim())
        .await?
        .ok_or_else(|| ApiError::bad_request("Invalid or expired token"))?;

    let txn = db.begin().await?;

    let mut user: users::ActiveModel = users::Entity::find_by_id(entry.user_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::bad_request("Invalid or expired token"))?
        .into();
    user.verified = Set(true);
    let user = user.update(&txn).await?;

    email_verifications::Entity::delete_by_id(entry.id)
        .exec(&txn)
        .await?;
    txn.commit().await?;

    log::info!("Email verified for user_id: {}", user.id);
    Ok(user)
}

/// Issues a new link for an existing unverified account. Unknown and already
/// verified addresses are silently ignored.
pub async fn resend_verification(
    db: &DatabaseConnection,
    mailer: &Mailer,
    settings: &AccountSettings,
    email: &str,
) -> ApiResult<()> {
    match find_by_email(db, email).await? {
        Some(user) if !user.verified => {
            email_verifications::Entity::delete_many()
                .filter(email_verifications::Column::UserId.eq(user.id))
                .exec(db)
                .await?;
            let token = store_verification_token(db, settings, user.id).await?;
            mail_verification(mailer, settings, &user, &token).await;
            Ok(())
        }
        _ => Ok(()),
    }
}

pub async fn login(
    db: &DatabaseConnection,
    keys: &JwtKeys,
    input: LoginInput,
) -> ApiResult<AuthResponse> {
    let user = find_by_email(db, &input.email)
        .await?
        .ok_or_else(|| ApiError::bad_request("Invalid credentials"))?;

    if !user.verified {
        return Err(ApiError::bad_request(
            "Please verify your email before logging in.",
        ));
    }

    let hash = user.password_hash.as_deref().ok_or_else(|| {
        ApiError::bad_request("This account uses Google login. Please log in with Google.")
    })?;

    if !verify_password(&input.password, hash) {
        log::info!("Failed login for user_id {}", user.id);
        return Err(ApiError::bad_request("Invalid credentials"));
    }

    issue_token(keys, user)
}

/// Username for a new Google account: the profile name, else the local part
/// of the address.
fn google_username(name: Option<&str>, email: &str) -> String {
    name.map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| email.split('@').next().unwrap_or(email))
        .chars()
        .take(255)
        .collect()
}

pub async fn google_login(
    db: &DatabaseConnection,
    keys: &JwtKeys,
    verifier: &dyn IdTokenVerifier,
    id_token: &str,
) -> ApiResult<AuthResponse> {
    let identity = verifier.verify(id_token).await.map_err(|e| match e {
        GoogleAuthError::NotConfigured | GoogleAuthError::Http(_) => {
            ApiError::internal(e.to_string())
        }
        GoogleAuthError::InvalidToken(_) => {
            log::info!("Rejected Google sign-in: {}", e);
            ApiError::unauthorized("Google login failed")
        }
    })?;

    let email = normalize_email(&identity.email);
    let user = match find_by_email(db, &email).await? {
        Some(user) => user,
        None => {
            let user = users::ActiveModel {
                username: Set(google_username(identity.name.as_deref(), &email)),
                email: Set(email),
                password_hash: Set(None),
                role: Set(Role::User),
                verified: Set(true),
                created_at: Set(Utc::now().naive_utc()),
                ..Default::default()
            }
            .insert(db)
            .await?;
            log::info!("Created user_id {} from Google sign-in", user.id);
            user
        }
    };

    issue_token(keys, user)
}

pub async fn forgot_password(
    db: &DatabaseConnection,
    mailer: &Mailer,
    settings: &AccountSettings,
    email: &str,
) -> ApiResult<()> {
    let user = find_by_email(db, email)
        .await?
        .ok_or_else(|| ApiError::bad_request("User not found"))?;

    if user.password_hash.is_none() {
        return Err(ApiError::bad_request(
            "This account uses Google login. Please sign in with Google instead.",
        ));
    }

    let token = generate_token();
    password_resets::ActiveModel {
        user_id: Set(user.id),
        reset_token: Set(token.clone()),
        expires_at: Set(Utc::now().naive_utc() + Duration::minutes(settings.reset_ttl_minutes)),
        ..Default::default()
    }
    .insert(db)
    .await?;

    templates::send_password_reset_email(
        mailer,
        &user.email,
        &user.username,
        &settings.reset_link(&token),
        settings.reset_ttl_minutes,
    )
    .await
    .map_err(|e| {
        log::error!("Failed to send password reset email to {}: {}", user.email, e);
        ApiError::internal(e.to_string())
    })?;

    log::info!("Password reset requested for user_id: {}", user.id);
    Ok(())
}

pub async fn reset_password(db: &DatabaseConnection, input: ResetPasswordInput) -> ApiResult<()> {
    let entry = password_resets::Entity::find()
        .filter(password_resets::Column::ResetToken.eq(input.token.trim()))
        .filter(password_resets::Column::ExpiresAt.gt(Utc::now().naive_utc()))
        .one(db)
        .await?
        .ok_or_else(|| ApiError::bad_request("Invalid or expired token"))?;

    input.validate()?;

    let password_hash = hash_password(&input.new_password).map_err(|e| {
        log::error!("Failed to hash password: {}", e);
        ApiError::internal(e.to_string())
    })?;

    let txn = db.begin().await?;

    users::ActiveModel {
        id: Set(entry.user_id),
        password_hash: Set(Some(password_hash)),
        ..Default::default()
    }
    .update(&txn)
    .await?;

    password_resets::Entity::delete_by_id(entry.id)
        .exec(&txn)
        .await?;
    txn.commit().await?;

    log::info!("Password reset for user_id: {}", entry.user_id);
    Ok(())
}
