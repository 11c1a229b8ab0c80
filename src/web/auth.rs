//! `/api/auth`: registration, verification, sign-in and password reset.

use crate::accounts::{self, AccountSettings, LoginInput, RegisterInput, ResetPasswordInput};
use crate::auth::google::IdTokenVerifier;
use crate::auth::jwt::JwtKeys;
use crate::email::Mailer;
use crate::error::ApiResult;
use actix_web::{get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;

pub(super) fn configure(conf: &mut web::ServiceConfig) {
    conf.service(register)
        .service(verify_email)
        .service(resend_verification)
        .service(login)
        .service(google_login)
        .service(forgot_password)
        .service(reset_password)
        .service(logout);
}

#[derive(Deserialize)]
pub struct TokenQuery {
    pub token: String,
}

#[derive(Deserialize)]
pub struct EmailForm {
    pub email: String,
}

#[derive(Deserialize)]
pub struct GoogleForm {
    #[serde(alias = "idToken", alias = "credential")]
    pub id_token: String,
}

#[post("/auth/register")]
pub async fn register(
    db: web::Data<DatabaseConnection>,
    mailer: web::Data<Mailer>,
    settings: web::Data<AccountSettings>,
    form: web::Json<RegisterInput>,
) -> ApiResult<HttpResponse> {
    let user = accounts::register(&db, &mailer, &settings, form.into_inner()).await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Registration successful. Please check your email to verify account.",
        "user_id": user.id,
    })))
}

#[get("/auth/verify-email")]
pub async fn verify_email(
    db: web::Data<DatabaseConnection>,
    query: web::Query<TokenQuery>,
) -> ApiResult<HttpResponse> {
    accounts::verify_email(&db, &query.token).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Email verified successfully. You can now log in."
    })))
}

#[post("/auth/resend-verification")]
pub async fn resend_verification(
    db: web::Data<DatabaseConnection>,
    mailer: web::Data<Mailer>,
    settings: web::Data<AccountSettings>,
    form: web::Json<EmailForm>,
) -> ApiResult<HttpResponse> {
    accounts::resend_verification(&db, &mailer, &settings, &form.email).await?;

    // Same answer whether or not the address is known.
    Ok(HttpResponse::Ok().json(json!({
        "message": "If that account exists and is not yet verified, a new verification email has been sent."
    })))
}

#[post("/auth/login")]
pub async fn login(
    db: web::Data<DatabaseConnection>,
    keys: web::Data<JwtKeys>,
    form: web::Json<LoginInput>,
) -> ApiResult<HttpResponse> {
    let response = accounts::login(&db, &keys, form.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/auth/google")]
pub async fn google_login(
    db: web::Data<DatabaseConnection>,
    keys: web::Data<JwtKeys>,
    verifier: web::Data<dyn IdTokenVerifier>,
    form: web::Json<GoogleForm>,
) -> ApiResult<HttpResponse> {
    let response = accounts::google_login(&db, &keys, verifier.get_ref(), &form.id_token).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/auth/forgot-password")]
pub async fn forgot_password(
    db: web::Data<DatabaseConnection>,
    mailer: web::Data<Mailer>,
    settings: web::Data<AccountSettings>,
    form: web::Json<EmailForm>,
) -> ApiResult<HttpResponse> {
    accounts::forgot_password(&db, &mailer, &settings, &form.email).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Password reset link sent to your email."
    })))
}

#[post("/auth/reset-password")]
pub async fn reset_password(
    db: web::Data<DatabaseConnection>,
    form: web::Json<ResetPasswordInput>,
) -> ApiResult<HttpResponse> {
    accounts::reset_password(&db, form.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Password has been reset successfully."
    })))
}

/// Tokens are stateless; the client discards its copy.
#[post("/auth/logout")]
pub async fn logout() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "message": "Logged out. Please remove the token on the client."
    }))
}
