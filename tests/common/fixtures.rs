//! Test fixtures for creating test data
#![allow(dead_code)]

use actix_web::web::{Data, ServiceConfig};
use async_trait::async_trait;
use chrono::Utc;
use nikoflix::accounts::AccountSettings;
use nikoflix::auth::google::{GoogleAuthError, GoogleIdentity, IdTokenVerifier};
use nikoflix::auth::hash_password;
use nikoflix::auth::jwt::JwtKeys;
use nikoflix::email::Mailer;
use nikoflix::middleware::AuthUser;
use nikoflix::orm::users::Role;
use nikoflix::orm::{movies, series, users};
use nikoflix::storage::{AssetRef, AssetStore, DetachedStore, StorageError};
use sea_orm::{entity::*, ActiveValue::Set, DatabaseConnection, DbErr};
use std::sync::{Arc, Mutex};

pub const TEST_SECRET: &str = "integration-test-secret";
pub const TEST_PASSWORD: &str = "correct horse battery";

pub fn test_keys() -> JwtKeys {
    JwtKeys::new(TEST_SECRET, 60)
}

pub fn test_settings() -> AccountSettings {
    AccountSettings {
        frontend_url: "http://frontend.test".to_string(),
        verification_ttl_hours: 24,
        reset_ttl_minutes: 15,
    }
}

/// Create a user with known credentials.
pub async fn create_user(
    db: &DatabaseConnection,
    username: &str,
    email: &str,
    role: Role,
    verified: bool,
) -> Result<users::Model, DbErr> {
    let password_hash = hash_password(TEST_PASSWORD)
        .map_err(|e| DbErr::Custom(format!("Password hashing failed: {}", e)))?;

    users::ActiveModel {
        username: Set(username.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(Some(password_hash)),
        role: Set(role),
        verified: Set(verified),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn create_viewer(db: &DatabaseConnection, username: &str) -> Result<users::Model, DbErr> {
    create_user(
        db,
        username,
        &format!("{}@test.com", username),
        Role::User,
        true,
    )
    .await
}

pub async fn create_admin(db: &DatabaseConnection) -> Result<users::Model, DbErr> {
    create_user(db, "admin", "admin@test.com", Role::Admin, true).await
}

/// Identity as the bearer extractor would produce it.
pub fn auth_user(user: &users::Model) -> AuthUser {
    AuthUser {
        user_id: user.id,
        role: user.role.clone(),
        email: user.email.clone(),
    }
}

pub fn bearer(keys: &JwtKeys, user: &users::Model) -> String {
    format!("Bearer {}", keys.issue(user).expect("token signing"))
}

pub async fn create_movie(db: &DatabaseConnection, title: &str) -> Result<movies::Model, DbErr> {
    movies::ActiveModel {
        title: Set(title.to_string()),
        release_year: Set(Some(2020)),
        is_premium: Set(false),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn create_series(
    db: &DatabaseConnection,
    title: &str,
    is_animated: bool,
) -> Result<series::Model, DbErr> {
    series::ActiveModel {
        title: Set(title.to_string()),
        is_animated: Set(is_animated),
        is_premium: Set(false),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Pulls the 64 hex character token out of a mailed link.
pub fn token_from_body(body: &str) -> Option<String> {
    let start = body.find("token=")? + "token=".len();
    let token: String = body[start..]
        .chars()
        .take_while(|c| c.is_ascii_hexdigit())
        .collect();
    (token.len() == 64).then(|| token)
}

/// Store that remembers every asset it was asked to delete.
#[derive(Default)]
pub struct RecordingStore {
    pub deleted: Mutex<Vec<AssetRef>>,
}

impl RecordingStore {
    pub fn deleted_ids(&self) -> Vec<String> {
        self.deleted
            .lock()
            .unwrap()
            .iter()
            .map(|asset| asset.public_id.clone())
            .collect()
    }
}

#[async_trait]
impl AssetStore for RecordingStore {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn delete(&self, asset: &AssetRef) -> Result<(), StorageError> {
        self.deleted.lock().unwrap().push(asset.clone());
        Ok(())
    }
}

/// Store whose deletes always fail.
pub struct FailingStore;

#[async_trait]
impl AssetStore for FailingStore {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn delete(&self, _asset: &AssetRef) -> Result<(), StorageError> {
        Err(StorageError::Cloudinary("simulated outage".to_string()))
    }
}

/// Accepts exactly one ID token.
pub struct FakeGoogle {
    pub token: String,
    pub identity: GoogleIdentity,
}

#[async_trait]
impl IdTokenVerifier for FakeGoogle {
    async fn verify(&self, id_token: &str) -> Result<GoogleIdentity, GoogleAuthError> {
        if id_token == self.token {
            Ok(self.identity.clone())
        } else {
            Err(GoogleAuthError::InvalidToken("unknown token".to_string()))
        }
    }
}

/// App data for `actix_web::test::init_service`.
pub struct TestState {
    pub db: Data<DatabaseConnection>,
    pub keys: Data<JwtKeys>,
    pub mailer: Data<Mailer>,
    pub settings: Data<AccountSettings>,
    pub store: Data<dyn AssetStore>,
    pub verifier: Data<dyn IdTokenVerifier>,
}

impl TestState {
    pub fn new(db: DatabaseConnection) -> Self {
        let store: Arc<dyn AssetStore> = Arc::new(DetachedStore);
        let verifier: Arc<dyn IdTokenVerifier> = Arc::new(FakeGoogle {
            token: "valid-google-token".to_string(),
            identity: GoogleIdentity {
                email: "googler@test.com".to_string(),
                name: Some("Googler".to_string()),
            },
        });

        Self {
            db: Data::new(db),
            keys: Data::new(test_keys()),
            mailer: Data::new(Mailer::mock("Test Flix")),
            settings: Data::new(test_settings()),
            store: Data::from(store),
            verifier: Data::from(verifier),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn AssetStore>) -> Self {
        self.store = Data::from(store);
        self
    }

    /// Registers the app data and every route.
    pub fn configure(&self, cfg: &mut ServiceConfig) {
        cfg.app_data(self.db.clone())
            .app_data(self.keys.clone())
            .app_data(self.mailer.clone())
            .app_data(self.settings.clone())
            .app_data(self.store.clone())
            .app_data(self.verifier.clone());
        nikoflix::web::configure(cfg);
    }
}
