use actix_web::http::header;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use env_logger::Env;
use nikoflix::accounts::AccountSettings;
use nikoflix::app_config::AppConfig;
use nikoflix::auth::google::{GoogleTokenInfo, IdTokenVerifier};
use nikoflix::auth::jwt::JwtKeys;
use nikoflix::email::Mailer;
use nikoflix::middleware::{allowed_origins, build_cors};
use nikoflix::storage::{self, AssetStore};
use rand::{distributions::Alphanumeric, Rng};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_lib_mods();

    let config = AppConfig::load().expect("Failed to load configuration");

    let db = nikoflix::db::connect(&config.database)
        .await
        .expect("Failed to connect to the database");
    if config.database.auto_migrate {
        nikoflix::db::create_schema(&db)
            .await
            .expect("Failed to create database schema");
    }

    let jwt_secret = if config.auth.jwt_secret.is_empty() {
        let random_string: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(64)
            .map(char::from)
            .collect();
        log::warn!("NIKOFLIX_AUTH__JWT_SECRET is not set.\r\nTokens issued now will stop validating every time the application is restarted.\r\n\r\nNeed a secret? How about:\r\n{}", random_string);
        random_string
    } else {
        config.auth.jwt_secret.clone()
    };

    let store: Arc<dyn AssetStore> =
        storage::from_config(&config.storage).expect("Failed to initialize asset storage");
    log::info!("Asset storage backend: {}", store.name());

    if config.auth.google_client_id.is_empty() {
        log::warn!("Google sign-in is disabled: auth.google_client_id is not set");
    }
    let verifier: Arc<dyn IdTokenVerifier> =
        Arc::new(GoogleTokenInfo::new(config.auth.google_client_id.clone()));

    let db = Data::new(db);
    let keys = Data::new(JwtKeys::new(&jwt_secret, config.auth.token_ttl_minutes));
    let mailer = Data::new(Mailer::new(config.email.clone(), config.site.name.clone()));
    let settings = Data::new(AccountSettings::from_config(&config));
    let store: Data<dyn AssetStore> = Data::from(store);
    let verifier: Data<dyn IdTokenVerifier> = Data::from(verifier);

    log::info!("CORS allowed origins: {:?}", allowed_origins(&config));
    let cors_config = config.clone();
    let bind = config.server.bind.clone();
    log::info!("{} API listening on {}", config.site.name, bind);

    let mut server = HttpServer::new(move || {
        // Order of middleware IS IMPORTANT and is in REVERSE EXECUTION ORDER.
        App::new()
            .app_data(db.clone())
            .app_data(keys.clone())
            .app_data(mailer.clone())
            .app_data(settings.clone())
            .app_data(store.clone())
            .app_data(verifier.clone())
            // Security headers - applied to all responses
            .wrap(
                DefaultHeaders::new()
                    .add((header::X_FRAME_OPTIONS, "DENY"))
                    .add((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
                    .add(("Referrer-Policy", "strict-origin-when-cross-origin")),
            )
            .wrap(build_cors(&cors_config))
            .wrap(Logger::new("%a %r %s %Dms"))
            .configure(nikoflix::web::configure)
    });

    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server.bind(bind)?.run().await
}

/// Initialize third party crates we rely on but don't have control over.
pub fn init_lib_mods() {
    // A missing .env is fine; configuration also comes from config.toml and the environment.
    if let Err(e) = dotenv::dotenv() {
        eprintln!("No .env file loaded: {}", e);
    }
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}
