//! Course Academy storefront backend - application entry point.
//!
//! Loads configuration, connects to PostgreSQL, wires adapters into the
//! storefront router and serves it with axum.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use course_academy::adapters::auth::{Argon2CredentialHasher, JwtSessionValidator};
use course_academy::adapters::email::{LoggingNotifier, ResendConfig, ResendNotifier};
use course_academy::adapters::http::{app_router, AuthState, StorefrontAppState};
use course_academy::adapters::postgres::{
    PostgresCourseRepository, PostgresOrderRepository, PostgresUserRepository,
};
use course_academy::adapters::stripe::{StripeConfig, StripePaymentAdapter};
use course_academy::config::{AppConfig, ServerConfig};
use course_academy::ports::Notifier;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;
    tracing::debug!("Configuration loaded");

    let pool = config.database.pool_options().connect(&config.database.url).await?;
    tracing::info!("Database connected");

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Migrations applied");
    }

    let public_url = config.server.normalized_public_url();

    let notifier: Arc<dyn Notifier> = match config.email.api_key() {
        Some(key) => Arc::new(ResendNotifier::new(ResendConfig::new(
            secrecy::SecretString::new(key.to_string()),
            config.email.from_header(),
        ))),
        None => {
            tracing::warn!("No Resend API key configured; emails will be logged and skipped");
            Arc::new(LoggingNotifier::new())
        }
    };

    let payment_provider = StripePaymentAdapter::new(
        StripeConfig::new(
            config.payment.stripe_api_key.clone(),
            config.payment.stripe_webhook_secret.clone(),
        )
        .with_base_url(config.payment.api_base_url.clone()),
    );

    let state = StorefrontAppState {
        users: Arc::new(PostgresUserRepository::new(pool.clone())),
        courses: Arc::new(PostgresCourseRepository::new(pool.clone())),
        orders: Arc::new(PostgresOrderRepository::new(pool)),
        payment_provider: Arc::new(payment_provider),
        hasher: Arc::new(Argon2CredentialHasher::new()),
        notifier,
        public_url: public_url.clone(),
        checkout_locale: config.payment.checkout_locale.clone(),
    };

    let auth = AuthState::new(
        Arc::new(JwtSessionValidator::new(config.auth.secret())),
        config.auth.cookie_name.clone(),
    );

    let app = app_router(state, auth)
        .layer(cors_layer(&config.server))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, %public_url, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Initialize tracing subscriber
///
/// `RUST_LOG` overrides the configured filter; production logs are JSON.
fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(server.log_level.clone()));

    let registry = tracing_subscriber::registry().with(filter);
    if server.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            HeaderName::from_static("stripe-signature"),
        ])
        .allow_credentials(true)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
