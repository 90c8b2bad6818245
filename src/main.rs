//! wallet-ledger server binary.
//!
//! Loads configuration, wires adapters to ports, and serves the webhook
//! and health endpoints until interrupted.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wallet_ledger::adapters::http::{app_router, HealthAppState, WebhookAppState};
use wallet_ledger::adapters::{
    HttpNotifier, InMemoryEscrowCreator, InMemoryLedgerStore, LogNotifier, PaystackConfig,
    PaystackVerifier, PostgresEscrowCreator, PostgresLedgerStore,
};
use wallet_ledger::application::{
    PaymentVerification, ReconcileWebhookHandler, ReconciliationServices,
};
use wallet_ledger::config::{AppConfig, DatabaseConfig, PaymentConfig, ServerConfig};
use wallet_ledger::domain::webhook::WebhookSignatureVerifier;
use wallet_ledger::ports::{EscrowCreator, HealthProbe, Notifier, TransactionStore};

/// Store handles built from one backend.
struct Persistence {
    store: Arc<dyn TransactionStore>,
    escrow_creator: Arc<dyn EscrowCreator>,
    probe: Arc<dyn HealthProbe>,
}

fn init_tracing(server: &ServerConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&server.log_level))
        .context("invalid log filter")?;

    if server.is_production() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true),
            )
            .try_init()
            .context("failed to install tracing subscriber")?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty().with_target(true))
            .try_init()
            .context("failed to install tracing subscriber")?;
    }
    Ok(())
}

async fn connect_persistence(database: &DatabaseConfig) -> anyhow::Result<Persistence> {
    if !database.is_configured() {
        tracing::warn!("No database configured; using the in-memory store (not durable)");
        let store = Arc::new(InMemoryLedgerStore::new());
        return Ok(Persistence {
            store: store.clone(),
            escrow_creator: Arc::new(InMemoryEscrowCreator::new()),
            probe: store,
        });
    }

    let pool = database
        .pool_options()
        .connect(database.url.trim())
        .await
        .context("failed to connect to PostgreSQL")?;

    if database.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to run migrations")?;
        tracing::info!("Database migrations applied");
    }

    let store = Arc::new(PostgresLedgerStore::new(pool.clone()));
    Ok(Persistence {
        store: store.clone(),
        escrow_creator: Arc::new(PostgresEscrowCreator::new(pool)),
        probe: store,
    })
}

fn build_verification(payment: &PaymentConfig) -> PaymentVerification {
    match payment.secret() {
        Some(secret) if payment.verify_with_gateway => {
            let verifier = PaystackVerifier::new(
                PaystackConfig::new(secret)
                    .with_base_url(payment.api_base_url.clone())
                    .with_timeout(payment.verify_timeout()),
            );
            PaymentVerification::new(Arc::new(verifier), payment.verify_timeout())
        }
        _ => {
            tracing::info!("Secondary verification with the gateway is disabled");
            PaymentVerification::disabled()
        }
    }
}

fn build_notifier(config: &AppConfig) -> Arc<dyn Notifier> {
    match config.notifications.endpoint() {
        Some(url) => Arc::new(HttpNotifier::new(url, config.notifications.timeout())),
        None => Arc::new(LogNotifier::new()),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config.server)?;
    config.validate().context("invalid configuration")?;

    let signature_verifier = WebhookSignatureVerifier::from_optional(
        config.payment.secret().map(str::to_owned),
    );
    if !signature_verifier.is_configured() {
        tracing::error!("Payment secret is not configured; every webhook will be refused with 500");
    }

    let persistence = connect_persistence(&config.database).await?;
    let services = ReconciliationServices {
        store: persistence.store,
        verification: build_verification(&config.payment),
        escrow_creator: persistence.escrow_creator,
        notifier: build_notifier(&config),
    };
    let handler = Arc::new(ReconcileWebhookHandler::new(signature_verifier, services));

    let app = app_router(
        WebhookAppState::new(handler),
        HealthAppState {
            probe: persistence.probe,
        },
        config.server.request_timeout(),
    );

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(%addr, environment = ?config.server.environment, "wallet-ledger listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}
