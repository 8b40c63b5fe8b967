#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

pub mod adapters;
pub mod api;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod telemetry;
pub mod views;

use crate::adapters::database::DbPool;
use crate::api::ServiceContainer;
use crate::config::Config;
use crate::services::health_service::HealthService;
use crate::services::message_service::MessageService;
use crate::services::store::{MessageStore, UserDirectory};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Fully wired services, ready to be mounted on routers.
#[derive(Debug)]
pub struct App {
    pub services: ServiceContainer,
    pub health_service: HealthService,
}

/// Wires the message store into services. The store is chosen by the caller so
/// the binary can use Postgres while tests run against the in-memory adapter.
#[derive(Debug)]
pub struct AppBuilder {
    config: Config,
    messages: Option<Arc<dyn MessageStore>>,
    users: Option<Arc<dyn UserDirectory>>,
}

impl AppBuilder {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config, messages: None, users: None }
    }

    #[must_use]
    pub fn with_database(self, pool: DbPool) -> Self {
        self.with_store(Arc::new(adapters::database::PgStore::new(pool)))
    }

    #[must_use]
    pub fn with_store<S>(mut self, store: Arc<S>) -> Self
    where
        S: MessageStore + UserDirectory + 'static,
    {
        self.messages = Some(Arc::clone(&store) as Arc<dyn MessageStore>);
        self.users = Some(store as Arc<dyn UserDirectory>);
        self
    }

    /// Builds the services.
    ///
    /// # Errors
    /// Returns an error if no store was configured.
    pub fn build(self) -> anyhow::Result<App> {
        let messages = self.messages.ok_or_else(|| anyhow::anyhow!("message store not configured"))?;
        let users = self.users.ok_or_else(|| anyhow::anyhow!("user directory not configured"))?;

        let health_service =
            HealthService::new(Arc::clone(&messages), Duration::from_millis(self.config.database.ping_timeout_ms));
        let message_service = MessageService::new(messages, users);

        Ok(App { services: ServiceContainer { message_service }, health_service })
    }
}

/// Applies pending database migrations.
///
/// # Errors
/// Returns an error if a migration fails.
pub async fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    sqlx::migrate!().run(pool).await?;
    Ok(())
}

/// Flips the shutdown channel on SIGINT or SIGTERM.
pub fn spawn_signal_handler(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
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
            () = ctrl_c => {},
            () = terminate => {},
        }

        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });
}

/// Routes panics through tracing so they reach structured logs.
pub fn setup_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let location = info.location().map(|l| format!("{}:{}", l.file(), l.line())).unwrap_or_default();
        tracing::error!(panic = %info, %location, "Thread panicked");
    }));
}
