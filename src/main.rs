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

use proconnect_messaging::api::MgmtState;
use proconnect_messaging::config::Config;
use proconnect_messaging::{AppBuilder, adapters, telemetry};
use std::net::SocketAddr;
use tokio::sync::watch;
use tracing::Instrument;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load();
    let telemetry_guard = telemetry::init_telemetry(&config.telemetry)?;

    proconnect_messaging::setup_panic_hook();

    let boot_span = tracing::info_span!("boot_server");
    let (api_listener, mgmt_listener, app_router, mgmt_app, shutdown_rx) = async {
        // Phase 1: Infrastructure Setup
        let pool = adapters::database::init_pool(&config.database).await?;
        proconnect_messaging::run_migrations(&pool).await?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        proconnect_messaging::spawn_signal_handler(shutdown_tx);

        // Phase 2: Component Wiring
        let app = AppBuilder::new(config.clone()).with_database(pool).build()?;

        // Phase 3: Listeners and Routers
        let app_router = proconnect_messaging::api::app_router(&config, app.services);
        let mgmt_app = proconnect_messaging::api::mgmt_router(MgmtState { health_service: app.health_service });

        let api_addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
        let mgmt_addr: SocketAddr = format!("{}:{}", config.server.host, config.server.mgmt_port).parse()?;

        tracing::info!(address = %api_addr, "listening");
        tracing::info!(address = %mgmt_addr, "management server listening");

        let api_listener = tokio::net::TcpListener::bind(api_addr).await?;
        let mgmt_listener = tokio::net::TcpListener::bind(mgmt_addr).await?;

        Ok::<_, anyhow::Error>((api_listener, mgmt_listener, app_router, mgmt_app, shutdown_rx))
    }
    .instrument(boot_span)
    .await?;

    // Phase 4: Serve until a shutdown signal arrives
    let mut api_rx = shutdown_rx.clone();
    let api_server = axum::serve(api_listener, app_router.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async move {
            let _ = api_rx.wait_for(|&s| s).await;
        });

    let mut mgmt_rx = shutdown_rx.clone();
    let mgmt_server = axum::serve(mgmt_listener, mgmt_app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async move {
            let _ = mgmt_rx.wait_for(|&s| s).await;
        });

    // Phase 5: Bounded drain of in-flight requests
    let drain = async { tokio::try_join!(api_server, mgmt_server) };
    tokio::select! {
        result = drain => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Server error");
            }
        }
        () = async {
            let mut rx = shutdown_rx.clone();
            let _ = rx.wait_for(|&s| s).await;
            tokio::time::sleep(std::time::Duration::from_secs(config.server.shutdown_timeout_secs)).await;
        } => {
            tracing::warn!("Timeout waiting for in-flight requests to finish.");
        }
    }

    telemetry_guard.shutdown();
    Ok(())
}
