//! Warden - Headless session client entry point
//!
//! Wires the real adapters to the session core, optionally logs in with
//! credentials from the environment, and then watches the session,
//! reporting monitor signals until the process is stopped.

use std::sync::Arc;

use tokio::sync::mpsc;
use warden_application::ports::{AuthGateway, Clock, KeyValueStorage};
use warden_application::{SessionFacade, SessionMonitor, SessionSignal, SessionStore};
use warden_domain::{Credentials, DeviceInfo};
use warden_infrastructure::{ApiConfig, FileStorage, HttpAuthGateway, ReqwestTransport, SystemClock};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ApiConfig::from_env()?;
    tracing::info!(base_url = %config.base_url, "starting warden");

    let storage = Arc::new(FileStorage::open_default()?) as Arc<dyn KeyValueStorage>;
    let store = SessionStore::new(storage);
    let clock = Arc::new(SystemClock::new()) as Arc<dyn Clock>;
    let gateway =
        Arc::new(HttpAuthGateway::new(ReqwestTransport::new(&config)?)) as Arc<dyn AuthGateway>;
    let device = DeviceInfo::new(std::env::consts::OS);

    let facade = SessionFacade::new(store.clone(), gateway, clock.clone(), device);

    if !facade.is_authenticated()
        && let (Ok(username), Ok(password)) = (
            std::env::var("WARDEN_USERNAME"),
            std::env::var("WARDEN_PASSWORD"),
        )
    {
        let session = facade
            .login(&Credentials::new(username, password).remembered())
            .await?;
        tracing::info!(user = %session.user.display_name, role = %session.user.role, "logged in");
    }

    tracing::info!(authenticated = facade.is_authenticated(), "session status");

    let (signals, mut receiver) = mpsc::unbounded_channel();
    let _monitor = SessionMonitor::start(store, clock, signals);

    while let Some(signal) = receiver.recv().await {
        match signal {
            SessionSignal::Expired => tracing::warn!("session expired"),
            SessionSignal::NearExpiry { minutes_left } => {
                tracing::warn!(minutes_left, "session expires soon");
            }
        }
    }

    Ok(())
}
