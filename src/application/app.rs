use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

use crate::api::{self, AppState};
use crate::config::{LoggingSettings, Settings};
use crate::domain::types::ApiKey;
use crate::infrastructure::log_messages::application;
use crate::providers::{AnthropicProvider, CompletionProvider, GithubFetcher};
use crate::{Error, Result};

/// Main application struct that wires settings, providers and the server
pub struct Application {
    settings: Settings,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Load settings, install the tracing subscriber and bind the listener
    pub async fn new() -> Result<Self> {
        let settings = Settings::new()?;
        init_tracing(&settings.logging);
        Self::build(settings).await
    }

    /// Build from explicit settings; tracing is left to the caller
    #[instrument(skip(settings), fields(environment = %settings.application.environment))]
    pub async fn build(settings: Settings) -> Result<Self> {
        info!(version = env!("CARGO_PKG_VERSION"), "{}", application::STARTING);

        let completion = completion_provider(&settings)?;
        let source = GithubFetcher::new(&settings.github)
            .map_err(|e| Error::application(e.to_string()))?;
        let state = AppState::new(completion, Arc::new(source));

        let listener = TcpListener::bind(settings.bind_address()).await?;
        Ok(Self {
            settings,
            listener,
            state,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn local_addr(&self) -> Result<std::net::SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until ctrl-c
    pub async fn run(self) -> Result<()> {
        let addr = self.listener.local_addr()?;
        info!(%addr, "{}", application::LISTENING);

        let router = api::router(self.state, &self.settings.application);
        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("{}", application::STOPPED);
        Ok(())
    }
}

fn completion_provider(settings: &Settings) -> Result<Option<Arc<dyn CompletionProvider>>> {
    let Some(api_key) = settings
        .anthropic
        .api_key
        .clone()
        .and_then(|key| ApiKey::try_new(key).ok())
    else {
        warn!("{}", application::CREDENTIAL_MISSING);
        return Ok(None);
    };

    let provider = AnthropicProvider::new(&settings.anthropic, api_key)
        .map_err(|e| Error::application(e.to_string()))?;
    Ok(Some(Arc::new(provider)))
}

/// `RUST_LOG` wins; otherwise `logging.level`
fn init_tracing(logging: &LoggingSettings) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let installed = if logging.format.eq_ignore_ascii_case("pretty") {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .pretty()
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init()
    };

    // A subscriber installed earlier (tests, embedding) stays in place
    let _ = installed;
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "{}", application::SIGNAL_LISTENER_FAILED);
        std::future::pending::<()>().await;
    }
    info!("{}", application::SHUTDOWN_SIGNAL);
}
