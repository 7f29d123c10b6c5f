use tokio::sync::{Mutex, RwLock};

use bovespa_core::dispatcher::{EventDispatcher, HttpJobRunner};
use bovespa_core::{Config, SanitizedConfig};

use crate::api::runs::RunReport;

/// Shared application state
pub struct AppState {
    config: Config,
    dispatcher: EventDispatcher<HttpJobRunner>,
    /// Held for the duration of one acquisition session; a second trigger
    /// while a session is in flight is rejected rather than queued, since
    /// concurrent sessions would corrupt the download-directory snapshot.
    run_lock: Mutex<()>,
    last_run: RwLock<Option<RunReport>>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let runner = HttpJobRunner::new(config.dispatcher.clone())
            .map_err(|e| anyhow::anyhow!("Failed to create job runner: {}", e))?;
        let dispatcher = EventDispatcher::new(runner, config.dispatcher.job_name.clone());

        Ok(Self {
            config,
            dispatcher,
            run_lock: Mutex::new(()),
            last_run: RwLock::new(None),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn dispatcher(&self) -> &EventDispatcher<HttpJobRunner> {
        &self.dispatcher
    }

    pub fn run_lock(&self) -> &Mutex<()> {
        &self.run_lock
    }

    pub fn last_run(&self) -> &RwLock<Option<RunReport>> {
        &self.last_run
    }
}
