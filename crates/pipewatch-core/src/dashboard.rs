//! Dashboard controller: wires one shared state to the poller and the
//! orchestrator.

use std::sync::Arc;

use crate::config::Config;
use crate::endpoints::Endpoints;
use crate::error::Result;
use crate::fetch::{Fetcher, HttpFetcher};
use crate::orchestrator::ConsistencyOrchestrator;
use crate::poller::SnapshotPoller;
use crate::state::SharedState;

/// Owns the shared state and the two engines that write to it
pub struct Dashboard<F: Fetcher> {
    state: SharedState,
    orchestrator: Arc<ConsistencyOrchestrator<F>>,
    poller: Arc<SnapshotPoller<F>>,
}

impl<F: Fetcher> Clone for Dashboard<F> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            orchestrator: Arc::clone(&self.orchestrator),
            poller: Arc::clone(&self.poller),
        }
    }
}

impl Dashboard<HttpFetcher> {
    /// Production dashboard talking HTTP to the configured gateway
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_fetcher(config, Arc::new(HttpFetcher::new()))
    }
}

impl<F: Fetcher + 'static> Dashboard<F> {
    pub fn with_fetcher(config: &Config, fetcher: Arc<F>) -> Result<Self> {
        config.validate()?;
        let endpoints = Endpoints::from_config(&config.endpoints)?;
        let state = SharedState::new();
        let orchestrator = Arc::new(ConsistencyOrchestrator::new(
            Arc::clone(&fetcher),
            endpoints.clone(),
            state.clone(),
        ));
        let poller = Arc::new(SnapshotPoller::new(
            fetcher,
            endpoints,
            Arc::clone(&orchestrator),
            &config.polling,
        ));
        Ok(Self {
            state,
            orchestrator,
            poller,
        })
    }

    #[must_use]
    pub fn state(&self) -> &SharedState {
        &self.state
    }

    #[must_use]
    pub fn orchestrator(&self) -> &Arc<ConsistencyOrchestrator<F>> {
        &self.orchestrator
    }

    #[must_use]
    pub fn poller(&self) -> &Arc<SnapshotPoller<F>> {
        &self.poller
    }
}
