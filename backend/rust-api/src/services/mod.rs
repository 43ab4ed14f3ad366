use std::sync::Arc;

use crate::config::Config;
use crate::storage::LearningStore;
use crate::utils::time::{Clock, SystemClock};

use ledger::ResourceLedger;
use recorder::ProgressRecorder;

pub mod grader;
pub mod ledger;
pub mod locks;
pub mod recorder;

pub struct AppState {
    pub config: Config,
    pub recorder: ProgressRecorder,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn LearningStore>) -> Self {
        Self::with_clock(config, store, Arc::new(SystemClock))
    }

    pub fn with_clock(config: Config, store: Arc<dyn LearningStore>, clock: Arc<dyn Clock>) -> Self {
        let ledger = ResourceLedger::new(config.ledger_policy());
        tracing::info!(
            "Progress recorder ready: backend={}, policy={:?}",
            store.backend_name(),
            ledger.policy()
        );

        Self {
            recorder: ProgressRecorder::new(store, ledger, clock),
            config,
        }
    }
}
