//! Settings for relation queries.

use gsv_core::Identity;
use gsv_eval::{CancelToken, Limits};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct RelationConfig {
    /// Step budget of each evaluation performed by a query; `None` for no
    /// bound.
    pub gas_limit: Option<u64>,
    /// Wall-clock budget of a whole query.
    pub time_limit: Option<Duration>,
    pub cancel: Option<CancelToken>,
    /// Worker threads used to check enumerated states. `0` and `1` both mean
    /// checking on the calling thread.
    pub threads: usize,
    /// Forward the trace of every nested evaluation to the caller's logger.
    pub log_details: bool,
    /// Membership criterion of the enumerated states.
    pub identity: Identity,
}

impl Default for RelationConfig {
    fn default() -> Self {
        Self {
            gas_limit: None,
            time_limit: None,
            cancel: None,
            threads: 1,
            log_details: false,
            identity: Identity::Structural,
        }
    }
}

impl RelationConfig {
    pub fn with_gas_limit(mut self, gas_limit: Option<u64>) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = Some(time_limit);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_log_details(mut self, log_details: bool) -> Self {
        self.log_details = log_details;
        self
    }

    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = identity;
        self
    }

    /// Evaluation limits for a query starting now.
    pub(crate) fn limits(&self) -> Limits {
        Limits {
            gas_limit: self.gas_limit,
            deadline: self.time_limit.map(|limit| Instant::now() + limit),
            cancel: self.cancel.clone(),
        }
    }
}
