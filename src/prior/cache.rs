//! Lazily generated prior set owned by a pipeline.

use std::sync::OnceLock;

use crate::prior::{generate_validated, PriorConfig, PriorSet};
use crate::util::SsdOcrResult;

/// Holds a validated prior table and generates its priors on first use.
///
/// Generation runs at most once even when several threads ask for the priors
/// concurrently; later reads are lock-free.
#[derive(Debug)]
pub struct PriorCache {
    config: PriorConfig,
    priors: OnceLock<PriorSet>,
}

impl PriorCache {
    /// Validates the table without generating any priors yet.
    pub fn new(config: PriorConfig) -> SsdOcrResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            priors: OnceLock::new(),
        })
    }

    /// Returns the prior set, generating it if needed.
    pub fn get(&self) -> &PriorSet {
        self.priors
            .get_or_init(|| generate_validated(&self.config))
    }

    /// Returns true once the priors have been generated.
    pub fn is_initialized(&self) -> bool {
        self.priors.get().is_some()
    }

    /// Returns the table the priors are generated from.
    pub fn config(&self) -> &PriorConfig {
        &self.config
    }
}
