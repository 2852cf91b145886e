// Application state module
// Everything a request needs, built once at startup and shared by reference

use std::sync::Arc;

use super::types::Config;
use crate::contact::{BackupStore, Notifier};

/// Application state
pub struct AppState {
    pub config: Config,
    pub backup: BackupStore,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(config: &Config, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            config: config.clone(),
            backup: BackupStore::new(&config.backup),
            notifier,
        }
    }
}
