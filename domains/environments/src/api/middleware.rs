//! Environments domain state

use std::sync::Arc;

use crate::repository::EnvironmentDirectory;

/// Application state for the Environments domain
#[derive(Clone)]
pub struct EnvironmentsState {
    pub directory: Arc<dyn EnvironmentDirectory>,
}
