use std::sync::Arc;

use crate::config::Config;
use crate::talent::directory::EmployeeDirectory;
use crate::talent::narrative::NarrativeGenerator;
use crate::talent::store::TalentStore;

/// Shared application state injected into all route handlers via Axum extractors.
/// Every collaborator is constructed once in `main`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TalentStore>,
    /// `None` when no LLM key is configured.
    pub narrator: Option<Arc<dyn NarrativeGenerator>>,
    pub directory: Arc<EmployeeDirectory>,
    pub config: Config,
}
