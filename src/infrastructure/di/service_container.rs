//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{ApprovalService, HierarchyService, SpawnerService};
use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::domain::IdAllocator;
use crate::infrastructure::traits::{Console, StdoutConsole};

/// Container holding the shared dependencies of all services.
///
/// The identifier allocator lives here so that every spawner created from
/// one container draws from the same sequence.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Narration sink
    pub console: Arc<dyn Console>,

    /// Identifier service for spawned prototypes
    pub ids: Arc<IdAllocator>,
}

impl ServiceContainer {
    /// Create a new service container narrating to stdout.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(StdoutConsole))
    }

    /// Create a service container with a custom console (for testing).
    pub fn with_deps(settings: Settings, console: Arc<dyn Console>) -> Self {
        let ids = Arc::new(IdAllocator::new(settings.spawner.first_id));
        let settings = Arc::new(settings);

        Self {
            settings,
            console,
            ids,
        }
    }

    pub fn hierarchy_service(&self) -> HierarchyService {
        HierarchyService::new(Arc::clone(&self.console), self.settings.render.indent_step)
    }

    /// Build the approval chain described by the settings.
    pub fn approval_service(&self) -> ApplicationResult<ApprovalService> {
        ApprovalService::from_settings(&self.settings.chain, Arc::clone(&self.console))
    }

    pub fn spawner_service(&self) -> SpawnerService {
        SpawnerService::new(Arc::clone(&self.ids), Arc::clone(&self.console))
    }
}
