use crate::cli::CommandLineArgs;
use crate::datastore::Datastore;
use crate::resource_manager::ResourceManager;

use std::sync::Arc;

/// Shared application state passed to each request handler.
pub struct AppState {
    /// Command line arguments.
    pub args: CommandLineArgs,

    /// Weather readings database.
    pub datastore: Datastore,

    /// Resource manager.
    pub resource_manager: ResourceManager,
}

impl AppState {
    /// Create and return an [AppState].
    pub fn new(args: &CommandLineArgs) -> Self {
        let render_task_limit = args
            .render_task_limit
            .or_else(|| Some(std::cmp::max(num_cpus::get() - 1, 1)));
        Self {
            args: args.clone(),
            datastore: Datastore::new(args),
            resource_manager: ResourceManager::new(render_task_limit),
        }
    }
}

/// AppState wrapped in an Atomic Reference Count (Arc) to allow multiple references.
pub type SharedAppState = Arc<AppState>;
