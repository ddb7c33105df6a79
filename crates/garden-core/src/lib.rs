//! The container lifecycle orchestrator: the main orchestration library,
//! generic over its collaborators via trait objects from `garden-types`.

mod container;
mod orchestrator;

#[cfg(any(test, feature = "test_utils"))]
pub mod testutil;

pub use container::Container;
pub use orchestrator::{Orchestrator, OrchestratorBuilder};

/// Re-exported so callers assembling an [`Orchestrator`] have a ready-made
/// [`garden_types::PropertyManager`] without a separate dependency line.
pub use garden_properties::PropertyStore;
