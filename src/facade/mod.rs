//! Fluent navigation graph over the remote resource hierarchy.
//!
//! The graph has two node kinds: collection nodes scoped to a parent's
//! identity (`ProjectsFacade`, `StoriesFacade`, `IterationsFacade`) and
//! item nodes bound to one entity snapshot (`ProjectFacade`,
//! `StoryFacade`, `IterationFacade`). Every node shares the root
//! credential context and keeps the parent it was built from; deleting an
//! item hands that parent back for continued chaining.
//!
//! Snapshots may be stale relative to the server. A mutation serializes
//! the whole entity and replaces the snapshot with the server's response;
//! if the remote call fails after a local mutator already ran, the
//! snapshot stays diverged — there is no rollback.

use std::sync::Arc;

use crate::error::Result;
use crate::repository::{ClientConfig, Token, TrackerContext, Transport};

mod iterations;
mod projects;
mod stories;

pub use iterations::{IterationFacade, IterationsFacade};
pub use projects::{ProjectFacade, ProjectsFacade};
pub use stories::{StoriesFacade, StoryFacade};

/// A node of the navigation graph: anything that can reach the root
/// credential context.
pub trait Node {
    fn context(&self) -> &Arc<TrackerContext>;
}

/// Root of the navigation graph.
#[derive(Clone, Debug)]
pub struct Tracker {
    ctx: Arc<TrackerContext>,
}

impl Tracker {
    /// Connect to the hosted Tracker API with default settings.
    pub fn new(token: Token) -> Result<Self> {
        Self::with_config(token, ClientConfig::default())
    }

    /// Connect with explicit transport configuration.
    pub fn with_config(token: Token, config: ClientConfig) -> Result<Self> {
        Ok(Self {
            ctx: Arc::new(TrackerContext::http(token, config)?),
        })
    }

    /// Build a root over a caller-supplied transport. This is the seam
    /// tests use to script responses without a network.
    pub fn with_transport(token: Token, transport: Box<dyn Transport>) -> Self {
        Self {
            ctx: Arc::new(TrackerContext::new(token, transport)),
        }
    }

    /// Enter the projects collection.
    pub fn projects(&self) -> ProjectsFacade {
        ProjectsFacade::new(self.clone())
    }
}

impl Node for Tracker {
    fn context(&self) -> &Arc<TrackerContext> {
        &self.ctx
    }
}
