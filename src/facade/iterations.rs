//! Iteration collection and item nodes.

use std::cell::OnceCell;
use std::sync::Arc;

use crate::error::Result;
use crate::models::{Iteration, Story};
use crate::repository::IterationRepository;

use super::projects::ProjectFacade;
use super::{Node, TrackerContext};

/// Collection node over the iterations of one project.
#[derive(Clone)]
pub struct IterationsFacade {
    parent: ProjectFacade,
    repo: OnceCell<IterationRepository>,
}

impl IterationsFacade {
    pub(super) fn new(parent: ProjectFacade) -> Self {
        Self {
            parent,
            repo: OnceCell::new(),
        }
    }

    /// The owning project node.
    pub fn project(&self) -> &ProjectFacade {
        &self.parent
    }

    fn repo(&self) -> &IterationRepository {
        self.repo
            .get_or_init(|| IterationRepository::new(self.context().clone()))
    }

    /// Fetch all iterations: past, current and future.
    pub fn get_all(&self) -> Result<Vec<IterationFacade>> {
        let iterations = self.repo().get_all(self.parent.item().id)?;
        Ok(iterations
            .into_iter()
            .map(|i| IterationFacade::new(self.clone(), i))
            .collect())
    }

    /// Fetch a window of the project's iterations. Not supported; fails
    /// without touching the network.
    pub fn limited(&self, offset: i64, limit: i64) -> Result<Vec<IterationFacade>> {
        let iterations = self.repo().limited(self.parent.item().id, offset, limit)?;
        Ok(iterations
            .into_iter()
            .map(|i| IterationFacade::new(self.clone(), i))
            .collect())
    }
}

impl Node for IterationsFacade {
    fn context(&self) -> &Arc<TrackerContext> {
        self.parent.context()
    }
}

/// Item node bound to one iteration snapshot. The remote API offers no
/// iteration mutation, so the node is read-only.
pub struct IterationFacade {
    parent: IterationsFacade,
    item: Iteration,
}

impl IterationFacade {
    pub(super) fn new(parent: IterationsFacade, item: Iteration) -> Self {
        Self { parent, item }
    }

    /// The bound snapshot.
    pub fn item(&self) -> &Iteration {
        &self.item
    }

    /// Stories scheduled into this iteration, in server order.
    pub fn stories(&self) -> &[Story] {
        &self.item.stories
    }

    /// Hand the parent collection back for continued chaining.
    pub fn done(self) -> IterationsFacade {
        self.parent
    }
}

impl Node for IterationFacade {
    fn context(&self) -> &Arc<TrackerContext> {
        self.parent.context()
    }
}
