//! Project collection and item nodes.

use std::cell::OnceCell;
use std::sync::Arc;

use crate::error::Result;
use crate::models::{NewProject, Project};
use crate::repository::ProjectRepository;

use super::iterations::IterationsFacade;
use super::stories::StoriesFacade;
use super::{Node, Tracker, TrackerContext};

/// Collection node over every project the token can see.
///
/// Each accessor performs a fresh fetch; the list is never cached. Only
/// the repository handle is memoized, lazily, for the node's lifetime.
#[derive(Clone, Debug)]
pub struct ProjectsFacade {
    parent: Tracker,
    repo: OnceCell<ProjectRepository>,
}

impl ProjectsFacade {
    pub(super) fn new(parent: Tracker) -> Self {
        Self {
            parent,
            repo: OnceCell::new(),
        }
    }

    fn repo(&self) -> &ProjectRepository {
        self.repo
            .get_or_init(|| ProjectRepository::new(self.context().clone()))
    }

    /// Fetch one project by id.
    pub fn get(&self, project_id: i64) -> Result<ProjectFacade> {
        let project = self.repo().get(project_id)?;
        Ok(ProjectFacade::new(self.clone(), project))
    }

    /// Fetch every project. An empty account yields an empty vector.
    pub fn get_all(&self) -> Result<Vec<ProjectFacade>> {
        let projects = self.repo().get_all()?;
        Ok(projects
            .into_iter()
            .map(|p| ProjectFacade::new(self.clone(), p))
            .collect())
    }

    /// Fetch all projects and wrap the first one matching the predicate.
    pub fn find(&self, predicate: impl Fn(&Project) -> bool) -> Result<Option<ProjectFacade>> {
        let projects = self.repo().get_all()?;
        Ok(projects
            .into_iter()
            .find(|p| predicate(p))
            .map(|p| ProjectFacade::new(self.clone(), p)))
    }

    /// Create a project and bind a node to the server's representation.
    pub fn create(&self, project: &NewProject) -> Result<ProjectFacade> {
        let created = self.repo().create(project)?;
        Ok(ProjectFacade::new(self.clone(), created))
    }
}

impl Node for ProjectsFacade {
    fn context(&self) -> &Arc<TrackerContext> {
        self.parent.context()
    }
}

/// Item node bound to one project snapshot.
#[derive(Clone, Debug)]
pub struct ProjectFacade {
    parent: ProjectsFacade,
    item: Project,
}

impl ProjectFacade {
    pub(super) fn new(parent: ProjectsFacade, item: Project) -> Self {
        Self { parent, item }
    }

    /// The bound snapshot.
    pub fn item(&self) -> &Project {
        &self.item
    }

    /// Hand the parent collection back for continued chaining.
    pub fn done(self) -> ProjectsFacade {
        self.parent
    }

    /// Enter this project's stories.
    pub fn stories(&self) -> StoriesFacade {
        StoriesFacade::new(self.clone())
    }

    /// Enter this project's iterations.
    pub fn iterations(&self) -> IterationsFacade {
        IterationsFacade::new(self.clone())
    }
}

impl Node for ProjectFacade {
    fn context(&self) -> &Arc<TrackerContext> {
        self.parent.context()
    }
}
