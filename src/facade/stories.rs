//! Story collection and item nodes.

use std::cell::OnceCell;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::models::{NewStory, Story};
use crate::repository::{MovePosition, StoryRepository};

use super::projects::ProjectFacade;
use super::{Node, TrackerContext};

/// Collection node over the stories of one project.
#[derive(Clone, Debug)]
pub struct StoriesFacade {
    parent: ProjectFacade,
    repo: OnceCell<StoryRepository>,
}

impl StoriesFacade {
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

    fn project_id(&self) -> i64 {
        self.parent.item().id
    }

    fn repo(&self) -> &StoryRepository {
        self.repo
            .get_or_init(|| StoryRepository::new(self.context().clone()))
    }

    fn wrap(&self, stories: Vec<Story>) -> Vec<StoryFacade> {
        stories
            .into_iter()
            .map(|s| StoryFacade::new(self.clone(), s))
            .collect()
    }

    /// Fetch one story by id.
    pub fn get(&self, story_id: i64) -> Result<StoryFacade> {
        let story = self.repo().get(self.project_id(), story_id)?;
        Ok(StoryFacade::new(self.clone(), story))
    }

    /// Fetch every story of the project, in server order. A project with
    /// no stories yields an empty vector; a transport failure is an error.
    pub fn get_all(&self) -> Result<Vec<StoryFacade>> {
        let stories = self.repo().get_all(self.project_id())?;
        Ok(self.wrap(stories))
    }

    /// Fetch the stories matching a Tracker filter expression.
    pub fn filtered(&self, filter: &str) -> Result<Vec<StoryFacade>> {
        let stories = self.repo().filtered(self.project_id(), filter)?;
        Ok(self.wrap(stories))
    }

    /// Fetch a window of the project's stories.
    pub fn limited(&self, offset: i64, limit: i64) -> Result<Vec<StoryFacade>> {
        let stories = self.repo().limited(self.project_id(), offset, limit)?;
        Ok(self.wrap(stories))
    }

    /// Create a story and bind a node to the server's representation.
    pub fn add(&self, story: &NewStory) -> Result<StoryFacade> {
        let created = self.repo().add(self.project_id(), story)?;
        Ok(StoryFacade::new(self.clone(), created))
    }

    /// Transition every finished story to delivered and return the
    /// affected stories.
    pub fn deliver_all_finished(&self) -> Result<Vec<StoryFacade>> {
        let stories = self.repo().deliver_all_finished(self.project_id())?;
        Ok(self.wrap(stories))
    }
}

impl Node for StoriesFacade {
    fn context(&self) -> &Arc<TrackerContext> {
        self.parent.context()
    }
}

/// Item node bound to one story snapshot.
///
/// Sub-resource mutations mirror the remote effect into the snapshot after
/// the call succeeds. The mirror is best effort: it is not synchronized
/// against concurrent external changes, and a remote failure after a local
/// mutator ran leaves the snapshot diverged from the server.
#[derive(Debug)]
pub struct StoryFacade {
    parent: StoriesFacade,
    repo: OnceCell<StoryRepository>,
    item: Story,
}

impl StoryFacade {
    pub(super) fn new(parent: StoriesFacade, item: Story) -> Self {
        Self {
            parent,
            repo: OnceCell::new(),
            item,
        }
    }

    /// The bound snapshot.
    pub fn item(&self) -> &Story {
        &self.item
    }

    fn repo(&self) -> &StoryRepository {
        self.repo
            .get_or_init(|| StoryRepository::new(self.context().clone()))
    }

    /// Apply `mutator` to the snapshot, send the whole story as a full
    /// update and replace the snapshot with the server's representation,
    /// including fields the server recomputed. Last write wins.
    pub fn update(&mut self, mutator: impl FnOnce(&mut Story)) -> Result<&mut Self> {
        mutator(&mut self.item);
        let estimable = self.parent.project().item().bugs_and_chores_estimable;
        let updated = self.repo().update(&self.item, estimable)?;
        self.item = updated;
        Ok(self)
    }

    /// Create a note remotely, then append the returned representation to
    /// the snapshot's note list.
    pub fn add_note(&mut self, text: &str) -> Result<&mut Self> {
        let note = self.repo().add_note(self.item.project_id, self.item.id, text)?;
        self.item.notes.push(note);
        Ok(self)
    }

    /// Create a task remotely, then append the returned representation to
    /// the snapshot's task list.
    pub fn add_task(&mut self, description: &str) -> Result<&mut Self> {
        let task = self
            .repo()
            .add_task(self.item.project_id, self.item.id, description)?;
        self.item.tasks.push(task);
        Ok(self)
    }

    /// Update a task by id. The id must be present in the snapshot; a
    /// missing id fails before any remote call is issued.
    pub fn update_task(
        &mut self,
        task_id: i64,
        complete: bool,
        description: &str,
    ) -> Result<&mut Self> {
        let index = self.task_index(task_id)?;
        let task = self.repo().update_task(
            self.item.project_id,
            self.item.id,
            task_id,
            complete,
            description,
        )?;
        self.item.tasks[index] = task;
        Ok(self)
    }

    /// Remove a task by id. Same local-lookup-first rule as
    /// [`StoryFacade::update_task`].
    pub fn remove_task(&mut self, task_id: i64) -> Result<&mut Self> {
        let index = self.task_index(task_id)?;
        self.repo()
            .remove_task(self.item.project_id, self.item.id, task_id)?;
        self.item.tasks.remove(index);
        Ok(self)
    }

    fn task_index(&self, task_id: i64) -> Result<usize> {
        self.item
            .tasks
            .iter()
            .position(|t| t.id == task_id)
            .ok_or_else(|| Error::not_found_with_id("task", task_id))
    }

    /// Reorder this story relative to another one and take the server's
    /// representation as the new snapshot.
    pub fn move_to(&mut self, position: MovePosition, target_story_id: i64) -> Result<&mut Self> {
        let moved = self.repo().move_story(
            self.item.project_id,
            self.item.id,
            position,
            target_story_id,
        )?;
        self.item = moved;
        Ok(self)
    }

    /// Linking to an external integration is not supported; fails without
    /// touching the network.
    pub fn link_to_external(&mut self) -> Result<&mut Self> {
        self.repo()
            .link_to_external(self.item.project_id, self.item.id)?;
        Ok(self)
    }

    /// Delete the story remotely and hand back the collection node this
    /// item came from. Other snapshots that still reference the deleted
    /// story are left untouched.
    pub fn delete(self) -> Result<StoriesFacade> {
        self.repo().delete(self.item.project_id, self.item.id)?;
        Ok(self.parent)
    }
}

impl Node for StoryFacade {
    fn context(&self) -> &Arc<TrackerContext> {
        self.parent.context()
    }
}
