//! Story wire DTOs, mapping and repository.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{Attachment, NewStory, Note, Story, Task};

use super::{timestamp, TrackerContext, Verb};

// ---------------------------------------------------------------------------
// DTOs

/// `<story>` response body.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct StoryDto {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub project_id: i64,
    pub story_type: String,
    pub current_state: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requested_by: String,
    #[serde(default)]
    pub owned_by: String,
    #[serde(default)]
    pub url: String,
    pub estimate: Option<i32>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub accepted_at: Option<String>,
    pub labels: Option<String>,
    pub attachments: Option<AttachmentListDto>,
    pub notes: Option<NoteListDto>,
    pub tasks: Option<TaskListDto>,
}

/// `<stories>` list wrapper. An empty list is a valid body, distinct from
/// a transport failure.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct StoriesDto {
    #[serde(default)]
    pub story: Vec<StoryDto>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AttachmentListDto {
    #[serde(default)]
    pub attachment: Vec<AttachmentDto>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AttachmentDto {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct NoteListDto {
    #[serde(default)]
    pub note: Vec<NoteDto>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct NoteDto {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub author: String,
    pub noted_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TaskListDto {
    #[serde(default)]
    pub task: Vec<TaskDto>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TaskDto {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub complete: bool,
    pub created_at: Option<String>,
}

/// `<story>` full-update request body. The whole entity goes over the
/// wire on every update; the server's answer replaces the snapshot.
#[derive(Debug, Serialize)]
struct StoryUpdateDto {
    story_type: String,
    current_state: String,
    name: String,
    description: String,
    requested_by: String,
    owned_by: String,
    labels: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    estimate: Option<i32>,
}

/// `<story>` creation request body.
#[derive(Debug, Serialize)]
struct StoryCreationDto {
    story_type: String,
    name: String,
    requested_by: String,
    description: String,
    labels: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    owned_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    estimate: Option<i32>,
}

#[derive(Debug, Serialize)]
struct NoteCreationDto {
    text: String,
}

#[derive(Debug, Serialize)]
struct TaskRequestDto {
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    complete: Option<bool>,
}

// ---------------------------------------------------------------------------
// Mapping

/// Split a comma-separated label field into trimmed labels.
pub(crate) fn split_labels(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Re-join labels with the same comma delimiter the read side splits on.
pub(crate) fn join_labels(labels: &[String]) -> String {
    labels.join(",")
}

/// The estimate that actually goes over the wire.
///
/// Anything below the sentinel means "leave the field out". Bug and chore
/// estimates are forced back to the sentinel when the owning project does
/// not allow estimating them, regardless of the in-memory value.
fn wire_estimate(story: &Story, bugs_and_chores_estimable: bool) -> Option<i32> {
    if story.estimate < Story::NO_ESTIMATE {
        return None;
    }
    if story.story_type.is_bug_or_chore() && !bugs_and_chores_estimable {
        return Some(Story::NO_ESTIMATE);
    }
    Some(story.estimate)
}

pub(crate) fn map_task(dto: TaskDto) -> Result<Task> {
    Ok(Task {
        id: dto.id,
        description: dto.description,
        position: dto.position,
        complete: dto.complete,
        created: timestamp::parse(dto.created_at.as_deref().unwrap_or(""))?,
    })
}

fn map_note(dto: NoteDto, story_id: i64) -> Result<Note> {
    Ok(Note {
        id: dto.id,
        author: dto.author,
        text: dto.text,
        story_id,
        noted_at: timestamp::parse(dto.noted_at.as_deref().unwrap_or(""))?,
    })
}

fn map_attachment(dto: AttachmentDto) -> Attachment {
    Attachment {
        id: dto.id,
        filename: dto.filename,
        description: dto.description,
        url: dto.url,
    }
}

/// Map a story response onto the domain entity. Absent nested collections
/// hydrate as empty vectors, never as an error.
pub(crate) fn map_story(dto: StoryDto) -> Result<Story> {
    let labels = dto.labels.as_deref().map(split_labels).unwrap_or_default();

    let attachments = dto
        .attachments
        .map(|l| l.attachment.into_iter().map(map_attachment).collect())
        .unwrap_or_default();

    let notes = dto
        .notes
        .map(|l| {
            l.note
                .into_iter()
                .map(|n| map_note(n, dto.id))
                .collect::<Result<Vec<_>>>()
        })
        .transpose()?
        .unwrap_or_default();

    let tasks = dto
        .tasks
        .map(|l| l.task.into_iter().map(map_task).collect::<Result<Vec<_>>>())
        .transpose()?
        .unwrap_or_default();

    Ok(Story {
        id: dto.id,
        project_id: dto.project_id,
        story_type: dto.story_type.parse()?,
        current_state: dto.current_state.parse()?,
        name: dto.name,
        description: dto.description,
        requested_by: dto.requested_by,
        owned_by: dto.owned_by,
        url: dto.url,
        estimate: dto.estimate.unwrap_or(Story::NO_ESTIMATE),
        created: timestamp::parse(dto.created_at.as_deref().unwrap_or(""))?,
        updated: timestamp::parse(dto.updated_at.as_deref().unwrap_or(""))?,
        accepted: timestamp::parse(dto.accepted_at.as_deref().unwrap_or(""))?,
        labels,
        attachments,
        notes,
        tasks,
    })
}

/// Serialize a story for a full update. Enums go out lowercase.
fn update_payload(story: &Story, bugs_and_chores_estimable: bool) -> StoryUpdateDto {
    StoryUpdateDto {
        story_type: story.story_type.to_string(),
        current_state: story.current_state.to_string(),
        name: story.name.clone(),
        description: story.description.clone(),
        requested_by: story.requested_by.clone(),
        owned_by: story.owned_by.clone(),
        labels: join_labels(&story.labels),
        estimate: wire_estimate(story, bugs_and_chores_estimable),
    }
}

fn creation_payload(story: &NewStory) -> StoryCreationDto {
    StoryCreationDto {
        story_type: story.story_type.to_string(),
        name: story.name.clone(),
        requested_by: story.requested_by.clone(),
        description: story.description.clone(),
        labels: join_labels(&story.labels),
        current_state: story.current_state.map(|s| s.to_string()),
        owned_by: story.owned_by.clone(),
        estimate: (story.estimate >= Story::NO_ESTIMATE).then_some(story.estimate),
    }
}

// ---------------------------------------------------------------------------
// Repository

/// Where to place a moved story relative to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovePosition {
    Before,
    After,
}

impl MovePosition {
    fn as_str(self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
        }
    }
}

/// Manages stories and their sub-resources.
#[derive(Clone, Debug)]
pub struct StoryRepository {
    ctx: Arc<TrackerContext>,
}

impl StoryRepository {
    pub fn new(ctx: Arc<TrackerContext>) -> Self {
        Self { ctx }
    }

    fn fetch_stories(&self, path: &str, verb: Verb) -> Result<Vec<Story>> {
        let dto: StoriesDto = self.ctx.fetch(path, verb)?;
        dto.story.into_iter().map(map_story).collect()
    }

    pub fn get(&self, project_id: i64, story_id: i64) -> Result<Story> {
        let path = format!("/projects/{project_id}/stories/{story_id}");
        let dto: StoryDto = self.ctx.fetch(&path, Verb::Get)?;
        map_story(dto)
    }

    pub fn get_all(&self, project_id: i64) -> Result<Vec<Story>> {
        self.fetch_stories(&format!("/projects/{project_id}/stories"), Verb::Get)
    }

    /// Stories matching a Tracker filter expression.
    pub fn filtered(&self, project_id: i64, filter: &str) -> Result<Vec<Story>> {
        let path = format!(
            "/projects/{project_id}/stories?filter={}",
            urlencoding::encode(filter)
        );
        self.fetch_stories(&path, Verb::Get)
    }

    /// A window of the project's stories.
    pub fn limited(&self, project_id: i64, offset: i64, limit: i64) -> Result<Vec<Story>> {
        let path = format!("/projects/{project_id}/stories?limit={limit}&offset={offset}");
        self.fetch_stories(&path, Verb::Get)
    }

    pub fn add(&self, project_id: i64, story: &NewStory) -> Result<Story> {
        let path = format!("/projects/{project_id}/stories");
        let dto: StoryDto =
            self.ctx
                .send(&path, "story", &creation_payload(story), Verb::Post)?;
        map_story(dto)
    }

    /// Send the whole story as a full update and return the server's
    /// representation.
    pub fn update(&self, story: &Story, bugs_and_chores_estimable: bool) -> Result<Story> {
        let path = format!("/projects/{}/stories/{}", story.project_id, story.id);
        let payload = update_payload(story, bugs_and_chores_estimable);
        let dto: StoryDto = self.ctx.send(&path, "story", &payload, Verb::Put)?;
        map_story(dto)
    }

    pub fn delete(&self, project_id: i64, story_id: i64) -> Result<Story> {
        let path = format!("/projects/{project_id}/stories/{story_id}");
        let dto: StoryDto = self.ctx.fetch(&path, Verb::Delete)?;
        map_story(dto)
    }

    pub fn add_note(&self, project_id: i64, story_id: i64, text: &str) -> Result<Note> {
        let path = format!("/projects/{project_id}/stories/{story_id}/notes");
        let payload = NoteCreationDto {
            text: text.to_string(),
        };
        let dto: NoteDto = self.ctx.send(&path, "note", &payload, Verb::Post)?;
        map_note(dto, story_id)
    }

    pub fn add_task(&self, project_id: i64, story_id: i64, description: &str) -> Result<Task> {
        let path = format!("/projects/{project_id}/stories/{story_id}/tasks");
        let payload = TaskRequestDto {
            description: description.to_string(),
            complete: None,
        };
        let dto: TaskDto = self.ctx.send(&path, "task", &payload, Verb::Post)?;
        map_task(dto)
    }

    pub fn update_task(
        &self,
        project_id: i64,
        story_id: i64,
        task_id: i64,
        complete: bool,
        description: &str,
    ) -> Result<Task> {
        let path = format!("/projects/{project_id}/stories/{story_id}/tasks/{task_id}");
        let payload = TaskRequestDto {
            description: description.to_string(),
            complete: Some(complete),
        };
        let dto: TaskDto = self.ctx.send(&path, "task", &payload, Verb::Put)?;
        map_task(dto)
    }

    pub fn remove_task(&self, project_id: i64, story_id: i64, task_id: i64) -> Result<Task> {
        let path = format!("/projects/{project_id}/stories/{story_id}/tasks/{task_id}");
        let dto: TaskDto = self.ctx.fetch(&path, Verb::Delete)?;
        map_task(dto)
    }

    /// Transition every finished story to delivered.
    pub fn deliver_all_finished(&self, project_id: i64) -> Result<Vec<Story>> {
        let path = format!("/projects/{project_id}/stories/deliver_all_finished");
        self.fetch_stories(&path, Verb::Put)
    }

    pub fn move_story(
        &self,
        project_id: i64,
        story_id: i64,
        position: MovePosition,
        target_story_id: i64,
    ) -> Result<Story> {
        let path = format!(
            "/projects/{project_id}/stories/{story_id}/moves?move[move]={}&move[target]={target_story_id}",
            position.as_str()
        );
        let dto: StoryDto = self.ctx.fetch(&path, Verb::Post)?;
        map_story(dto)
    }

    /// Linking a story to an external integration needs a payload schema
    /// the API does not document; the operation fails immediately and
    /// distinctly from a remote failure.
    pub fn link_to_external(&self, _project_id: i64, _story_id: i64) -> Result<Story> {
        Err(crate::error::Error::unsupported(
            "link story to external integration",
        ))
    }
}
