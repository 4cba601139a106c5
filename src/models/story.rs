//! Story model and its sub-resources (tasks, notes, attachment records).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::error::Error;

/// Kind of a story.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryType {
    Feature,
    Bug,
    Chore,
    Release,
}

impl StoryType {
    /// Whether the estimate of this story kind is gated by the project's
    /// `bugs_and_chores_estimable` flag.
    pub fn is_bug_or_chore(self) -> bool {
        matches!(self, Self::Bug | Self::Chore)
    }
}

impl FromStr for StoryType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.trim().to_lowercase().as_str() {
            "feature" => Ok(Self::Feature),
            "bug" => Ok(Self::Bug),
            "chore" => Ok(Self::Chore),
            "release" => Ok(Self::Release),
            other => Err(Error::invalid_field(
                format!("unknown story type {other:?}"),
                "story_type",
            )),
        }
    }
}

impl fmt::Display for StoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Feature => write!(f, "feature"),
            Self::Bug => write!(f, "bug"),
            Self::Chore => write!(f, "chore"),
            Self::Release => write!(f, "release"),
        }
    }
}

/// Workflow state of a story.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryState {
    Unscheduled,
    Started,
    Finished,
    Delivered,
    Accepted,
    Rejected,
}

impl FromStr for StoryState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.trim().to_lowercase().as_str() {
            "unscheduled" => Ok(Self::Unscheduled),
            "started" => Ok(Self::Started),
            "finished" => Ok(Self::Finished),
            "delivered" => Ok(Self::Delivered),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(Error::invalid_field(
                format!("unknown story state {other:?}"),
                "current_state",
            )),
        }
    }
}

impl fmt::Display for StoryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unscheduled => write!(f, "unscheduled"),
            Self::Started => write!(f, "started"),
            Self::Finished => write!(f, "finished"),
            Self::Delivered => write!(f, "delivered"),
            Self::Accepted => write!(f, "accepted"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// A task attached to a story.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: i64,

    /// Task text.
    pub description: String,

    /// Server-encoded ordinal within the story's task list.
    pub position: String,

    pub complete: bool,

    pub created: Option<DateTime<Utc>>,
}

/// A note (comment) attached to a story.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub id: i64,

    pub author: String,

    /// Note text.
    pub text: String,

    /// Id of the owning story.
    pub story_id: i64,

    pub noted_at: Option<DateTime<Utc>>,
}

/// Attachment metadata as reported by the server. The byte stream itself
/// is not handled by this client.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub id: i64,

    pub filename: String,

    pub description: String,

    /// Download URL.
    pub url: String,
}

/// A Tracker story with its hydrated sub-resources.
///
/// The snapshot is owned by the facade node that fetched it and is replaced
/// wholesale by the server's response on every successful mutation.
#[derive(Debug, Clone)]
pub struct Story {
    pub id: i64,

    /// Id of the owning project.
    pub project_id: i64,

    pub story_type: StoryType,

    pub current_state: StoryState,

    pub name: String,

    pub description: String,

    /// Who requested the story.
    pub requested_by: String,

    /// Current owner, empty when unassigned.
    pub owned_by: String,

    /// Web URL of the story.
    pub url: String,

    /// Point estimate. [`Story::NO_ESTIMATE`] means "not estimated",
    /// distinct from a real estimate of 0.
    pub estimate: i32,

    pub created: Option<DateTime<Utc>>,

    pub updated: Option<DateTime<Utc>>,

    pub accepted: Option<DateTime<Utc>>,

    /// Labels in server order.
    pub labels: Vec<String>,

    pub attachments: Vec<Attachment>,

    /// Notes in server order.
    pub notes: Vec<Note>,

    /// Tasks in position order.
    pub tasks: Vec<Task>,
}

impl Story {
    /// Sentinel estimate meaning "no estimate set".
    pub const NO_ESTIMATE: i32 = -1;

    /// Whether a real estimate has been set.
    pub fn has_estimate(&self) -> bool {
        self.estimate > Self::NO_ESTIMATE
    }
}

/// Payload for creating a new story.
#[derive(Debug, Clone)]
pub struct NewStory {
    pub story_type: StoryType,
    pub name: String,
    pub requested_by: String,
    pub description: String,
    pub labels: Vec<String>,
    pub current_state: Option<StoryState>,
    pub owned_by: Option<String>,
    pub estimate: i32,
}

impl NewStory {
    /// Start a creation payload; remaining fields keep their defaults.
    pub fn new(story_type: StoryType, name: impl Into<String>) -> Self {
        Self {
            story_type,
            name: name.into(),
            requested_by: String::new(),
            description: String::new(),
            labels: Vec::new(),
            current_state: None,
            owned_by: None,
            estimate: Story::NO_ESTIMATE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_story_type_parse_case_insensitive() {
        assert_eq!("feature".parse::<StoryType>().unwrap(), StoryType::Feature);
        assert_eq!("BUG".parse::<StoryType>().unwrap(), StoryType::Bug);
        assert_eq!("Chore".parse::<StoryType>().unwrap(), StoryType::Chore);
        assert_eq!("Release".parse::<StoryType>().unwrap(), StoryType::Release);
        assert!("epic".parse::<StoryType>().is_err());
    }

    #[test]
    fn test_story_state_parse_case_insensitive() {
        assert_eq!(
            "Unscheduled".parse::<StoryState>().unwrap(),
            StoryState::Unscheduled
        );
        assert_eq!(
            "DELIVERED".parse::<StoryState>().unwrap(),
            StoryState::Delivered
        );
        assert!("planned".parse::<StoryState>().is_err());
    }

    #[test]
    fn test_enums_display_lowercase() {
        assert_eq!(StoryType::Feature.to_string(), "feature");
        assert_eq!(StoryState::Accepted.to_string(), "accepted");
    }

    #[test]
    fn test_estimate_sentinel() {
        let mut story = NewStory::new(StoryType::Feature, "s");
        assert_eq!(story.estimate, Story::NO_ESTIMATE);
        story.estimate = 0;
        // 0 is a real estimate, only -1 means unset
        assert_ne!(story.estimate, Story::NO_ESTIMATE);
    }
}
