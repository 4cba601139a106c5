//! Domain models.
//!
//! These are the longer-lived entities the facade graph hands out, distinct
//! from the transient wire DTOs living in the repository layer. Child
//! collections are owned by their parent entity; nothing is shared by
//! reference across two parents.

pub mod iteration;
pub mod project;
pub mod story;

// Re-exports for convenient access
pub use iteration::Iteration;
pub use project::{Integration, Membership, NewProject, Person, Project, ProjectRef};
pub use story::{Attachment, NewStory, Note, Story, StoryState, StoryType, Task};
