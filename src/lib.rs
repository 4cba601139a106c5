//! Fluent, synchronous client for the Pivotal Tracker v3 XML API.
//!
//! The crate turns the remote resource hierarchy (projects → iterations /
//! stories → tasks / notes / attachments) into a lazily-populated,
//! parent-aware object graph. Collection nodes enumerate children of a
//! parent scope; item nodes bind one entity snapshot and coordinate
//! mutations: the whole entity is sent on every update and the server's
//! response replaces the snapshot verbatim.
//!
//! All calls block the current thread for the duration of the round trip.
//! Nothing is retried and there is no rollback: a remote failure after a
//! local mutator ran leaves the snapshot diverged from the server.
//!
//! ```no_run
//! use pivotal_fluent::{NewStory, StoryType, Token, Tracker};
//!
//! fn main() -> Result<(), pivotal_fluent::Error> {
//!     let tracker = Tracker::new(Token::new("api-token"))?;
//!     let project = tracker.projects().get(42)?;
//!
//!     let mut story = project
//!         .stories()
//!         .add(&NewStory::new(StoryType::Feature, "Ship it"))?;
//!     story
//!         .update(|s| s.name = "Ship it soon".to_string())?
//!         .add_note("created from Rust")?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod facade;
pub mod models;
pub mod repository;

// Re-exports for convenient access
pub use error::{Error, Result};
pub use facade::{
    IterationFacade, IterationsFacade, Node, ProjectFacade, ProjectsFacade, StoriesFacade,
    StoryFacade, Tracker,
};
pub use models::{
    Attachment, Integration, Iteration, Membership, NewProject, NewStory, Note, Person, Project,
    ProjectRef, Story, StoryState, StoryType, Task,
};
pub use repository::{
    ClientConfig, HttpTransport, IterationRepository, MovePosition, ProjectRepository,
    StoryRepository, Token, TrackerContext, Transport, Verb,
};
