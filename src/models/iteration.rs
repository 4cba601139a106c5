//! Iteration model.

use chrono::{DateTime, Utc};

use super::story::Story;

/// A Tracker iteration with its stories.
#[derive(Debug, Clone)]
pub struct Iteration {
    pub id: i64,

    /// Iteration number within the project.
    pub number: i32,

    pub start: Option<DateTime<Utc>>,

    pub finish: Option<DateTime<Utc>>,

    /// Fraction of the team available during the iteration.
    pub team_strength: f32,

    /// Stories in server order.
    pub stories: Vec<Story>,
}
