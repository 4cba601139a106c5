//! Project model and its pass-through records (memberships, integrations).

use chrono::{DateTime, NaiveDate, Utc, Weekday};

/// Denormalized back-reference from a membership to its owning project.
///
/// Filled in at mapping time as a convenience; the project itself stays
/// authoritative.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectRef {
    pub id: i64,
    pub name: String,
}

/// A person as embedded in a membership record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Person {
    pub email: String,
    pub name: String,
    pub initials: String,
}

/// A project membership.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Membership {
    pub id: i64,
    pub person: Person,
    pub role: String,
    pub project: ProjectRef,
}

/// A third-party integration attached to a project. Pass-through record;
/// linking stories to an integration is not supported by this client.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Integration {
    pub id: i64,
    pub kind: String,
    pub name: String,
}

/// A Tracker project.
#[derive(Debug, Clone)]
pub struct Project {
    pub id: i64,

    pub name: String,

    /// Iteration length in weeks.
    pub iteration_length: i32,

    pub week_start_day: Weekday,

    /// Comma-separated point scale values, e.g. `"0,1,2,3"`.
    pub point_scale: String,

    pub account: String,

    pub velocity_scheme: String,

    pub current_velocity: i32,

    pub initial_velocity: i32,

    pub done_iterations_to_show: i32,

    /// Project-wide labels; insertion order carries no meaning.
    pub labels: Vec<String>,

    pub attachments_allowed: bool,

    pub public: bool,

    pub use_https: bool,

    /// When false, bug and chore stories cannot carry an estimate and any
    /// estimate written for them is forced back to the unset sentinel.
    pub bugs_and_chores_estimable: bool,

    pub commit_mode: bool,

    /// First iteration start date. Always a plain date: the time-of-day
    /// part of the wire value is dropped, so this is midnight by
    /// construction.
    pub start_date: Option<NaiveDate>,

    pub last_activity: Option<DateTime<Utc>>,

    /// Memberships in server order.
    pub memberships: Vec<Membership>,

    pub integrations: Vec<Integration>,
}

/// Payload for creating a new project.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub iteration_length: i32,
    pub start_date: Option<NaiveDate>,
}

impl NewProject {
    pub fn new(name: impl Into<String>, iteration_length: i32) -> Self {
        Self {
            name: name.into(),
            iteration_length,
            start_date: None,
        }
    }
}
