//! Project wire DTOs, mapping and repository.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Integration, Membership, NewProject, Person, Project, ProjectRef};

use super::story::split_labels;
use super::{timestamp, TrackerContext, Verb};

// ---------------------------------------------------------------------------
// DTOs

/// `<project>` response body.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProjectDto {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub iteration_length: i32,
    #[serde(default)]
    pub week_start_day: String,
    #[serde(default)]
    pub point_scale: String,
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub velocity_scheme: String,
    #[serde(default)]
    pub current_velocity: i32,
    #[serde(default)]
    pub initial_velocity: i32,
    #[serde(default)]
    pub number_of_done_iterations_to_show: i32,
    pub labels: Option<String>,
    #[serde(default)]
    pub allow_attachments: bool,
    #[serde(default, rename = "public")]
    pub is_public: bool,
    #[serde(default)]
    pub use_https: bool,
    #[serde(default)]
    pub bugs_and_chores_are_estimatable: bool,
    #[serde(default)]
    pub commit_mode: bool,
    pub first_iteration_start_time: Option<String>,
    pub last_activity_at: Option<String>,
    pub memberships: Option<MembershipListDto>,
    pub integrations: Option<IntegrationListDto>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProjectsDto {
    #[serde(default)]
    pub project: Vec<ProjectDto>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MembershipListDto {
    #[serde(default)]
    pub membership: Vec<MembershipDto>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MembershipDto {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub person: PersonDto,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PersonDto {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub initials: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct IntegrationListDto {
    #[serde(default)]
    pub integration: Vec<IntegrationDto>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct IntegrationDto {
    #[serde(default)]
    pub id: i64,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub name: String,
}

/// `<project>` creation request body.
#[derive(Debug, Serialize)]
struct ProjectCreationDto {
    name: String,
    iteration_length: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_iteration_start_time: Option<String>,
}

// ---------------------------------------------------------------------------
// Mapping

/// Map a project response onto the domain entity. Memberships receive the
/// owning project's id and name as a denormalized back-reference.
pub(crate) fn map_project(dto: ProjectDto) -> Result<Project> {
    let week_start_day = dto
        .week_start_day
        .parse()
        .map_err(|_| {
            Error::invalid_field(
                format!("unknown weekday {:?}", dto.week_start_day),
                "week_start_day",
            )
        })?;

    let start_date = timestamp::parse(dto.first_iteration_start_time.as_deref().unwrap_or(""))?
        .map(|instant| instant.date_naive());

    let project_ref = ProjectRef {
        id: dto.id,
        name: dto.name.clone(),
    };
    let memberships = dto
        .memberships
        .map(|l| {
            l.membership
                .into_iter()
                .map(|m| Membership {
                    id: m.id,
                    role: m.role,
                    person: Person {
                        email: m.person.email,
                        name: m.person.name,
                        initials: m.person.initials,
                    },
                    project: project_ref.clone(),
                })
                .collect()
        })
        .unwrap_or_default();

    let integrations = dto
        .integrations
        .map(|l| {
            l.integration
                .into_iter()
                .map(|i| Integration {
                    id: i.id,
                    kind: i.kind,
                    name: i.name,
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(Project {
        id: dto.id,
        name: dto.name,
        iteration_length: dto.iteration_length,
        week_start_day,
        point_scale: dto.point_scale,
        account: dto.account,
        velocity_scheme: dto.velocity_scheme,
        current_velocity: dto.current_velocity,
        initial_velocity: dto.initial_velocity,
        done_iterations_to_show: dto.number_of_done_iterations_to_show,
        labels: dto.labels.as_deref().map(split_labels).unwrap_or_default(),
        attachments_allowed: dto.allow_attachments,
        public: dto.is_public,
        use_https: dto.use_https,
        bugs_and_chores_estimable: dto.bugs_and_chores_are_estimatable,
        commit_mode: dto.commit_mode,
        start_date,
        last_activity: timestamp::parse(dto.last_activity_at.as_deref().unwrap_or(""))?,
        memberships,
        integrations,
    })
}

fn creation_payload(project: &NewProject) -> ProjectCreationDto {
    ProjectCreationDto {
        name: project.name.clone(),
        iteration_length: project.iteration_length,
        first_iteration_start_time: project
            .start_date
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .and_then(|dt| timestamp::format(Some(dt.and_utc()))),
    }
}

// ---------------------------------------------------------------------------
// Repository

/// Manages projects.
#[derive(Clone, Debug)]
pub struct ProjectRepository {
    ctx: Arc<TrackerContext>,
}

impl ProjectRepository {
    pub fn new(ctx: Arc<TrackerContext>) -> Self {
        Self { ctx }
    }

    pub fn get(&self, id: i64) -> Result<Project> {
        let dto: ProjectDto = self.ctx.fetch(&format!("/projects/{id}"), Verb::Get)?;
        map_project(dto)
    }

    pub fn get_all(&self) -> Result<Vec<Project>> {
        let dto: ProjectsDto = self.ctx.fetch("/projects", Verb::Get)?;
        dto.project.into_iter().map(map_project).collect()
    }

    pub fn create(&self, project: &NewProject) -> Result<Project> {
        let dto: ProjectDto =
            self.ctx
                .send("/projects", "project", &creation_payload(project), Verb::Post)?;
        map_project(dto)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Weekday};

    const PROJECT_XML: &str = r#"
        <project>
            <id>42</id>
            <name>Sample Project</name>
            <iteration_length type="integer">2</iteration_length>
            <week_start_day>Monday</week_start_day>
            <point_scale>0,1,2,3</point_scale>
            <account>acme</account>
            <velocity_scheme>Average of 3 iterations</velocity_scheme>
            <current_velocity>10</current_velocity>
            <initial_velocity>10</initial_velocity>
            <number_of_done_iterations_to_show>12</number_of_done_iterations_to_show>
            <labels>shields, transporter</labels>
            <allow_attachments>true</allow_attachments>
            <public>false</public>
            <use_https>true</use_https>
            <bugs_and_chores_are_estimatable>false</bugs_and_chores_are_estimatable>
            <commit_mode>false</commit_mode>
            <first_iteration_start_time>2011-06-13 06:00:00 UTC</first_iteration_start_time>
            <last_activity_at>2011-06-18 14:30:00 UTC</last_activity_at>
            <memberships>
                <membership>
                    <id>100</id>
                    <role>Owner</role>
                    <person>
                        <email>kirk@example.com</email>
                        <name>James Kirk</name>
                        <initials>JK</initials>
                    </person>
                </membership>
            </memberships>
            <integrations>
                <integration>
                    <id>3</id>
                    <type>Other</type>
                    <name>bridge</name>
                </integration>
            </integrations>
        </project>"#;

    #[test]
    fn test_map_project_from_xml() {
        let dto: ProjectDto = quick_xml::de::from_str(PROJECT_XML).unwrap();
        let project = map_project(dto).unwrap();

        assert_eq!(project.id, 42);
        assert_eq!(project.week_start_day, Weekday::Mon);
        assert_eq!(project.labels, vec!["shields", "transporter"]);
        assert!(!project.bugs_and_chores_estimable);
        assert!(project.last_activity.is_some());

        assert_eq!(project.integrations.len(), 1);
        assert_eq!(project.integrations[0].kind, "Other");
    }

    #[test]
    fn test_start_date_is_truncated_to_midnight() {
        let dto: ProjectDto = quick_xml::de::from_str(PROJECT_XML).unwrap();
        let project = map_project(dto).unwrap();
        // the 06:00:00 time-of-day is dropped
        assert_eq!(
            project.start_date,
            Some(NaiveDate::from_ymd_opt(2011, 6, 13).unwrap())
        );
    }

    #[test]
    fn test_memberships_get_project_back_reference() {
        let dto: ProjectDto = quick_xml::de::from_str(PROJECT_XML).unwrap();
        let project = map_project(dto).unwrap();

        assert_eq!(project.memberships.len(), 1);
        let membership = &project.memberships[0];
        assert_eq!(membership.person.initials, "JK");
        assert_eq!(membership.project.id, 42);
        assert_eq!(membership.project.name, "Sample Project");
    }

    #[test]
    fn test_unknown_weekday_is_invalid_field() {
        let xml = "<project><id>1</id><week_start_day>Someday</week_start_day></project>";
        let dto: ProjectDto = quick_xml::de::from_str(xml).unwrap();
        assert!(matches!(
            map_project(dto),
            Err(Error::InvalidField { .. })
        ));
    }

    #[test]
    fn test_creation_payload() {
        let mut new = NewProject::new("Warp Drive", 1);
        new.start_date = NaiveDate::from_ymd_opt(2011, 7, 1);
        let xml = quick_xml::se::to_string_with_root("project", &creation_payload(&new)).unwrap();
        assert!(xml.contains("<name>Warp Drive</name>"));
        assert!(xml.contains("<iteration_length>1</iteration_length>"));
        assert!(xml.contains(
            "<first_iteration_start_time>2011-07-01 00:00:00 UTC</first_iteration_start_time>"
        ));
    }
}
