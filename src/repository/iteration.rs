//! Iteration wire DTOs, mapping and repository.

use std::sync::Arc;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::Iteration;

use super::story::{map_story, StoriesDto};
use super::{timestamp, TrackerContext, Verb};

/// `<iteration>` response body.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct IterationDto {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub number: i32,
    pub start: Option<String>,
    pub finish: Option<String>,
    #[serde(default)]
    pub team_strength: f32,
    pub stories: Option<StoriesDto>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct IterationsDto {
    #[serde(default)]
    pub iteration: Vec<IterationDto>,
}

pub(crate) fn map_iteration(dto: IterationDto) -> Result<Iteration> {
    let stories = dto
        .stories
        .map(|l| l.story.into_iter().map(map_story).collect::<Result<Vec<_>>>())
        .transpose()?
        .unwrap_or_default();

    Ok(Iteration {
        id: dto.id,
        number: dto.number,
        start: timestamp::parse(dto.start.as_deref().unwrap_or(""))?,
        finish: timestamp::parse(dto.finish.as_deref().unwrap_or(""))?,
        team_strength: dto.team_strength,
        stories,
    })
}

/// Manages iterations. Read-only; the API offers no iteration mutation.
#[derive(Clone)]
pub struct IterationRepository {
    ctx: Arc<TrackerContext>,
}

impl IterationRepository {
    pub fn new(ctx: Arc<TrackerContext>) -> Self {
        Self { ctx }
    }

    /// All iterations of a project: past, current and future.
    pub fn get_all(&self, project_id: i64) -> Result<Vec<Iteration>> {
        let path = format!("/projects/{project_id}/iterations");
        let dto: IterationsDto = self.ctx.fetch(&path, Verb::Get)?;
        dto.iteration.into_iter().map(map_iteration).collect()
    }

    /// A window of the project's iterations. Not implemented by this
    /// client; fails without touching the network.
    pub fn limited(&self, _project_id: i64, _offset: i64, _limit: i64) -> Result<Vec<Iteration>> {
        Err(Error::unsupported("paged iteration fetch"))
    }
}
