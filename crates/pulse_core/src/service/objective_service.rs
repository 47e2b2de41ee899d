//! Objective use-case service.
//!
//! # Responsibility
//! - Provide CRUD entry points plus dashboard projections (overview,
//!   principal/secondary accessors).
//! - Re-derive palier unlock flags from live progress on every read.
//!
//! # Invariants
//! - No read path ever returns storage-trusted `unlocked` flags.
//! - Service APIs never bypass repository validation contracts.

use crate::model::objective::{Objective, ObjectiveId, ObjectiveKind, Palier};
use crate::prime::{derive_objective_unlocks, next_palier};
use crate::repo::objective_repo::{ObjectiveListQuery, ObjectiveRepository};
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for objective use-cases.
#[derive(Debug)]
pub enum ObjectiveServiceError {
    ObjectiveNotFound(ObjectiveId),
    Repo(RepoError),
}

impl Display for ObjectiveServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ObjectiveNotFound(id) => write!(f, "objective not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ObjectiveServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::ObjectiveNotFound(_) => None,
        }
    }
}

impl From<RepoError> for ObjectiveServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::ObjectiveNotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub type ObjectiveServiceResult<T> = Result<T, ObjectiveServiceError>;

/// Dashboard projection of one objective.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectiveOverview {
    /// Objective with tiers re-derived from progress.
    pub objective: Objective,
    /// `progress / target * 100`; may exceed 100 on overshoot.
    pub progress_percent: f64,
    pub unlocked_count: usize,
    pub next_palier: Option<Palier>,
}

/// Use-case service wrapper for objective operations.
pub struct ObjectiveService<R: ObjectiveRepository> {
    repo: R,
}

impl<R: ObjectiveRepository> ObjectiveService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_objective(&mut self, objective: &Objective) -> ObjectiveServiceResult<ObjectiveId> {
        Ok(self.repo.create_objective(objective)?)
    }

    pub fn update_objective(&mut self, objective: &Objective) -> ObjectiveServiceResult<()> {
        Ok(self.repo.update_objective(objective)?)
    }

    /// Stores a new progress reading for the objective.
    pub fn record_progress(&mut self, id: ObjectiveId, progress: f64) -> ObjectiveServiceResult<()> {
        Ok(self.repo.set_progress(id, progress)?)
    }

    pub fn archive_objective(&mut self, id: ObjectiveId) -> ObjectiveServiceResult<()> {
        Ok(self.repo.archive_objective(id)?)
    }

    /// Gets one objective with unlock flags derived from progress.
    pub fn get_objective(
        &self,
        id: ObjectiveId,
        include_archived: bool,
    ) -> ObjectiveServiceResult<Option<Objective>> {
        let objective = self.repo.get_objective(id, include_archived)?;
        Ok(objective.map(with_derived_unlocks))
    }

    /// Lists objectives with unlock flags derived from progress.
    pub fn list_objectives(
        &self,
        query: &ObjectiveListQuery,
    ) -> ObjectiveServiceResult<Vec<Objective>> {
        let objectives = self.repo.list_objectives(query)?;
        Ok(objectives.into_iter().map(with_derived_unlocks).collect())
    }

    /// The headline objective, when an active one exists.
    pub fn principal_objective(&self) -> ObjectiveServiceResult<Option<Objective>> {
        let query = ObjectiveListQuery {
            kind: Some(ObjectiveKind::Principal),
            limit: Some(1),
            ..ObjectiveListQuery::default()
        };
        Ok(self.list_objectives(&query)?.into_iter().next())
    }

    /// Active supporting objectives.
    pub fn secondary_objectives(&self) -> ObjectiveServiceResult<Vec<Objective>> {
        let query = ObjectiveListQuery {
            kind: Some(ObjectiveKind::Secondary),
            ..ObjectiveListQuery::default()
        };
        self.list_objectives(&query)
    }

    /// Assembles the dashboard card projection for one objective.
    pub fn objective_overview(&self, id: ObjectiveId) -> ObjectiveServiceResult<ObjectiveOverview> {
        let objective = self
            .get_objective(id, true)?
            .ok_or(ObjectiveServiceError::ObjectiveNotFound(id))?;

        let progress_percent = if objective.target > 0.0 {
            objective.progress / objective.target * 100.0
        } else {
            0.0
        };
        let unlocked_count = objective.paliers.iter().filter(|p| p.unlocked).count();
        let next = next_palier(&objective).cloned();

        Ok(ObjectiveOverview {
            progress_percent,
            unlocked_count,
            next_palier: next,
            objective,
        })
    }
}

fn with_derived_unlocks(mut objective: Objective) -> Objective {
    derive_objective_unlocks(&mut objective);
    objective
}
