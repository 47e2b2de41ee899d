//! Team administration use-case service.
//!
//! # Responsibility
//! - Member CRUD plus the team page projections: roster stats and the
//!   per-member bonus preview.
//!
//! # Invariants
//! - Excluded members appear in rosters but never in bonus previews.

use crate::model::member::{MemberId, TeamMember};
use crate::prime::{pro_rata_prime, team_distribution, PrimeCalcError, TeamDistribution};
use crate::repo::member_repo::{MemberListQuery, MemberRepository};
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for team use-cases.
#[derive(Debug)]
pub enum TeamServiceError {
    MemberNotFound(MemberId),
    Calc(PrimeCalcError),
    Repo(RepoError),
}

impl Display for TeamServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MemberNotFound(id) => write!(f, "team member not found: {id}"),
            Self::Calc(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TeamServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Calc(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::MemberNotFound(_) => None,
        }
    }
}

impl From<RepoError> for TeamServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::MemberNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<PrimeCalcError> for TeamServiceError {
    fn from(value: PrimeCalcError) -> Self {
        Self::Calc(value)
    }
}

pub type TeamServiceResult<T> = Result<T, TeamServiceError>;

/// Team page header stats plus the pro-rata preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamOverview {
    pub member_count: usize,
    /// Sum of contracted hours across the roster.
    pub total_contract_hours: u32,
    /// Rounded completed/assigned objective ratio, 0 when nothing is
    /// assigned.
    pub completion_percent: u32,
    pub distribution: TeamDistribution,
}

/// Use-case service wrapper for team administration.
pub struct TeamService<R: MemberRepository> {
    repo: R,
}

impl<R: MemberRepository> TeamService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn invite_member(&mut self, member: &TeamMember) -> TeamServiceResult<MemberId> {
        Ok(self.repo.create_member(member)?)
    }

    pub fn update_member(&mut self, member: &TeamMember) -> TeamServiceResult<()> {
        Ok(self.repo.update_member(member)?)
    }

    pub fn remove_member(&mut self, id: MemberId) -> TeamServiceResult<()> {
        Ok(self.repo.delete_member(id)?)
    }

    pub fn set_exclude_from_primes(
        &mut self,
        id: MemberId,
        exclude: bool,
    ) -> TeamServiceResult<()> {
        Ok(self.repo.set_exclude_from_primes(id, exclude)?)
    }

    pub fn get_member(&self, id: MemberId) -> TeamServiceResult<Option<TeamMember>> {
        Ok(self.repo.get_member(id)?)
    }

    /// Roster listing with optional name/role search.
    pub fn list_members(&self, query: &MemberListQuery) -> TeamServiceResult<Vec<TeamMember>> {
        Ok(self.repo.list_members(query)?)
    }

    /// Assembles the team page stats against a bonus pool.
    pub fn team_overview(&self, total_potential_cents: i64) -> TeamServiceResult<TeamOverview> {
        let members = self.repo.list_members(&MemberListQuery::default())?;

        let total_contract_hours = members.iter().map(|m| m.contract_hours).sum();
        let assigned: u32 = members.iter().map(|m| m.objectives_assigned).sum();
        let completed: u32 = members.iter().map(|m| m.objectives_completed).sum();
        let completion_percent = if assigned > 0 {
            (f64::from(completed) / f64::from(assigned) * 100.0).round() as u32
        } else {
            0
        };
        let distribution = team_distribution(total_potential_cents, &members)?;

        Ok(TeamOverview {
            member_count: members.len(),
            total_contract_hours,
            completion_percent,
            distribution,
        })
    }

    /// Pro-rata preview for one member; `None` when the member is
    /// excluded from primes.
    pub fn member_prime_preview(
        &self,
        id: MemberId,
        total_potential_cents: i64,
    ) -> TeamServiceResult<Option<i64>> {
        let member = self
            .repo
            .get_member(id)?
            .ok_or(TeamServiceError::MemberNotFound(id))?;

        if member.exclude_from_primes {
            return Ok(None);
        }
        let amount = pro_rata_prime(
            total_potential_cents,
            member.contract_hours,
            member.base_hours,
        )?;
        Ok(Some(amount))
    }
}
