//! Prime (bonus statement) use-case service.
//!
//! # Responsibility
//! - Drive the monthly statement lifecycle: open, record breakdown,
//!   validate, pay.
//! - Assemble statement projections by feeding repository data through
//!   the pure calculator.
//!
//! # Invariants
//! - One statement per month; reopening an existing month is rejected.
//! - The service never reads clocks; transition timestamps come from the
//!   caller's environment via the repository defaults.

use crate::model::member::TeamMember;
use crate::model::objective::Objective;
use crate::model::prime::{is_valid_month_key, Prime, PrimeId, PrimeLine, PrimeStatus};
use crate::prime::{team_distribution, total_potential_prime, PrimeCalcError, TeamDistribution};
use crate::repo::prime_repo::PrimeRepository;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for prime use-cases.
#[derive(Debug)]
pub enum PrimeServiceError {
    PrimeNotFound(PrimeId),
    /// A statement already exists for the month key.
    MonthAlreadyOpen(String),
    /// No statement exists for the month key.
    MonthNotFound(String),
    InvalidMonthKey(String),
    Calc(PrimeCalcError),
    Repo(RepoError),
}

impl Display for PrimeServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PrimeNotFound(id) => write!(f, "prime not found: {id}"),
            Self::MonthAlreadyOpen(month) => {
                write!(f, "a prime statement already exists for {month}")
            }
            Self::MonthNotFound(month) => {
                write!(f, "no prime statement exists for {month}")
            }
            Self::InvalidMonthKey(month) => {
                write!(f, "invalid month key `{month}`, expected YYYY-MM")
            }
            Self::Calc(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PrimeServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Calc(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for PrimeServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::PrimeNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<PrimeCalcError> for PrimeServiceError {
    fn from(value: PrimeCalcError) -> Self {
        Self::Calc(value)
    }
}

pub type PrimeServiceResult<T> = Result<T, PrimeServiceError>;

/// Full statement projection for one month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyStatement {
    pub prime: Prime,
    /// Maximum earnable across the objective catalogue, euro cents.
    pub potential_cents: i64,
    /// `amount / potential * 100`; 0 when nothing is earnable.
    pub progress_percent: f64,
    /// Pro-rata split of the potential across the roster.
    pub distribution: TeamDistribution,
}

/// Use-case service wrapper for prime statements.
pub struct PrimeService<R: PrimeRepository> {
    repo: R,
}

impl<R: PrimeRepository> PrimeService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Opens an empty pending statement for the month.
    pub fn open_month(&mut self, month: &str) -> PrimeServiceResult<Prime> {
        if !is_valid_month_key(month) {
            return Err(PrimeServiceError::InvalidMonthKey(month.to_string()));
        }
        if self.repo.get_prime_by_month(month)?.is_some() {
            return Err(PrimeServiceError::MonthAlreadyOpen(month.to_string()));
        }

        let prime = Prime::pending(month);
        self.repo.create_prime(&prime)?;
        Ok(prime)
    }

    /// The statement currently accumulating, when one is open.
    pub fn current_prime(&self) -> PrimeServiceResult<Option<Prime>> {
        let mut pending = self.repo.list_primes(Some(PrimeStatus::Pending))?;
        Ok(if pending.is_empty() {
            None
        } else {
            Some(pending.remove(0))
        })
    }

    /// Replaces the statement breakdown; the header amount follows the
    /// line sum.
    pub fn record_breakdown(
        &mut self,
        id: PrimeId,
        breakdown: Vec<PrimeLine>,
    ) -> PrimeServiceResult<Prime> {
        let mut prime = self
            .repo
            .get_prime(id)?
            .ok_or(PrimeServiceError::PrimeNotFound(id))?;

        prime.amount_cents = breakdown.iter().map(|line| line.amount_cents).sum();
        prime.breakdown = breakdown;
        self.repo.update_prime(&prime)?;
        Ok(prime)
    }

    /// Moves a pending statement to validated.
    pub fn validate_prime(&mut self, id: PrimeId) -> PrimeServiceResult<()> {
        Ok(self.repo.update_status(id, PrimeStatus::Validated)?)
    }

    /// Moves a validated statement to paid.
    pub fn mark_paid(&mut self, id: PrimeId) -> PrimeServiceResult<()> {
        Ok(self.repo.update_status(id, PrimeStatus::Paid)?)
    }

    /// All statements, newest month first.
    pub fn history(&self) -> PrimeServiceResult<Vec<Prime>> {
        Ok(self.repo.list_primes(None)?)
    }

    /// Lifetime paid total, euro cents.
    pub fn paid_total_cents(&self) -> PrimeServiceResult<i64> {
        Ok(self.repo.paid_total_cents()?)
    }

    /// Assembles the statement projection for one month.
    ///
    /// Objectives and roster are passed in so the statement math stays a
    /// pure function of its inputs.
    pub fn monthly_statement(
        &self,
        month: &str,
        objectives: &[Objective],
        members: &[TeamMember],
    ) -> PrimeServiceResult<MonthlyStatement> {
        let prime = self
            .repo
            .get_prime_by_month(month)?
            .ok_or_else(|| PrimeServiceError::MonthNotFound(month.to_string()))?;

        let potential_cents = total_potential_prime(objectives);
        let progress_percent = if potential_cents > 0 {
            prime.amount_cents as f64 / potential_cents as f64 * 100.0
        } else {
            0.0
        };
        let distribution = team_distribution(potential_cents, members)?;

        Ok(MonthlyStatement {
            prime,
            potential_cents,
            progress_percent,
            distribution,
        })
    }
}
