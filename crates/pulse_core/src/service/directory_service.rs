//! Directory use-case service: sites, contacts and suppliers.
//!
//! # Invariants
//! - Sites land in a known category; unknown slugs are rejected before
//!   the FK can fire.
//! - Employee and admin listings never mix.

use crate::model::directory::{
    ContactId, SiteCategory, SiteId, Supplier, SupplierId, UsefulContact, UsefulSite,
};
use crate::repo::directory_repo::DirectoryRepository;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Service error for directory use-cases.
#[derive(Debug)]
pub enum DirectoryServiceError {
    RecordNotFound(Uuid),
    /// Site references a category slug that does not exist.
    UnknownCategory(String),
    Repo(RepoError),
}

impl Display for DirectoryServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RecordNotFound(id) => write!(f, "directory record not found: {id}"),
            Self::UnknownCategory(slug) => write!(f, "unknown site category `{slug}`"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DirectoryServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for DirectoryServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::RecordNotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub type DirectoryServiceResult<T> = Result<T, DirectoryServiceError>;

/// Use-case service wrapper for the directory.
pub struct DirectoryService<R: DirectoryRepository> {
    repo: R,
}

impl<R: DirectoryRepository> DirectoryService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn upsert_category(&mut self, category: &SiteCategory) -> DirectoryServiceResult<()> {
        Ok(self.repo.upsert_category(category)?)
    }

    pub fn list_categories(&self, admin_only: bool) -> DirectoryServiceResult<Vec<SiteCategory>> {
        Ok(self.repo.list_categories(admin_only)?)
    }

    /// Adds a site after checking its category exists for either audience.
    pub fn add_site(&mut self, site: &UsefulSite) -> DirectoryServiceResult<SiteId> {
        self.ensure_category_exists(&site.category)?;
        Ok(self.repo.create_site(site)?)
    }

    pub fn update_site(&mut self, site: &UsefulSite) -> DirectoryServiceResult<()> {
        self.ensure_category_exists(&site.category)?;
        Ok(self.repo.update_site(site)?)
    }

    pub fn remove_site(&mut self, id: SiteId) -> DirectoryServiceResult<()> {
        Ok(self.repo.delete_site(id)?)
    }

    /// Employee-facing site directory.
    pub fn employee_sites(&self, category: Option<&str>) -> DirectoryServiceResult<Vec<UsefulSite>> {
        Ok(self.repo.list_sites(false, category)?)
    }

    /// Back-office site directory.
    pub fn admin_sites(&self, category: Option<&str>) -> DirectoryServiceResult<Vec<UsefulSite>> {
        Ok(self.repo.list_sites(true, category)?)
    }

    pub fn add_contact(&mut self, contact: &UsefulContact) -> DirectoryServiceResult<ContactId> {
        Ok(self.repo.create_contact(contact)?)
    }

    pub fn list_contacts(&self) -> DirectoryServiceResult<Vec<UsefulContact>> {
        Ok(self.repo.list_contacts()?)
    }

    pub fn remove_contact(&mut self, id: ContactId) -> DirectoryServiceResult<()> {
        Ok(self.repo.delete_contact(id)?)
    }

    pub fn add_supplier(&mut self, supplier: &Supplier) -> DirectoryServiceResult<SupplierId> {
        Ok(self.repo.create_supplier(supplier)?)
    }

    pub fn update_supplier(&mut self, supplier: &Supplier) -> DirectoryServiceResult<()> {
        Ok(self.repo.update_supplier(supplier)?)
    }

    pub fn get_supplier(&self, id: SupplierId) -> DirectoryServiceResult<Option<Supplier>> {
        Ok(self.repo.get_supplier(id)?)
    }

    pub fn list_suppliers(&self) -> DirectoryServiceResult<Vec<Supplier>> {
        Ok(self.repo.list_suppliers()?)
    }

    pub fn remove_supplier(&mut self, id: SupplierId) -> DirectoryServiceResult<()> {
        Ok(self.repo.delete_supplier(id)?)
    }

    fn ensure_category_exists(&self, slug: &str) -> DirectoryServiceResult<()> {
        let known = self
            .repo
            .list_categories(false)?
            .into_iter()
            .chain(self.repo.list_categories(true)?)
            .any(|category| category.id == slug);
        if known {
            Ok(())
        } else {
            Err(DirectoryServiceError::UnknownCategory(slug.to_string()))
        }
    }
}
