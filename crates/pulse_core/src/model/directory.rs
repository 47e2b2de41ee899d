//! Supplier and contact directory model.
//!
//! The employee-facing site list and the admin back-office list share one
//! record shape, separated by `admin_only`.
//!
//! # Invariants
//! - Site URLs are http(s).
//! - Phone numbers accept digits, spaces, dots, `+`, parentheses, dashes.
//! - Supplier order cutoffs are `HH:MM` 24h times.

use super::{require_non_empty, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a directory site.
pub type SiteId = Uuid;

/// Stable identifier for a directory contact.
pub type ContactId = Uuid;

/// Stable identifier for a supplier.
pub type SupplierId = Uuid;

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s]+$").expect("valid url regex"));
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9][0-9 .()\-]{5,19}$").expect("valid phone regex"));
static CUTOFF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("valid cutoff regex"));

pub(crate) fn is_valid_url(value: &str) -> bool {
    URL_RE.is_match(value)
}

pub(crate) fn is_valid_phone(value: &str) -> bool {
    PHONE_RE.is_match(value)
}

pub(crate) fn is_valid_cutoff(value: &str) -> bool {
    CUTOFF_RE.is_match(value)
}

/// Grouping header for directory sites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteCategory {
    /// Stable slug, e.g. `aides`, `sante`, `livraison`.
    pub id: String,
    pub name: String,
    /// Icon name rendered by the UI layer.
    pub icon: String,
    /// `#RRGGBB` accent color.
    pub color: String,
    pub admin_only: bool,
}

impl SiteCategory {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty(&self.id, "id")?;
        require_non_empty(&self.name, "name")?;
        Ok(())
    }
}

/// One external site useful to employees or administrators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsefulSite {
    pub id: SiteId,
    pub name: String,
    pub description: String,
    pub url: String,
    /// Category slug, references `SiteCategory::id`.
    pub category: String,
    /// Optional custom logo asset path.
    pub logo: Option<String>,
    /// Back-office tools are hidden from the employee directory.
    pub admin_only: bool,
}

impl UsefulSite {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_nil() {
            return Err(ValidationError::NilUuid);
        }
        require_non_empty(&self.name, "name")?;
        require_non_empty(&self.category, "category")?;
        if !is_valid_url(&self.url) {
            return Err(ValidationError::InvalidUrl(self.url.clone()));
        }
        Ok(())
    }
}

/// One phone contact shown in the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsefulContact {
    pub id: ContactId,
    pub name: String,
    pub phone: String,
    pub role: String,
    pub category: String,
}

impl UsefulContact {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_nil() {
            return Err(ValidationError::NilUuid);
        }
        require_non_empty(&self.name, "name")?;
        require_non_empty(&self.role, "role")?;
        require_non_empty(&self.category, "category")?;
        if !is_valid_phone(&self.phone) {
            return Err(ValidationError::InvalidPhone(self.phone.clone()));
        }
        Ok(())
    }
}

/// Delivery weekday for suppliers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

/// One goods supplier with its ordering constraints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    /// Sales representative name, when the account has one.
    pub sales_contact: Option<String>,
    pub phone: String,
    pub delivery_days: Vec<Weekday>,
    /// Days of advance notice an order needs.
    pub lead_time_days: u32,
    /// Latest order time on the ordering day, `HH:MM`.
    pub order_cutoff: Option<String>,
    /// Minimum order amount, euro cents.
    pub min_order_cents: Option<i64>,
    /// Free-delivery (franco) threshold, euro cents.
    pub free_delivery_cents: Option<i64>,
    /// Free-text delivery slot, e.g. `Avant 10h`.
    pub delivery_window: Option<String>,
}

impl Supplier {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            sales_contact: None,
            phone: phone.into(),
            delivery_days: Vec::new(),
            lead_time_days: 1,
            order_cutoff: None,
            min_order_cents: None,
            free_delivery_cents: None,
            delivery_window: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_nil() {
            return Err(ValidationError::NilUuid);
        }
        require_non_empty(&self.name, "name")?;
        if !is_valid_phone(&self.phone) {
            return Err(ValidationError::InvalidPhone(self.phone.clone()));
        }
        if let Some(cutoff) = &self.order_cutoff {
            if !is_valid_cutoff(cutoff) {
                return Err(ValidationError::InvalidCutoffTime(cutoff.clone()));
            }
        }
        for amount in [self.min_order_cents, self.free_delivery_cents].into_iter().flatten() {
            if amount < 0 {
                return Err(ValidationError::NegativeAmount { cents: amount });
            }
        }
        Ok(())
    }
}
