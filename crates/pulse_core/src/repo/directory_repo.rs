//! Directory repository: categories, sites, contacts and suppliers.
//!
//! # Invariants
//! - Models validate before SQL mutations (URL, phone, cutoff formats).
//! - Listings are ordered by name for stable rendering.
//! - Supplier delivery days round-trip through a canonical CSV encoding.

use crate::model::directory::{
    ContactId, SiteCategory, SiteId, Supplier, SupplierId, UsefulContact, UsefulSite, Weekday,
};
use crate::repo::{
    bool_to_int, ensure_connection_ready, int_to_bool, parse_uuid, RepoError, RepoResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const SITE_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    description,
    url,
    category,
    logo,
    admin_only
FROM useful_sites";

const SUPPLIER_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    sales_contact,
    phone,
    delivery_days,
    lead_time_days,
    order_cutoff,
    min_order_cents,
    free_delivery_cents,
    delivery_window
FROM suppliers";

const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[
    ("site_categories", &["id", "name", "admin_only"]),
    ("useful_sites", &["uuid", "name", "url", "category", "admin_only"]),
    ("useful_contacts", &["uuid", "name", "phone", "role", "category"]),
    (
        "suppliers",
        &["uuid", "name", "phone", "delivery_days", "lead_time_days"],
    ),
];

/// Repository interface for the supplier/contact directory.
pub trait DirectoryRepository {
    fn upsert_category(&mut self, category: &SiteCategory) -> RepoResult<()>;
    fn list_categories(&self, admin_only: bool) -> RepoResult<Vec<SiteCategory>>;

    fn create_site(&mut self, site: &UsefulSite) -> RepoResult<SiteId>;
    fn update_site(&mut self, site: &UsefulSite) -> RepoResult<()>;
    fn get_site(&self, id: SiteId) -> RepoResult<Option<UsefulSite>>;
    /// Lists sites for one audience, optionally narrowed to a category.
    fn list_sites(&self, admin_only: bool, category: Option<&str>) -> RepoResult<Vec<UsefulSite>>;
    fn delete_site(&mut self, id: SiteId) -> RepoResult<()>;

    fn create_contact(&mut self, contact: &UsefulContact) -> RepoResult<ContactId>;
    fn list_contacts(&self) -> RepoResult<Vec<UsefulContact>>;
    fn delete_contact(&mut self, id: ContactId) -> RepoResult<()>;

    fn create_supplier(&mut self, supplier: &Supplier) -> RepoResult<SupplierId>;
    fn update_supplier(&mut self, supplier: &Supplier) -> RepoResult<()>;
    fn get_supplier(&self, id: SupplierId) -> RepoResult<Option<Supplier>>;
    fn list_suppliers(&self) -> RepoResult<Vec<Supplier>>;
    fn delete_supplier(&mut self, id: SupplierId) -> RepoResult<()>;
}

/// SQLite-backed directory repository.
pub struct SqliteDirectoryRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteDirectoryRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, REQUIRED_SCHEMA)?;
        Ok(Self { conn })
    }
}

impl DirectoryRepository for SqliteDirectoryRepository<'_> {
    fn upsert_category(&mut self, category: &SiteCategory) -> RepoResult<()> {
        category.validate()?;

        self.conn.execute(
            "INSERT INTO site_categories (id, name, icon, color, admin_only)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                icon = excluded.icon,
                color = excluded.color,
                admin_only = excluded.admin_only;",
            params![
                category.id.as_str(),
                category.name.as_str(),
                category.icon.as_str(),
                category.color.as_str(),
                bool_to_int(category.admin_only),
            ],
        )?;
        Ok(())
    }

    fn list_categories(&self, admin_only: bool) -> RepoResult<Vec<SiteCategory>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, icon, color, admin_only
             FROM site_categories
             WHERE admin_only = ?1
             ORDER BY name COLLATE NOCASE ASC, id ASC;",
        )?;
        let mut rows = stmt.query([bool_to_int(admin_only)])?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            categories.push(SiteCategory {
                id: row.get("id")?,
                name: row.get("name")?,
                icon: row.get("icon")?,
                color: row.get("color")?,
                admin_only: int_to_bool(row.get("admin_only")?, "site_categories.admin_only")?,
            });
        }
        Ok(categories)
    }

    fn create_site(&mut self, site: &UsefulSite) -> RepoResult<SiteId> {
        site.validate()?;

        self.conn.execute(
            "INSERT INTO useful_sites (uuid, name, description, url, category, logo, admin_only)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                site.id.to_string(),
                site.name.as_str(),
                site.description.as_str(),
                site.url.as_str(),
                site.category.as_str(),
                site.logo.as_deref(),
                bool_to_int(site.admin_only),
            ],
        )?;
        Ok(site.id)
    }

    fn update_site(&mut self, site: &UsefulSite) -> RepoResult<()> {
        site.validate()?;

        let changed = self.conn.execute(
            "UPDATE useful_sites
             SET name = ?1, description = ?2, url = ?3, category = ?4, logo = ?5, admin_only = ?6
             WHERE uuid = ?7;",
            params![
                site.name.as_str(),
                site.description.as_str(),
                site.url.as_str(),
                site.category.as_str(),
                site.logo.as_deref(),
                bool_to_int(site.admin_only),
                site.id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(site.id));
        }
        Ok(())
    }

    fn get_site(&self, id: SiteId) -> RepoResult<Option<UsefulSite>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SITE_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_site_row(row)?));
        }
        Ok(None)
    }

    fn list_sites(&self, admin_only: bool, category: Option<&str>) -> RepoResult<Vec<UsefulSite>> {
        let mut sql = format!("{SITE_SELECT_SQL} WHERE admin_only = ?");
        let mut bind_values: Vec<Value> = vec![Value::Integer(bool_to_int(admin_only))];
        if let Some(category) = category {
            sql.push_str(" AND category = ?");
            bind_values.push(Value::Text(category.to_string()));
        }
        sql.push_str(" ORDER BY name COLLATE NOCASE ASC, uuid ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut sites = Vec::new();
        while let Some(row) = rows.next()? {
            sites.push(parse_site_row(row)?);
        }
        Ok(sites)
    }

    fn delete_site(&mut self, id: SiteId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM useful_sites WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn create_contact(&mut self, contact: &UsefulContact) -> RepoResult<ContactId> {
        contact.validate()?;

        self.conn.execute(
            "INSERT INTO useful_contacts (uuid, name, phone, role, category)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                contact.id.to_string(),
                contact.name.as_str(),
                contact.phone.as_str(),
                contact.role.as_str(),
                contact.category.as_str(),
            ],
        )?;
        Ok(contact.id)
    }

    fn list_contacts(&self) -> RepoResult<Vec<UsefulContact>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, name, phone, role, category
             FROM useful_contacts
             ORDER BY name COLLATE NOCASE ASC, uuid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut contacts = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get("uuid")?;
            contacts.push(UsefulContact {
                id: parse_uuid(&uuid_text, "useful_contacts.uuid")?,
                name: row.get("name")?,
                phone: row.get("phone")?,
                role: row.get("role")?,
                category: row.get("category")?,
            });
        }
        Ok(contacts)
    }

    fn delete_contact(&mut self, id: ContactId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM useful_contacts WHERE uuid = ?1;",
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn create_supplier(&mut self, supplier: &Supplier) -> RepoResult<SupplierId> {
        supplier.validate()?;

        self.conn.execute(
            "INSERT INTO suppliers (
                uuid,
                name,
                sales_contact,
                phone,
                delivery_days,
                lead_time_days,
                order_cutoff,
                min_order_cents,
                free_delivery_cents,
                delivery_window
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                supplier.id.to_string(),
                supplier.name.as_str(),
                supplier.sales_contact.as_deref(),
                supplier.phone.as_str(),
                delivery_days_to_db(&supplier.delivery_days),
                supplier.lead_time_days,
                supplier.order_cutoff.as_deref(),
                supplier.min_order_cents,
                supplier.free_delivery_cents,
                supplier.delivery_window.as_deref(),
            ],
        )?;
        Ok(supplier.id)
    }

    fn update_supplier(&mut self, supplier: &Supplier) -> RepoResult<()> {
        supplier.validate()?;

        let changed = self.conn.execute(
            "UPDATE suppliers
             SET
                name = ?1,
                sales_contact = ?2,
                phone = ?3,
                delivery_days = ?4,
                lead_time_days = ?5,
                order_cutoff = ?6,
                min_order_cents = ?7,
                free_delivery_cents = ?8,
                delivery_window = ?9
             WHERE uuid = ?10;",
            params![
                supplier.name.as_str(),
                supplier.sales_contact.as_deref(),
                supplier.phone.as_str(),
                delivery_days_to_db(&supplier.delivery_days),
                supplier.lead_time_days,
                supplier.order_cutoff.as_deref(),
                supplier.min_order_cents,
                supplier.free_delivery_cents,
                supplier.delivery_window.as_deref(),
                supplier.id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(supplier.id));
        }
        Ok(())
    }

    fn get_supplier(&self, id: SupplierId) -> RepoResult<Option<Supplier>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SUPPLIER_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_supplier_row(row)?));
        }
        Ok(None)
    }

    fn list_suppliers(&self) -> RepoResult<Vec<Supplier>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SUPPLIER_SELECT_SQL} ORDER BY name COLLATE NOCASE ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut suppliers = Vec::new();
        while let Some(row) = rows.next()? {
            suppliers.push(parse_supplier_row(row)?);
        }
        Ok(suppliers)
    }

    fn delete_supplier(&mut self, id: SupplierId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM suppliers WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn parse_site_row(row: &Row<'_>) -> RepoResult<UsefulSite> {
    let uuid_text: String = row.get("uuid")?;
    Ok(UsefulSite {
        id: parse_uuid(&uuid_text, "useful_sites.uuid")?,
        name: row.get("name")?,
        description: row.get("description")?,
        url: row.get("url")?,
        category: row.get("category")?,
        logo: row.get("logo")?,
        admin_only: int_to_bool(row.get("admin_only")?, "useful_sites.admin_only")?,
    })
}

fn parse_supplier_row(row: &Row<'_>) -> RepoResult<Supplier> {
    let uuid_text: String = row.get("uuid")?;
    let days_text: String = row.get("delivery_days")?;
    Ok(Supplier {
        id: parse_uuid(&uuid_text, "suppliers.uuid")?,
        name: row.get("name")?,
        sales_contact: row.get("sales_contact")?,
        phone: row.get("phone")?,
        delivery_days: parse_delivery_days(&days_text)?,
        lead_time_days: row.get("lead_time_days")?,
        order_cutoff: row.get("order_cutoff")?,
        min_order_cents: row.get("min_order_cents")?,
        free_delivery_cents: row.get("free_delivery_cents")?,
        delivery_window: row.get("delivery_window")?,
    })
}

fn delivery_days_to_db(days: &[Weekday]) -> String {
    days.iter()
        .map(|day| weekday_to_db(*day))
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_delivery_days(value: &str) -> RepoResult<Vec<Weekday>> {
    if value.is_empty() {
        return Ok(Vec::new());
    }
    value
        .split(',')
        .map(|code| {
            parse_weekday(code).ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "invalid weekday `{code}` in suppliers.delivery_days"
                ))
            })
        })
        .collect()
}

fn weekday_to_db(day: Weekday) -> &'static str {
    match day {
        Weekday::Monday => "mon",
        Weekday::Tuesday => "tue",
        Weekday::Wednesday => "wed",
        Weekday::Thursday => "thu",
        Weekday::Friday => "fri",
        Weekday::Saturday => "sat",
        Weekday::Sunday => "sun",
    }
}

fn parse_weekday(value: &str) -> Option<Weekday> {
    match value {
        "mon" => Some(Weekday::Monday),
        "tue" => Some(Weekday::Tuesday),
        "wed" => Some(Weekday::Wednesday),
        "thu" => Some(Weekday::Thursday),
        "fri" => Some(Weekday::Friday),
        "sat" => Some(Weekday::Saturday),
        "sun" => Some(Weekday::Sunday),
        _ => None,
    }
}
