//! Content record types and their write schemas.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    Collection, ContentError, FieldValue, Fields, Record, Singleton, nullable, patch_field, require_max_len,
    require_text,
};

const MAX_TITLE_LEN: usize = 200;
const MAX_CONTACT_NAME_LEN: usize = 100;
const MAX_CONTACT_LEN: usize = 255;
const MAX_MESSAGE_LEN: usize = 5000;

fn validate_title(title: &str) -> Result<(), ContentError> {
    require_text("title", title)?;
    require_max_len("title", title, MAX_TITLE_LEN)
}

fn validate_patch_title(title: Option<&String>) -> Result<(), ContentError> {
    title.map_or(Ok(()), |t| validate_title(t))
}

// =============================================================================
// SITE SETTINGS
// =============================================================================

/// Company contact details and branding shown in header and footer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SiteSettings {
    pub id: Uuid,
    pub company_name: Option<String>,
    pub tagline: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub address: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteSettingsPatch {
    pub company_name: Option<String>,
    pub tagline: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub address: Option<String>,
    pub logo_url: Option<String>,
}

impl Record for SiteSettings {
    const TABLE: &'static str = "site_settings";
    const KEY: &'static str = "site-settings";
    const COLUMNS: &'static str = "id, company_name, tagline, email, phone, whatsapp, address, logo_url";
}

impl Singleton for SiteSettings {
    const CREATE_IF_MISSING: bool = true;
    type Patch = SiteSettingsPatch;
}

impl Fields for SiteSettingsPatch {
    fn into_fields(self) -> Vec<(&'static str, FieldValue)> {
        [
            ("company_name", self.company_name),
            ("tagline", self.tagline),
            ("email", self.email),
            ("phone", self.phone),
            ("whatsapp", self.whatsapp),
            ("address", self.address),
            ("logo_url", self.logo_url),
        ]
        .into_iter()
        .filter_map(|(column, value)| value.map(|v| (column, nullable(Some(v)))))
        .collect()
    }
}

// =============================================================================
// HOMEPAGE
// =============================================================================

/// Hero section copy, call-to-action buttons, and headline stats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct HomepageContent {
    pub id: Uuid,
    pub headline: Option<String>,
    pub subheadline: Option<String>,
    pub cta_primary_text: Option<String>,
    pub cta_primary_link: Option<String>,
    pub cta_secondary_text: Option<String>,
    pub cta_secondary_link: Option<String>,
    pub stats_projects: Option<String>,
    pub stats_clients: Option<String>,
    pub stats_years: Option<String>,
    pub youtube_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HomepagePatch {
    pub headline: Option<String>,
    pub subheadline: Option<String>,
    pub cta_primary_text: Option<String>,
    pub cta_primary_link: Option<String>,
    pub cta_secondary_text: Option<String>,
    pub cta_secondary_link: Option<String>,
    pub stats_projects: Option<String>,
    pub stats_clients: Option<String>,
    pub stats_years: Option<String>,
    pub youtube_url: Option<String>,
}

impl Record for HomepageContent {
    const TABLE: &'static str = "homepage_content";
    const KEY: &'static str = "homepage-content";
    const COLUMNS: &'static str = "id, headline, subheadline, cta_primary_text, cta_primary_link, \
         cta_secondary_text, cta_secondary_link, stats_projects, stats_clients, stats_years, youtube_url";
}

impl Singleton for HomepageContent {
    const CREATE_IF_MISSING: bool = false;
    type Patch = HomepagePatch;
}

impl Fields for HomepagePatch {
    fn into_fields(self) -> Vec<(&'static str, FieldValue)> {
        [
            ("headline", self.headline),
            ("subheadline", self.subheadline),
            ("cta_primary_text", self.cta_primary_text),
            ("cta_primary_link", self.cta_primary_link),
            ("cta_secondary_text", self.cta_secondary_text),
            ("cta_secondary_link", self.cta_secondary_link),
            ("stats_projects", self.stats_projects),
            ("stats_clients", self.stats_clients),
            ("stats_years", self.stats_years),
            ("youtube_url", self.youtube_url),
        ]
        .into_iter()
        .filter_map(|(column, value)| value.map(|v| (column, nullable(Some(v)))))
        .collect()
    }
}

// =============================================================================
// ABOUT
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AboutContent {
    pub id: Uuid,
    pub profile_text: Option<String>,
    pub vision: Option<String>,
    pub mission: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AboutPatch {
    pub profile_text: Option<String>,
    pub vision: Option<String>,
    pub mission: Option<Vec<String>>,
}

impl Record for AboutContent {
    const TABLE: &'static str = "about_content";
    const KEY: &'static str = "about-content";
    const COLUMNS: &'static str = "id, profile_text, vision, mission";
}

impl Singleton for AboutContent {
    const CREATE_IF_MISSING: bool = false;
    type Patch = AboutPatch;
}

impl Fields for AboutPatch {
    fn into_fields(self) -> Vec<(&'static str, FieldValue)> {
        let mut out = Vec::new();
        patch_field(&mut out, "profile_text", self.profile_text.map(|v| nullable(Some(v))));
        patch_field(&mut out, "vision", self.vision.map(|v| nullable(Some(v))));
        patch_field(&mut out, "mission", self.mission);
        out
    }
}

// =============================================================================
// SERVICES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Service {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub sort_order: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewService {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServicePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl Record for Service {
    const TABLE: &'static str = "services";
    const KEY: &'static str = "services";
    const COLUMNS: &'static str = "id, title, description, icon, sort_order, is_active";
}

impl Collection for Service {
    type Draft = NewService;
    type Patch = ServicePatch;
}

impl Fields for NewService {
    fn validate(&self) -> Result<(), ContentError> {
        validate_title(&self.title)
    }

    fn into_fields(self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("title", self.title.trim().to_owned().into()),
            ("description", self.description.into()),
            ("icon", self.icon.into()),
            ("sort_order", self.sort_order.into()),
            ("is_active", self.is_active.into()),
        ]
    }
}

impl Fields for ServicePatch {
    fn validate(&self) -> Result<(), ContentError> {
        validate_patch_title(self.title.as_ref())
    }

    fn into_fields(self) -> Vec<(&'static str, FieldValue)> {
        let mut out = Vec::new();
        patch_field(&mut out, "title", self.title.map(|t| t.trim().to_owned()));
        patch_field(&mut out, "description", self.description);
        patch_field(&mut out, "icon", self.icon);
        patch_field(&mut out, "sort_order", self.sort_order);
        patch_field(&mut out, "is_active", self.is_active);
        out
    }
}

// =============================================================================
// PORTFOLIO
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PortfolioItem {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub description: String,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub project_url: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPortfolioItem {
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub project_url: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortfolioPatch {
    pub title: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub project_url: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl Record for PortfolioItem {
    const TABLE: &'static str = "portfolio";
    const KEY: &'static str = "portfolio";
    const COLUMNS: &'static str =
        "id, title, category, description, tags, image_url, project_url, sort_order, is_active";
}

impl Collection for PortfolioItem {
    type Draft = NewPortfolioItem;
    type Patch = PortfolioPatch;
}

impl Fields for NewPortfolioItem {
    fn validate(&self) -> Result<(), ContentError> {
        validate_title(&self.title)?;
        require_text("category", &self.category)
    }

    fn into_fields(self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("title", self.title.trim().to_owned().into()),
            ("category", self.category.trim().to_owned().into()),
            ("description", self.description.into()),
            ("tags", self.tags.into()),
            ("image_url", nullable(self.image_url)),
            ("project_url", nullable(self.project_url)),
            ("sort_order", self.sort_order.into()),
            ("is_active", self.is_active.into()),
        ]
    }
}

impl Fields for PortfolioPatch {
    fn validate(&self) -> Result<(), ContentError> {
        validate_patch_title(self.title.as_ref())?;
        self.category
            .as_deref()
            .map_or(Ok(()), |c| require_text("category", c))
    }

    fn into_fields(self) -> Vec<(&'static str, FieldValue)> {
        let mut out = Vec::new();
        patch_field(&mut out, "title", self.title.map(|t| t.trim().to_owned()));
        patch_field(&mut out, "category", self.category.map(|c| c.trim().to_owned()));
        patch_field(&mut out, "description", self.description);
        patch_field(&mut out, "tags", self.tags);
        patch_field(&mut out, "image_url", self.image_url.map(|v| nullable(Some(v))));
        patch_field(&mut out, "project_url", self.project_url.map(|v| nullable(Some(v))));
        patch_field(&mut out, "sort_order", self.sort_order);
        patch_field(&mut out, "is_active", self.is_active);
        out
    }
}

// =============================================================================
// PRODUCTS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub features: Vec<String>,
    pub icon: String,
    pub is_popular: bool,
    pub is_active: bool,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub is_popular: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub features: Option<Vec<String>>,
    pub icon: Option<String>,
    pub is_popular: Option<bool>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

impl Record for Product {
    const TABLE: &'static str = "products";
    const KEY: &'static str = "products";
    const COLUMNS: &'static str = "id, title, description, features, icon, is_popular, is_active, sort_order";
}

impl Collection for Product {
    type Draft = NewProduct;
    type Patch = ProductPatch;
}

impl Fields for NewProduct {
    fn validate(&self) -> Result<(), ContentError> {
        validate_title(&self.title)
    }

    fn into_fields(self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("title", self.title.trim().to_owned().into()),
            ("description", self.description.into()),
            ("features", self.features.into()),
            ("icon", self.icon.into()),
            ("is_popular", self.is_popular.into()),
            ("is_active", self.is_active.into()),
            ("sort_order", self.sort_order.into()),
        ]
    }
}

impl Fields for ProductPatch {
    fn validate(&self) -> Result<(), ContentError> {
        validate_patch_title(self.title.as_ref())
    }

    fn into_fields(self) -> Vec<(&'static str, FieldValue)> {
        let mut out = Vec::new();
        patch_field(&mut out, "title", self.title.map(|t| t.trim().to_owned()));
        patch_field(&mut out, "description", self.description);
        patch_field(&mut out, "features", self.features);
        patch_field(&mut out, "icon", self.icon);
        patch_field(&mut out, "is_popular", self.is_popular);
        patch_field(&mut out, "is_active", self.is_active);
        patch_field(&mut out, "sort_order", self.sort_order);
        out
    }
}

// =============================================================================
// MENU SETTINGS
// =============================================================================

/// Navigation entry. Rows are seeded by migration; admins only toggle and
/// relabel them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MenuSetting {
    pub id: Uuid,
    pub menu_key: String,
    pub label: String,
    pub path: String,
    pub sort_order: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenuPatch {
    pub label: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl Record for MenuSetting {
    const TABLE: &'static str = "menu_settings";
    const KEY: &'static str = "menu-settings";
    const COLUMNS: &'static str = "id, menu_key, label, path, sort_order, is_active";
}

impl Collection for MenuSetting {
    type Draft = NewMenuSetting;
    type Patch = MenuPatch;
}

/// Only used by seeding and tests; the admin API exposes no menu creation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMenuSetting {
    pub menu_key: String,
    pub label: String,
    pub path: String,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Fields for NewMenuSetting {
    fn validate(&self) -> Result<(), ContentError> {
        require_text("menu_key", &self.menu_key)?;
        require_text("label", &self.label)?;
        if !self.path.starts_with('/') {
            return Err(ContentError::Invalid { field: "path", reason: "must start with /" });
        }
        Ok(())
    }

    fn into_fields(self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("menu_key", self.menu_key.into()),
            ("label", self.label.into()),
            ("path", self.path.into()),
            ("sort_order", self.sort_order.into()),
            ("is_active", self.is_active.into()),
        ]
    }
}

impl Fields for MenuPatch {
    fn validate(&self) -> Result<(), ContentError> {
        self.label.as_deref().map_or(Ok(()), |l| require_text("label", l))
    }

    fn into_fields(self) -> Vec<(&'static str, FieldValue)> {
        let mut out = Vec::new();
        patch_field(&mut out, "label", self.label.map(|l| l.trim().to_owned()));
        patch_field(&mut out, "sort_order", self.sort_order);
        patch_field(&mut out, "is_active", self.is_active);
        out
    }
}

// =============================================================================
// CONTACT MESSAGES
// =============================================================================

/// Message left through the public contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub contact: String,
    pub message: String,
    pub is_read: bool,
    /// RFC 3339 UTC timestamp.
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewContactMessage {
    pub name: String,
    /// Email address or WhatsApp number.
    pub contact: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactMessagePatch {
    pub is_read: Option<bool>,
}

impl Record for ContactMessage {
    const TABLE: &'static str = "contact_messages";
    const KEY: &'static str = "contact-messages";
    const COLUMNS: &'static str = r#"id, name, contact, message, is_read,
        to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at"#;
}

impl Collection for ContactMessage {
    const ORDER_BY: &'static str = "contact_messages.created_at DESC, id ASC";
    const ACTIVE_COLUMN: Option<&'static str> = None;
    type Draft = NewContactMessage;
    type Patch = ContactMessagePatch;
}

impl Fields for NewContactMessage {
    fn validate(&self) -> Result<(), ContentError> {
        require_text("name", &self.name)?;
        require_max_len("name", &self.name, MAX_CONTACT_NAME_LEN)?;
        require_text("contact", &self.contact)?;
        require_max_len("contact", &self.contact, MAX_CONTACT_LEN)?;
        require_text("message", &self.message)?;
        require_max_len("message", &self.message, MAX_MESSAGE_LEN)
    }

    fn into_fields(self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("name", self.name.trim().to_owned().into()),
            ("contact", self.contact.trim().to_owned().into()),
            ("message", self.message.trim().to_owned().into()),
        ]
    }
}

impl Fields for ContactMessagePatch {
    fn into_fields(self) -> Vec<(&'static str, FieldValue)> {
        let mut out = Vec::new();
        patch_field(&mut out, "is_read", self.is_read);
        out
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
#[path = "records_test.rs"]
mod tests;
