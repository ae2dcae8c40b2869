//! Store Model

use serde::{Deserialize, Serialize};

/// Store entity (one restaurant tenant)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Store {
    pub id: i64,
    pub name: String,
    /// Globally unique routing key (`/{slug}?t=...`)
    pub slug: String,
    pub logo_url: Option<String>,
    pub created_at: i64,
}

/// Create store payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreCreate {
    pub name: String,
    pub slug: String,
    pub logo_url: Option<String>,
}

/// Update store payload
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreUpdate {
    pub name: Option<String>,
    pub logo_url: Option<String>,
}

/// Slugs are lowercase ASCII letters, digits and single dashes
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
