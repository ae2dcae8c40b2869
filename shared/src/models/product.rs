//! Product Model

use serde::{Deserialize, Serialize};

/// Menu product entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub store_id: i64,
    pub name: String,
    pub price: f64,
    /// Free-text grouping shown as a menu tab
    pub category: String,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub created_at: i64,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub price: f64,
    pub category: String,
    pub image_url: Option<String>,
    pub description: Option<String>,
}

/// Partial product edit; existing orders keep their own snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub description: Option<String>,
}

/// Category label that matches every product
pub const ALL_CATEGORIES: &str = "All";

/// Menu browsing filter: category tab plus case-insensitive name search
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MenuFilter {
    /// `None` or [`ALL_CATEGORIES`] shows every category
    pub category: Option<String>,
    pub search: Option<String>,
}

impl MenuFilter {
    pub fn matches(&self, product: &Product) -> bool {
        let category_ok = match self.category.as_deref() {
            None | Some(ALL_CATEGORIES) => true,
            Some(c) => product.category == c,
        };
        let search_ok = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(q) => product.name.to_lowercase().contains(&q.to_lowercase()),
        };
        category_ok && search_ok
    }

    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        products.iter().filter(|p| self.matches(p)).collect()
    }
}

/// Distinct categories in first-seen order, prefixed with [`ALL_CATEGORIES`]
pub fn menu_categories(products: &[Product]) -> Vec<String> {
    let mut categories = vec![ALL_CATEGORIES.to_string()];
    for p in products {
        if !categories.iter().any(|c| c == &p.category) {
            categories.push(p.category.clone());
        }
    }
    categories
}
