//! Static mod catalog and lookup helpers.
//!
//! The registry is the single source of truth for which mod files the
//! loader probes for, how paths map to categories, and which mods start
//! enabled or stay hidden from listings. Everything here is pure data and
//! pure functions; discovery, persistence, and execution live elsewhere.

pub mod catalog;

use catalog::{DATABASE_MODS, DEFAULT_ENABLED, HIDDEN_MODS, OFFICIAL_MODS, SUPER_MODS};

/// Category a mod path belongs to, derived from its directory prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Database,
    Official,
    Super,
    User,
    Unknown,
}

impl Category {
    /// Directory prefix for this category inside the mod pack, if any.
    pub fn prefix(self) -> Option<&'static str> {
        match self {
            Category::Database => Some("database/"),
            Category::Official => Some("Official Mods/"),
            Category::Super => Some("Super Mods/"),
            Category::User => Some("User Mods/"),
            Category::Unknown => None,
        }
    }

    /// Short lowercase label, matching the wire/storage spelling.
    pub fn label(self) -> &'static str {
        match self {
            Category::Database => "database",
            Category::Official => "official",
            Category::Super => "super",
            Category::User => "user",
            Category::Unknown => "unknown",
        }
    }
}

/// The full catalog, grouped by category with source order preserved.
#[derive(Debug, Clone)]
pub struct CatalogByCategory {
    pub database: Vec<String>,
    pub official: Vec<String>,
    pub super_mods: Vec<String>,
}

/// All known mod paths grouped by category, each entry a full
/// category-prefixed path, in catalog order.
pub fn all_mods_by_category() -> CatalogByCategory {
    let prefixed = |category: Category, files: &[&str]| -> Vec<String> {
        let prefix = category.prefix().unwrap_or_default();
        files.iter().map(|f| format!("{prefix}{f}")).collect()
    };
    CatalogByCategory {
        database: prefixed(Category::Database, DATABASE_MODS),
        official: prefixed(Category::Official, OFFICIAL_MODS),
        super_mods: prefixed(Category::Super, SUPER_MODS),
    }
}

/// Flat candidate list for discovery probing, catalog order preserved
/// (database, then official, then super).
pub fn candidate_paths() -> Vec<String> {
    let cats = all_mods_by_category();
    let mut all = cats.database;
    all.extend(cats.official);
    all.extend(cats.super_mods);
    all
}

/// Whether a full mod path is on the default-enabled allowlist.
pub fn is_default_enabled(path: &str) -> bool {
    DEFAULT_ENABLED.contains(&path)
}

/// Whether a mod name is hidden from user-facing listings.
pub fn is_hidden_mod(name: &str) -> bool {
    HIDDEN_MODS.contains(&name)
}

/// Category for a mod path, by directory prefix. Paths outside the known
/// category directories are `Unknown`.
pub fn category_of(path: &str) -> Category {
    if path.starts_with("database/") {
        Category::Database
    } else if path.starts_with("Official Mods/") {
        Category::Official
    } else if path.starts_with("Super Mods/") {
        Category::Super
    } else if path.starts_with("User Mods/") {
        Category::User
    } else {
        Category::Unknown
    }
}

/// Human-readable name for a mod path: basename, `.js` stripped,
/// underscores replaced with spaces.
pub fn display_name(path: &str) -> String {
    let base = path.rsplit('/').next().unwrap_or(path);
    let base = base.strip_suffix(".js").unwrap_or(base);
    base.replace('_', " ")
}
