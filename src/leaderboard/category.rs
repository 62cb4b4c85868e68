//! Game categories and their storage names.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Game categories that own an independent result collection.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// `code-rush`
    #[serde(alias = "coderush")]
    CodeRush,
    /// `tech-picto`
    #[serde(alias = "techpicto")]
    TechPicto,
    /// `code-debugging`
    #[serde(alias = "codedebugging")]
    CodeDebugging,
    /// `word-hunt`
    #[serde(alias = "wordhunt")]
    WordHunt,
}

impl Category {
    /// Every category in the order the admin console lists them.
    pub const ALL: [Category; 4] = [
        Category::CodeRush,
        Category::TechPicto,
        Category::CodeDebugging,
        Category::WordHunt,
    ];

    /// Public identifier used in URLs and payloads.
    pub fn slug(self) -> &'static str {
        match self {
            Category::CodeRush => "code-rush",
            Category::TechPicto => "tech-picto",
            Category::CodeDebugging => "code-debugging",
            Category::WordHunt => "word-hunt",
        }
    }

    /// Compact key the game clients used when the collections were created.
    pub fn store_key(self) -> &'static str {
        match self {
            Category::CodeRush => "coderush",
            Category::TechPicto => "techpicto",
            Category::CodeDebugging => "codedebugging",
            Category::WordHunt => "wordhunt",
        }
    }

    /// Name of the document collection holding this category's results.
    pub fn collection_name(self) -> String {
        format!("{}_results", self.store_key())
    }

    /// Human readable label shown on the category tabs.
    pub fn label(self) -> &'static str {
        match self {
            Category::CodeRush => "Code Rush",
            Category::TechPicto => "Tech Picto",
            Category::CodeDebugging => "Code Debugging",
            Category::WordHunt => "Word Hunt",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}
