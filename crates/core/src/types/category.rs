//! Product categories carried by the shop.

use serde::{Deserialize, Serialize};

/// Error returned when a category slug is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown product category: {0}")]
pub struct UnknownCategory(pub String);

/// Product category.
///
/// Serialized as kebab-case slugs (`red-wine`, `sparkling`, ...), which is
/// also the form used in catalog frontmatter and `?category=` filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductCategory {
    RedWine,
    WhiteWine,
    Rose,
    Sparkling,
    Fortified,
    Spirits,
}

impl ProductCategory {
    /// All categories in display order.
    pub const ALL: [Self; 6] = [
        Self::RedWine,
        Self::WhiteWine,
        Self::Rose,
        Self::Sparkling,
        Self::Fortified,
        Self::Spirits,
    ];

    /// URL slug for the category.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::RedWine => "red-wine",
            Self::WhiteWine => "white-wine",
            Self::Rose => "rose",
            Self::Sparkling => "sparkling",
            Self::Fortified => "fortified",
            Self::Spirits => "spirits",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::RedWine => "Red Wine",
            Self::WhiteWine => "White Wine",
            Self::Rose => "Rosé",
            Self::Sparkling => "Sparkling",
            Self::Fortified => "Fortified",
            Self::Spirits => "Spirits",
        }
    }

    /// Whether the category is a wine (as opposed to a distilled spirit).
    #[must_use]
    pub const fn is_wine(self) -> bool {
        !matches!(self, Self::Spirits)
    }
}

impl std::fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl std::str::FromStr for ProductCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.slug() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
