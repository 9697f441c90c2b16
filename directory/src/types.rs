//! Wire types and URL layouts of region directory services

use serde::{Deserialize, Serialize};

/// A top-level region as returned by the directory
///
/// The IBGE API names the field `sigla`; the generic layout uses `code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRecord {
    /// Short region code, e.g. `SP`
    #[serde(alias = "sigla")]
    pub code: String,
}

/// A sub-region as returned by the directory
///
/// The IBGE API names the field `nome`; the generic layout uses `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubRegionRecord {
    /// Display name, e.g. `Campinas`
    #[serde(alias = "nome")]
    pub name: String,
}

/// URL layout of a directory service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectoryLayout {
    /// `GET /regions?orderBy=name` and `GET /regions/{code}/subregions?orderBy=name`
    Generic,
    /// `GET /localidades/estados?orderBy=nome` and
    /// `GET /localidades/estados/{code}/municipios?orderBy=nome`
    #[default]
    Ibge,
}

impl DirectoryLayout {
    /// Parse a layout name (`generic` or `ibge`, case-insensitive)
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "generic" => Some(Self::Generic),
            "ibge" => Some(Self::Ibge),
            _ => None,
        }
    }

    /// Path segments of the region list endpoint
    #[must_use]
    pub const fn region_segments(self) -> &'static [&'static str] {
        match self {
            Self::Generic => &["regions"],
            Self::Ibge => &["localidades", "estados"],
        }
    }

    /// Path segments of the sub-region list endpoint for `code`
    #[must_use]
    pub fn sub_region_segments(self, code: &str) -> Vec<&str> {
        match self {
            Self::Generic => vec!["regions", code, "subregions"],
            Self::Ibge => vec!["localidades", "estados", code, "municipios"],
        }
    }

    /// Value of the `orderBy` query parameter
    #[must_use]
    pub const fn order_by(self) -> &'static str {
        match self {
            Self::Generic => "name",
            Self::Ibge => "nome",
        }
    }
}

impl std::fmt::Display for DirectoryLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Generic => write!(f, "generic"),
            Self::Ibge => write!(f, "ibge"),
        }
    }
}
