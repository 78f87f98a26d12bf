pub mod admin_types;
pub mod device_types;
pub mod stats_types;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::FormError;

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Restaurant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Restaurant => "restaurant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Purchase,
    #[serde(alias = "top-up", alias = "topUp")]
    Topup,
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum YearOfStudy {
    Y1,
    Y2,
    Y3,
    Y4,
    #[serde(rename = "Y5+")]
    Y5Plus,
    #[serde(other)]
    Unknown,
}

impl YearOfStudy {
    pub const SELECTABLE: [YearOfStudy; 5] = [
        YearOfStudy::Y1,
        YearOfStudy::Y2,
        YearOfStudy::Y3,
        YearOfStudy::Y4,
        YearOfStudy::Y5Plus,
    ];

    pub fn label(self) -> &'static str {
        match self {
            YearOfStudy::Y1 => "Y1",
            YearOfStudy::Y2 => "Y2",
            YearOfStudy::Y3 => "Y3",
            YearOfStudy::Y4 => "Y4",
            YearOfStudy::Y5Plus => "Y5+",
            YearOfStudy::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for YearOfStudy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for YearOfStudy {
    type Err = FormError;

    /// Accepts `Y1`..`Y5+` as well as bare numbers, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        let normalized = normalized.strip_prefix('Y').unwrap_or(&normalized);
        match normalized {
            "1" => Ok(YearOfStudy::Y1),
            "2" => Ok(YearOfStudy::Y2),
            "3" => Ok(YearOfStudy::Y3),
            "4" => Ok(YearOfStudy::Y4),
            "5" | "5+" => Ok(YearOfStudy::Y5Plus),
            _ => Err(FormError::InvalidYear(s.to_string())),
        }
    }
}

/// A reference the backend sends either as a bare id or as a populated document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum EntityRef {
    Id(String),
    Embedded {
        #[serde(rename = "_id", default)]
        id: Option<String>,
        #[serde(default)]
        name: Option<String>,
    },
}

impl EntityRef {
    pub fn id(&self) -> Option<&str> {
        match self {
            EntityRef::Id(id) => Some(id),
            EntityRef::Embedded { id, .. } => id.as_deref(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            EntityRef::Id(_) => None,
            EntityRef::Embedded { name, .. } => name.as_deref(),
        }
    }

    /// Name when populated, the raw id otherwise.
    pub fn display(&self) -> Option<&str> {
        self.name().or_else(|| self.id())
    }
}
