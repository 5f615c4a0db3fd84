use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};
use uuid::Uuid;

/// Visual theme of a package card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageTheme {
    #[default]
    White,
    Teal,
    Periwinkle,
}

/// Display classes a theme expands to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccentStyle {
    pub card: &'static str,
    pub button: &'static str,
    pub badge: &'static str,
    pub text: &'static str,
}

impl PackageTheme {
    pub const ALL: [PackageTheme; 3] = [
        PackageTheme::White,
        PackageTheme::Teal,
        PackageTheme::Periwinkle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PackageTheme::White => "white",
            PackageTheme::Teal => "teal",
            PackageTheme::Periwinkle => "periwinkle",
        }
    }

    pub fn accent(self) -> AccentStyle {
        match self {
            PackageTheme::White => AccentStyle {
                card: "bg-white border border-slate-200",
                button: "bg-slate-900 text-white hover:bg-slate-700",
                badge: "bg-slate-100 text-slate-700",
                text: "text-slate-900",
            },
            PackageTheme::Teal => AccentStyle {
                card: "bg-teal-600 border border-teal-700",
                button: "bg-white text-teal-700 hover:bg-teal-50",
                badge: "bg-teal-500 text-white",
                text: "text-white",
            },
            PackageTheme::Periwinkle => AccentStyle {
                card: "bg-indigo-300 border border-indigo-400",
                button: "bg-indigo-900 text-white hover:bg-indigo-700",
                badge: "bg-indigo-100 text-indigo-900",
                text: "text-indigo-950",
            },
        }
    }
}

impl fmt::Display for PackageTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageTheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PackageTheme::ALL
            .into_iter()
            .find(|theme| theme.as_str() == s)
            .ok_or_else(|| format!("unknown package theme: {}", s))
    }
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Package {
    pub id: Uuid,
    pub name: String,
    /// Display string, e.g. "$1,299".
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub color: PackageTheme,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Package {
    pub fn accent(&self) -> AccentStyle {
        self.color.accent()
    }
}

/// A package as shown on the site: the record plus its accent bundle.
#[derive(Debug, Clone, Serialize)]
pub struct PackageCard {
    #[serde(flatten)]
    pub package: Package,
    pub accent: AccentStyle,
}

impl From<Package> for PackageCard {
    fn from(package: Package) -> Self {
        let accent = package.accent();
        Self { package, accent }
    }
}

/// Writable package fields, as stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PackageInput {
    pub name: String,
    pub price: String,
    pub color: PackageTheme,
    pub features: Vec<String>,
}

/// The admin form: features arrive as one newline-delimited text block.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PackageDraft {
    pub name: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub color: PackageTheme,
    #[serde(default)]
    pub features: String,
}

impl PackageDraft {
    pub fn into_input(self) -> PackageInput {
        PackageInput {
            features: parse_features(&self.features),
            name: self.name,
            price: self.price,
            color: self.color,
        }
    }
}

impl From<&Package> for PackageDraft {
    fn from(package: &Package) -> Self {
        Self {
            name: package.name.clone(),
            price: package.price.clone(),
            color: package.color,
            features: package.features.join("\n"),
        }
    }
}

/// Splits a feature block into lines, trimming each and dropping blanks.
pub fn parse_features(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
