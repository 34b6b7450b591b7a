//! Supported content locales.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A locale the portfolio content is published in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en")]
    En,
    #[serde(rename = "pt-BR")]
    PtBr,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported locale: {0}")]
pub struct UnsupportedLocale(pub String);

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::PtBr];

    /// BCP 47 tag, as stored in the `lang` column.
    pub fn as_tag(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::PtBr => "pt-BR",
        }
    }

    /// Best supported match for `tag`, falling back to English.
    ///
    /// Region subtags other than `pt-BR` are ignored (`en-GB` is `en`, `pt-PT` is `pt-BR`).
    pub fn negotiate(tag: &str) -> Locale {
        tag.parse().unwrap_or_else(|_| {
            let primary = tag.split(['-', '_']).next().unwrap_or_default();
            primary.parse().unwrap_or_default()
        })
    }
}

impl FromStr for Locale {
    type Err = UnsupportedLocale;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let normalized = tag.trim().replace('_', "-").to_ascii_lowercase();
        match normalized.as_str() {
            "en" => Ok(Locale::En),
            "pt" | "pt-br" => Ok(Locale::PtBr),
            _ => Err(UnsupportedLocale(tag.to_string())),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}
