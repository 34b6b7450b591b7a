//! Portfolio content rows and their cached form.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::content::Locale;

/// A showcased project (row of the `projects` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// Where the project lives (repository or deployed site)
    pub link: String,
    /// Preview image URL
    pub picture: String,
    pub lang: Locale,
}

/// A work history position (row of the `companies` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: i64,
    /// Role held
    pub title: String,
    pub client: String,
    pub start: NaiveDate,
    /// None while the position is current
    pub end: Option<NaiveDate>,
    /// Highlights, in display order
    #[serde(default)]
    pub items: Vec<String>,
    pub lang: Locale,
}

impl Company {
    pub fn is_current(&self) -> bool {
        self.end.is_none()
    }

    /// Display order: current positions first, then by end date, most recent first.
    pub fn timeline_order(a: &Company, b: &Company) -> Ordering {
        match (a.end, b.end) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a_end), Some(b_end)) => b_end.cmp(&a_end),
        }
    }
}

/// What the content service keeps in the shared cache.
#[derive(Debug, Clone)]
pub enum ContentSnapshot {
    Projects(Arc<Vec<Project>>),
    Companies(Arc<Vec<Company>>),
}

impl ContentSnapshot {
    pub fn kind(&self) -> &'static str {
        match self {
            ContentSnapshot::Projects(_) => "projects",
            ContentSnapshot::Companies(_) => "companies",
        }
    }
}
