//! Cache keys for portfolio content.

use std::fmt;

use crate::content::Locale;

/// Kind of content row set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Projects,
    Companies,
}

impl Entity {
    pub fn as_str(self) -> &'static str {
        match self {
            Entity::Projects => "projects",
            Entity::Companies => "companies",
        }
    }
}

/// One (entity, locale) pair, rendered as `"{entity}-{locale}"`, e.g. `projects-en`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentKey {
    pub entity: Entity,
    pub locale: Locale,
}

impl ContentKey {
    pub fn new(entity: Entity, locale: Locale) -> Self {
        Self { entity, locale }
    }

    pub fn projects(locale: Locale) -> Self {
        Self::new(Entity::Projects, locale)
    }

    pub fn companies(locale: Locale) -> Self {
        Self::new(Entity::Companies, locale)
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.entity.as_str(), self.locale.as_tag())
    }
}
