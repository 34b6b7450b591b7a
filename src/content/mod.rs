//! Content Module
//!
//! Portfolio content (projects, work history) read per locale from an
//! opaque [`ContentSource`] through the shared read-through cache.

mod key;
mod locale;
mod models;
mod service;
mod source;

pub use key::{ContentKey, Entity};
pub use locale::{Locale, UnsupportedLocale};
pub use models::{Company, ContentSnapshot, Project};
pub use service::PortfolioContent;
pub use source::ContentSource;
