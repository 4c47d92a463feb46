//! Headless CMS access: the HTTP client and the adapters that turn its JSON
//! into view models.

pub mod client;
pub mod error;
pub mod hero;
pub mod items;
pub mod lenient;
pub mod media;
pub mod menu;
pub mod news;
pub mod urls;

pub use client::CmsClient;
pub use error::CmsError;
