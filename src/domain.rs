//! Domain module - Core business logic and entities
//!
//! This module contains the catalog entities, the query engine, display
//! pagination and page formatting, authorization, and the service ports that
//! the application layer depends on.
//!
//! Modern Rust module organization (Rust 2018+ style):
//! - Each module is its own file in the domain/ directory
//! - Public exports are defined here for convenience

pub mod auth;
pub mod catalog;
pub mod constants;
pub mod errors;
pub mod pagination;
pub mod presentation;
pub mod query;
pub mod services;

// Re-export commonly used items for convenience
pub use auth::{Actor, AuthError, AuthPolicy, Privilege};
pub use catalog::{CatalogDocument, CatalogEntry, Item, Labeled};
pub use errors::ShopError;
pub use presentation::{Page, PageKind};
pub use query::{CatalogStats, Hit, ItemType, QueryKind, QueryResult, Rarity, SortDirection};
pub use services::{CatalogSource, ChannelId, NotificationSink};
