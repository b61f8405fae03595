//! # Dinemap Protocol
//!
//! Restaurant records and the live-update wire protocol for Dinemap.
//!
//! This crate provides:
//! - `RestaurantRecord` and its menu types
//! - `RestaurantDraft` for creating restaurants
//! - `SyncEvent`, the socket envelope (`initial_data`, `status_update`,
//!   `restaurant_added`)
//! - `RestaurantFilter`, the list query predicate
//! - HTTP response bodies shared by server and clients
//!
//! This is a pure protocol crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod draft;
mod error;
mod event;
mod filter;
mod messages;
mod record;

pub use draft::{DraftError, RestaurantDraft};
pub use error::{ProtocolError, ProtocolResult};
pub use event::SyncEvent;
pub use filter::RestaurantFilter;
pub use messages::{ErrorBody, HealthResponse, MenuResponse};
pub use record::{MenuCategory, MenuItem, RestaurantId, RestaurantRecord, DEFAULT_PRICE_RANGE};
