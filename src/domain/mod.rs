//! Domain Layer
//!
//! Entities, value objects, the geo filter service and the ports it
//! depends on. Nothing here knows about HTTP or storage engines.

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;

pub use entities::{GeoMetadata, SiteScope};
pub use value_objects::{PathPattern, BLOCKED_COUNTRY_CODE};
