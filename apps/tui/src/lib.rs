// Export our modules for use in binaries and tests
pub mod api;
pub mod chat;
pub mod config;
pub mod domain;
pub mod error;
pub mod geo;
pub mod location;
pub mod selection;
pub mod store;
pub mod viewport;

pub use chat::ChatSession;
pub use domain::{ChatMessage, ChatRole, Outlet, OutletId};
pub use geo::{BoundingBox, GeoPoint};
pub use selection::SelectionController;
pub use store::OutletStore;
pub use viewport::{CameraCommand, MapSurface, ViewportController};
