// App module for outlet-map
// Holds session state and the glue between input, background work and the map

pub mod actions;
pub mod camera;
pub mod input;
pub mod state;

pub use actions::AppEvent;
pub use input::handle_input;
pub use state::{App, Focus};
