//! Session state and the coordinator driving it

pub mod screen;
pub mod state;

pub use screen::AppCoordinator;
pub use state::{Phase, Session};
