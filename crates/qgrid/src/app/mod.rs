#[allow(clippy::module_inception)]
mod app;
mod state;

pub use app::{App, AppHost};
pub use state::Focus;
