mod app;
mod components;
mod theme;
mod view;

pub use app::*;
pub use components::*;
pub use theme::*;
pub use view::*;
