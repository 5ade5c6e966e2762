//! Process wiring: settings in, listening server out

pub mod app;

pub use app::Application;
