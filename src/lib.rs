//! Two small lighting demos: a floor and four spheres lit by two shader
//! lights that can be toggled, moved and recolored at runtime.

pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod ui;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

pub use app::run;
pub use config::{DemoConfig, Variant};
pub use error::AppError;
