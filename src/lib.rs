pub mod app;
pub mod braille;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod map;
pub mod report;
pub mod selector;
pub mod stats;
pub mod ui;

#[cfg(test)]
mod testdata;

pub use config::{AreaMode, Config, Settings, ShareBasis, Source};
pub use dashboard::{build, Dashboard, Outcome};
pub use data::{load, Tables};
pub use error::DashboardError;
pub use selector::Selection;
