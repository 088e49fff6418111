pub mod controller;
pub mod ordering;
pub mod overview;
pub mod poller;
pub mod pricing;
pub mod pump_soon;
pub mod recency;
pub mod stats;
pub mod store;

pub use controller::{ControllerError, DashboardController, DashboardEvent, DashboardSettings, DashboardView};
