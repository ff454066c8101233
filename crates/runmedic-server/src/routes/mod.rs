//! API routes.

pub mod health;
pub mod inspect;
pub mod orchestrations;

pub use health::{HealthResponse, health_routes};
pub use inspect::inspect_handler;
pub use orchestrations::{
    StartedResponse, orchestration_status_handler, start_orchestration_handler, status_path,
};
