//! Read-only access to the workflow resource-management API.
//!
//! Three calls are needed to inspect a workflow: fetch its details, list its
//! runs, and list the actions of one run. They sit behind [`ResourceApi`] so
//! the drivers can run against [`ArmClient`] in production and
//! `MockResourceApi` in tests.

pub mod api;
pub mod arm;
pub mod error;
#[cfg(any(test, feature = "testing"))]
pub mod mock;

pub use api::{ResourceApi, SharedResourceApi};
pub use arm::{ArmClient, ArmConfig};
pub use error::{ResourceError, Result};
#[cfg(any(test, feature = "testing"))]
pub use mock::{MockCall, MockResourceApi};
