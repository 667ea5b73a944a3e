//! Built-in checks.
//!
//! Each check is stateless, reads what it needs from the [`OutputSet`], and
//! reports machine-readable evidence in its result details.
//!
//! [`OutputSet`]: crate::domain::OutputSet

pub mod cidr_validation;
pub mod route_table;
pub mod subnet_connectivity;

use std::sync::Arc;

pub use cidr_validation::CidrValidationCheck;
pub use route_table::RouteTableCheck;
pub use subnet_connectivity::SubnetConnectivityCheck;

use crate::application::ports::NetworkInventory;
use crate::application::services::check_registry::CheckRegistry;

/// Registry pre-loaded with every built-in check.
#[must_use]
pub fn default_registry<I: NetworkInventory + 'static>(inventory: Arc<I>) -> CheckRegistry {
    let mut registry = CheckRegistry::new();
    registry.register(CidrValidationCheck);
    registry.register(SubnetConnectivityCheck::new(Arc::clone(&inventory)));
    registry.register(RouteTableCheck::new(inventory));
    registry
}
