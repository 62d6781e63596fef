pub mod desired;
pub mod executor;
pub mod gateway;
pub mod helpers;
pub mod observed;
pub mod reconciler;
pub mod resources;

#[cfg(test)]
pub(crate) mod testing;

pub const ANNOTATION_PREFIX: &str = "adjust-snat-controller.alphagodzilla";

/// SNAT rules always bind a single pod address
pub const POD_CIDR_SUFFIX: &str = "/32";
