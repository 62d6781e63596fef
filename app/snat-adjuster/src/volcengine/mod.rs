pub mod client;
pub mod model;
pub mod signer;

pub use client::VolcengineNatGateway;

pub const NATGATEWAY_SERVICE: &str = "natgateway";
pub const API_VERSION: &str = "2020-04-01";

/// upper bound of entry IDs per DescribeSnatEntries call
pub const DESCRIBE_PAGE_SIZE: usize = 100;
pub const REQUEST_TIMEOUT_SECS: u64 = 30;
