pub mod account;
pub mod base_client;
pub mod encoding;
pub mod errors;
pub mod fees;
pub mod indexer_client;
pub mod key_store;
pub mod operations;
pub mod rpc_client;
pub mod signing_client;

/// default offset from the chain head used as the operation branch, so that
/// small reorganisations of the head do not invalidate the operation.
pub const HEAD_BRANCH_OFFSET: u32 = 54;

pub const MAIN_CHAIN: &str = "main";
