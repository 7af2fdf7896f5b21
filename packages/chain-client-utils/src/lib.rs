pub mod common;
pub mod tezos;
pub mod tezos_client;
