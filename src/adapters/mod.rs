// Adapters layer: concrete implementations for external systems (storage, ipfs cli, http gateway).

pub mod gateway;
pub mod ipfs_cli;
pub mod storage;
