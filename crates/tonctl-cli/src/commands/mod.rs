//! Command handlers: orchestration over the contract, keystore and
//! provider crates.

pub mod bridge;
pub mod common;
pub mod example;
pub mod lottery;
pub mod wallet;
