pub mod config;
pub mod ledger;
pub mod lint;
pub mod registry;
pub mod workflow;
