//! Bee Hive - tick-driven colony simulation
//!
//! Worker agents run private task queues against a fixed comb of sites while
//! the hive matches idle workers to pending requests and tracks the shared
//! honey and bee-bread ledger.

pub mod core;
pub mod entity;
pub mod hive;
pub mod simulation;
