pub mod agent;
pub mod role;
pub mod tasks;

pub use agent::Agent;
pub use role::{JobKind, Role};
pub use tasks::{Task, TaskQueue};
