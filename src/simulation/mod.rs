pub mod colony;
pub mod events;
pub mod snapshot;
pub mod tick;

pub use colony::{ClickOutcome, Colony};
pub use events::{FailureCause, SimulationEvent};
pub use snapshot::ColonySnapshot;
pub use tick::{check_failure, run_simulation_tick};
