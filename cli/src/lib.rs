pub mod logging;
pub mod scenario;
pub mod sim;

#[cfg(test)]
mod sim_tests;

pub use scenario::{ScenarioError, Step, StepInput};
pub use sim::{Report, Simulator};
