/// edge flows and node deficits
mod manager;
pub use manager::FlowManager;

/// feasible starting flow
mod initialiser;
pub use initialiser::{FlowInitialiser, InitialFlow};

/// minimum flow and its path cover
mod min_flow;
pub use min_flow::MinFlowCalculator;
