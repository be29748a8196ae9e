pub mod forms;
pub mod sequence;
pub mod state;
pub mod workflow;

pub use workflow::{WorkflowController, WorkflowSettings};
