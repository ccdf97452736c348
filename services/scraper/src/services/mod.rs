pub mod dashboard;
pub mod orchestrator;

pub use dashboard::Dashboard;
pub use orchestrator::{JobHandle, JobOrchestrator};
