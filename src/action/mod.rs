pub mod dto;
mod handler;
mod log;
mod memory;
mod research;

pub use handler::{DetectionLogRepository, ResearchExportPort, UserFeedbackRepository};
pub use log::TracingDetectionLog;
pub use memory::{
    InMemoryDetectionLog, InMemoryFeedbackRepository, InMemoryResearchExport, LoggedDetection,
};
pub use research::{HttpFeedbackRepository, HttpResearchExport, ResearchClient, SharedResearchClient};
