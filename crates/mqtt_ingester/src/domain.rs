mod broker;
mod ingestion_config;
mod ingestion_pipeline;
mod pipeline_state;
mod reading_ingest_service;
mod topic_filter;

pub use broker::*;
pub use ingestion_config::*;
pub use ingestion_pipeline::*;
pub use pipeline_state::*;
pub use reading_ingest_service::*;
pub use topic_filter::*;
