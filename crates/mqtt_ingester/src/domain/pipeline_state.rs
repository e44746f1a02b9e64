use std::fmt;

/// Connection lifecycle of the ingestion pipeline
///
/// `Disconnected → Connecting → Subscribed → Receiving`; any transport failure goes
/// back to `Connecting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Disconnected,
    Connecting,
    Subscribed,
    Receiving,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Disconnected => "disconnected",
            PipelineState::Connecting => "connecting",
            PipelineState::Subscribed => "subscribed",
            PipelineState::Receiving => "receiving",
        };
        f.write_str(name)
    }
}
