use crate::domain::{
    topic_matches, BrokerTransport, IngestionConfig, PipelineState, ReadingIngestService,
    ReconnectBackoff, TransportEvent,
};
use common::domain::DomainResult;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, instrument, warn, Instrument, Span};

/// Long-running broker → store pipeline
///
/// Owns the broker connection lifecycle. Each session subscribes as soon as the broker
/// accepts the connection; a lost session is reopened after a backoff delay, forever,
/// until shutdown. Bad messages and store outages are logged and the message dropped,
/// never ending the session.
pub struct IngestionPipeline {
    transport: Arc<dyn BrokerTransport>,
    ingest_service: Arc<ReadingIngestService>,
    config: IngestionConfig,
    state: watch::Sender<PipelineState>,
}

impl IngestionPipeline {
    pub fn new(
        transport: Arc<dyn BrokerTransport>,
        ingest_service: Arc<ReadingIngestService>,
        config: IngestionConfig,
    ) -> Self {
        let (state, _) = watch::channel(PipelineState::Disconnected);
        Self {
            transport,
            ingest_service,
            config,
            state,
        }
    }

    pub fn state(&self) -> PipelineState {
        *self.state.borrow()
    }

    /// Observe state transitions. Rapid transitions may be coalesced.
    pub fn watch_state(&self) -> watch::Receiver<PipelineState> {
        self.state.subscribe()
    }

    /// Run until `shutdown` is cancelled
    ///
    /// Cancellation is observed between messages, so a reading being appended when
    /// shutdown starts is still written.
    #[instrument(name = "ingestion_pipeline", skip_all, fields(topic = %self.config.topic))]
    pub async fn run(&self, shutdown: CancellationToken) {
        info!("starting ingestion pipeline");
        let mut backoff = self.config.backoff();

        while !shutdown.is_cancelled() {
            self.set_state(PipelineState::Connecting);

            match self.run_session(&shutdown, &mut backoff).await {
                Ok(()) => break,
                Err(e) => {
                    self.set_state(PipelineState::Connecting);
                    let delay = backoff.next_delay();
                    warn!(error = %e, retry_in = ?delay, "broker session lost, reconnecting");

                    tokio::select! {
                        _ = shutdown.cancelled() => break,
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }

        self.set_state(PipelineState::Disconnected);
        info!("ingestion pipeline stopped");
    }

    /// One broker session. `Ok` means shutdown was requested.
    async fn run_session(
        &self,
        shutdown: &CancellationToken,
        backoff: &mut ReconnectBackoff,
    ) -> DomainResult<()> {
        let mut session = self.transport.open().await?;

        loop {
            let event = tokio::select! {
                _ = shutdown.cancelled() => None,
                event = session.poll() => Some(event),
            };

            let Some(event) = event else {
                debug!("shutdown signal received, closing broker session");
                session.close().await;
                return Ok(());
            };

            match event? {
                TransportEvent::Connected => {
                    info!("connected to broker");
                    session.subscribe(&self.config.topic).await?;
                    debug!(topic = %self.config.topic, "subscription requested");
                }
                TransportEvent::Subscribed => {
                    self.set_state(PipelineState::Subscribed);
                    backoff.reset();
                }
                TransportEvent::Message { topic, payload } => {
                    if self.state() == PipelineState::Subscribed {
                        self.set_state(PipelineState::Receiving);
                    }
                    self.handle_message(&topic, &payload).await;
                }
                TransportEvent::Other => {}
            }
        }
    }

    /// Process one delivered message in its own trace
    pub(crate) async fn handle_message(&self, topic: &str, payload: &[u8]) {
        let span = info_span!(
            parent: Span::none(),
            "telemetry_message",
            topic = %topic,
            payload_size = payload.len(),
        );

        async {
            if !topic_matches(&self.config.topic, topic) {
                debug!("message on unsubscribed topic, ignoring");
                return;
            }

            match self.ingest_service.ingest(payload).await {
                Ok(id) => debug!(id, "reading stored"),
                Err(e) if e.is_rejected_input() => {
                    warn!(error = %e, "discarding telemetry message");
                }
                Err(e) => {
                    error!(error = %e, "failed to store reading, message dropped");
                }
            }
        }
        .instrument(span)
        .await
    }

    fn set_state(&self, next: PipelineState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            info!(from = %previous, to = %next, "pipeline state changed");
        }
    }
}
