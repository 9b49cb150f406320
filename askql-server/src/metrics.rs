//! Prometheus metrics for answered questions and startup state.

use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::registry::Registry;
use std::sync::Arc;

use askql_pipeline::ResponseStatus;

#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct StatusLabel(pub &'static str);

impl prometheus_client::encoding::EncodeLabelSet for StatusLabel {
    fn encode(
        &self,
        mut encoder: prometheus_client::encoding::LabelSetEncoder,
    ) -> Result<(), std::fmt::Error> {
        use prometheus_client::encoding::EncodeLabel;
        ("status", self.0).encode(encoder.encode_label())?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct ServerMetrics {
    pub questions: Family<StatusLabel, Counter>,
    pub tokens_used: Counter,
    pub initialized: Gauge,
    pub registry: Arc<Registry>,
}

impl ServerMetrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let questions = Family::<StatusLabel, Counter>::default();
        registry.register(
            "askql_questions",
            "Questions answered by envelope status",
            questions.clone(),
        );

        let tokens_used = Counter::default();
        registry.register(
            "askql_tokens_used",
            "Tokens accounted across all answered questions",
            tokens_used.clone(),
        );

        let initialized = Gauge::default();
        registry.register(
            "askql_pipeline_initialized",
            "1 when the pipeline initialized successfully, 0 when degraded",
            initialized.clone(),
        );

        Self {
            questions,
            tokens_used,
            initialized,
            registry: Arc::new(registry),
        }
    }

    pub fn record_answer(&self, status: ResponseStatus, tokens_used: usize) {
        let label = match status {
            ResponseStatus::Success => "success",
            ResponseStatus::Error => "error",
        };
        self.questions.get_or_create(&StatusLabel(label)).inc();
        self.tokens_used.inc_by(tokens_used as u64);
    }

    /// Encode all metrics as Prometheus text format.
    pub fn encode(&self) -> String {
        let mut buf = String::new();
        if let Err(e) = encode(&mut buf, &self.registry) {
            tracing::warn!("Failed to encode metrics: {}", e);
        }
        buf
    }
}
