pub mod context_fields;
pub mod job_tracer;
pub mod metrics_collector;
pub mod structured_logger;
pub mod telemetry_setup;

pub use context_fields::ContextFields;
pub use job_tracer::JobTracer;
pub use metrics_collector::JobMetrics;
pub use structured_logger::StructuredLogger;
pub use telemetry_setup::init_structured_logging;
