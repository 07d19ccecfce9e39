/// Alert entity module
pub mod alert;
/// Metric sample entity module
pub mod metric_sample;
/// Pipeline run entity module
pub mod pipeline_run;
/// Monitored service entity module
pub mod service;

pub use alert::Entity as Alert;
pub use metric_sample::Entity as MetricSample;
pub use pipeline_run::Entity as PipelineRun;
pub use service::Entity as Service;
