pub mod describer;
pub mod metrics;
pub mod providers;

pub use describer::Describer;
pub use metrics::{get_metrics, init_metrics};
