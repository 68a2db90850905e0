mod loader;

pub use loader::{Config, QueryConfig, ReportConfig, ResolutionConfig};
