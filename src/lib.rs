pub mod axis;
pub mod column_set;
pub mod config;
pub mod dataset;
pub mod enumerator;
pub mod error;
pub mod explorer;
pub mod isolation_forest;
pub mod mapper;
pub mod ranker;
pub mod sample;
pub mod scorer;

pub use config::AnalysisConfig;
pub use dataset::Dataset;
pub use error::{ExplorerError, Result};
pub use explorer::{AnalysisReport, AnomalyExplorer, Selection};
