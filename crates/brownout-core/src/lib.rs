pub mod boundary;
pub mod config;
pub mod error;
pub mod types;

pub use boundary::{ObservationSource, TacticExecutor};
pub use config::BrownoutConfig;
pub use error::{ConfigError, ConfigResult};
pub use types::*;
