pub mod config;
pub mod core;
pub mod domain;
pub mod suites;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::FileConfig;
pub use crate::core::{build_suites, SuiteRunner};
pub use domain::model::{StepLog, StepReport, SuiteReport};
pub use domain::ports::{ConnectionSettings, SmokeSuite};
pub use utils::error::{Result, SmokeError};
