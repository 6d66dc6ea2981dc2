pub mod runner;

pub use crate::domain::model::{StepLog, StepReport, SuiteReport};
pub use crate::domain::ports::{ConnectionSettings, SmokeSuite};
pub use crate::utils::error::Result;
pub use runner::{build_suites, SuiteRunner};
