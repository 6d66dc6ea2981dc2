use crate::domain::model::StepLog;
use crate::utils::error::Result;
use async_trait::async_trait;

/// A smoke suite walks the fixed operation menu of one data store,
/// recording one step per operation. The first failing operation aborts
/// the walk; there is no retry.
#[async_trait]
pub trait SmokeSuite: Send + Sync {
    fn name(&self) -> &str;

    /// The operation menu, in execution order. Used by dry runs.
    fn operations(&self) -> Vec<&'static str>;

    async fn run(&self, log: &mut StepLog) -> Result<()>;
}

/// Connection targets for every suite. Implemented by the file config;
/// tests provide their own.
pub trait ConnectionSettings: Send + Sync {
    fn search_url(&self) -> &str;
    fn search_index(&self) -> &str;
    fn document_uri(&self) -> &str;
    fn document_database(&self) -> &str;
    fn document_collection(&self) -> &str;
    fn relational_dsn(&self) -> &str;
    fn relational_pool_size(&self) -> usize;
    fn keyvalue_url(&self) -> &str;
    fn keyvalue_channel(&self) -> &str;
}
