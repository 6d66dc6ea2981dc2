pub mod file_config;

pub use file_config::FileConfig;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "store-smoke")]
#[command(about = "Walks the call surface of each configured data-store client")]
pub struct CliConfig {
    /// Path to a TOML config file; defaults apply when omitted
    #[arg(short, long)]
    pub config: Option<String>,

    /// Run only these suites (comma-separated names)
    #[arg(long)]
    pub only: Option<String>,

    /// Skip these suites (comma-separated names)
    #[arg(long)]
    pub skip: Option<String>,

    /// Override the search engine URL
    #[arg(long)]
    pub search_url: Option<String>,

    /// Override the document database URI
    #[arg(long)]
    pub document_uri: Option<String>,

    /// Override the relational DSN
    #[arg(long)]
    pub relational_dsn: Option<String>,

    /// Override the key-value store URL
    #[arg(long)]
    pub keyvalue_url: Option<String>,

    /// Show the execution plan without touching any store
    #[arg(long)]
    pub dry_run: bool,

    /// Report process CPU/memory after the run
    #[arg(long)]
    pub monitor: bool,

    /// Execution ID for this run
    #[arg(long)]
    pub execution_id: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit log lines as JSON
    #[arg(long)]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// CLI flags win over file values.
    pub fn apply_overrides(&self, config: &mut FileConfig) {
        if let Some(url) = &self.search_url {
            config.search.url = url.clone();
        }
        if let Some(uri) = &self.document_uri {
            config.document.uri = uri.clone();
        }
        if let Some(dsn) = &self.relational_dsn {
            config.relational.dsn = dsn.clone();
        }
        if let Some(url) = &self.keyvalue_url {
            config.keyvalue.url = url.clone();
        }
        if self.monitor {
            config.monitoring.enabled = true;
        }
    }

    /// Parse a comma-separated suite list ("search,keyvalue").
    pub fn parse_suite_list(value: &Option<String>) -> Vec<String> {
        value
            .as_deref()
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_apply_overrides() {
        let cli = CliConfig::parse_from([
            "store-smoke",
            "--search-url",
            "http://other:9200",
            "--monitor",
        ]);
        let mut config = FileConfig::default();

        cli.apply_overrides(&mut config);

        assert_eq!(config.search.url, "http://other:9200");
        assert!(config.monitoring.enabled);
        // Untouched values keep their defaults
        assert_eq!(config.keyvalue.url, "redis://localhost:6379");
    }

    #[test]
    fn test_parse_suite_list() {
        let list = CliConfig::parse_suite_list(&Some("search, keyvalue,,".to_string()));
        assert_eq!(list, vec!["search".to_string(), "keyvalue".to_string()]);
        assert!(CliConfig::parse_suite_list(&None).is_empty());
    }
}
