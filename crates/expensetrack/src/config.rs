use std::{env, fmt, str::FromStr};

use expensetrack_core::expense::{DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use thiserror::Error;

/// Errors raised while reading configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown storage backend '{0}' (expected 'memory' or 'dynamodb')")]
    UnknownStorage(String),
}

/// Storage backend selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// Process-local store. Data is lost on exit.
    #[default]
    Memory,
    /// AWS DynamoDB. Requires the `dynamodb` feature.
    DynamoDb,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "inmemory" => Ok(Self::Memory),
            "dynamodb" => Ok(Self::DynamoDb),
            other => Err(ConfigError::UnknownStorage(other.to_string())),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => f.write_str("memory"),
            Self::DynamoDb => f.write_str("dynamodb"),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Storage backend (default: memory)
    pub storage: StorageBackend,
    /// DynamoDB table name (default: "expenses")
    pub table_name: String,
    /// Name of the expense-ID index (default: "GSI1")
    pub gsi1_name: String,
    /// Custom DynamoDB endpoint, e.g. DynamoDB Local
    pub aws_endpoint_url: Option<String>,
    /// AWS region (default: "us-east-1")
    pub aws_region: String,
    /// Page size used when a listing does not ask for one (default: 50)
    pub list_default_limit: u32,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `EXPENSETRACK_STORAGE` - `memory` or `dynamodb` (default: memory)
    /// - `EXPENSES_TABLE_NAME` - DynamoDB table name (default: "expenses")
    /// - `EXPENSES_GSI1_NAME` - Expense-ID index name (default: "GSI1")
    /// - `AWS_ENDPOINT_URL` - Custom DynamoDB endpoint (default: unset)
    /// - `AWS_REGION` - AWS region (default: "us-east-1")
    /// - `LIST_DEFAULT_LIMIT` - Default page size, clamped to 1..=100 (default: 50)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage = match lookup("EXPENSETRACK_STORAGE") {
            Some(value) => value.parse()?,
            None => StorageBackend::default(),
        };

        Ok(Self {
            storage,
            table_name: lookup("EXPENSES_TABLE_NAME").unwrap_or_else(|| "expenses".to_string()),
            gsi1_name: lookup("EXPENSES_GSI1_NAME").unwrap_or_else(|| "GSI1".to_string()),
            aws_endpoint_url: lookup("AWS_ENDPOINT_URL").filter(|v| !v.is_empty()),
            aws_region: lookup("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            list_default_limit: lookup("LIST_DEFAULT_LIMIT")
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(DEFAULT_LIST_LIMIT)
                .clamp(1, MAX_LIST_LIMIT),
        })
    }

    /// Returns a display string for the target store.
    pub fn target_display(&self) -> String {
        match (self.storage, &self.aws_endpoint_url) {
            (StorageBackend::Memory, _) => "in-memory store".to_string(),
            (StorageBackend::DynamoDb, Some(url)) => {
                format!("Local DynamoDB ({}, table {})", url, self.table_name)
            }
            (StorageBackend::DynamoDb, None) => format!(
                "AWS DynamoDB (region: {}, table {})",
                self.aws_region, self.table_name
            ),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageBackend::Memory,
            table_name: "expenses".to_string(),
            gsi1_name: "GSI1".to_string(),
            aws_endpoint_url: None,
            aws_region: "us-east-1".to_string(),
            list_default_limit: DEFAULT_LIST_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_values() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.table_name, "expenses");
        assert_eq!(config.gsi1_name, "GSI1");
        assert_eq!(config.list_default_limit, 50);
    }

    #[test]
    fn test_dynamodb_settings() {
        let config = Config::from_lookup(lookup_from(&[
            ("EXPENSETRACK_STORAGE", "DynamoDB"),
            ("EXPENSES_TABLE_NAME", "expenses-dev"),
            ("AWS_ENDPOINT_URL", "http://localhost:8000"),
            ("AWS_REGION", "ap-south-1"),
        ]))
        .unwrap();

        assert_eq!(config.storage, StorageBackend::DynamoDb);
        assert_eq!(config.table_name, "expenses-dev");
        assert_eq!(
            config.aws_endpoint_url.as_deref(),
            Some("http://localhost:8000")
        );
        assert_eq!(config.aws_region, "ap-south-1");
        assert_eq!(
            config.target_display(),
            "Local DynamoDB (http://localhost:8000, table expenses-dev)"
        );
    }

    #[test]
    fn test_unknown_storage_is_rejected() {
        let result = Config::from_lookup(lookup_from(&[("EXPENSETRACK_STORAGE", "sqlite")]));
        assert_eq!(result, Err(ConfigError::UnknownStorage("sqlite".to_string())));
    }

    #[test]
    fn test_list_limit_is_clamped() {
        let config = Config::from_lookup(lookup_from(&[("LIST_DEFAULT_LIMIT", "500")])).unwrap();
        assert_eq!(config.list_default_limit, 100);

        let config = Config::from_lookup(lookup_from(&[("LIST_DEFAULT_LIMIT", "0")])).unwrap();
        assert_eq!(config.list_default_limit, 1);

        let config = Config::from_lookup(lookup_from(&[("LIST_DEFAULT_LIMIT", "ten")])).unwrap();
        assert_eq!(config.list_default_limit, 50);
    }
}
