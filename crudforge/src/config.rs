use std::collections::HashMap;

use crate::errors::ApiError;

/// Name of the connection used when a seed run does not pick one.
pub const DEFAULT_CONNECTION: &str = "default";

/// Named database connections for the seeding pipeline.
///
/// An explicit value handed into [`SeedRunner::new`](crate::seeder::SeedRunner::new);
/// nothing here is ambient or process-global.
#[derive(Debug, Clone)]
pub struct DbConfig {
    connections: HashMap<String, String>,
    default_connection: String,
}

impl DbConfig {
    /// Config with a single connection registered under
    /// [`DEFAULT_CONNECTION`].
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        let mut connections = HashMap::new();
        connections.insert(DEFAULT_CONNECTION.to_string(), url.into());
        Self {
            connections,
            default_connection: DEFAULT_CONNECTION.to_string(),
        }
    }

    /// Add a named connection.
    #[must_use]
    pub fn with_connection(mut self, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.connections.insert(name.into(), url.into());
        self
    }

    /// Change which named connection is the default.
    #[must_use]
    pub fn default_to(mut self, name: impl Into<String>) -> Self {
        self.default_connection = name.into();
        self
    }

    #[must_use]
    pub fn default_connection(&self) -> &str {
        &self.default_connection
    }

    /// URL of a named connection, or of the default when `name` is `None`.
    ///
    /// # Errors
    ///
    /// Fails with a configuration error for an unknown name.
    pub fn url(&self, name: Option<&str>) -> Result<&str, ApiError> {
        let name = name.unwrap_or(&self.default_connection);
        self.connections
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| ApiError::configuration(format!("unknown database connection '{name}'")))
    }
}
