//! Database location.

use serde::{Deserialize, Serialize};

/// In-memory database marker accepted by libSQL.
pub const IN_MEMORY: &str = ":memory:";

fn default_path() -> String {
    ".tenet/tenet.db".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Path to the local libSQL file, or `:memory:`.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

impl DatabaseConfig {
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.path == IN_MEMORY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_into_dot_tenet() {
        let config = DatabaseConfig::default();
        assert_eq!(config.path, ".tenet/tenet.db");
        assert!(!config.is_in_memory());
    }

    #[test]
    fn memory_marker_is_recognised() {
        let config = DatabaseConfig {
            path: IN_MEMORY.to_string(),
        };
        assert!(config.is_in_memory());
    }
}
