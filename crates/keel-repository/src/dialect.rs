//! SQL dialect differences the `Any` driver leaves to the caller.

use keel_core::{KeelError, KeelResult};
use std::fmt;

/// Database flavour behind an `Any` connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SqlDialect {
    /// MySQL / MariaDB.
    #[default]
    MySql,
    /// PostgreSQL.
    Postgres,
    /// SQLite.
    Sqlite,
}

impl SqlDialect {
    /// Resolves the dialect from a database URL.
    pub fn from_url(url: &str) -> KeelResult<Self> {
        let scheme = url.split(':').next().unwrap_or_default();
        match scheme.to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Self::MySql),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "sqlite" => Ok(Self::Sqlite),
            _ => Err(KeelError::configuration(format!(
                "Unsupported database URL scheme: '{}'",
                scheme
            ))),
        }
    }

    /// Returns the bind placeholder for the 1-based parameter `index`.
    #[must_use]
    pub fn placeholder(self, index: usize) -> String {
        match self {
            Self::Postgres => format!("${}", index),
            Self::MySql | Self::Sqlite => "?".to_string(),
        }
    }

    /// Returns `count` comma-separated placeholders starting at `start`.
    #[must_use]
    pub fn placeholders(self, start: usize, count: usize) -> String {
        let mut out = String::new();
        for i in 0..count {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(&self.placeholder(start + i));
        }
        out
    }

    /// Returns `col = ?` assignments for an `UPDATE ... SET` clause.
    #[must_use]
    pub fn assignments<'a>(self, columns: impl IntoIterator<Item = &'a str>, start: usize) -> String {
        let mut out = String::new();
        for (i, column) in columns.into_iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(&format!("{} = {}", column, self.placeholder(start + i)));
        }
        out
    }
}

impl fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MySql => write!(f, "mysql"),
            Self::Postgres => write!(f, "postgres"),
            Self::Sqlite => write!(f, "sqlite"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_url() {
        assert_eq!(SqlDialect::from_url("mysql://u:p@h/db").unwrap(), SqlDialect::MySql);
        assert_eq!(SqlDialect::from_url("mariadb://u:p@h/db").unwrap(), SqlDialect::MySql);
        assert_eq!(SqlDialect::from_url("postgres://h/db").unwrap(), SqlDialect::Postgres);
        assert_eq!(SqlDialect::from_url("postgresql://h/db").unwrap(), SqlDialect::Postgres);
        assert_eq!(SqlDialect::from_url("sqlite::memory:").unwrap(), SqlDialect::Sqlite);
        assert_eq!(SqlDialect::from_url("sqlite://data.db").unwrap(), SqlDialect::Sqlite);
    }

    #[test]
    fn test_dialect_urls_pass_config_validation() {
        use keel_config::{AppConfig, ConfigValidator};

        for url in [
            "mysql://u:p@h/db",
            "mariadb://u:p@h/db",
            "postgres://h/db",
            "postgresql://h/db",
            "sqlite::memory:",
        ] {
            assert!(SqlDialect::from_url(url).is_ok(), "{url}");

            let mut config = AppConfig::default();
            config.database.url = url.to_string();
            assert!(ConfigValidator::validate(&config).is_ok(), "{url}");
        }
    }

    #[test]
    fn test_from_url_unsupported() {
        let err = SqlDialect::from_url("redis://localhost").unwrap_err();
        assert!(matches!(err, KeelError::Configuration(_)));
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(SqlDialect::MySql.placeholders(1, 3), "?, ?, ?");
        assert_eq!(SqlDialect::Postgres.placeholders(1, 3), "$1, $2, $3");
        assert_eq!(SqlDialect::Postgres.placeholders(4, 1), "$4");
        assert_eq!(SqlDialect::Sqlite.placeholders(1, 0), "");
    }

    #[test]
    fn test_assignments() {
        assert_eq!(
            SqlDialect::Postgres.assignments(["title", "pages"], 1),
            "title = $1, pages = $2"
        );
        assert_eq!(SqlDialect::Sqlite.assignments(["title"], 1), "title = ?");
    }
}
