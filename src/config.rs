use std::str::FromStr;

use tracing::warn;

use crate::ledger::{DuplicatePolicy, Ledger};
use crate::limits::MAX_TABLES;
use crate::schedule::{DEFAULT_CLOSE_HOUR, DEFAULT_OPEN_HOUR, OpeningHours};

pub const DEFAULT_PORT: u16 = 5433;
pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_PASSWORD: &str = "tablebook";
pub const DEFAULT_MAX_CONNECTIONS: usize = 256;
pub const DEFAULT_TABLES: u32 = 10;

/// What every restaurant ledger is created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerSettings {
    pub tables: u32,
    pub hours: OpeningHours,
    pub duplicates: DuplicatePolicy,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            tables: DEFAULT_TABLES,
            hours: OpeningHours::default(),
            duplicates: DuplicatePolicy::default(),
        }
    }
}

impl LedgerSettings {
    pub fn new_ledger(&self) -> Ledger {
        Ledger::with_policy(self.tables, self.duplicates)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub bind: String,
    /// Only this login user is accepted when set.
    pub user: Option<String>,
    pub password: String,
    pub max_connections: usize,
    pub metrics_port: Option<u16>,
    pub tls_cert: Option<String>,
    pub tls_key: Option<String>,
    pub ledger: LedgerSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.into(),
            user: None,
            password: DEFAULT_PASSWORD.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            metrics_port: None,
            tls_cert: None,
            tls_key: None,
            ledger: LedgerSettings::default(),
        }
    }
}

impl Config {
    /// Read `TABLEBOOK_*` variables. Unparseable values fall back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Config::default();

        let duplicates = match lookup("TABLEBOOK_DUPLICATES") {
            Some(s) => s.parse::<DuplicatePolicy>().unwrap_or_else(|e| {
                warn!("{e}, using allow");
                DuplicatePolicy::Allow
            }),
            None => DuplicatePolicy::Allow,
        };

        Self {
            port: parsed(&lookup, "TABLEBOOK_PORT").unwrap_or(defaults.port),
            bind: lookup("TABLEBOOK_BIND").unwrap_or(defaults.bind),
            user: lookup("TABLEBOOK_USER").filter(|u| !u.is_empty()),
            password: lookup("TABLEBOOK_PASSWORD").unwrap_or(defaults.password),
            max_connections: parsed(&lookup, "TABLEBOOK_MAX_CONNECTIONS").unwrap_or(defaults.max_connections),
            metrics_port: parsed(&lookup, "TABLEBOOK_METRICS_PORT"),
            tls_cert: lookup("TABLEBOOK_TLS_CERT"),
            tls_key: lookup("TABLEBOOK_TLS_KEY"),
            ledger: LedgerSettings {
                tables: parsed(&lookup, "TABLEBOOK_TABLES").unwrap_or(DEFAULT_TABLES),
                hours: OpeningHours::new(
                    parsed(&lookup, "TABLEBOOK_OPEN_HOUR").unwrap_or(DEFAULT_OPEN_HOUR),
                    parsed(&lookup, "TABLEBOOK_CLOSE_HOUR").unwrap_or(DEFAULT_CLOSE_HOUR),
                ),
                duplicates,
            },
        }
    }

    /// Clamp values the engine cannot work with.
    pub fn validated(mut self) -> Self {
        let tables = self.ledger.tables.clamp(1, MAX_TABLES);
        if tables != self.ledger.tables {
            warn!("TABLEBOOK_TABLES={} out of range, using {tables}", self.ledger.tables);
            self.ledger.tables = tables;
        }

        let hours = &mut self.ledger.hours;
        if hours.close_hour > 23 {
            warn!("TABLEBOOK_CLOSE_HOUR={} out of range, using 23", hours.close_hour);
            hours.close_hour = 23;
        }
        if hours.open_hour > hours.close_hour {
            warn!(
                "TABLEBOOK_OPEN_HOUR={} after close hour {}, using {DEFAULT_OPEN_HOUR}",
                hours.open_hour, hours.close_hour
            );
            hours.open_hour = DEFAULT_OPEN_HOUR.min(hours.close_hour);
        }

        if self.max_connections == 0 {
            warn!("TABLEBOOK_MAX_CONNECTIONS=0, using {DEFAULT_MAX_CONNECTIONS}");
            self.max_connections = DEFAULT_MAX_CONNECTIONS;
        }
        self
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|s| s.trim().parse().ok())
}
