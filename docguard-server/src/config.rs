//! Server configuration
//!
//! Upload limits and HTTP settings, read from environment variables.

use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;

use docguard_core::{UploadPolicy, DEFAULT_EVENT_CAPACITY, DEFAULT_MAX_FILES, DEFAULT_MAX_SIZE_MIB};

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port (default: 3000)
    pub port: u16,
    /// Server host (default: 127.0.0.1)
    pub host: [u8; 4],
    /// Allowed CORS origins, comma-separated (default: allow all in dev)
    pub allowed_origins: Option<Vec<String>>,
    /// Request body limit in MB (default: 60, room for a full zone at the default file size)
    pub body_limit_mb: usize,
    /// Maximum file size per upload in MiB (default: 10)
    pub max_file_size_mb: u64,
    /// Maximum accepted files per zone (default: 5)
    pub max_files_per_zone: usize,
    /// Accepted MIME patterns, comma-separated (default: every allowed type)
    pub accepted_mime_patterns: Vec<String>,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// Enable rate limiting (default: false for tests, true when loaded from env)
    pub rate_limit_enabled: bool,
    /// Rate limit: requests per second (default: 10)
    pub rate_limit_per_sec: u64,
    /// Rate limit: burst size (default: 20)
    pub rate_limit_burst: u32,
    /// Number of recent pipeline events kept for `/events` (default: 50)
    pub event_buffer_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            host: [127, 0, 0, 1],
            allowed_origins: None, // None = allow all (dev mode)
            body_limit_mb: 60,
            max_file_size_mb: DEFAULT_MAX_SIZE_MIB,
            max_files_per_zone: DEFAULT_MAX_FILES,
            accepted_mime_patterns: Vec::new(),
            timeout_secs: 30,
            rate_limit_enabled: false, // Disabled by default (for tests)
            rate_limit_per_sec: 10,
            rate_limit_burst: 20,
            event_buffer_size: DEFAULT_EVENT_CAPACITY,
        }
    }
}

fn comma_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parsed value of `key`, or `fallback` when unset or unparsable.
fn setting<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, fallback: T) -> T {
    lookup(key)
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(fallback)
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from any key/value source.
    ///
    /// Unset or unparsable keys keep their [`Default`] value, except
    /// `RATE_LIMIT_ENABLED`, which is on unless explicitly `false`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let host = lookup("HOST")
            .and_then(|h| h.trim().parse::<Ipv4Addr>().ok())
            .map(|ip| ip.octets())
            .unwrap_or(defaults.host);

        Self {
            port: setting(&lookup, "PORT", defaults.port),
            host,
            allowed_origins: lookup("ALLOWED_ORIGINS").map(|origins| comma_list(&origins)),
            body_limit_mb: setting(&lookup, "BODY_LIMIT_MB", defaults.body_limit_mb),
            max_file_size_mb: setting(&lookup, "MAX_FILE_SIZE_MB", defaults.max_file_size_mb),
            max_files_per_zone: setting(&lookup, "MAX_FILES_PER_ZONE", defaults.max_files_per_zone),
            accepted_mime_patterns: lookup("ACCEPTED_MIME_PATTERNS")
                .map(|patterns| comma_list(&patterns))
                .unwrap_or_default(),
            timeout_secs: setting(&lookup, "REQUEST_TIMEOUT_SECS", defaults.timeout_secs),
            rate_limit_enabled: lookup("RATE_LIMIT_ENABLED")
                .map(|v| !v.trim().eq_ignore_ascii_case("false"))
                .unwrap_or(true),
            rate_limit_per_sec: setting(&lookup, "RATE_LIMIT_PER_SEC", defaults.rate_limit_per_sec),
            rate_limit_burst: setting(&lookup, "RATE_LIMIT_BURST", defaults.rate_limit_burst),
            event_buffer_size: Some(setting(&lookup, "EVENT_BUFFER_SIZE", defaults.event_buffer_size))
                .filter(|size| *size > 0)
                .unwrap_or(defaults.event_buffer_size),
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from((self.host, self.port))
    }

    /// Pipeline policy applied to every zone
    pub fn upload_policy(&self) -> UploadPolicy {
        UploadPolicy::default()
            .with_max_files(self.max_files_per_zone)
            .with_max_size_mib(self.max_file_size_mb)
            .with_accepted_patterns(self.accepted_mime_patterns.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.max_files_per_zone, 5);
        assert_eq!(config.max_file_size_mb, 10);
        assert!(!config.rate_limit_enabled);
        assert_eq!(config.event_buffer_size, 50);
    }

    #[test]
    fn test_upload_policy_from_config() {
        let config = Config {
            max_files_per_zone: 2,
            max_file_size_mb: 1,
            accepted_mime_patterns: vec!["image/*".to_string()],
            ..Config::default()
        };
        let policy = config.upload_policy();
        assert_eq!(policy.max_files, 2);
        assert_eq!(policy.max_size_bytes, 1024 * 1024);
        assert!(policy.accepts_mime("image/png"));
        assert!(!policy.accepts_mime("application/pdf"));
    }

    #[test]
    fn test_comma_list_skips_blanks() {
        assert_eq!(
            comma_list(" image/*, ,application/pdf,"),
            vec!["image/*".to_string(), "application/pdf".to_string()]
        );
    }

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: std::collections::HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_reads_upload_limits() {
        let config = Config::from_lookup(lookup_from(&[
            ("MAX_FILES_PER_ZONE", "3"),
            ("MAX_FILE_SIZE_MB", " 2 "),
            ("ACCEPTED_MIME_PATTERNS", "image/*,application/pdf"),
            ("HOST", "0.0.0.0"),
            ("PORT", "not-a-port"),
        ]));
        assert_eq!(config.max_files_per_zone, 3);
        assert_eq!(config.max_file_size_mb, 2);
        assert_eq!(config.accepted_mime_patterns.len(), 2);
        assert_eq!(config.host, [0, 0, 0, 0]);
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_from_lookup_rate_limit_and_buffer() {
        let config = Config::from_lookup(lookup_from(&[]));
        assert!(config.rate_limit_enabled);
        assert_eq!(config.allowed_origins, None);

        let config = Config::from_lookup(lookup_from(&[
            ("RATE_LIMIT_ENABLED", "FALSE"),
            ("EVENT_BUFFER_SIZE", "0"),
            ("ALLOWED_ORIGINS", "https://example.fr"),
        ]));
        assert!(!config.rate_limit_enabled);
        assert_eq!(config.event_buffer_size, 50);
        assert_eq!(config.allowed_origins, Some(vec!["https://example.fr".to_string()]));
    }

    #[test]
    fn test_socket_addr() {
        let config = Config::default();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
    }
}
