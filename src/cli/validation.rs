//! Value parsers for CLI arguments clap cannot check on its own.

use std::net::IpAddr;
use std::path::PathBuf;

const MAX_HOSTNAME_LENGTH: usize = 253;

/// Port in 1..=65535.
pub fn validate_port(raw: &str) -> Result<u16, String> {
    match raw.trim().parse::<u16>() {
        Ok(0) => Err("Port 0 is not allowed, use 1-65535".to_string()),
        Ok(port) => Ok(port),
        Err(_) => Err(format!("Port must be a number between 1 and 65535, got '{}'", raw)),
    }
}

/// An existing, readable regular file.
pub fn validate_config_file_path(raw: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(raw);
    if !path.is_file() {
        return Err(format!("Configuration file not found: '{}'", raw));
    }
    std::fs::File::open(&path)
        .map(|_| path)
        .map_err(|e| format!("Cannot read configuration file '{}': {}", raw, e))
}

/// An IP literal or a DNS hostname.
pub fn validate_host_address(raw: &str) -> Result<String, String> {
    let host = raw.trim();
    if host.is_empty() {
        return Err("Host address cannot be empty".to_string());
    }
    if host.parse::<IpAddr>().is_ok() {
        return Ok(host.to_string());
    }
    // Dotted digits that are not an IP are a typo, not a hostname.
    if host.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(format!("Invalid IPv4 address: '{}'", host));
    }
    if host.len() > MAX_HOSTNAME_LENGTH {
        return Err(format!(
            "Host address is too long (maximum {} characters)",
            MAX_HOSTNAME_LENGTH
        ));
    }
    let labels_ok = host.split('.').all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });
    if labels_ok {
        Ok(host.to_string())
    } else {
        Err(format!("Invalid host address: '{}'", host))
    }
}
