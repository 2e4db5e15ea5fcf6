//! Value parsers wired into clap arguments.
//!
//! Each function turns a raw argument string into a typed value or a
//! message clap prints verbatim, so the wording is user-facing.

use std::fs;
use std::net::Ipv4Addr;
use std::path::PathBuf;

pub fn validate_port(value: &str) -> Result<u16, String> {
    match value.parse::<u16>() {
        Ok(0) => Err("Port 0 is not usable; pick one between 1 and 65535".to_string()),
        Ok(port) => Ok(port),
        Err(_) => Err(format!("'{value}' is not a port number between 1 and 65535")),
    }
}

pub fn validate_config_file_path(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);

    if !path.is_file() {
        return Err(if path.exists() {
            format!("Configuration path is not a file: '{value}'")
        } else {
            format!("Configuration file does not exist: '{value}'")
        });
    }

    // Opening the file is the only reliable readability check
    fs::File::open(&path)
        .map(|_| path)
        .map_err(|e| format!("Cannot read configuration file '{value}': {e}"))
}

pub fn validate_rollback_steps(value: &str) -> Result<u32, String> {
    let steps = value
        .parse::<u32>()
        .map_err(|_| format!("'{value}' is not a number of migration steps"))?;

    match steps {
        0 => Err("Rollback steps must be greater than 0".to_string()),
        1..=100 => Ok(steps),
        _ => Err("Rollback steps cannot exceed 100 for safety reasons".to_string()),
    }
}

/// Accepts loopback names, wildcard binds, well-formed IPv4 addresses and
/// plausible hostnames. Anything dotted-numeric must parse as IPv4.
pub fn validate_host_address(value: &str) -> Result<String, String> {
    let host = value.trim();

    if host.is_empty() {
        return Err("Host address must not be empty".to_string());
    }

    if host.contains(' ') {
        return Err(format!("'{host}' contains whitespace"));
    }

    if host.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return match host.parse::<Ipv4Addr>() {
            Ok(_) => Ok(host.to_string()),
            Err(_) => Err(format!("'{host}' is not a valid IPv4 address")),
        };
    }

    if host.len() > 253 {
        return Err("Host addresses are limited to 253 characters".to_string());
    }

    Ok(host.to_string())
}
