//! Config validation module
//!
//! Validation rules:
//! - poll_interval_secs >= 1
//! - directory_addr parses as host:port
//! - node_id non-empty

use std::net::SocketAddr;

use contracts::{ContractError, RelayConfig};

/// Validate a RelayConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &RelayConfig) -> Result<(), ContractError> {
    validate_poll_interval(config)?;
    validate_directory_addr(config)?;
    validate_identity(config)?;
    Ok(())
}

fn validate_poll_interval(config: &RelayConfig) -> Result<(), ContractError> {
    if config.sender.poll_interval_secs == 0 {
        return Err(ContractError::config_validation(
            "sender.poll_interval_secs",
            "poll interval must be at least 1 second",
        ));
    }
    Ok(())
}

fn validate_directory_addr(config: &RelayConfig) -> Result<(), ContractError> {
    config
        .sender
        .directory_addr
        .parse::<SocketAddr>()
        .map_err(|e| {
            ContractError::config_validation(
                "sender.directory_addr",
                format!("invalid address '{}': {e}", config.sender.directory_addr),
            )
        })?;
    Ok(())
}

fn validate_identity(config: &RelayConfig) -> Result<(), ContractError> {
    if config.identity.node_id.is_empty() {
        return Err(ContractError::config_validation(
            "identity.node_id",
            "node id must not be empty",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{IdentitySection, ObservabilitySection, SenderSection};

    fn base_config() -> RelayConfig {
        RelayConfig {
            sender: SenderSection::default(),
            identity: IdentitySection {
                node_id: "node-1".to_string(),
                token: String::new(),
            },
            observability: ObservabilitySection::default(),
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate(&base_config()).is_ok());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = base_config();
        config.sender.poll_interval_secs = 0;
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("poll_interval_secs"));
    }

    #[test]
    fn test_bad_directory_addr_rejected() {
        let mut config = base_config();
        config.sender.directory_addr = "not-an-addr".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_node_id_rejected() {
        let mut config = base_config();
        config.identity.node_id.clear();
        assert!(validate(&config).is_err());
    }
}
