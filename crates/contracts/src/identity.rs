//! Node identity and dial credentials.

use serde::{Deserialize, Serialize};

use crate::ContractError;

/// Credentials attached to every outbound satellite connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialCredentials {
    /// This storage node's id
    pub node_id: String,

    /// Pre-shared intake token
    pub token: String,
}

/// Source of dial credentials.
///
/// Kept synchronous: producing credentials is a local operation, and a
/// failure here is a startup-class error rather than a network one.
pub trait IdentityProvider: Send + Sync {
    fn credentials(&self) -> Result<DialCredentials, ContractError>;
}

/// The node's own identity, loaded from configuration.
#[derive(Debug, Clone)]
pub struct NodeIdentity {
    node_id: String,
    token: String,
}

impl NodeIdentity {
    pub fn new(node_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            token: token.into(),
        }
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }
}

impl IdentityProvider for NodeIdentity {
    fn credentials(&self) -> Result<DialCredentials, ContractError> {
        if self.node_id.is_empty() {
            return Err(ContractError::credentials("node id is empty"));
        }
        Ok(DialCredentials {
            node_id: self.node_id.clone(),
            token: self.token.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_from_identity() {
        let identity = NodeIdentity::new("node-1", "secret");
        let creds = identity.credentials().unwrap();
        assert_eq!(creds.node_id, "node-1");
        assert_eq!(creds.token, "secret");
    }

    #[test]
    fn test_empty_node_id_rejected() {
        let identity = NodeIdentity::new("", "secret");
        assert!(identity.credentials().is_err());
    }
}
