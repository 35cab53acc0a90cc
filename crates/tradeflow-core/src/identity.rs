//! # Contract Identity and Participant Roles
//!
//! `ContractId` keys every row the workflow writes: the contract row and
//! one row per document kind. `Role` names the four trade parties.
//!
//! ## Security Invariant
//!
//! Role strings are parsed exactly once at the command boundary. The access
//! gate only ever sees the closed enum, so a typo cannot silently select
//! the wrong certificate column.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TradeError;

/// Caller-supplied identifier of a trade contract. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractId(String);

impl ContractId {
    /// Validate and wrap a contract identifier.
    pub fn new(id: impl Into<String>) -> Result<Self, TradeError> {
        let id = id.into();
        if id.is_empty() {
            return Err(TradeError::InvalidArgument(
                "contract id must not be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Access the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContractId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContractId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One of the four parties to a trade contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Importer,
    Exporter,
    ImporterBank,
    ExporterBank,
}

impl Role {
    /// All roles in participant-listing order.
    pub const ALL: [Role; 4] = [
        Role::Importer,
        Role::Exporter,
        Role::ImporterBank,
        Role::ExporterBank,
    ];

    /// The wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Importer => "Importer",
            Self::Exporter => "Exporter",
            Self::ImporterBank => "ImporterBank",
            Self::ExporterBank => "ExporterBank",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = TradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| {
                TradeError::InvalidArgument(
                    "Role should be Importer, Exporter, ImporterBank or ExporterBank.".to_string(),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_contract_id_rejected() {
        let err = ContractId::new("").unwrap_err();
        assert!(matches!(err, TradeError::InvalidArgument(_)));
    }

    #[test]
    fn contract_id_display_is_raw() {
        let id = ContractId::new("1000").unwrap();
        assert_eq!(id.to_string(), "1000");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"1000\"");
    }

    #[test]
    fn role_parses_exact_names() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn role_parse_is_case_sensitive() {
        let err = "importer".parse::<Role>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid argument: Role should be Importer, Exporter, ImporterBank or ExporterBank."
        );
        assert!("Shipper".parse::<Role>().is_err());
    }

    #[test]
    fn role_order_is_fixed() {
        let names: Vec<_> = Role::ALL.iter().map(Role::as_str).collect();
        assert_eq!(names, ["Importer", "Exporter", "ImporterBank", "ExporterBank"]);
    }

    proptest::proptest! {
        #[test]
        fn any_non_empty_id_is_accepted_verbatim(id in ".{1,64}") {
            let contract = ContractId::new(id.clone()).unwrap();
            proptest::prop_assert_eq!(contract.as_str(), id.as_str());
        }
    }
}
