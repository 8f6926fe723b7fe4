//! Typed views of the Oracle contract's custom errors.

use chainbind_core::RevertReason;
use std::fmt;

/// The custom errors declared by the Oracle contract. All are zero-arg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OracleContractError {
    ContractNotFound,
    ContractPaused,
    InvalidGgpPrice,
    InvalidOrOutdatedContract,
    InvalidTimestamp,
    MustBeGuardian,
    MustBeGuardianOrValidContract,
    MustBeMultisig,
}

impl OracleContractError {
    /// Declared error name, as it appears in the contract interface.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ContractNotFound => "ContractNotFound",
            Self::ContractPaused => "ContractPaused",
            Self::InvalidGgpPrice => "InvalidGGPPrice",
            Self::InvalidOrOutdatedContract => "InvalidOrOutdatedContract",
            Self::InvalidTimestamp => "InvalidTimestamp",
            Self::MustBeGuardian => "MustBeGuardian",
            Self::MustBeGuardianOrValidContract => "MustBeGuardianOrValidContract",
            Self::MustBeMultisig => "MustBeMultisig",
        }
    }

    /// Match a decoded revert reason against the contract's errors.
    pub fn from_revert(reason: &RevertReason) -> Option<Self> {
        let RevertReason::Custom { name, .. } = reason else {
            return None;
        };
        ALL.iter().copied().find(|e| e.name() == name)
    }
}

const ALL: [OracleContractError; 8] = [
    OracleContractError::ContractNotFound,
    OracleContractError::ContractPaused,
    OracleContractError::InvalidGgpPrice,
    OracleContractError::InvalidOrOutdatedContract,
    OracleContractError::InvalidTimestamp,
    OracleContractError::MustBeGuardian,
    OracleContractError::MustBeGuardianOrValidContract,
    OracleContractError::MustBeMultisig,
];

impl fmt::Display for OracleContractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}()", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_revert_matches_by_name() {
        let reason = RevertReason::Custom {
            name: "MustBeMultisig".into(),
            fields: vec![],
        };
        assert_eq!(
            OracleContractError::from_revert(&reason),
            Some(OracleContractError::MustBeMultisig)
        );
        assert!(OracleContractError::from_revert(&RevertReason::Message("x".into())).is_none());
    }
}
