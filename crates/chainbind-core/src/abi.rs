//! In-memory descriptions of a contract interface.
//!
//! Generated bindings construct these programmatically — there is no ABI
//! JSON parsing here. The descriptions drive the codec in `chainbind-evm`:
//! event descriptions decide how topics and data split across fields,
//! function descriptions produce selectors and calldata layouts.

use crate::types::AbiType;
use serde::{Deserialize, Serialize};

/// A single event parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbiParam {
    pub name: String,
    pub ty: AbiType,
    /// EVM: indexed parameters are carried in topics[1..]
    pub indexed: bool,
}

impl AbiParam {
    pub fn new(name: impl Into<String>, ty: AbiType) -> Self {
        Self {
            name: name.into(),
            ty,
            indexed: false,
        }
    }

    pub fn indexed(name: impl Into<String>, ty: AbiType) -> Self {
        Self {
            name: name.into(),
            ty,
            indexed: true,
        }
    }
}

/// Description of a contract event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbiEvent {
    /// Event name as declared in the contract, e.g. "Transfer"
    pub name: String,
    /// Parameters in declaration order
    pub inputs: Vec<AbiParam>,
}

impl AbiEvent {
    pub fn new(name: impl Into<String>, inputs: Vec<AbiParam>) -> Self {
        Self {
            name: name.into(),
            inputs,
        }
    }

    /// Canonical ABI signature, e.g. `Transfer(address,address,uint256)`.
    /// Its keccak256 hash is topics[0] for logs of this event.
    pub fn signature(&self) -> String {
        let types: Vec<_> = self.inputs.iter().map(|p| p.ty.to_string()).collect();
        format!("{}({})", self.name, types.join(","))
    }

    /// Parameters carried in topics[1..], in declaration order.
    pub fn indexed_inputs(&self) -> Vec<&AbiParam> {
        self.inputs.iter().filter(|p| p.indexed).collect()
    }

    /// Parameters ABI-encoded in the data payload, in declaration order.
    pub fn data_inputs(&self) -> Vec<&AbiParam> {
        self.inputs.iter().filter(|p| !p.indexed).collect()
    }
}

/// Description of a contract function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbiFunction {
    pub name: String,
    /// Inputs in declaration order
    pub inputs: Vec<(String, AbiType)>,
    /// Outputs in declaration order
    pub outputs: Vec<(String, AbiType)>,
    /// True for view/pure functions dispatched via `eth_call`
    pub constant: bool,
}

impl AbiFunction {
    /// A view/pure function.
    pub fn view(
        name: impl Into<String>,
        inputs: Vec<(String, AbiType)>,
        outputs: Vec<(String, AbiType)>,
    ) -> Self {
        Self {
            name: name.into(),
            inputs,
            outputs,
            constant: true,
        }
    }

    /// A state-mutating function dispatched as a transaction.
    pub fn mutating(name: impl Into<String>, inputs: Vec<(String, AbiType)>) -> Self {
        Self {
            name: name.into(),
            inputs,
            outputs: vec![],
            constant: false,
        }
    }

    /// Canonical ABI signature, e.g. `transfer(address,uint256)`.
    /// Its keccak256 hash's first four bytes are the call selector.
    pub fn signature(&self) -> String {
        let types: Vec<_> = self.inputs.iter().map(|(_, t)| t.to_string()).collect();
        format!("{}({})", self.name, types.join(","))
    }
}

/// Description of a Solidity 0.8.4+ custom error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbiError {
    pub name: String,
    /// Inputs in declaration order
    pub inputs: Vec<(String, AbiType)>,
}

impl AbiError {
    pub fn new(name: impl Into<String>, inputs: Vec<(String, AbiType)>) -> Self {
        Self {
            name: name.into(),
            inputs,
        }
    }

    /// Canonical ABI signature, e.g. `ContractPaused()`.
    pub fn signature(&self) -> String {
        let types: Vec<_> = self.inputs.iter().map(|(_, t)| t.to_string()).collect();
        format!("{}({})", self.name, types.join(","))
    }
}

/// The complete interface description a binding is generated against.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContractAbi {
    pub functions: Vec<AbiFunction>,
    pub events: Vec<AbiEvent>,
    pub errors: Vec<AbiError>,
}

impl ContractAbi {
    pub fn new(
        functions: Vec<AbiFunction>,
        events: Vec<AbiEvent>,
        errors: Vec<AbiError>,
    ) -> Self {
        Self {
            functions,
            events,
            errors,
        }
    }

    /// Look up a function by name.
    pub fn function(&self, name: &str) -> Option<&AbiFunction> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Look up an event by name.
    pub fn event(&self, name: &str) -> Option<&AbiEvent> {
        self.events.iter().find(|e| e.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_signature() {
        let ev = AbiEvent::new(
            "GGPPriceUpdated",
            vec![
                AbiParam::indexed("price", AbiType::Uint(256)),
                AbiParam::new("timestamp", AbiType::Uint(256)),
            ],
        );
        assert_eq!(ev.signature(), "GGPPriceUpdated(uint256,uint256)");
        assert_eq!(ev.indexed_inputs().len(), 1);
        assert_eq!(ev.data_inputs()[0].name, "timestamp");
    }

    #[test]
    fn function_signature() {
        let f = AbiFunction::mutating(
            "setGGPPriceInAVAX",
            vec![
                ("price".into(), AbiType::Uint(256)),
                ("timestamp".into(), AbiType::Uint(256)),
            ],
        );
        assert_eq!(f.signature(), "setGGPPriceInAVAX(uint256,uint256)");
        assert!(!f.constant);
    }

    #[test]
    fn abi_lookup() {
        let abi = ContractAbi::new(
            vec![AbiFunction::view("version", vec![], vec![("".into(), AbiType::Uint(8))])],
            vec![],
            vec![AbiError::new("ContractPaused", vec![])],
        );
        assert!(abi.function("version").is_some());
        assert!(abi.function("missing").is_none());
        assert_eq!(abi.errors[0].signature(), "ContractPaused()");
    }
}
