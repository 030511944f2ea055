//! Machine-readable interface descriptions, for tooling that needs the
//! identifiers without parsing generated code.

use serde::{Deserialize, Serialize};

use crate::codegen::InterfacePlan;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceMetadata {
    pub interface_name: String,
    /// `0x%08X`
    pub interface_id: String,
    pub uuid: String,
    pub namespace: String,
    pub base_interface: String,
    pub methods: Vec<MethodMetadata>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodMetadata {
    pub method_id: u16,
    pub name: String,
    /// `0x%08X`
    pub hash: String,
}

impl InterfaceMetadata {
    pub fn of(plan: &InterfacePlan) -> InterfaceMetadata {
        InterfaceMetadata {
            interface_name: plan.name.clone(),
            interface_id: hex(plan.interface_id),
            uuid: plan.uuid.clone(),
            namespace: plan.namespace.clone(),
            base_interface: plan.base.clone(),
            methods: plan
                .methods
                .iter()
                .map(|method| MethodMetadata {
                    method_id: method.ordinal,
                    name: method.idl_name.clone(),
                    hash: hex(method.hash),
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// `<Name>.meta.json`
    pub fn file_name(&self) -> String {
        format!("{}.meta.json", self.interface_name)
    }
}

fn hex(value: u32) -> String {
    format!("{value:#010X}")
}
