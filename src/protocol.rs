use crate::{ast::InterfaceDef, ident};

/// The wire-level description of one interface: its identifier and the
/// method table shared by proxy and stub.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterfaceProtocol {
    pub name: String,
    pub interface_id: u32,
    pub methods: Vec<MethodEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodEntry {
    /// Zero-based declaration position; the wire discriminator.
    pub ordinal: u16,
    pub name: String,
    /// FNV-1a of `<Interface>::<Method>`, for diagnostics only.
    pub hash: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("interface `{interface}` declares {count} methods, more than a 16-bit ordinal can address")]
pub struct TooManyMethods {
    pub interface: String,
    pub count: usize,
}

impl InterfaceProtocol {
    /// Builds the protocol table. Properties must have been lowered already
    /// (see [`crate::desugar::lower`]).
    pub fn of(interface: &InterfaceDef) -> Result<InterfaceProtocol, TooManyMethods> {
        debug_assert_eq!(interface.properties().count(), 0);
        let methods = interface
            .methods()
            .enumerate()
            .map(|(ordinal, method)| {
                let ordinal = u16::try_from(ordinal).map_err(|_| TooManyMethods {
                    interface: interface.name.clone(),
                    count: interface.methods().count(),
                })?;
                Ok(MethodEntry {
                    ordinal,
                    name: method.name.clone(),
                    hash: ident::method_hash(&interface.name, &method.name),
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(InterfaceProtocol {
            name: interface.name.clone(),
            interface_id: ident::interface_id(&interface.uuid),
            methods,
        })
    }

    pub fn method(&self, name: &str) -> Option<&MethodEntry> {
        self.methods.iter().find(|m| m.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{desugar, parser::parse_document};
    use pretty_assertions::assert_eq;

    fn protocol_of(src: &str) -> InterfaceProtocol {
        let document = desugar::lower(parse_document(src).unwrap(), &mut Vec::new());
        InterfaceProtocol::of(&document.interfaces[0]).unwrap()
    }

    #[test]
    fn test_ordinals_put_declared_methods_before_accessors() {
        let protocol = protocol_of(
            r#"
            [uuid("11111111-2222-3333-4444-555555555555")]
            interface IExample {
                DasResult Add(int32 a, int32 b, [out] int32* sum);
                [get] int32 Count;
                void Reset();
            }
            "#,
        );
        let table: Vec<_> = protocol
            .methods
            .iter()
            .map(|m| (m.ordinal, m.name.as_str(), m.hash))
            .collect();
        assert_eq!(
            table,
            [
                (0, "Add", ident::fnv1a(b"IExample::Add")),
                (1, "Reset", ident::fnv1a(b"IExample::Reset")),
                (2, "GetCount", ident::fnv1a(b"IExample::GetCount")),
            ]
        );
        assert_eq!(
            protocol.interface_id,
            ident::fnv1a(b"11111111-2222-3333-4444-555555555555")
        );
    }

    #[test]
    fn test_swapping_methods_keeps_interface_id() {
        let a = protocol_of(
            r#"[uuid("11111111-2222-3333-4444-555555555555")]
            interface IExample { void First(); void Second(); }"#,
        );
        let b = protocol_of(
            r#"[uuid("11111111-2222-3333-4444-555555555555")]
            interface IExample { void Second(); void First(); }"#,
        );
        assert_eq!(a.interface_id, b.interface_id);
        assert_eq!(a.method("First").unwrap().ordinal, 0);
        assert_eq!(b.method("First").unwrap().ordinal, 1);
        assert_eq!(a.method("First").unwrap().hash, b.method("First").unwrap().hash);
    }
}
