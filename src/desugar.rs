use std::ops::Deref;

use heck::ToShoutySnakeCase;

use crate::{
    ast::{
        Attributes, Direction, EnumDef, EnumValue, IdlDocument, InterfaceDef, Member, MethodDef,
        MethodOrigin, ParameterDef, PropertyDef, ENUM_SENTINEL_VALUE,
    },
    diagnostic::{Diagnostic, DiagnosticKind},
    types::TypeInfo,
};

/// A document whose properties have been lowered into methods and whose
/// enums have been completed. Generators only accept documents in this form.
#[derive(Clone, Debug, PartialEq)]
pub struct Desugared(IdlDocument);

impl Desugared {
    pub fn into_inner(self) -> IdlDocument {
        self.0
    }
}

impl Deref for Desugared {
    type Target = IdlDocument;

    fn deref(&self) -> &IdlDocument {
        &self.0
    }
}

/// Runs every desugaring pass over the document, once.
pub fn lower(mut document: IdlDocument, diagnostics: &mut Vec<Diagnostic>) -> Desugared {
    for interface in &mut document.interfaces {
        lower_properties(interface);
        if interface.uuid.is_empty() {
            diagnostics.push(Diagnostic::new(
                interface.line,
                DiagnosticKind::MissingUuid {
                    interface: interface.name.clone(),
                },
            ));
        }
    }
    for def in &mut document.enums {
        if let Some(diagnostic) = complete_enum(def) {
            diagnostics.push(diagnostic);
        }
    }
    Desugared(document)
}

/// Replaces every property with its accessors. Declared methods keep their
/// positions; accessors follow the last of them in property order, the getter
/// before the setter. Method ordinals follow from the resulting order.
pub fn lower_properties(interface: &mut InterfaceDef) {
    let members = std::mem::take(&mut interface.members);
    let mut accessors = Vec::new();
    for member in members {
        match member {
            Member::Method(method) => interface.members.push(Member::Method(method)),
            Member::Property(property) => {
                if property.has_getter {
                    accessors.push(Member::Method(getter(&property)));
                }
                if property.has_setter {
                    accessors.push(Member::Method(setter(&property)));
                }
            }
        }
    }
    interface.members.extend(accessors);
}

/// `T Name` becomes `DasResult GetName([out] T* p_out)`.
fn getter(property: &PropertyDef) -> MethodDef {
    let mut ty = property.ty.clone();
    ty.pointer_depth += 1;
    ty.is_reference = false;
    MethodDef {
        name: format!("Get{}", property.name),
        return_ty: TypeInfo::named("DasResult"),
        params: vec![ParameterDef {
            name: "p_out".to_string(),
            ty,
            direction: Direction::Out,
        }],
        attributes: Attributes::default(),
        origin: MethodOrigin::Getter,
        line: property.line,
    }
}

/// `T Name` becomes `DasResult SetName(T value)`.
fn setter(property: &PropertyDef) -> MethodDef {
    MethodDef {
        name: format!("Set{}", property.name),
        return_ty: TypeInfo::named("DasResult"),
        params: vec![ParameterDef {
            name: "value".to_string(),
            ty: property.ty.clone(),
            direction: Direction::In,
        }],
        attributes: Attributes::default(),
        origin: MethodOrigin::Setter,
        line: property.line,
    }
}

/// Appends the `<ENUM>_FORCE_DWORD = 0x7FFFFFFF` member if no member already
/// has that value.
pub fn complete_enum(def: &mut EnumDef) -> Option<Diagnostic> {
    if def.has_sentinel() {
        return None;
    }
    let sentinel = sentinel_name(&def.name);
    def.values.push(EnumValue {
        name: sentinel.clone(),
        value: ENUM_SENTINEL_VALUE,
    });
    Some(Diagnostic::new(
        def.line,
        DiagnosticKind::EnumSentinelInserted {
            enum_name: def.name.clone(),
            sentinel,
        },
    ))
}

pub fn sentinel_name(enum_name: &str) -> String {
    format!("{}_FORCE_DWORD", enum_name.to_shouty_snake_case())
}
