// document ::= (item)*
// item ::= import STRING ';'
//        | namespace ID ('::' ID)* '{' (item)* '}'
//        | [attributes] interface ID [':' ID] '{' (member)* '}' [';']
//        | enum ID '{' [enum_value (',' enum_value)* [',']] '}' [';']
//        | struct ID '{' (type ID ';')* '}' [';']
//        | ';'
// attributes ::= '[' [attribute (',' attribute)*] ']'
// attribute ::= ID ['(' (STRING | NUMBER | ID) ')']
// member ::= [attributes] type ID '(' [param (',' param)*] ')' ['=' NUMBER] ';'
//          | '[' (get | set) ... ']' type ID [';']
// param ::= [attributes] type ID
// type ::= [const] ID ('::' ID)* ('*')* ['&']
//        | [const] (unsigned | signed) ID ('*')* ['&']
// enum_value ::= ID ['=' NUMBER]

use std::fmt;

pub use crate::types::TypeInfo;

/// The interface every interface implicitly extends.
pub const DEFAULT_BASE_INTERFACE: &str = "IDasBase";

/// The value every generated enum must be able to represent.
pub const ENUM_SENTINEL_VALUE: i32 = 0x7FFF_FFFF;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct IdlDocument {
    pub interfaces: Vec<InterfaceDef>,
    pub enums: Vec<EnumDef>,
    pub structs: Vec<StructDef>,
    pub imports: Vec<ImportDef>,
    /// The single namespace declared by the document, if any (e.g. `A::B`).
    pub namespace: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImportDef {
    pub path: String,
    pub line: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InterfaceDef {
    pub name: String,
    /// The canonical textual form of the interface unique id (8-4-4-4-12).
    /// Empty if the interface carries no `uuid` attribute.
    pub uuid: String,
    pub base: String,
    pub members: Vec<Member>,
    /// The namespace path enclosing the declaration; empty at top level.
    pub namespace: String,
    pub attributes: Attributes,
    pub line: u32,
}

impl InterfaceDef {
    pub fn methods(&self) -> impl Iterator<Item = &MethodDef> {
        self.members.iter().filter_map(|m| match m {
            Member::Method(method) => Some(method),
            Member::Property(_) => None,
        })
    }

    pub fn properties(&self) -> impl Iterator<Item = &PropertyDef> {
        self.members.iter().filter_map(|m| match m {
            Member::Property(property) => Some(property),
            Member::Method(_) => None,
        })
    }

    /// The interface name without its `I` prefix (`IExample` -> `Example`).
    pub fn short_name(&self) -> &str {
        short_interface_name(&self.name)
    }
}

pub fn short_interface_name(name: &str) -> &str {
    match name.strip_prefix('I') {
        Some(rest) if !rest.is_empty() => rest,
        _ => name,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Member {
    Method(MethodDef),
    Property(PropertyDef),
}

#[derive(Clone, Debug, PartialEq)]
pub struct MethodDef {
    pub name: String,
    pub return_ty: TypeInfo,
    pub params: Vec<ParameterDef>,
    pub attributes: Attributes,
    pub origin: MethodOrigin,
    pub line: u32,
}

impl MethodDef {
    /// Whether the method transfers opaque byte buffers instead of typed
    /// values (the `[binary_buffer]` attribute).
    pub fn is_binary_buffer(&self) -> bool {
        self.attributes.has("binary_buffer")
    }
}

/// Where a method came from. Only used to improve error messages.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MethodOrigin {
    Declared,
    Getter,
    Setter,
}

impl fmt::Display for MethodOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodOrigin::Declared => f.write_str("method"),
            MethodOrigin::Getter => f.write_str("property getter"),
            MethodOrigin::Setter => f.write_str("property setter"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParameterDef {
    pub name: String,
    pub ty: TypeInfo,
    pub direction: Direction,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
    InOut,
}

impl Direction {
    /// Whether the value travels in the request.
    pub fn is_input(self) -> bool {
        matches!(self, Direction::In | Direction::InOut)
    }

    /// Whether the value travels in the response.
    pub fn is_output(self) -> bool {
        matches!(self, Direction::Out | Direction::InOut)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::In => f.write_str("in"),
            Direction::Out => f.write_str("out"),
            Direction::InOut => f.write_str("inout"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PropertyDef {
    pub name: String,
    pub ty: TypeInfo,
    pub has_getter: bool,
    pub has_setter: bool,
    pub line: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnumDef {
    pub name: String,
    pub values: Vec<EnumValue>,
    pub namespace: String,
    pub line: u32,
}

impl EnumDef {
    pub fn has_sentinel(&self) -> bool {
        self.values.iter().any(|v| v.value == ENUM_SENTINEL_VALUE)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnumValue {
    pub name: String,
    pub value: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StructDef {
    pub name: String,
    pub fields: Vec<StructField>,
    pub namespace: String,
    pub line: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StructField {
    pub name: String,
    pub ty: TypeInfo,
}

/// An ordered attribute list, as in `[uuid("..."), swig_export]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attributes(Vec<Attribute>);

impl Attributes {
    pub fn push(&mut self, attribute: Attribute) {
        self.0.push(attribute);
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.0.iter().find(|a| a.name == name).map(|a| &a.value)
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<AttributeValue> {
        let index = self.0.iter().position(|a| a.name == name)?;
        Some(self.0.remove(index).value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.0.iter()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: AttributeValue,
}

#[derive(Clone, Debug, PartialEq)]
pub enum AttributeValue {
    /// A bare attribute, such as `[get]`.
    Flag,
    String(String),
    Number(i64),
    Ident(String),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Flag => Ok(()),
            AttributeValue::String(s) => write!(f, "({s:?})"),
            AttributeValue::Number(n) => write!(f, "({n})"),
            AttributeValue::Ident(i) => write!(f, "({i})"),
        }
    }
}

/// Iterates over the segments of a `::`-separated namespace path.
pub fn namespace_segments(namespace: &str) -> impl Iterator<Item = &str> {
    namespace.split("::").filter(|s| !s.is_empty())
}
