use std::fmt;

/// A type reference, as written in the IDL (e.g. `const unsigned char*`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    /// The base name, possibly `::`-qualified or a two-word compound such as
    /// `unsigned int`.
    pub base_type: String,
    pub pointer_depth: u32,
    pub is_const: bool,
    pub is_reference: bool,
}

impl TypeInfo {
    pub fn named(base_type: impl Into<String>) -> TypeInfo {
        TypeInfo {
            base_type: base_type.into(),
            pointer_depth: 0,
            is_const: false,
            is_reference: false,
        }
    }

    pub fn pointer_to(base_type: impl Into<String>, depth: u32) -> TypeInfo {
        TypeInfo {
            pointer_depth: depth,
            ..TypeInfo::named(base_type)
        }
    }

    pub fn is_void(&self) -> bool {
        self.base_type == "void" && self.pointer_depth == 0
    }

    pub fn is_pointer(&self) -> bool {
        self.pointer_depth > 0
    }

    pub fn primitive(&self) -> Option<Primitive> {
        PRIMITIVES.get(self.base_type.as_str()).copied()
    }

    /// `const char*` (and pointers to it) are treated as strings.
    pub fn is_c_string(&self) -> bool {
        self.is_const && self.pointer_depth >= 1 && self.base_type == "char"
    }

    /// The unqualified name (`Das::Foo::Bar` -> `Bar`).
    pub fn unqualified(&self) -> &str {
        split_qualified(&self.base_type).1
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_const {
            f.write_str("const ")?;
        }
        f.write_str(&self.base_type)?;
        for _ in 0..self.pointer_depth {
            f.write_str("*")?;
        }
        if self.is_reference {
            f.write_str("&")?;
        }
        Ok(())
    }
}

/// Splits `A::B::C` into (`Some("A::B")`, `C`).
pub fn split_qualified(name: &str) -> (Option<&str>, &str) {
    match name.rsplit_once("::") {
        Some((namespace, name)) => (Some(namespace), name),
        None => (None, name),
    }
}

/// Interfaces are recognized by the naming convention: an `I` followed by an
/// uppercase letter.
pub fn is_interface_name(name: &str) -> bool {
    let mut chars = split_qualified(name).1.chars();
    chars.next() == Some('I') && chars.next().is_some_and(|c| c.is_ascii_uppercase())
}

/// A type with a fixed wire encoding.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    Void,
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    /// `DasResult`, a signed status code.
    Status,
    /// `DasGuid`, 16 raw bytes.
    Guid,
    /// A length-prefixed UTF-8 string.
    String,
}

impl Primitive {
    /// The Rust type used for a value of this primitive. Runtime types are
    /// prefixed with `rt::`.
    pub fn rust_type(self) -> &'static str {
        use Primitive::*;
        match self {
            Void => "()",
            Bool => "bool",
            I8 => "i8",
            I16 => "i16",
            I32 => "i32",
            I64 => "i64",
            U8 => "u8",
            U16 => "u16",
            U32 => "u32",
            U64 => "u64",
            F32 => "f32",
            F64 => "f64",
            Status => "rt::Status",
            Guid => "rt::Guid",
            String => "String",
        }
    }

    pub fn is_byte(self) -> bool {
        matches!(self, Primitive::I8 | Primitive::U8)
    }
}

pub static PRIMITIVES: phf::Map<&'static str, Primitive> = phf::phf_map! {
    "void" => Primitive::Void,
    "bool" => Primitive::Bool,
    "DasBool" => Primitive::Bool,
    "char" => Primitive::I8,
    "int8" => Primitive::I8,
    "int8_t" => Primitive::I8,
    "signed char" => Primitive::I8,
    "unsigned char" => Primitive::U8,
    "uint8" => Primitive::U8,
    "uint8_t" => Primitive::U8,
    "short" => Primitive::I16,
    "int16" => Primitive::I16,
    "int16_t" => Primitive::I16,
    "signed short" => Primitive::I16,
    "unsigned short" => Primitive::U16,
    "uint16" => Primitive::U16,
    "uint16_t" => Primitive::U16,
    "int" => Primitive::I32,
    "int32" => Primitive::I32,
    "int32_t" => Primitive::I32,
    "long" => Primitive::I32,
    "signed int" => Primitive::I32,
    "signed long" => Primitive::I32,
    "uint" => Primitive::U32,
    "uint32" => Primitive::U32,
    "uint32_t" => Primitive::U32,
    "unsigned int" => Primitive::U32,
    "unsigned long" => Primitive::U32,
    "int64" => Primitive::I64,
    "int64_t" => Primitive::I64,
    "uint64" => Primitive::U64,
    "uint64_t" => Primitive::U64,
    "size_t" => Primitive::U64,
    "float" => Primitive::F32,
    "double" => Primitive::F64,
    "DasResult" => Primitive::Status,
    "DasGuid" => Primitive::Guid,
    "string" => Primitive::String,
    "DasString" => Primitive::String,
    "DasReadOnlyString" => Primitive::String,
    "IDasReadOnlyString" => Primitive::String,
};

/// The base types a struct field may have. Structs must have a fixed layout,
/// which rules out strings, interfaces and other structs.
pub static STRUCT_FIELD_TYPES: phf::Set<&'static str> = phf::phf_set! {
    "bool",
    "int", "int8", "int16", "int32", "int64",
    "uint8", "uint16", "uint32", "uint64",
    "float", "double",
    "char", "size_t",
    "int8_t", "int16_t", "int32_t", "int64_t",
    "uint8_t", "uint16_t", "uint32_t", "uint64_t",
    "unsigned char", "unsigned int", "unsigned short", "unsigned long",
    "signed char", "signed int", "signed short", "signed long",
};

/// Whether a field of the given type may appear in a struct.
pub fn is_struct_field_type(ty: &TypeInfo) -> bool {
    !ty.is_pointer() && !ty.is_reference && STRUCT_FIELD_TYPES.contains(ty.base_type.as_str())
}

/// What a base type name refers to, once resolved.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TypeKind {
    Primitive(Primitive),
    Enum,
    Struct,
    Interface,
    Unknown,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Primitive(_) => f.write_str("primitive"),
            TypeKind::Enum => f.write_str("enum"),
            TypeKind::Struct => f.write_str("struct"),
            TypeKind::Interface => f.write_str("interface"),
            TypeKind::Unknown => f.write_str("unknown type"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interface_naming_convention() {
        assert!(is_interface_name("IFoo"));
        assert!(is_interface_name("IDasBase"));
        assert!(is_interface_name("Das::Api::IFoo"));
        assert!(!is_interface_name("Image"));
        assert!(!is_interface_name("I"));
        assert!(!is_interface_name("Iota"));
    }

    #[test]
    fn test_primitive_lookup() {
        assert_eq!(TypeInfo::named("int32").primitive(), Some(Primitive::I32));
        assert_eq!(
            TypeInfo::named("unsigned char").primitive(),
            Some(Primitive::U8)
        );
        assert_eq!(TypeInfo::named("size_t").primitive(), Some(Primitive::U64));
        assert_eq!(
            TypeInfo::named("DasResult").primitive(),
            Some(Primitive::Status)
        );
        assert_eq!(TypeInfo::named("IFoo").primitive(), None);
    }

    #[test]
    fn test_struct_field_types() {
        assert!(is_struct_field_type(&TypeInfo::named("int32")));
        assert!(is_struct_field_type(&TypeInfo::named("unsigned long")));
        assert!(!is_struct_field_type(&TypeInfo::named("IFoo")));
        assert!(!is_struct_field_type(&TypeInfo::named("string")));
        assert!(!is_struct_field_type(&TypeInfo::pointer_to("int32", 1)));
    }

    #[test]
    fn test_display() {
        let ty = TypeInfo {
            base_type: "unsigned char".into(),
            pointer_depth: 2,
            is_const: true,
            is_reference: true,
        };
        assert_eq!(ty.to_string(), "const unsigned char**&");
        assert_eq!(TypeInfo::named("Das::Foo").unqualified(), "Foo");
    }
}
