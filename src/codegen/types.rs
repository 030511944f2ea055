use std::collections::HashSet;

use crate::{
    ast::{Direction, EnumDef, InterfaceDef, MethodDef, StructDef},
    codegen::{f, naming, CodeGen, GenerateError, Options},
    protocol::InterfaceProtocol,
    resolve::{Qualification, TypeScope},
    types::{Primitive, TypeInfo, TypeKind},
};

/// How a value is passed to and stored by generated code.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Shape {
    /// Passed by value.
    Plain,
    /// Owned as `String`, borrowed as `&str`.
    Str,
    /// Owned as `Vec<u8>`, borrowed as `&[u8]`.
    Blob,
    /// A generated struct, borrowed when passed in.
    Struct,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueType {
    /// The owned Rust type.
    pub path: String,
    pub shape: Shape,
}

impl ValueType {
    fn new(path: impl Into<String>, shape: Shape) -> ValueType {
        ValueType {
            path: path.into(),
            shape,
        }
    }

    /// The type of a parameter passed in the given direction.
    pub fn param_type(&self, direction: Direction) -> String {
        match (direction, self.shape) {
            (Direction::Out | Direction::InOut, _) => format!("&mut {}", self.path),
            (Direction::In, Shape::Plain) => self.path.clone(),
            (Direction::In, Shape::Str) => "&str".to_string(),
            (Direction::In, Shape::Blob) => "&[u8]".to_string(),
            (Direction::In, Shape::Struct) => format!("&{}", self.path),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamPlan {
    pub name: String,
    pub value: ValueType,
    pub direction: Direction,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Return {
    Void,
    /// `DasResult`: the implementation's status is the call status.
    Status,
    Value(ValueType),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodPlan {
    pub ordinal: u16,
    /// As declared, used in the method table.
    pub idl_name: String,
    pub name: String,
    pub hash: u32,
    pub params: Vec<ParamPlan>,
    pub ret: Return,
}

impl MethodPlan {
    pub fn inputs(&self) -> impl Iterator<Item = &ParamPlan> {
        self.params.iter().filter(|p| p.direction.is_input())
    }

    pub fn outputs(&self) -> impl Iterator<Item = &ParamPlan> {
        self.params.iter().filter(|p| p.direction.is_output())
    }

    /// `&self, a: i32, sum: &mut i32`
    pub fn params_decl(&self) -> String {
        let mut decl = String::from("&self");
        for param in &self.params {
            decl.push_str(&format!(
                ", {}: {}",
                param.name,
                param.value.param_type(param.direction)
            ));
        }
        decl
    }

    /// `a, sum`
    pub fn args(&self) -> String {
        let names: Vec<_> = self.params.iter().map(|p| p.name.as_str()).collect();
        names.join(", ")
    }

    /// The signature seen by implementers.
    pub fn implementer_signature(&self) -> String {
        let ret = match &self.ret {
            Return::Void => String::new(),
            Return::Status => " -> rt::Status".to_string(),
            Return::Value(value) => format!(" -> {}", value.path),
        };
        format!("fn {}({}){ret}", self.name, self.params_decl())
    }

    /// The signature seen by callers, which must account for call failure.
    pub fn client_signature(&self) -> String {
        let ret = match &self.ret {
            Return::Void | Return::Status => "rt::Status".to_string(),
            Return::Value(value) => format!("Result<{}, rt::Status>", value.path),
        };
        format!("fn {}({}) -> {ret}", self.name, self.params_decl())
    }
}

/// Everything proxy and stub generation needs to know about an interface,
/// with all types resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterfacePlan {
    /// As declared (`IExample`).
    pub name: String,
    /// Without the `I` prefix (`Example`).
    pub short: String,
    /// The module holding the generated items (`example`).
    pub module: String,
    pub namespace: String,
    pub uuid: String,
    pub base: String,
    pub interface_id: u32,
    pub methods: Vec<MethodPlan>,
}

impl InterfacePlan {
    pub fn new(
        interface: &InterfaceDef,
        scope: &TypeScope,
        options: &Options,
    ) -> Result<InterfacePlan, GenerateError> {
        let protocol = InterfaceProtocol::of(interface)?;
        let resolver = Resolver {
            scope,
            options,
            interface,
        };
        let mut seen = HashSet::new();
        let mut methods = Vec::with_capacity(protocol.methods.len());
        for (entry, method) in protocol.methods.iter().zip(interface.methods()) {
            let name = naming::method_name(&method.name);
            if !seen.insert(name.clone()) {
                return Err(GenerateError::DuplicateMethod {
                    interface: interface.name.clone(),
                    name,
                });
            }
            methods.push(MethodPlan {
                ordinal: entry.ordinal,
                idl_name: entry.name.clone(),
                name,
                hash: entry.hash,
                params: resolver.params(method)?,
                ret: resolver.ret(method)?,
            });
        }
        let short = interface.short_name().to_string();
        Ok(InterfacePlan {
            name: naming::ident(&interface.name),
            module: naming::module_name(&short),
            short,
            namespace: interface.namespace.clone(),
            uuid: interface.uuid.clone(),
            base: interface.base.clone(),
            interface_id: protocol.interface_id,
            methods,
        })
    }
}

struct Resolver<'a> {
    scope: &'a TypeScope,
    options: &'a Options,
    interface: &'a InterfaceDef,
}

impl Resolver<'_> {
    fn params(&self, method: &MethodDef) -> Result<Vec<ParamPlan>, GenerateError> {
        method
            .params
            .iter()
            .map(|param| {
                Ok(ParamPlan {
                    name: naming::param_name(&param.name),
                    value: self.value(method, &param.ty)?,
                    direction: param.direction,
                })
            })
            .collect()
    }

    fn ret(&self, method: &MethodDef) -> Result<Return, GenerateError> {
        let ty = &method.return_ty;
        if ty.is_void() {
            return Ok(Return::Void);
        }
        if !ty.is_pointer() && ty.primitive() == Some(Primitive::Status) {
            return Ok(Return::Status);
        }
        self.value(method, ty).map(Return::Value)
    }

    fn value(&self, method: &MethodDef, ty: &TypeInfo) -> Result<ValueType, GenerateError> {
        let primitive = ty.primitive();
        if method.is_binary_buffer() && ty.is_pointer() && primitive.is_some_and(Primitive::is_byte)
        {
            return Ok(ValueType::new("Vec<u8>", Shape::Blob));
        }
        if ty.is_c_string() {
            return Ok(ValueType::new("String", Shape::Str));
        }

        let resolved = self.scope.resolve(&ty.base_type, &self.interface.namespace);
        match resolved.kind {
            TypeKind::Primitive(Primitive::Void) => {
                Err(self.unsupported(method, ty, "has no wire encoding"))
            }
            TypeKind::Primitive(Primitive::String) => Ok(ValueType::new("String", Shape::Str)),
            TypeKind::Primitive(primitive) => Ok(ValueType::new(primitive.rust_type(), Shape::Plain)),
            TypeKind::Enum => Ok(ValueType::new(
                self.path(ty.unqualified(), &resolved.qualification),
                Shape::Plain,
            )),
            TypeKind::Struct => Ok(ValueType::new(
                self.path(ty.unqualified(), &resolved.qualification),
                Shape::Struct,
            )),
            TypeKind::Interface if ty.pointer_depth > 2 => {
                Err(self.unsupported(method, ty, "has too many levels of indirection"))
            }
            TypeKind::Interface => Ok(ValueType::new("rt::ObjectId", Shape::Plain)),
            TypeKind::Unknown => Err(GenerateError::UnknownType {
                interface: self.interface.name.clone(),
                method: method.name.clone(),
                origin: method.origin,
                line: method.line,
                ty: ty.to_string(),
            }),
        }
    }

    /// Spells a generated type as seen from inside an interface module.
    fn path(&self, name: &str, qualification: &Qualification) -> String {
        let name = naming::ident(name);
        match qualification {
            Qualification::SameNamespace => name,
            Qualification::NoNamespace => format!("{}::{name}", self.options.root_path),
            Qualification::OtherNamespace(namespace) => format!(
                "{}::{}::{name}",
                self.options.root_path,
                naming::namespace_path(namespace).join("::")
            ),
        }
    }

    fn unsupported(&self, method: &MethodDef, ty: &TypeInfo, reason: &'static str) -> GenerateError {
        GenerateError::UnsupportedType {
            interface: self.interface.name.clone(),
            method: method.name.clone(),
            origin: method.origin,
            line: method.line,
            ty: ty.to_string(),
            reason,
        }
    }
}

/// `INTERFACE_ID` and `METHOD_TABLE`, shared by proxy and stub.
pub fn protocol_constants(plan: &InterfacePlan) -> String {
    let mut gen = CodeGen::with_capacity();
    gen.emit(f!(
        "/// Derived from `{}`.\npub const INTERFACE_ID: u32 = {:#010X};\n\n",
        plan.uuid,
        plan.interface_id
    ));
    gen.emit(f!(
        "/// Indexed by method ordinal, the wire-level method discriminator.\n\
         pub const METHOD_TABLE: [rt::MethodMetadata; {}] = [\n",
        plan.methods.len()
    ));
    for method in &plan.methods {
        gen.emit(f!(
            "    rt::MethodMetadata {{ ordinal: {}, name: {:?}, hash: {:#010X} }},\n",
            method.ordinal,
            method.idl_name,
            method.hash
        ));
    }
    gen.emit(f!("];\n"));
    gen.finish()
}

/// The trait implemented by the object behind the interface.
pub fn implementer_trait(plan: &InterfacePlan) -> String {
    let mut gen = CodeGen::with_capacity();
    gen.emit(f!("pub trait {} {{\n", plan.name));
    for method in &plan.methods {
        gen.emit(f!("    {};\n", method.implementer_signature()));
    }
    gen.emit(f!("}}\n"));
    gen.finish()
}

/// Enums are open `i32` newtypes, so any value received off the wire is
/// representable.
pub fn enum_item(def: &EnumDef) -> String {
    let mut gen = CodeGen::with_capacity();
    let name = naming::ident(&def.name);
    gen.emit(f!(
        "#[repr(transparent)]\n\
         #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]\n\
         pub struct {name}(pub i32);\n\n\
         impl {name} {{\n"
    ));
    for value in &def.values {
        gen.emit(f!(
            "    pub const {}: {name} = {name}({});\n",
            naming::const_name(&value.name),
            value.value
        ));
    }
    gen.emit(f!("}}\n\n"));
    gen.emit(f!(
        "impl rt::Wire for {name} {{\n    \
             fn encode(&self, writer: &mut rt::WireWriter) {{\n        \
                 writer.write(&self.0);\n    \
             }}\n\n    \
             fn decode(reader: &mut rt::WireReader<'_>) -> Result<Self, rt::WireError> {{\n        \
                 reader.read().map({name})\n    \
             }}\n\
         }}\n"
    ));
    gen.finish()
}

/// Structs hold primitives only, encoded field by field in declaration order.
pub fn struct_item(def: &StructDef) -> String {
    let mut gen = CodeGen::with_capacity();
    let name = naming::ident(&def.name);
    let fields: Vec<_> = def
        .fields
        .iter()
        .map(|field| {
            let ty = field.ty.primitive().map_or("i32", Primitive::rust_type);
            (naming::field_name(&field.name), ty)
        })
        .collect();

    gen.emit(f!(
        "#[derive(Copy, Clone, Debug, Default, PartialEq)]\npub struct {name} {{\n"
    ));
    for (field, ty) in &fields {
        gen.emit(f!("    pub {field}: {ty},\n"));
    }
    gen.emit(f!("}}\n\n"));

    gen.emit(f!(
        "impl rt::Wire for {name} {{\n    fn encode(&self, writer: &mut rt::WireWriter) {{\n"
    ));
    for (field, _) in &fields {
        gen.emit(f!("        writer.write(&self.{field});\n"));
    }
    gen.emit(f!(
        "    }}\n\n    \
         fn decode(reader: &mut rt::WireReader<'_>) -> Result<Self, rt::WireError> {{\n        \
             Ok({name} {{\n"
    ));
    for (field, _) in &fields {
        gen.emit(f!("            {field}: reader.read()?,\n"));
    }
    gen.emit(f!("        }})\n    }}\n}}\n"));
    gen.finish()
}
