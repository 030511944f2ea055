use std::io::Write;

use crate::ast::*;

const INDENT_WIDTH: usize = 2;

pub fn print_document_string(document: &IdlDocument) -> String {
    let mut buf = Vec::with_capacity(1024);
    print_document(&mut buf, document).expect("writing to a Vec never fails");
    String::from_utf8(buf).expect("the tree is built from UTF-8 strings")
}

pub fn print_document(w: &mut impl Write, document: &IdlDocument) -> std::io::Result<()> {
    if let Some(namespace) = &document.namespace {
        writeln!(w, "namespace {namespace}")?;
    }
    for import in &document.imports {
        writeln!(w, "import {:?} (line {})", import.path, import.line)?;
    }
    for interface in &document.interfaces {
        print_interface(w, 0, interface)?;
    }
    for def in &document.enums {
        print_enum(w, 0, def)?;
    }
    for def in &document.structs {
        print_struct(w, 0, def)?;
    }
    Ok(())
}

fn print_interface(w: &mut impl Write, i: usize, interface: &InterfaceDef) -> std::io::Result<()> {
    sp(w, i)?;
    let uuid = if interface.uuid.is_empty() {
        "-"
    } else {
        &interface.uuid
    };
    write!(
        w,
        "interface {} : {} (uuid {uuid}, line {})",
        interface.name, interface.base, interface.line
    )?;
    print_namespace_suffix(w, &interface.namespace)?;
    print_attributes(w, i + 1, &interface.attributes)?;
    for member in &interface.members {
        match member {
            Member::Method(method) => print_method(w, i + 1, method)?,
            Member::Property(property) => print_property(w, i + 1, property)?,
        }
    }
    Ok(())
}

fn print_method(w: &mut impl Write, i: usize, method: &MethodDef) -> std::io::Result<()> {
    sp(w, i)?;
    write!(w, "method {} {}(", method.return_ty, method.name)?;
    for (idx, param) in method.params.iter().enumerate() {
        if idx > 0 {
            write!(w, ", ")?;
        }
        write!(w, "{} {} {}", param.direction, param.ty, param.name)?;
    }
    write!(w, ") (line {}", method.line)?;
    if method.origin != MethodOrigin::Declared {
        write!(w, ", from {}", method.origin)?;
    }
    writeln!(w, ")")?;
    print_attributes(w, i + 1, &method.attributes)
}

fn print_property(w: &mut impl Write, i: usize, property: &PropertyDef) -> std::io::Result<()> {
    sp(w, i)?;
    write!(w, "property {} {} (", property.ty, property.name)?;
    if property.has_getter {
        write!(w, "get, ")?;
    }
    if property.has_setter {
        write!(w, "set, ")?;
    }
    writeln!(w, "line {})", property.line)
}

fn print_enum(w: &mut impl Write, i: usize, def: &EnumDef) -> std::io::Result<()> {
    sp(w, i)?;
    write!(w, "enum {} (line {})", def.name, def.line)?;
    print_namespace_suffix(w, &def.namespace)?;
    for value in &def.values {
        sp(w, i + 1)?;
        writeln!(w, "{} = {}", value.name, value.value)?;
    }
    Ok(())
}

fn print_struct(w: &mut impl Write, i: usize, def: &StructDef) -> std::io::Result<()> {
    sp(w, i)?;
    write!(w, "struct {} (line {})", def.name, def.line)?;
    print_namespace_suffix(w, &def.namespace)?;
    for field in &def.fields {
        sp(w, i + 1)?;
        writeln!(w, "{} {}", field.ty, field.name)?;
    }
    Ok(())
}

fn print_attributes(w: &mut impl Write, i: usize, attributes: &Attributes) -> std::io::Result<()> {
    for attribute in attributes.iter() {
        sp(w, i)?;
        writeln!(w, "attribute {}{}", attribute.name, attribute.value)?;
    }
    Ok(())
}

/// Terminates the current line.
fn print_namespace_suffix(w: &mut impl Write, namespace: &str) -> std::io::Result<()> {
    if namespace.is_empty() {
        writeln!(w)
    } else {
        writeln!(w, " in {namespace}")
    }
}

fn sp(w: &mut impl Write, i: usize) -> std::io::Result<()> {
    write!(w, "{:width$}", "", width = i * INDENT_WIDTH)
}
