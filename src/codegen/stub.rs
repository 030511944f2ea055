use crate::{
    ast::Direction,
    codegen::{f, CodeGen, InterfacePlan, MethodPlan, ParamPlan, Return, Shape},
};

/// Emits the stub type and its `Dispatch` impl.
pub fn generate(plan: &InterfacePlan) -> String {
    let mut gen = CodeGen::with_capacity();
    let short = &plan.short;
    let name = &plan.name;

    gen.emit(f!(
        "/// Decodes requests for `{name}` and invokes the implementation.\n\
         pub struct {short}Stub<T> {{\n    \
             implementation: T,\n\
         }}\n\n\
         impl<T: {name}> {short}Stub<T> {{\n    \
             pub const INTERFACE_ID: u32 = INTERFACE_ID;\n    \
             pub const METHOD_TABLE: &'static [rt::MethodMetadata] = &METHOD_TABLE;\n\n    \
             pub fn new(implementation: T) -> Self {{\n        \
                 {short}Stub {{ implementation }}\n    \
             }}\n\n    \
             pub fn implementation(&self) -> &T {{\n        \
                 &self.implementation\n    \
             }}\n"
    ));
    for method in &plan.methods {
        gen.emit(f!("\n"));
        gen.block(1, &handler(method));
    }
    gen.emit(f!("}}\n\n"));

    gen.emit(f!(
        "impl<T: {name}> rt::Dispatch for {short}Stub<T> {{\n    \
             fn interface_id(&self) -> u32 {{\n        \
                 INTERFACE_ID\n    \
             }}\n\n    \
             fn method_table(&self) -> &'static [rt::MethodMetadata] {{\n        \
                 &METHOD_TABLE\n    \
             }}\n\n    \
             fn dispatch(&self, ordinal: u16, request: &[u8], response: &mut [u8]) -> usize {{\n        \
                 match ordinal {{\n"
    ));
    for method in &plan.methods {
        gen.emit(f!(
            "            {} => self.handle_{}(request, response),\n",
            method.ordinal,
            method.name.trim_start_matches("r#")
        ));
    }
    gen.emit(f!(
        "            _ => 0,\n        \
                 }}\n    \
             }}\n\
         }}\n"
    ));
    gen.finish()
}

/// Decodes inputs (an undecodable request yields an empty response), calls
/// the implementation, then encodes the status, the return value and the
/// outputs.
fn handler(method: &MethodPlan) -> String {
    let mut gen = CodeGen::with_capacity();
    gen.emit(f!(
        "fn handle_{}(&self, request: &[u8], response: &mut [u8]) -> usize {{\n",
        method.name.trim_start_matches("r#")
    ));
    if method.inputs().next().is_some() {
        gen.emit(f!("    let mut request = rt::WireReader::new(request);\n"));
    } else {
        gen.emit(f!("    let _ = request;\n"));
    }
    for param in &method.params {
        gen.emit(f!("    {}\n", storage(param)));
    }

    let args: Vec<_> = method.params.iter().map(argument).collect();
    let call = format!("self.implementation.{}({})", method.name, args.join(", "));
    gen.emit(f!("    let mut reply = rt::WireWriter::new();\n"));
    match &method.ret {
        Return::Void => {
            gen.emit(f!("    {call};\n    reply.write(&rt::Status::OK);\n"));
        }
        Return::Status => {
            gen.emit(f!(
                "    let status = {call};\n    \
                 reply.write(&status);\n    \
                 if status.is_failure() {{\n        \
                     return rt::copy_response(reply.as_bytes(), response);\n    \
                 }}\n"
            ));
        }
        Return::Value(_) => {
            gen.emit(f!(
                "    let ret = {call};\n    \
                 reply.write(&rt::Status::OK);\n    \
                 reply.write(&ret);\n"
            ));
        }
    }
    for param in method.outputs() {
        gen.emit(f!("    reply.write(&{});\n", param.name));
    }
    gen.emit(f!("    rt::copy_response(reply.as_bytes(), response)\n}}\n"));
    gen.finish()
}

/// Declares the local holding a parameter.
fn storage(param: &ParamPlan) -> String {
    let name = &param.name;
    let path = &param.value.path;
    match param.direction {
        Direction::In => format!("let Ok({name}) = request.read::<{path}>() else {{ return 0 }};"),
        Direction::InOut => {
            format!("let Ok(mut {name}) = request.read::<{path}>() else {{ return 0 }};")
        }
        Direction::Out => format!("let mut {name} = <{path}>::default();"),
    }
}

fn argument(param: &ParamPlan) -> String {
    let name = &param.name;
    match (param.direction, param.value.shape) {
        (Direction::Out | Direction::InOut, _) => format!("&mut {name}"),
        (Direction::In, Shape::Plain) => name.clone(),
        (Direction::In, Shape::Str | Shape::Blob | Shape::Struct) => format!("&{name}"),
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::codegen::tests::plan_of;

    #[test]
    fn test_handler_writes_status_then_outputs() {
        let plan = plan_of(
            r#"
            [uuid("11111111-2222-3333-4444-555555555555")]
            interface IExample {
                DasResult Add(int32 a, int32 b, [out] int32* sum);
            }
            "#,
        );
        assert_eq!(
            handler(&plan.methods[0]),
            indoc! {"
                fn handle_add(&self, request: &[u8], response: &mut [u8]) -> usize {
                    let mut request = rt::WireReader::new(request);
                    let Ok(a) = request.read::<i32>() else { return 0 };
                    let Ok(b) = request.read::<i32>() else { return 0 };
                    let mut sum = <i32>::default();
                    let mut reply = rt::WireWriter::new();
                    let status = self.implementation.add(a, b, &mut sum);
                    reply.write(&status);
                    if status.is_failure() {
                        return rt::copy_response(reply.as_bytes(), response);
                    }
                    reply.write(&sum);
                    rt::copy_response(reply.as_bytes(), response)
                }
            "}
        );
    }

    #[test]
    fn test_borrowed_inputs_and_value_return() {
        let plan = plan_of(
            r#"
            struct Point { int32 x; }
            interface ICanvas {
                int32 Plot(const Point& at, string label);
            }
            "#,
        );
        assert_eq!(
            handler(&plan.methods[0]),
            indoc! {"
                fn handle_plot(&self, request: &[u8], response: &mut [u8]) -> usize {
                    let mut request = rt::WireReader::new(request);
                    let Ok(at) = request.read::<Point>() else { return 0 };
                    let Ok(label) = request.read::<String>() else { return 0 };
                    let mut reply = rt::WireWriter::new();
                    let ret = self.implementation.plot(&at, &label);
                    reply.write(&rt::Status::OK);
                    reply.write(&ret);
                    rt::copy_response(reply.as_bytes(), response)
                }
            "}
        );
    }

    #[test]
    fn test_dispatch_matches_on_ordinal() {
        let plan = plan_of("interface IPair { void First(); void Second(); }");
        let code = generate(&plan);
        assert!(code.contains(
            "        match ordinal {\n            \
                         0 => self.handle_first(request, response),\n            \
                         1 => self.handle_second(request, response),\n            \
                         _ => 0,\n        \
                     }\n"
        ));
    }
}
