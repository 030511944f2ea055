use crate::{
    ast::Direction,
    codegen::{f, CodeGen, InterfacePlan, MethodPlan, ParamPlan, Return, Shape},
};

/// Emits the client trait, the proxy type and its two strategy impls.
pub fn generate(plan: &InterfacePlan) -> String {
    let mut gen = CodeGen::with_capacity();
    let short = &plan.short;
    let name = &plan.name;

    gen.emit(f!("/// The call surface of `{name}`, local or remote.\n"));
    gen.emit(f!("pub trait {short}Client {{\n"));
    for method in &plan.methods {
        gen.emit(f!("    {};\n", method.client_signature()));
    }
    gen.emit(f!("}}\n\n"));

    gen.emit(f!(
        "pub struct {short}Proxy<S> {{\n    strategy: S,\n}}\n\n\
         pub type {short}ProxyLocal<T> = {short}Proxy<rt::Local<T>>;\n\
         pub type {short}ProxyRemote<R> = {short}Proxy<rt::Remote<R>>;\n\n\
         impl<S> {short}Proxy<S> {{\n    \
             pub const INTERFACE_ID: u32 = INTERFACE_ID;\n    \
             pub const METHOD_TABLE: &'static [rt::MethodMetadata] = &METHOD_TABLE;\n\n    \
             pub fn strategy(&self) -> &S {{\n        \
                 &self.strategy\n    \
             }}\n\
         }}\n\n\
         impl<T: {name}> {short}Proxy<rt::Local<T>> {{\n    \
             pub fn local(implementation: T) -> Self {{\n        \
                 {short}Proxy {{ strategy: rt::Local::new(implementation) }}\n    \
             }}\n\
         }}\n\n\
         impl<R: rt::Transport> {short}Proxy<rt::Remote<R>> {{\n    \
             pub fn remote(transport: R, target: &impl rt::ObjectHandle) -> Self {{\n        \
                 {short}Proxy {{ strategy: rt::Remote::new(transport, target) }}\n    \
             }}\n"
    ));
    for method in &plan.methods {
        gen.emit(f!("\n"));
        gen.block(1, &remote_body(method));
    }
    gen.emit(f!("}}\n\n"));

    gen.emit(f!("impl<T: {name}> {short}Client for {short}Proxy<rt::Local<T>> {{\n"));
    for (i, method) in plan.methods.iter().enumerate() {
        if i > 0 {
            gen.emit(f!("\n"));
        }
        gen.block(1, &local_method(method));
    }
    gen.emit(f!("}}\n\n"));

    gen.emit(f!(
        "impl<R: rt::Transport> {short}Client for {short}Proxy<rt::Remote<R>> {{\n"
    ));
    for (i, method) in plan.methods.iter().enumerate() {
        if i > 0 {
            gen.emit(f!("\n"));
        }
        gen.block(1, &remote_method(method));
    }
    gen.emit(f!("}}\n"));
    gen.finish()
}

/// Forwards to the implementation without encoding anything.
fn local_method(method: &MethodPlan) -> String {
    let call = format!("self.strategy.get().{}({})", method.name, method.args());
    let body = match method.ret {
        Return::Void => format!("{call};\n    rt::Status::OK"),
        Return::Status => call,
        Return::Value(_) => format!("Ok({call})"),
    };
    format!("{} {{\n    {body}\n}}\n", method.client_signature())
}

fn remote_method(method: &MethodPlan) -> String {
    let call = format!("self.call_{}({})", method.name.trim_start_matches("r#"), method.args());
    let body = match method.ret {
        Return::Void | Return::Status => format!("{call}.unwrap_or_else(|status| status)"),
        Return::Value(_) => call,
    };
    format!("{} {{\n    {body}\n}}\n", method.client_signature())
}

/// Encodes inputs, performs the call, then checks the transport status and
/// the call status before decoding anything.
fn remote_body(method: &MethodPlan) -> String {
    let mut gen = CodeGen::with_capacity();
    let ok = match &method.ret {
        Return::Void | Return::Status => "rt::Status".to_string(),
        Return::Value(value) => value.path.clone(),
    };
    gen.emit(f!(
        "fn call_{}({}) -> Result<{ok}, rt::Status> {{\n",
        method.name.trim_start_matches("r#"),
        method.params_decl()
    ));
    if method.inputs().next().is_some() {
        gen.emit(f!("    let mut request = rt::WireWriter::new();\n"));
        for param in method.inputs() {
            gen.emit(f!("    {}\n", write_input(param)));
        }
    } else {
        gen.emit(f!("    let request = rt::WireWriter::new();\n"));
    }
    gen.emit(f!(
        "    let reply = self\n        \
             .strategy\n        \
             .call(INTERFACE_ID, {}, request.as_bytes())?;\n    \
         let mut reply = rt::WireReader::new(&reply);\n    \
         let status: rt::Status = reply.read()?;\n    \
         if status.is_failure() {{\n        \
             return Err(status);\n    \
         }}\n",
        method.ordinal
    ));
    if let Return::Value(value) = &method.ret {
        gen.emit(f!("    let ret: {} = reply.read()?;\n", value.path));
    }
    for param in method.outputs() {
        gen.emit(f!("    *{} = reply.read()?;\n", param.name));
    }
    let result = match method.ret {
        Return::Value(_) => "ret",
        Return::Void | Return::Status => "status",
    };
    gen.emit(f!("    Ok({result})\n}}\n"));
    gen.finish()
}

fn write_input(param: &ParamPlan) -> String {
    let name = &param.name;
    match (param.direction, param.value.shape) {
        (Direction::InOut, _) => format!("request.write(&*{name});"),
        (_, Shape::Str) => format!("request.write_str({name});"),
        (_, Shape::Blob) => format!("request.write_blob({name});"),
        (_, Shape::Struct) => format!("request.write({name});"),
        (_, Shape::Plain) => format!("request.write(&{name});"),
    }
}
