use cast::{Type, TypeSpec, render_decl};

use crate::{Function, TypeMap};

/// Diagnostic rendering of a type
///
/// Aggregates render by tag (`struct Foo`, `anon union`); everything else
/// renders as a declarator with a blank name.
pub fn type_to_string(ty: &Type) -> String {
    if let Type::Decl(td) = ty
        && let TypeSpec::Aggregate(agg) = &td.spec
    {
        agg.tag()
    } else {
        render_decl(ty, "")
    }
}

/// Diagnostic rendering of a signature, e.g. `int(char *, ...)`
///
/// An explicit empty parameter list renders as `void`; an unknown-arity
/// declaration renders with nothing between the parentheses.
pub fn function_to_string(func: &Function) -> String {
    let params = match &func.params {
        None => String::new(),
        Some(params) => {
            let mut rendered = params
                .iter()
                .map(|x| type_to_string(&x.ty))
                .collect::<Vec<_>>();
            if func.is_variadic {
                rendered.push("...".to_string());
            }
            let joined = rendered.join(", ");
            if joined.is_empty() { "void".to_string() } else { joined }
        }
    };
    let ret = match &func.ret_type {
        None => "void".to_string(),
        Some(ty) => type_to_string(ty),
    };
    format!("{ret}({params})")
}

/// Dump the whole map as text for inspection
pub fn dump_typemap(map: &TypeMap) -> String {
    use std::fmt::Write as _;
    let mut output = String::new();
    let _ = writeln!(output, "Variables:");
    for (name, ty) in &map.var_types {
        let _ = writeln!(output, "{name}: {}", type_to_string(ty));
    }
    let _ = writeln!(output);
    let _ = writeln!(output, "Functions:");
    for (name, func) in &map.functions {
        let _ = writeln!(output, "{name}: {}", function_to_string(func));
    }
    let _ = writeln!(output);
    let _ = writeln!(output, "Structs:");
    for (name, layout) in &map.named_structs {
        let _ = writeln!(output, "{name}: size {}, align {}", layout.size, layout.align);
        for (offset, fields) in &layout.fields {
            let _ = write!(output, "  {offset}:");
            for field in fields {
                let _ = write!(output, " {} ({})", field.name, type_to_string(&field.ty));
            }
            let _ = writeln!(output);
        }
    }
    output
}
