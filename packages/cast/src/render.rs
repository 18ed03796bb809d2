use crate::{Decl, EnumSpec, ParamDecl, Type, TypeSpec};

/// Render a type as a C declaration for the given name
///
/// An empty name yields the abstract-declarator spelling used in
/// diagnostics, e.g. `int *` or `void (*)(int, char *)`. Pointer
/// declarators are parenthesized inside array and function declarators
/// so the output reads back as the same type.
pub fn render_decl(ty: &Type, name: &str) -> String {
    render_inner(ty, name.to_string())
}

fn render_inner(ty: &Type, decl: String) -> String {
    match ty {
        Type::Decl(td) => {
            let spec = specifier(&td.spec);
            if decl.is_empty() {
                spec
            } else {
                format!("{spec} {decl}")
            }
        }
        Type::Ptr(inner) => render_inner(inner, format!("*{decl}")),
        Type::Array(a) => {
            let decl = parenthesize_ptr(decl);
            let dim = match &a.dim {
                Some(dim) => dim.to_string(),
                None => String::new(),
            };
            render_inner(&a.elem, format!("{decl}[{dim}]"))
        }
        Type::Func(func) => {
            let decl = parenthesize_ptr(decl);
            let params = match &func.params {
                None => String::new(),
                Some(params) => {
                    let rendered = params.iter().map(render_param).collect::<Vec<_>>();
                    rendered.join(", ")
                }
            };
            render_inner(&func.ret, format!("{decl}({params})"))
        }
    }
}

// a pointer declarator binds looser than [] and (), so it needs parens
fn parenthesize_ptr(decl: String) -> String {
    if decl.starts_with('*') {
        format!("({decl})")
    } else {
        decl
    }
}

fn render_param(param: &ParamDecl) -> String {
    match param {
        ParamDecl::Decl(Decl { name, ty, .. }) => render_decl(ty, name.as_deref().unwrap_or("")),
        ParamDecl::Typename(ty) => render_decl(ty, ""),
        ParamDecl::Id(name) => name.clone(),
        ParamDecl::Ellipsis => "...".to_string(),
    }
}

fn specifier(spec: &TypeSpec) -> String {
    match spec {
        TypeSpec::Ident(names) => names.join(" "),
        TypeSpec::Enum(EnumSpec { name: Some(name), .. }) => format!("enum {name}"),
        TypeSpec::Enum(_) => "enum".to_string(),
        TypeSpec::Aggregate(agg) => match &agg.name {
            Some(name) => format!("{} {name}", agg.kind.keyword()),
            None => agg.kind.keyword().to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use crate::{ArrayDecl, Expr, FuncDecl, basic_type, pointer};

    use super::*;

    fn array_of(elem: Type, dim: &str) -> Type {
        Type::Array(ArrayDecl {
            elem: Box::new(elem),
            dim: Some(Expr::Constant(dim.to_string())),
        })
    }

    #[test]
    fn test_render_scalar() {
        assert_eq!(render_decl(&basic_type(&["int"]), "x"), "int x");
        assert_eq!(
            render_decl(&basic_type(&["unsigned", "long", "long"]), ""),
            "unsigned long long"
        );
        assert_eq!(render_decl(&pointer(basic_type(&["char"])), ""), "char *");
    }

    #[test]
    fn test_render_array() {
        let ty = array_of(basic_type(&["int"]), "3");
        assert_eq!(render_decl(&ty, "a"), "int a[3]");
        // pointer-to-array needs parens
        let ty = pointer(array_of(basic_type(&["int"]), "3"));
        assert_eq!(render_decl(&ty, "p"), "int (*p)[3]");
        // array-of-pointer does not
        let ty = array_of(pointer(basic_type(&["int"])), "3");
        assert_eq!(render_decl(&ty, "a"), "int *a[3]");
    }

    #[test]
    fn test_render_function_pointer() {
        let ty = pointer(Type::Func(FuncDecl {
            params: Some(vec![
                ParamDecl::Typename(basic_type(&["int"])),
                ParamDecl::Ellipsis,
            ]),
            ret: Box::new(basic_type(&["void"])),
        }));
        assert_eq!(render_decl(&ty, ""), "void (*)(int, ...)");
        assert_eq!(render_decl(&ty, "cb"), "void (*cb)(int, ...)");
    }
}
