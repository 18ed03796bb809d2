use cu::pre::*;

use cast::{FuncDecl, ParamDecl, Type, render_decl};

use crate::{Function, Param};

/// Parse a function declarator into a signature
///
/// Distinguishes a declaration with an empty `()` (unknown arity,
/// `params = None`) from an explicit `(void)` (zero parameters). K&R
/// identifier lists are not supported.
pub fn parse_function(func: &FuncDecl) -> cu::Result<Function> {
    let mut params: Vec<Param> = Vec::new();
    let mut is_variadic = false;
    let mut has_void = false;
    if let Some(args) = &func.params {
        for arg in args {
            match arg {
                ParamDecl::Ellipsis => is_variadic = true,
                ParamDecl::Decl(decl) => params.push(Param {
                    ty: decl.ty.clone(),
                    name: decl.name.clone(),
                }),
                ParamDecl::Id(_) => cu::bail!(
                    "K&R-style function header is not supported: {}",
                    render_decl(&Type::Func(func.clone()), "")
                ),
                ParamDecl::Typename(ty) => {
                    if ty.is_void() {
                        has_void = true;
                    } else {
                        params.push(Param {
                            ty: ty.clone(),
                            name: None,
                        });
                    }
                }
            }
        }
    }
    let params = if params.is_empty() && !has_void && !is_variadic {
        // declaration without a parameter list
        None
    } else {
        Some(params)
    };
    let ret_type = if func.ret.is_void() {
        None
    } else {
        Some((*func.ret).clone())
    };
    Ok(Function {
        ret_type,
        params,
        is_variadic,
    })
}

#[cfg(test)]
mod tests {
    use cast::{Decl, basic_type};

    use super::*;

    fn func(params: Option<Vec<ParamDecl>>, ret: Type) -> FuncDecl {
        FuncDecl {
            params,
            ret: Box::new(ret),
        }
    }

    #[test]
    fn test_variadic_with_named_param() -> cu::Result<()> {
        // int f(int x, ...)
        let f = func(
            Some(vec![
                ParamDecl::Decl(Decl {
                    name: Some("x".to_string()),
                    ty: basic_type(&["int"]),
                    bitsize: None,
                }),
                ParamDecl::Ellipsis,
            ]),
            basic_type(&["int"]),
        );
        let sig = parse_function(&f)?;
        assert!(sig.is_variadic);
        assert_eq!(sig.ret_type, Some(basic_type(&["int"])));
        let params = sig.params.unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].name.as_deref(), Some("x"));
        assert_eq!(params[0].ty, basic_type(&["int"]));
        Ok(())
    }

    #[test]
    fn test_explicit_void() -> cu::Result<()> {
        // void g(void) has zero parameters, not unknown arity
        let f = func(
            Some(vec![ParamDecl::Typename(basic_type(&["void"]))]),
            basic_type(&["void"]),
        );
        let sig = parse_function(&f)?;
        assert_eq!(sig.ret_type, None);
        assert_eq!(sig.params, Some(vec![]));
        assert!(!sig.is_variadic);
        Ok(())
    }

    #[test]
    fn test_empty_parameter_list() -> cu::Result<()> {
        // double h() leaves the arity unknown
        let f = func(None, basic_type(&["double"]));
        let sig = parse_function(&f)?;
        assert_eq!(sig.ret_type, Some(basic_type(&["double"])));
        assert_eq!(sig.params, None);
        assert!(!sig.is_variadic);
        Ok(())
    }

    #[test]
    fn test_unnamed_param() -> cu::Result<()> {
        // int f(int)
        let f = func(
            Some(vec![ParamDecl::Typename(basic_type(&["int"]))]),
            basic_type(&["int"]),
        );
        let sig = parse_function(&f)?;
        let params = sig.params.unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].name, None);
        Ok(())
    }

    #[test]
    fn test_knr_header_rejected() {
        let f = func(
            Some(vec![ParamDecl::Id("x".to_string())]),
            basic_type(&["int"]),
        );
        let err = parse_function(&f).unwrap_err();
        assert!(format!("{err}").contains("K&R-style function header is not supported"));
    }
}
