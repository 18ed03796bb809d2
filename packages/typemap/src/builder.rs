use cu::pre::*;

use cast::{Decl, Item, TranslationUnit, Type, TypeSpec, basic_type};

use crate::{TypeMap, parse_function};

/// Build the type map from a parsed translation unit
///
/// Typedefs and function signatures are registered in a first pass over
/// the top-level items, so a struct body may reference a typedef declared
/// anywhere in the unit. A recursive visit then records variable types,
/// lays out every complete struct/union definition, and maps named enums
/// to `int`. Any error aborts the whole build.
pub fn build_typemap(ast: &TranslationUnit) -> cu::Result<TypeMap> {
    let mut map = TypeMap::default();

    for item in &ast.items {
        match item {
            Item::Typedef(td) => {
                map.typedefs.insert(td.name.clone(), td.ty.clone());
            }
            Item::FuncDef(fd) => {
                let name = cu::check!(fd.decl.name.as_deref(), "cannot define an anonymous function")?;
                let Type::Func(func) = &fd.decl.ty else {
                    cu::bail!("unexpected non-function type for function definition {name}");
                };
                let sig = cu::check!(
                    parse_function(func),
                    "failed to parse signature of function {name}"
                )?;
                map.functions.insert(name.to_string(), sig);
            }
            Item::Decl(decl) => {
                if let Type::Func(func) = &decl.ty {
                    let name = cu::check!(decl.name.as_deref(), "cannot declare an anonymous function")?;
                    let sig = cu::check!(
                        parse_function(func),
                        "failed to parse signature of function {name}"
                    )?;
                    map.functions.insert(name.to_string(), sig);
                }
            }
        }
    }
    cu::debug!(
        "registered {} typedefs and {} functions",
        map.typedefs.len(),
        map.functions.len()
    );

    for item in &ast.items {
        visit_item(item, &mut map)?;
    }
    cu::debug!(
        "type map: {} variables, {} named structs, {} anonymous structs",
        map.var_types.len(),
        map.named_structs.len(),
        map.anon_structs.len()
    );
    Ok(map)
}

fn visit_item(item: &Item, map: &mut TypeMap) -> cu::Result<()> {
    match item {
        Item::Typedef(td) => visit_type(&td.ty, map),
        Item::FuncDef(fd) => {
            if let Some(name) = &fd.decl.name {
                map.var_types.insert(name.clone(), fd.decl.ty.clone());
            }
            Ok(())
        }
        Item::Decl(decl) => visit_decl(decl, map),
    }
}

fn visit_decl(decl: &Decl, map: &mut TypeMap) -> cu::Result<()> {
    if let Some(name) = &decl.name {
        map.var_types.insert(name.clone(), decl.ty.clone());
    }
    // function declarations are owned by the signature parser; their
    // parameters are not variables
    if !matches!(decl.ty, Type::Func(_)) {
        visit_type(&decl.ty, map)?;
    }
    Ok(())
}

fn visit_type(ty: &Type, map: &mut TypeMap) -> cu::Result<()> {
    match ty {
        Type::Ptr(inner) => visit_type(inner, map),
        Type::Array(a) => visit_type(&a.elem, map),
        Type::Func(func) => {
            // reached for pointer-to-function and similar nested spellings
            if let Some(params) = &func.params {
                for param in params {
                    match param {
                        cast::ParamDecl::Decl(d) => visit_type(&d.ty, map)?,
                        cast::ParamDecl::Typename(t) => visit_type(t, map)?,
                        _ => {}
                    }
                }
            }
            visit_type(&func.ret, map)
        }
        Type::Decl(td) => visit_spec(&td.spec, map),
    }
}

fn visit_spec(spec: &TypeSpec, map: &mut TypeMap) -> cu::Result<()> {
    match spec {
        TypeSpec::Ident(_) => Ok(()),
        TypeSpec::Enum(e) => {
            // a named enum is usable as a plain type name, reading as int
            if let Some(name) = &e.name {
                map.typedefs.insert(name.clone(), basic_type(&["int"]));
            }
            Ok(())
        }
        TypeSpec::Aggregate(agg) => {
            if agg.decls.is_some() {
                map.parse_struct(agg)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use cast::{
        AggregateKind, AggregateSpec, EnumSpec, FuncDecl, FuncDef, MemberItem, NodeIdGen,
        ParamDecl, TypeDecl, Typedef, pointer,
    };

    use super::*;

    fn field(name: &str, ty: Type) -> MemberItem {
        MemberItem::Field(Decl {
            name: Some(name.to_string()),
            ty,
            bitsize: None,
        })
    }

    fn var(name: &str, ty: Type) -> Item {
        Item::Decl(Decl {
            name: Some(name.to_string()),
            ty,
            bitsize: None,
        })
    }

    fn vec2_ref(r#gen: &mut NodeIdGen) -> Type {
        Type::Decl(TypeDecl {
            declname: None,
            spec: TypeSpec::Aggregate(AggregateSpec {
                id: r#gen.fresh(),
                kind: AggregateKind::Struct,
                name: Some("Vec2".to_string()),
                decls: None,
            }),
        })
    }

    fn unit_with_struct_and_funcs(r#gen: &mut NodeIdGen) -> TranslationUnit {
        let vec2 = AggregateSpec {
            id: r#gen.fresh(),
            kind: AggregateKind::Struct,
            name: Some("Vec2".to_string()),
            decls: Some(vec![
                field("x", basic_type(&["f32"])),
                field("y", basic_type(&["f32"])),
            ]),
        };
        TranslationUnit {
            items: vec![
                Item::Typedef(Typedef {
                    name: "f32".to_string(),
                    ty: basic_type(&["float"]),
                }),
                var(
                    "origin",
                    Type::Decl(TypeDecl {
                        declname: Some("origin".to_string()),
                        spec: TypeSpec::Aggregate(vec2),
                    }),
                ),
                Item::Decl(Decl {
                    name: Some("length".to_string()),
                    ty: Type::Func(FuncDecl {
                        params: Some(vec![ParamDecl::Typename(pointer(vec2_ref(r#gen)))]),
                        ret: Box::new(basic_type(&["f32"])),
                    }),
                    bitsize: None,
                }),
                Item::FuncDef(FuncDef {
                    decl: Decl {
                        name: Some("main".to_string()),
                        ty: Type::Func(FuncDecl {
                            params: Some(vec![ParamDecl::Typename(basic_type(&["void"]))]),
                            ret: Box::new(basic_type(&["int"])),
                        }),
                        bitsize: None,
                    },
                }),
            ],
        }
    }

    #[test]
    fn test_build_small_unit() -> cu::Result<()> {
        let mut r#gen = NodeIdGen::default();
        let map = build_typemap(&unit_with_struct_and_funcs(&mut r#gen))?;

        assert_eq!(map.typedefs.get("f32"), Some(&basic_type(&["float"])));
        assert!(map.var_types.contains_key("origin"));
        assert!(map.var_types.contains_key("main"));
        // declared functions are addressable, so they keep a var type too
        assert!(map.var_types.contains_key("length"));

        let vec2 = &map.named_structs["Vec2"];
        assert_eq!(vec2.size, 8);
        assert_eq!(vec2.align, 4);

        let length = &map.functions["length"];
        assert_eq!(length.params.as_ref().map(|x| x.len()), Some(1));
        assert!(!length.is_variadic);
        let main = &map.functions["main"];
        assert_eq!(main.ret_type, Some(basic_type(&["int"])));
        assert_eq!(main.params, Some(vec![]));
        Ok(())
    }

    #[test]
    fn test_forward_typedef_reference() -> cu::Result<()> {
        // the struct body uses a typedef declared after it
        let mut r#gen = NodeIdGen::default();
        let s = AggregateSpec {
            id: r#gen.fresh(),
            kind: AggregateKind::Struct,
            name: Some("S".to_string()),
            decls: Some(vec![field("v", basic_type(&["word"]))]),
        };
        let unit = TranslationUnit {
            items: vec![
                var(
                    "g",
                    Type::Decl(TypeDecl {
                        declname: Some("g".to_string()),
                        spec: TypeSpec::Aggregate(s),
                    }),
                ),
                Item::Typedef(Typedef {
                    name: "word".to_string(),
                    ty: basic_type(&["unsigned", "short"]),
                }),
            ],
        };
        let map = build_typemap(&unit)?;
        assert_eq!(map.named_structs["S"].size, 2);
        Ok(())
    }

    #[test]
    fn test_named_enum_registers_as_int() -> cu::Result<()> {
        let unit = TranslationUnit {
            items: vec![var(
                "mode",
                Type::Decl(TypeDecl {
                    declname: Some("mode".to_string()),
                    spec: TypeSpec::Enum(EnumSpec {
                        name: Some("Mode".to_string()),
                        members: Some(vec![]),
                    }),
                }),
            )],
        };
        let map = build_typemap(&unit)?;
        assert_eq!(map.typedefs.get("Mode"), Some(&basic_type(&["int"])));
        Ok(())
    }

    #[test]
    fn test_struct_inside_typedef_is_laid_out() -> cu::Result<()> {
        // typedef struct { int x; } T; registers the anonymous layout
        let mut r#gen = NodeIdGen::default();
        let anon = AggregateSpec {
            id: r#gen.fresh(),
            kind: AggregateKind::Struct,
            name: None,
            decls: Some(vec![field("x", basic_type(&["int"]))]),
        };
        let anon_id = anon.id;
        let unit = TranslationUnit {
            items: vec![Item::Typedef(Typedef {
                name: "T".to_string(),
                ty: Type::Decl(TypeDecl {
                    declname: None,
                    spec: TypeSpec::Aggregate(anon),
                }),
            })],
        };
        let map = build_typemap(&unit)?;
        assert_eq!(map.anon_structs[&anon_id].size, 4);
        Ok(())
    }
}
