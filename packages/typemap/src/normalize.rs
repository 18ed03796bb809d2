use cu::pre::*;
use fxhash::FxHashSet;

use cast::{Type, TypeSpec, basic_type, pointer};

use crate::TypeMap;

impl TypeMap {
    /// Follow typedef links until hitting a shape that is not a plain
    /// typedef reference
    ///
    /// Only a `TypeDecl` wrapping a single known identifier is followed;
    /// a pointer or array of a typedef is left alone. Idempotent on
    /// anything else. Fails on a typedef cycle instead of spinning.
    pub fn resolve_typedefs<'a>(&'a self, mut ty: &'a Type) -> cu::Result<&'a Type> {
        let mut seen = FxHashSet::default();
        loop {
            let Type::Decl(td) = ty else { return Ok(ty) };
            let TypeSpec::Ident(names) = &td.spec else { return Ok(ty) };
            if names.len() != 1 {
                return Ok(ty);
            }
            let name = names[0].as_str();
            let Some(next) = self.typedefs.get(name) else { return Ok(ty) };
            cu::ensure!(seen.insert(name), "typedef cycle detected at {name}")?;
            ty = next;
        }
    }

    /// Decay the type as it behaves in a value context
    ///
    /// Arrays become pointers to their element, functions become pointers
    /// to the original (pre-resolution) function type, enums read as
    /// `int`. The result is always a pointer or a non-array `TypeDecl`.
    pub fn pointer_decay(&self, ty: &Type) -> cu::Result<Type> {
        let real = self.resolve_typedefs(ty)?;
        match real {
            Type::Array(a) => Ok(Type::Ptr(a.elem.clone())),
            Type::Func(_) => Ok(pointer(ty.clone())),
            Type::Decl(td) if matches!(td.spec, TypeSpec::Enum(_)) => Ok(basic_type(&["int"])),
            _ => Ok(ty.clone()),
        }
    }

    /// Type after dereferencing a pointer or array
    pub fn deref_type<'a>(&'a self, ty: &'a Type) -> cu::Result<&'a Type> {
        let ty = self.resolve_typedefs(ty)?;
        match ty {
            Type::Ptr(inner) => Ok(inner),
            Type::Array(a) => Ok(&a.elem),
            _ => cu::bail!("unexpected dereference of non-pointer type"),
        }
    }

    /// Whether the type resolves to a struct or union
    pub fn is_struct_type(&self, ty: &Type) -> cu::Result<bool> {
        let ty = self.resolve_typedefs(ty)?;
        if let Type::Decl(td) = ty {
            Ok(matches!(td.spec, TypeSpec::Aggregate(_)))
        } else {
            Ok(false)
        }
    }

    /// The identifier list of a primitive type, after typedef resolution
    ///
    /// Enums read as `["int"]`. Pointers, arrays, functions and
    /// aggregates have no primitive list.
    pub fn get_primitive_list(&self, ty: &Type) -> cu::Result<Option<Vec<String>>> {
        let ty = self.resolve_typedefs(ty)?;
        let Type::Decl(td) = ty else { return Ok(None) };
        match &td.spec {
            TypeSpec::Enum(_) => Ok(Some(vec!["int".to_string()])),
            TypeSpec::Ident(names) => Ok(Some(names.clone())),
            TypeSpec::Aggregate(_) => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use cast::{ArrayDecl, EnumSpec, Expr, FuncDecl, TypeDecl};

    use super::*;

    fn map_with_typedefs(defs: &[(&str, Type)]) -> TypeMap {
        let mut map = TypeMap::default();
        for (name, ty) in defs {
            map.typedefs.insert(name.to_string(), ty.clone());
        }
        map
    }

    #[test]
    fn test_resolve_chain() -> cu::Result<()> {
        let map = map_with_typedefs(&[
            ("T", basic_type(&["int"])),
            ("U", basic_type(&["T"])),
        ]);
        let u = basic_type(&["U"]);
        let resolved = map.resolve_typedefs(&u)?;
        assert_eq!(resolved, &basic_type(&["int"]));
        // idempotent
        assert_eq!(map.resolve_typedefs(resolved)?, resolved);
        Ok(())
    }

    #[test]
    fn test_resolve_stops_at_pointer() -> cu::Result<()> {
        let map = map_with_typedefs(&[("T", basic_type(&["int"]))]);
        // a pointer to a typedef is not resolved
        let p = pointer(basic_type(&["T"]));
        assert_eq!(map.resolve_typedefs(&p)?, &p);
        Ok(())
    }

    #[test]
    fn test_resolve_cycle_fails() {
        let map = map_with_typedefs(&[
            ("A", basic_type(&["B"])),
            ("B", basic_type(&["A"])),
        ]);
        let a = basic_type(&["A"]);
        assert!(map.resolve_typedefs(&a).is_err());
    }

    #[test]
    fn test_decay_array_and_function() -> cu::Result<()> {
        let map = TypeMap::default();
        let arr = Type::Array(ArrayDecl {
            elem: Box::new(basic_type(&["int"])),
            dim: Some(Expr::Constant("4".to_string())),
        });
        assert_eq!(map.pointer_decay(&arr)?, pointer(basic_type(&["int"])));

        let func = Type::Func(FuncDecl {
            params: None,
            ret: Box::new(basic_type(&["int"])),
        });
        assert_eq!(map.pointer_decay(&func)?, pointer(func.clone()));
        Ok(())
    }

    #[test]
    fn test_decay_function_typedef_keeps_spelling() -> cu::Result<()> {
        // decaying a typedef to a function wraps the named spelling,
        // not the resolved function type
        let func = Type::Func(FuncDecl {
            params: None,
            ret: Box::new(basic_type(&["void"])),
        });
        let map = map_with_typedefs(&[("handler_t", func)]);
        let named = basic_type(&["handler_t"]);
        assert_eq!(map.pointer_decay(&named)?, pointer(named.clone()));
        Ok(())
    }

    #[test]
    fn test_decay_enum_and_stability() -> cu::Result<()> {
        let map = TypeMap::default();
        let e = Type::Decl(TypeDecl {
            declname: None,
            spec: TypeSpec::Enum(EnumSpec { name: Some("E".to_string()), members: None }),
        });
        let decayed = map.pointer_decay(&e)?;
        assert_eq!(decayed, basic_type(&["int"]));
        // one application reaches a fixed point
        assert_eq!(map.pointer_decay(&decayed)?, decayed);
        let p = pointer(basic_type(&["char"]));
        assert_eq!(map.pointer_decay(&p)?, p);
        Ok(())
    }

    #[test]
    fn test_deref_through_typedef() -> cu::Result<()> {
        // typedef int T; T *p; deref of p's type yields int
        let map = map_with_typedefs(&[("T", basic_type(&["int"]))]);
        let p = pointer(basic_type(&["T"]));
        let inner = map.deref_type(&p)?;
        assert_eq!(map.resolve_typedefs(inner)?, &basic_type(&["int"]));
        assert!(map.deref_type(&basic_type(&["int"])).is_err());
        Ok(())
    }

    #[test]
    fn test_primitive_list() -> cu::Result<()> {
        let map = map_with_typedefs(&[("T", basic_type(&["unsigned", "short"]))]);
        let list = map.get_primitive_list(&basic_type(&["T"]))?;
        assert_eq!(list, Some(vec!["unsigned".to_string(), "short".to_string()]));
        let e = Type::Decl(TypeDecl {
            declname: None,
            spec: TypeSpec::Enum(EnumSpec { name: None, members: None }),
        });
        assert_eq!(map.get_primitive_list(&e)?, Some(vec!["int".to_string()]));
        assert_eq!(map.get_primitive_list(&pointer(basic_type(&["int"])))?, None);
        Ok(())
    }
}
