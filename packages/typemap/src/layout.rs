use std::collections::BTreeMap;

use cu::pre::*;

use cast::{AggregateKind, AggregateSpec, MemberItem, Type, TypeSpec};

use crate::{Struct, StructField, TypeMap, parse_constant_int, primitive_size};

fn align_up(x: u32, align: u32) -> u32 {
    (x + align - 1) & !(align - 1)
}

impl TypeMap {
    fn get_struct(&self, agg: &AggregateSpec) -> Option<&Struct> {
        match &agg.name {
            Some(name) => self.named_structs.get(name),
            None => self.anon_structs.get(&agg.id),
        }
    }

    /// Compute the layout of a struct or union definition
    ///
    /// Layouts are memoized under the tag name, or under the node
    /// identity for anonymous definitions, so repeated references return
    /// the cached result. A bare tag reference to a type that was never
    /// defined is an error.
    pub fn parse_struct(&mut self, agg: &AggregateSpec) -> cu::Result<Struct> {
        if let Some(existing) = self.get_struct(agg) {
            return Ok(existing.clone());
        }
        let Some(decls) = &agg.decls else {
            cu::bail!("tried to use {} before it is defined", agg.tag());
        };
        let layout = cu::check!(
            self.do_parse_struct(agg, decls),
            "failed to lay out {}",
            agg.tag()
        )?;
        match &agg.name {
            Some(name) => {
                self.named_structs.insert(name.clone(), layout.clone());
            }
            None => {
                self.anon_structs.insert(agg.id, layout.clone());
            }
        }
        Ok(layout)
    }

    fn do_parse_struct(&mut self, agg: &AggregateSpec, decls: &[MemberItem]) -> cu::Result<Struct> {
        let is_union = agg.kind == AggregateKind::Union;
        cu::ensure!(!decls.is_empty(), "empty {} is not valid C", agg.tag())?;

        let mut fields: BTreeMap<u32, Vec<StructField>> = BTreeMap::new();
        let mut union_size: u32 = 0;
        let mut align: u32 = 1;
        let mut offset: u32 = 0;
        // bits consumed in the current byte by an ongoing bitfield run
        let mut bit_offset: u32 = 0;

        for item in decls {
            // bare tag introductions take no storage
            let MemberItem::Field(decl) = item else { continue };
            let field_name = format!(
                "{}.{}",
                agg.name.as_deref().unwrap_or("<anon>"),
                decl.name.as_deref().unwrap_or("<anon>")
            );

            if let Some(bitsize) = &decl.bitsize {
                // A bitfield `type a : b;` aligns the struct as if it held a
                // `type` field, then allocates the next b bits. A field must
                // be loadable with a single load of its declared type: if it
                // would straddle a `type`-alignment boundary, all bits up to
                // that boundary are skipped first.
                let (ssize, salign, substr) = self.parse_struct_member(&decl.ty, &field_name)?;
                cu::ensure!(
                    ssize == salign && substr.is_none(),
                    "bitfield {field_name} is not of primitive type"
                )?;
                align = align.max(salign);
                let width = cu::check!(
                    parse_constant_int(bitsize),
                    "failed to evaluate width of bitfield {field_name}"
                )?;
                cu::ensure!(width >= 0, "negative width of bitfield {field_name}")?;
                cu::ensure!(
                    width <= (ssize * 8) as i64,
                    "width of bitfield {field_name} exceeds its type"
                )?;
                let width = width as u32;
                if width == 0 {
                    // a zero-width bitfield ends the current run; the next
                    // field starts at an ssize boundary
                    if !is_union && (bit_offset != 0 || offset % ssize != 0) {
                        if bit_offset != 0 {
                            bit_offset = 0;
                            offset += 1;
                        }
                        offset = align_up(offset, ssize);
                    }
                    continue;
                }
                if is_union {
                    union_size = union_size.max(ssize);
                } else {
                    if offset / ssize != (offset + (bit_offset + width - 1) / 8) / ssize {
                        // straddle: skip to the next ssize-aligned unit
                        bit_offset = 0;
                        offset = (offset + ssize) & !(ssize - 1);
                    }
                    bit_offset += width;
                    offset += bit_offset / 8;
                    bit_offset &= 7;
                }
                continue;
            }

            // any non-bitfield member ends an in-progress bit run
            if !is_union && bit_offset != 0 {
                bit_offset = 0;
                offset += 1;
            }

            if let Some(name) = &decl.name {
                let (ssize, salign, substr) = self.parse_struct_member(&decl.ty, &field_name)?;
                align = align.max(salign);
                offset = align_up(offset, salign);
                fields.entry(offset).or_default().push(StructField {
                    ty: decl.ty.clone(),
                    name: name.clone(),
                });
                if let Some(substr) = substr {
                    // aggregate member: also record the flattened leaves at
                    // their absolute offsets
                    for (off, sfields) in &substr.fields {
                        for field in sfields {
                            fields.entry(offset + off).or_default().push(StructField {
                                ty: field.ty.clone(),
                                name: format!("{name}.{}", field.name),
                            });
                        }
                    }
                }
                if is_union {
                    union_size = union_size.max(ssize);
                } else {
                    offset += ssize;
                }
            } else if let Type::Decl(td) = &decl.ty
                && let TypeSpec::Aggregate(inner) = &td.spec
                && inner.decls.is_some()
            {
                let substr = self.parse_struct(inner)?;
                if inner.name.is_some() {
                    // a tagged type defined inside another, which is silly
                    // but valid C; parse_struct registered it globally and
                    // it takes no storage here
                } else {
                    // C extension: anonymous struct/union member, whose
                    // fields are flattened into the parent unprefixed
                    align = align.max(substr.align);
                    offset = align_up(offset, substr.align);
                    for (off, sfields) in &substr.fields {
                        for field in sfields {
                            fields.entry(offset + off).or_default().push(field.clone());
                        }
                    }
                    if is_union {
                        union_size = union_size.max(substr.size);
                    } else {
                        offset += substr.size;
                    }
                }
            }
        }

        if !is_union && bit_offset != 0 {
            offset += 1;
        }
        let size = if is_union { union_size } else { align_up(offset, align) };
        Ok(Struct { fields, size, align })
    }

    /// Size, alignment, and (for aggregates) the layout of a member type
    ///
    /// `field_name` only feeds error messages. Arrays multiply their
    /// element size with no extra tail padding; an array member without a
    /// dimension cannot be laid out.
    pub fn parse_struct_member(
        &mut self,
        ty: &Type,
        field_name: &str,
    ) -> cu::Result<(u32, u32, Option<Struct>)> {
        let ty = self.resolve_typedefs(ty)?.clone();
        match &ty {
            Type::Ptr(_) => Ok((4, 4, None)),
            Type::Array(a) => {
                let Some(dim) = &a.dim else {
                    cu::bail!("array field {field_name} must have a size");
                };
                let dim = cu::check!(
                    parse_constant_int(dim),
                    "failed to evaluate dimension of array field {field_name}"
                )?;
                cu::ensure!(dim >= 0, "negative dimension of array field {field_name}")?;
                let (size, elem_align, _) = self.parse_struct_member(&a.elem, field_name)?;
                let total = (size as u64) * (dim as u64);
                cu::ensure!(
                    total <= u32::MAX as u64,
                    "array field {field_name} is too big. This is unlikely to be correct"
                )?;
                Ok((total as u32, elem_align, None))
            }
            Type::Func(_) => cu::bail!("unexpected function type for struct member {field_name}"),
            Type::Decl(td) => match &td.spec {
                TypeSpec::Aggregate(agg) => {
                    let substr = self.parse_struct(agg)?;
                    Ok((substr.size, substr.align, Some(substr)))
                }
                TypeSpec::Enum(_) => Ok((4, 4, None)),
                TypeSpec::Ident(names) => {
                    let size = primitive_size(names);
                    Ok((size, size, None))
                }
            },
        }
    }

    /// Size and alignment of a variable of the given type
    pub fn var_size_align(&mut self, ty: &Type) -> cu::Result<(u32, u32)> {
        let (size, align, _) = self.parse_struct_member(ty, "")?;
        Ok((size, align))
    }

    /// Size, alignment, and aggregate layout of a by-value function argument
    ///
    /// Arrays decay to pointers here. Aggregate arguments must be of a
    /// named, already laid-out type: a typedef leading to an anonymous
    /// aggregate cannot be looked up and is rejected.
    pub fn function_arg_size_align(&self, ty: &Type) -> cu::Result<(u32, u32, Option<&Struct>)> {
        let ty = self.resolve_typedefs(ty)?;
        match ty {
            Type::Ptr(_) | Type::Array(_) => Ok((4, 4, None)),
            Type::Func(_) => cu::bail!("unexpected function argument of function type"),
            Type::Decl(td) => match &td.spec {
                TypeSpec::Aggregate(agg) => {
                    let name = cu::check!(
                        agg.name.as_deref(),
                        "function argument cannot be of anonymous struct type"
                    )?;
                    let layout = cu::check!(
                        self.named_structs.get(name),
                        "function argument cannot be of incomplete struct {name}"
                    )?;
                    Ok((layout.size, layout.align, Some(layout)))
                }
                TypeSpec::Enum(_) => Ok((4, 4, None)),
                TypeSpec::Ident(names) => {
                    let size = primitive_size(names);
                    Ok((size, size, None))
                }
            },
        }
    }
}
