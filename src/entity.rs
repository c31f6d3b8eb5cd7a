//! The `Entity` capability: runtime field resolution for arbitrary structs.
//!
//! Rust has no reflection, so a type opts into name-based binding and
//! scanning by implementing [`Entity`]: a static field-metadata table plus
//! indexed access to the fields themselves. The mapper compiles that table
//! once per type into a name → traversal index (see [`crate::mapper`]); the
//! binder and scanner then walk traversals through possibly nested
//! flattened sub-structs without ever matching on names again.
//!
//! A derive macro is planned; until then implementations are written by
//! hand (see the crate-level example).

use std::any::TypeId;

use crate::error::{Error, Result};
use crate::value::{Value, ValueSink};

/// An ordered list of field indices locating a possibly nested field.
/// An empty traversal means "unresolved".
pub type Traversal = Vec<usize>;

/// Static description of one struct field, in declaration order.
pub struct FieldMeta {
    /// Declared field name; fed through the mapper's rename function.
    pub name: &'static str,
    /// Explicit bind name, overriding the rename function.
    pub tag: Option<&'static str>,
    /// Set for flattened sub-structs; yields the child's own field table.
    /// A function pointer so metadata is reachable without an instance.
    pub nested: Option<fn() -> &'static [FieldMeta]>,
}

impl FieldMeta {
    pub const fn scalar(name: &'static str) -> Self {
        FieldMeta {
            name,
            tag: None,
            nested: None,
        }
    }

    pub const fn tagged(name: &'static str, tag: &'static str) -> Self {
        FieldMeta {
            name,
            tag: Some(tag),
            nested: None,
        }
    }

    pub const fn flattened(name: &'static str, meta: fn() -> &'static [FieldMeta]) -> Self {
        FieldMeta {
            name,
            tag: None,
            nested: Some(meta),
        }
    }
}

/// Read access to one resolved field, before it crosses the wire.
///
/// Struct-valued fields stay structural here so the UDT wrap pass
/// ([`crate::udt::UdtCodec::wrap`]) can decide attribute-wise encoding per
/// element; only [`RawField::Scalar`] is already in wire form.
pub enum RawField<'a> {
    Scalar(Value),
    Struct(&'a dyn Entity),
    List(Vec<RawField<'a>>),
    /// String-keyed map; maps with other key types are produced as
    /// `Scalar` by the entity implementation and pass through untouched.
    StrMap(Vec<(String, RawField<'a>)>),
}

/// Write access to one resolved field.
pub enum FieldMut<'a> {
    Scalar(&'a mut dyn ValueSink),
    Struct(&'a mut dyn Entity),
}

/// A struct whose fields can be resolved by name at runtime.
pub trait Entity: 'static {
    /// Field table in declaration order.
    fn meta(&self) -> &'static [FieldMeta];

    /// Type identity; keys the mapper cache.
    fn type_key(&self) -> TypeId;

    /// Display name for error messages.
    fn type_name(&self) -> &'static str;

    /// Opts the type into attribute-wise UDT (de)serialization.
    fn udt_marked(&self) -> bool {
        false
    }

    /// Reads field `index` of [`Entity::meta`].
    fn field(&self, index: usize) -> RawField<'_>;

    /// Write access to field `index` of [`Entity::meta`].
    fn field_mut(&mut self, index: usize) -> FieldMut<'_>;
}

/// Walks `traversal` down `entity`, descending through flattened
/// sub-structs, and returns the addressed field.
pub fn walk<'a>(entity: &'a dyn Entity, traversal: &[usize]) -> Result<RawField<'a>> {
    let (last, inner) = traversal
        .split_last()
        .ok_or_else(|| Error::shape("empty traversal"))?;
    let mut current = entity;
    for &index in inner {
        match current.field(index) {
            RawField::Struct(sub) => current = sub,
            _ => {
                return Err(Error::shape(format!(
                    "traversal descends through a non-struct field of {}",
                    current.type_name()
                )))
            }
        }
    }
    Ok(current.field(*last))
}

/// Mutable counterpart of [`walk`].
pub fn walk_mut<'a>(entity: &'a mut dyn Entity, traversal: &[usize]) -> Result<FieldMut<'a>> {
    let (last, inner) = traversal
        .split_last()
        .ok_or_else(|| Error::shape("empty traversal"))?;
    let mut current = entity;
    for &index in inner {
        match current.field_mut(index) {
            FieldMut::Struct(sub) => current = sub,
            _ => {
                return Err(Error::shape(
                    "traversal descends through a non-struct field",
                ))
            }
        }
    }
    Ok(current.field_mut(*last))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::testing::{Account, Audit};
    use crate::value::FromValue;

    #[test]
    fn test_walk_top_level_field() {
        let account = Account {
            id: "acc-1".into(),
            balance: 250,
            audit: Audit::default(),
        };
        match walk(&account, &[1]).unwrap() {
            RawField::Scalar(v) => assert_eq!(v, Value::BigInt(250)),
            _ => panic!("expected scalar"),
        }
    }

    #[test]
    fn test_walk_descends_flattened_struct() {
        let account = Account {
            id: "acc-1".into(),
            balance: 0,
            audit: Audit {
                created_at: 11,
                updated_at: 22,
            },
        };
        match walk(&account, &[2, 1]).unwrap() {
            RawField::Scalar(v) => assert_eq!(v, Value::Timestamp(22)),
            _ => panic!("expected scalar"),
        }
    }

    #[test]
    fn test_walk_mut_writes_nested_field() {
        let mut account = Account::default();
        match walk_mut(&mut account, &[2, 0]).unwrap() {
            FieldMut::Scalar(slot) => slot.put(Value::Timestamp(99)).unwrap(),
            FieldMut::Struct(_) => panic!("expected scalar slot"),
        }
        assert_eq!(account.audit.created_at, 99);
    }

    #[test]
    fn test_walk_empty_traversal_is_error() {
        let account = Account::default();
        assert!(walk(&account, &[]).is_err());
    }

    #[test]
    fn test_walk_through_scalar_is_error() {
        let account = Account::default();
        // index 0 is the scalar `id` field, not a struct
        assert!(walk(&account, &[0, 0]).is_err());
    }

    #[test]
    fn test_from_value_via_sink_matches_direct_conversion() {
        let mut direct = String::new();
        ValueSink::put(&mut direct, Value::Text("x".into())).unwrap();
        assert_eq!(direct, String::from_value(Value::Text("x".into())).unwrap());
    }
}
