//! Attribute-wise (de)serialization of user-defined composite types.
//!
//! A struct opts in by returning `true` from [`Entity::udt_marked`]; its
//! wire form is then a named tuple of sub-attributes ([`Value::Udt`])
//! rather than one opaque value. The codec resolves attribute names
//! through the mapper and recurses through collections, so lists and
//! string-keyed maps of UDTs encode element by element.

use std::sync::Arc;

use crate::entity::{walk, walk_mut, Entity, FieldMut, RawField};
use crate::error::{Error, Result};
use crate::mapper::{default_mapper, Mapper};
use crate::value::Value;

/// Mapper-driven codec for UDT-marked entities.
pub struct UdtCodec {
    mapper: Arc<Mapper>,
    lenient: bool,
}

impl UdtCodec {
    pub fn new() -> Self {
        UdtCodec {
            mapper: default_mapper(),
            lenient: false,
        }
    }

    pub fn with_mapper(mapper: Arc<Mapper>) -> Self {
        UdtCodec {
            mapper,
            lenient: false,
        }
    }

    /// Tolerates unresolved attributes instead of failing hard.
    pub fn unsafe_mode(mut self) -> Self {
        self.lenient = true;
        self
    }

    /// Serializes the single attribute `name` of `entity`.
    ///
    /// # Errors
    ///
    /// [`Error::Resolution`] if the attribute does not resolve on the
    /// entity's type, unless unsafe mode is set (then `Null` is produced).
    pub fn marshal_attr(&self, entity: &dyn Entity, name: &str) -> Result<Value> {
        let map = self.mapper.type_map(entity);
        match map.traversal(name) {
            Some(traversal) => {
                let raw = walk(entity, traversal)?;
                let raw = self.wrap(raw)?;
                self.finalize(raw)
            }
            None if self.lenient => Ok(Value::Null),
            None => Err(Error::resolution(name, entity.type_name())),
        }
    }

    /// Decodes one attribute value into the resolved field of `entity`.
    pub fn unmarshal_attr(&self, entity: &mut dyn Entity, name: &str, value: Value) -> Result<()> {
        let map = self.mapper.type_map(&*entity);
        let Some(traversal) = map.traversal(name) else {
            if self.lenient {
                tracing::warn!(attr = name, entity = entity.type_name(), "dropping unresolved UDT attribute");
                return Ok(());
            }
            return Err(Error::resolution(name, entity.type_name()));
        };
        match walk_mut(entity, traversal)? {
            FieldMut::Scalar(slot) => slot.put(value),
            FieldMut::Struct(sub) => self.decode(sub, value),
        }
    }

    /// Serializes a whole entity attribute by attribute, in field
    /// declaration order.
    pub fn encode(&self, entity: &dyn Entity) -> Result<Value> {
        let map = self.mapper.type_map(entity);
        let mut attrs = Vec::with_capacity(map.len());
        for (name, traversal) in map.entries() {
            let raw = walk(entity, traversal)?;
            let raw = self.wrap(raw)?;
            attrs.push((name.to_owned(), self.finalize(raw)?));
        }
        Ok(Value::Udt(attrs))
    }

    /// Decodes a [`Value::Udt`] into `entity`, attribute by attribute.
    pub fn decode(&self, entity: &mut dyn Entity, value: Value) -> Result<()> {
        let Value::Udt(attrs) = value else {
            return Err(Error::shape(format!(
                "cannot decode {} into UDT {}",
                value.kind(),
                entity.type_name()
            )));
        };
        for (name, value) in attrs {
            self.unmarshal_attr(entity, &name, value)?;
        }
        Ok(())
    }

    /// The recursive wrap pass over a value about to cross the wire.
    ///
    /// UDT-marked structs are encoded attribute-wise, lists and
    /// string-keyed maps recurse per element, and everything else,
    /// including plain structs, passes through unmodified. The pass runs
    /// fresh on every call; bind paths that are known UDT-free can skip
    /// it entirely (see [`crate::bind::Binder::without_udt_wrap`]).
    pub fn wrap<'a>(&self, field: RawField<'a>) -> Result<RawField<'a>> {
        Ok(match field {
            RawField::Struct(entity) if entity.udt_marked() => {
                RawField::Scalar(self.encode(entity)?)
            }
            RawField::List(items) => RawField::List(
                items
                    .into_iter()
                    .map(|item| self.wrap(item))
                    .collect::<Result<_>>()?,
            ),
            RawField::StrMap(pairs) => RawField::StrMap(
                pairs
                    .into_iter()
                    .map(|(key, item)| Ok((key, self.wrap(item)?)))
                    .collect::<Result<_>>()?,
            ),
            other => other,
        })
    }

    /// Collapses a (wrapped) field into its final wire value.
    ///
    /// A struct that survives to this point was never UDT-wrapped and has
    /// no whole-value wire form, which is a shape error.
    pub fn finalize(&self, field: RawField<'_>) -> Result<Value> {
        match field {
            RawField::Scalar(value) => Ok(value),
            RawField::Struct(entity) => Err(Error::shape(format!(
                "{} is not UDT-marked and cannot be serialized as one value",
                entity.type_name()
            ))),
            RawField::List(items) => Ok(Value::List(
                items
                    .into_iter()
                    .map(|item| self.finalize(item))
                    .collect::<Result<_>>()?,
            )),
            RawField::StrMap(pairs) => Ok(Value::Map(
                pairs
                    .into_iter()
                    .map(|(key, item)| Ok((Value::Text(key), self.finalize(item)?)))
                    .collect::<Result<_>>()?,
            )),
        }
    }
}

impl Default for UdtCodec {
    fn default() -> Self {
        UdtCodec::new()
    }
}

/// Implements [`crate::value::FromValue`] for UDT-marked entity types by
/// delegating to the default codec, so collections of UDTs decode through
/// the ordinary conversion machinery.
#[macro_export]
macro_rules! udt_from_value {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::value::FromValue for $ty {
            fn from_value(value: $crate::value::Value) -> $crate::error::Result<Self> {
                let mut out = <$ty as ::core::default::Default>::default();
                $crate::udt::UdtCodec::new().decode(&mut out, value)?;
                Ok(out)
            }
        }
    )+};
}
