//! Turning a named argument source into an ordered positional value list.
//!
//! A [`Binder`] resolves each name of a compiled statement against either
//! a struct ([`Entity`]) or a flat string-keyed map and emits the values
//! in name-list order. That order must exactly match the name list the
//! statement was compiled with; there is no runtime cross-check against
//! the statement text, so a mismatched pairing silently corrupts argument
//! order rather than erroring. Keeping statement and name list together
//! is the caller's obligation (or use [`crate::query::Query`], which
//! does).

use std::collections::HashMap;
use std::sync::Arc;

use crate::entity::{walk, Entity};
use crate::error::{Error, Result};
use crate::mapper::{default_mapper, Mapper};
use crate::udt::UdtCodec;
use crate::value::Value;

/// Pure per-value hook applied after resolution, before the positional
/// list is returned. Must be side-effect-free and order-independent.
pub type TransformFn = fn(&str, Value) -> Value;

/// Transform mapping null and empty values to the driver's `Unset`
/// sentinel, so partial updates do not unintentionally clear columns.
pub fn unset_empty(_name: &str, value: Value) -> Value {
    match &value {
        Value::Null => Value::Unset,
        Value::Text(s) if s.is_empty() => Value::Unset,
        Value::Blob(b) if b.is_empty() => Value::Unset,
        Value::List(v) if v.is_empty() => Value::Unset,
        Value::Map(v) if v.is_empty() => Value::Unset,
        Value::Udt(v) if v.is_empty() => Value::Unset,
        _ => value,
    }
}

/// Binds named argument sources into positional value lists.
pub struct Binder {
    mapper: Arc<Mapper>,
    transform: Option<TransformFn>,
    wrap_udts: bool,
}

impl Binder {
    pub fn new() -> Self {
        Binder {
            mapper: default_mapper(),
            transform: None,
            wrap_udts: true,
        }
    }

    pub fn with_mapper(mut self, mapper: Arc<Mapper>) -> Self {
        self.mapper = mapper;
        self
    }

    pub fn with_transform(mut self, transform: TransformFn) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Skips the recursive UDT wrap pass ("fast" path). Only safe when
    /// the bound values are known to contain no UDT-marked structs.
    pub fn without_udt_wrap(mut self) -> Self {
        self.wrap_udts = false;
        self
    }

    /// Resolves `names` against `entity` and returns the values in
    /// name-list order.
    ///
    /// # Errors
    ///
    /// [`Error::Resolution`] naming the first field that does not resolve.
    pub fn bind_struct<S: AsRef<str>>(&self, names: &[S], entity: &dyn Entity) -> Result<Vec<Value>> {
        self.bind(names, entity, None)
    }

    /// Like [`Binder::bind_struct`], but unresolved names consult
    /// `fallback` before failing.
    pub fn bind_struct_with<S: AsRef<str>>(
        &self,
        names: &[S],
        entity: &dyn Entity,
        fallback: &HashMap<String, Value>,
    ) -> Result<Vec<Value>> {
        self.bind(names, entity, Some(fallback))
    }

    /// Looks each name up directly in `values`; a missing key is a hard
    /// error.
    pub fn bind_map<S: AsRef<str>>(
        &self,
        names: &[S],
        values: &HashMap<String, Value>,
    ) -> Result<Vec<Value>> {
        let mut out = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let value = values
                .get(name)
                .cloned()
                .ok_or_else(|| Error::resolution(name, "map"))?;
            out.push(self.transformed(name, value));
        }
        Ok(out)
    }

    fn bind<S: AsRef<str>>(
        &self,
        names: &[S],
        entity: &dyn Entity,
        fallback: Option<&HashMap<String, Value>>,
    ) -> Result<Vec<Value>> {
        let codec = UdtCodec::with_mapper(self.mapper.clone());
        let traversals = self.mapper.traversals(entity, names);
        let mut out = Vec::with_capacity(names.len());
        for (name, traversal) in names.iter().zip(&traversals) {
            let name = name.as_ref();
            let value = if traversal.is_empty() {
                match fallback.and_then(|map| map.get(name)) {
                    Some(value) => value.clone(),
                    None => return Err(Error::resolution(name, entity.type_name())),
                }
            } else {
                let raw = walk(entity, traversal)?;
                let raw = if self.wrap_udts { codec.wrap(raw)? } else { raw };
                codec.finalize(raw)?
            };
            out.push(self.transformed(name, value));
        }
        Ok(out)
    }

    fn transformed(&self, name: &str, value: Value) -> Value {
        match self.transform {
            Some(transform) => transform(name, value),
            None => value,
        }
    }
}

impl Default for Binder {
    fn default() -> Self {
        Binder::new()
    }
}
