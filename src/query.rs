//! The query front object: compiled statement, name list, binder
//! configuration.
//!
//! `Query` keeps a statement and the ordered name list it was compiled
//! with together, so the positional argument lists it produces can never
//! drift out of order. It is the per-statement analog of holding a
//! template and rebuilding arguments on each execution.

use std::collections::HashMap;
use std::sync::Arc;

use crate::bind::{Binder, TransformFn};
use crate::compile::{compile, CompiledQuery};
use crate::entity::Entity;
use crate::error::Result;
use crate::iter::{Iter, RowSource};
use crate::mapper::{default_mapper, Mapper};
use crate::value::Value;

/// A compiled named query plus its binding configuration.
///
/// # Examples
///
/// ```
/// use cql_named_bind::Query;
///
/// let query = Query::new("SELECT id, name FROM users WHERE id = :id")?;
/// assert_eq!(query.statement(), "SELECT id, name FROM users WHERE id = ?");
/// assert_eq!(query.names(), ["id"]);
/// # Ok::<(), cql_named_bind::Error>(())
/// ```
pub struct Query {
    stmt: String,
    names: Vec<String>,
    mapper: Arc<Mapper>,
    transform: Option<TransformFn>,
    wrap_udts: bool,
}

impl Query {
    /// Compiles a `:name` template into a positional statement.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Compile`] for a malformed template.
    pub fn new(template: &str) -> Result<Self> {
        let CompiledQuery { stmt, names } = compile(template)?;
        Ok(Query::from_parts(stmt, names))
    }

    /// Adopts a statement and ordered name list produced by an external
    /// statement builder.
    ///
    /// The pairing is not validated against the statement text; handing
    /// over a name list that does not match the statement's positional
    /// markers silently corrupts argument order.
    pub fn from_parts(stmt: impl Into<String>, names: Vec<String>) -> Self {
        Query {
            stmt: stmt.into(),
            names,
            mapper: default_mapper(),
            transform: None,
            wrap_udts: true,
        }
    }

    pub fn with_mapper(mut self, mapper: Arc<Mapper>) -> Self {
        self.mapper = mapper;
        self
    }

    /// Applies `transform` to every bound value (see
    /// [`crate::bind::unset_empty`]).
    pub fn with_transform(mut self, transform: TransformFn) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Skips the UDT wrap pass when binding (see
    /// [`crate::bind::Binder::without_udt_wrap`]).
    pub fn without_udt_wrap(mut self) -> Self {
        self.wrap_udts = false;
        self
    }

    /// The positional statement text.
    pub fn statement(&self) -> &str {
        &self.stmt
    }

    /// Placeholder names in positional order, duplicates preserved.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Binds `entity`'s fields into a positional argument list.
    pub fn bind_struct(&self, entity: &dyn Entity) -> Result<Vec<Value>> {
        self.binder().bind_struct(&self.names, entity)
    }

    /// Like [`Query::bind_struct`], consulting `fallback` for names the
    /// entity does not cover.
    pub fn bind_struct_with(
        &self,
        entity: &dyn Entity,
        fallback: &HashMap<String, Value>,
    ) -> Result<Vec<Value>> {
        self.binder()
            .bind_struct_with(&self.names, entity, fallback)
    }

    /// Binds values looked up directly from a map.
    pub fn bind_map(&self, values: &HashMap<String, Value>) -> Result<Vec<Value>> {
        self.binder().bind_map(&self.names, values)
    }

    /// Wraps a result set produced for this query, inheriting the
    /// query's mapper.
    pub fn iter<S: RowSource>(&self, source: S) -> Iter<S> {
        Iter::new(source).with_mapper(self.mapper.clone())
    }

    fn binder(&self) -> Binder {
        let binder = Binder::new().with_mapper(self.mapper.clone());
        let binder = match self.transform {
            Some(transform) => binder.with_transform(transform),
            None => binder,
        };
        if self.wrap_udts {
            binder
        } else {
            binder.without_udt_wrap()
        }
    }
}
