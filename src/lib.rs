//! # cql-named-bind
//!
//! Named parameter binding, struct mapping and UDT codecs for wide-column
//! (CQL) row sources.
//!
//! ## Features
//!
//! - **Named Placeholders**: Use `:param_name` instead of `?` in your CQL
//!   statements; compilation keeps the ordered name list so positional
//!   argument order can never drift
//! - **Struct Mapping**: Resolve placeholder names and result columns
//!   against struct fields through a per-type, build-once traversal cache
//! - **Flattened Embedding**: Fields of embedded sub-structs resolve as if
//!   they belonged to the parent
//! - **UDT Codecs**: Attribute-wise (de)serialization of user-defined
//!   composite types, recursing through lists and string-keyed maps
//! - **Strict by Default**: A result column without a matching field is a
//!   hard error; unsafe mode downgrades it to a logged skip
//! - **Driver Agnostic**: The transport is visible only through the
//!   synchronous [`iter::RowSource`] trait
//!
//! ## Quick Start
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! cql-named-bind = "0.1"
//! ```
//!
//! Compile a named query and bind arguments from a map:
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! use cql_named_bind::{Query, Value};
//!
//! # fn example() -> cql_named_bind::Result<()> {
//! let query = Query::new("INSERT INTO users (id, name) VALUES (:id, :name)")?;
//! assert_eq!(query.statement(), "INSERT INTO users (id, name) VALUES (?, ?)");
//!
//! let mut args = HashMap::new();
//! args.insert("id".to_owned(), Value::Int(42));
//! args.insert("name".to_owned(), Value::Text("John Doe".to_owned()));
//!
//! // ordered by the name list: [id, name]
//! let positional = query.bind_map(&args)?;
//! assert_eq!(positional, vec![Value::Int(42), Value::Text("John Doe".to_owned())]);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Binding and scanning structs
//!
//! A struct opts into name-based resolution by implementing
//! [`entity::Entity`] (a derive macro is planned; the implementation
//! below is what it will generate):
//!
//! ```rust
//! use std::any::TypeId;
//!
//! use cql_named_bind::entity::{Entity, FieldMeta, FieldMut, RawField};
//! use cql_named_bind::value::IntoValue;
//! use cql_named_bind::{scan_as_entity, Query, Value};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct User {
//!     id: i32,
//!     name: String,
//! }
//!
//! impl Entity for User {
//!     fn meta(&self) -> &'static [FieldMeta] {
//!         static META: &[FieldMeta] = &[
//!             FieldMeta::scalar("id"),
//!             FieldMeta::scalar("name"),
//!         ];
//!         META
//!     }
//!
//!     fn type_key(&self) -> TypeId {
//!         TypeId::of::<User>()
//!     }
//!
//!     fn type_name(&self) -> &'static str {
//!         "User"
//!     }
//!
//!     fn field(&self, index: usize) -> RawField<'_> {
//!         match index {
//!             0 => RawField::Scalar(self.id.into_value()),
//!             _ => RawField::Scalar(self.name.clone().into_value()),
//!         }
//!     }
//!
//!     fn field_mut(&mut self, index: usize) -> FieldMut<'_> {
//!         match index {
//!             0 => FieldMut::Scalar(&mut self.id),
//!             _ => FieldMut::Scalar(&mut self.name),
//!         }
//!     }
//! }
//!
//! scan_as_entity!(User);
//!
//! # fn example() -> cql_named_bind::Result<()> {
//! let query = Query::new("UPDATE users SET name = :name WHERE id = :id")?;
//! let args = query.bind_struct(&User { id: 7, name: "Ada".into() })?;
//! assert_eq!(args, vec![Value::Text("Ada".into()), Value::Int(7)]);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! Scanning mirrors binding: wrap the driver's result set in a type
//! implementing [`iter::RowSource`] and use [`iter::Iter::get`] for a
//! single row (zero rows reports [`Error::NotFound`]) or
//! [`iter::Iter::select`] for all rows (zero rows is an empty, successful
//! result; the two deliberately differ).
//!
//! ## How It Works
//!
//! 1. **Compile**: Rewrite `:name` placeholders to `?` in a single pass,
//!    collecting names in occurrence order
//! 2. **Resolve**: Compile each destination type's field table once into
//!    a name → traversal index, cached per type identity
//! 3. **Bind / Scan**: Walk traversals to move values between fields and
//!    the positional wire form, wrapping UDT-marked structs
//!    attribute-wise on the way
//!
//! The per-type cache is safe under concurrent first use: callers either
//! see a fully built table or trigger exactly one build. Per-iterator
//! state (column resolution, scratch row) is single-owner and never
//! shared.
//!
//! ## Limitations
//!
//! - Placeholder names must match `[a-zA-Z0-9_.]+`
//! - One iterator instance serves one destination shape; switching
//!   destination types mid-iteration is unsupported
//! - `Entity` implementations are hand-written until the derive macro
//!   lands
//!
//! ## License
//!
//! Licensed under either of Apache License, Version 2.0 or MIT license at
//! your option.

pub mod bind;
pub mod compile;
pub mod entity;
pub mod error;
pub mod iter;
pub mod mapper;
pub mod query;
pub mod udt;
pub mod value;

#[cfg(test)]
pub(crate) mod testing;

pub use bind::Binder;
pub use compile::{compile as compile_named_query, CompiledQuery};
pub use error::{Error, Result};
pub use iter::{Iter, RowSource};
pub use mapper::Mapper;
pub use query::Query;
pub use udt::UdtCodec;
pub use value::Value;

/// Convenience re-exports for common use cases
pub mod prelude {
    pub use crate::bind::{unset_empty, Binder};
    pub use crate::entity::{Entity, FieldMeta, FieldMut, RawField};
    pub use crate::error::{Error, Result};
    pub use crate::iter::{Iter, RowSource, ScanDest, Shape};
    pub use crate::mapper::Mapper;
    pub use crate::query::Query;
    pub use crate::udt::UdtCodec;
    pub use crate::value::{FromValue, IntoValue, Value};
}
