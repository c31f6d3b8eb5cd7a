//! Basic example demonstrating named-query compilation, struct binding
//! and row scanning over an in-memory row source.
//!
//! Run with: cargo run --example basic

use std::any::TypeId;
use std::collections::{HashMap, VecDeque};

use cql_named_bind::entity::{Entity, FieldMeta, FieldMut, RawField};
use cql_named_bind::iter::RowSource;
use cql_named_bind::value::IntoValue;
use cql_named_bind::{scan_as_entity, Iter, Query, Value};

#[derive(Debug, Default, Clone, PartialEq)]
struct User {
    id: i32,
    name: String,
    email: Option<String>,
}

impl Entity for User {
    fn meta(&self) -> &'static [FieldMeta] {
        static META: &[FieldMeta] = &[
            FieldMeta::scalar("id"),
            FieldMeta::scalar("name"),
            FieldMeta::scalar("email"),
        ];
        META
    }

    fn type_key(&self) -> TypeId {
        TypeId::of::<User>()
    }

    fn type_name(&self) -> &'static str {
        "User"
    }

    fn field(&self, index: usize) -> RawField<'_> {
        match index {
            0 => RawField::Scalar(self.id.into_value()),
            1 => RawField::Scalar(self.name.clone().into_value()),
            2 => RawField::Scalar(self.email.clone().into_value()),
            _ => unreachable!(),
        }
    }

    fn field_mut(&mut self, index: usize) -> FieldMut<'_> {
        match index {
            0 => FieldMut::Scalar(&mut self.id),
            1 => FieldMut::Scalar(&mut self.name),
            2 => FieldMut::Scalar(&mut self.email),
            _ => unreachable!(),
        }
    }
}

scan_as_entity!(User);

/// Stand-in for a driver result set.
struct MemoryRows {
    columns: Vec<String>,
    rows: VecDeque<Vec<Value>>,
}

impl MemoryRows {
    fn new(columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        MemoryRows {
            columns: columns.iter().map(|c| (*c).to_owned()).collect(),
            rows: rows.into(),
        }
    }
}

impl RowSource for MemoryRows {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn scan(&mut self, dest: &mut [Value]) -> bool {
        match self.rows.pop_front() {
            Some(row) => {
                for (slot, value) in dest.iter_mut().zip(row) {
                    *slot = value;
                }
                true
            }
            None => false,
        }
    }

    fn take_error(&mut self) -> Option<Box<dyn std::error::Error + Send + Sync>> {
        None
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().init();

    // Example 1: compile a named query
    println!("--- Example 1: Compiling a named query ---");
    let insert = Query::new("INSERT INTO users (id, name, email) VALUES (:id, :name, :email)")?;
    println!("statement: {}", insert.statement());
    println!("names:     {:?}", insert.names());

    // Example 2: bind arguments from a struct
    println!("\n--- Example 2: Binding a struct ---");
    let alice = User {
        id: 1,
        name: "Alice".into(),
        email: Some("alice@example.com".into()),
    };
    let args = insert.bind_struct(&alice)?;
    println!("positional args: {args:?}");

    // Example 3: bind arguments from a map
    println!("\n--- Example 3: Binding a map ---");
    let delete = Query::new("DELETE FROM users WHERE id = :id")?;
    let mut values = HashMap::new();
    values.insert("id".to_owned(), Value::Int(3));
    println!("positional args: {:?}", delete.bind_map(&values)?);

    // Example 4: scan rows back into structs
    println!("\n--- Example 4: Scanning rows ---");
    let result = MemoryRows::new(
        &["id", "name", "email"],
        vec![
            vec![
                Value::Int(1),
                Value::Text("Alice".into()),
                Value::Text("alice@example.com".into()),
            ],
            vec![Value::Int(2), Value::Text("Bob".into()), Value::Null],
        ],
    );
    let mut users: Vec<User> = Vec::new();
    Iter::new(result).select(&mut users)?;
    for user in &users {
        println!("  - {} (id={}, email={:?})", user.name, user.id, user.email);
    }

    // Example 5: single-row fetch and the NotFound outcome
    println!("\n--- Example 5: Single-row fetch ---");
    let empty = MemoryRows::new(&["id", "name", "email"], vec![]);
    let mut missing = User::default();
    match Iter::new(empty).get(&mut missing) {
        Err(err) if err.is_not_found() => println!("no such user (NotFound, as expected)"),
        other => println!("unexpected outcome: {other:?}"),
    }

    println!("\nExample completed successfully!");
    Ok(())
}
