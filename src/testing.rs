//! Shared fixtures for unit tests: hand-written `Entity` implementations
//! (what the planned derive macro will generate) and an in-memory row
//! source.

use std::any::TypeId;
use std::collections::VecDeque;

use crate::entity::{Entity, FieldMeta, FieldMut, RawField};
use crate::error::Result;
use crate::iter::{RowSource, Shape, ScanDest};
use crate::value::{IntoValue, Value};
use crate::{scan_as_entity, udt_from_value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: Option<String>,
}

impl User {
    fn meta_table() -> &'static [FieldMeta] {
        static META: &[FieldMeta] = &[
            FieldMeta::scalar("id"),
            FieldMeta::tagged("name", "full_name"),
            FieldMeta::scalar("email"),
        ];
        META
    }
}

impl Entity for User {
    fn meta(&self) -> &'static [FieldMeta] {
        User::meta_table()
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
            _ => unreachable!("User has 3 fields"),
        }
    }

    fn field_mut(&mut self, index: usize) -> FieldMut<'_> {
        match index {
            0 => FieldMut::Scalar(&mut self.id),
            1 => FieldMut::Scalar(&mut self.name),
            2 => FieldMut::Scalar(&mut self.email),
            _ => unreachable!("User has 3 fields"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Audit {
    pub created_at: i64,
    pub updated_at: i64,
}

impl Audit {
    fn meta_table() -> &'static [FieldMeta] {
        static META: &[FieldMeta] = &[
            FieldMeta::scalar("created_at"),
            FieldMeta::scalar("updated_at"),
        ];
        META
    }
}

impl Entity for Audit {
    fn meta(&self) -> &'static [FieldMeta] {
        Audit::meta_table()
    }

    fn type_key(&self) -> TypeId {
        TypeId::of::<Audit>()
    }

    fn type_name(&self) -> &'static str {
        "Audit"
    }

    fn field(&self, index: usize) -> RawField<'_> {
        match index {
            0 => RawField::Scalar(Value::Timestamp(self.created_at)),
            1 => RawField::Scalar(Value::Timestamp(self.updated_at)),
            _ => unreachable!("Audit has 2 fields"),
        }
    }

    fn field_mut(&mut self, index: usize) -> FieldMut<'_> {
        match index {
            0 => FieldMut::Scalar(&mut self.created_at),
            1 => FieldMut::Scalar(&mut self.updated_at),
            _ => unreachable!("Audit has 2 fields"),
        }
    }
}

/// Flattened-embedding fixture: `audit`'s fields resolve on `Account`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Account {
    pub id: String,
    pub balance: i64,
    pub audit: Audit,
}

impl Account {
    fn meta_table() -> &'static [FieldMeta] {
        static META: &[FieldMeta] = &[
            FieldMeta::scalar("id"),
            FieldMeta::scalar("balance"),
            FieldMeta::flattened("audit", Audit::meta_table),
        ];
        META
    }
}

impl Entity for Account {
    fn meta(&self) -> &'static [FieldMeta] {
        Account::meta_table()
    }

    fn type_key(&self) -> TypeId {
        TypeId::of::<Account>()
    }

    fn type_name(&self) -> &'static str {
        "Account"
    }

    fn field(&self, index: usize) -> RawField<'_> {
        match index {
            0 => RawField::Scalar(self.id.clone().into_value()),
            1 => RawField::Scalar(self.balance.into_value()),
            2 => RawField::Struct(&self.audit),
            _ => unreachable!("Account has 3 fields"),
        }
    }

    fn field_mut(&mut self, index: usize) -> FieldMut<'_> {
        match index {
            0 => FieldMut::Scalar(&mut self.id),
            1 => FieldMut::Scalar(&mut self.balance),
            2 => FieldMut::Struct(&mut self.audit),
            _ => unreachable!("Account has 3 fields"),
        }
    }
}

/// UDT-marked fixture.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    fn meta_table() -> &'static [FieldMeta] {
        static META: &[FieldMeta] = &[FieldMeta::scalar("x"), FieldMeta::scalar("y")];
        META
    }
}

impl Entity for Point {
    fn meta(&self) -> &'static [FieldMeta] {
        Point::meta_table()
    }

    fn type_key(&self) -> TypeId {
        TypeId::of::<Point>()
    }

    fn type_name(&self) -> &'static str {
        "Point"
    }

    fn udt_marked(&self) -> bool {
        true
    }

    fn field(&self, index: usize) -> RawField<'_> {
        match index {
            0 => RawField::Scalar(self.x.into_value()),
            1 => RawField::Scalar(self.y.into_value()),
            _ => unreachable!("Point has 2 fields"),
        }
    }

    fn field_mut(&mut self, index: usize) -> FieldMut<'_> {
        match index {
            0 => FieldMut::Scalar(&mut self.x),
            1 => FieldMut::Scalar(&mut self.y),
            _ => unreachable!("Point has 2 fields"),
        }
    }
}

udt_from_value!(Point);

/// Entity holding a UDT field and a list of UDTs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Route {
    pub id: i32,
    pub start: Point,
    pub waypoints: Vec<Point>,
}

impl Route {
    fn meta_table() -> &'static [FieldMeta] {
        static META: &[FieldMeta] = &[
            FieldMeta::scalar("id"),
            FieldMeta::scalar("start"),
            FieldMeta::scalar("waypoints"),
        ];
        META
    }
}

impl Entity for Route {
    fn meta(&self) -> &'static [FieldMeta] {
        Route::meta_table()
    }

    fn type_key(&self) -> TypeId {
        TypeId::of::<Route>()
    }

    fn type_name(&self) -> &'static str {
        "Route"
    }

    fn field(&self, index: usize) -> RawField<'_> {
        match index {
            0 => RawField::Scalar(self.id.into_value()),
            1 => RawField::Struct(&self.start),
            2 => RawField::List(
                self.waypoints
                    .iter()
                    .map(|p| RawField::Struct(p as &dyn Entity))
                    .collect(),
            ),
            _ => unreachable!("Route has 3 fields"),
        }
    }

    fn field_mut(&mut self, index: usize) -> FieldMut<'_> {
        match index {
            0 => FieldMut::Scalar(&mut self.id),
            1 => FieldMut::Scalar(&mut self.start),
            2 => FieldMut::Scalar(&mut self.waypoints),
            _ => unreachable!("Route has 3 fields"),
        }
    }
}

/// Plain struct without the UDT marker; the wrap pass must leave it
/// untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlainPair {
    pub a: i32,
    pub b: i32,
}

impl PlainPair {
    fn meta_table() -> &'static [FieldMeta] {
        static META: &[FieldMeta] = &[FieldMeta::scalar("a"), FieldMeta::scalar("b")];
        META
    }
}

impl Entity for PlainPair {
    fn meta(&self) -> &'static [FieldMeta] {
        PlainPair::meta_table()
    }

    fn type_key(&self) -> TypeId {
        TypeId::of::<PlainPair>()
    }

    fn type_name(&self) -> &'static str {
        "PlainPair"
    }

    fn field(&self, index: usize) -> RawField<'_> {
        match index {
            0 => RawField::Scalar(self.a.into_value()),
            1 => RawField::Scalar(self.b.into_value()),
            _ => unreachable!("PlainPair has 2 fields"),
        }
    }

    fn field_mut(&mut self, index: usize) -> FieldMut<'_> {
        match index {
            0 => FieldMut::Scalar(&mut self.a),
            1 => FieldMut::Scalar(&mut self.b),
            _ => unreachable!("PlainPair has 2 fields"),
        }
    }
}

/// Struct with zero mappable fields; classified scannable by the iterator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoFields;

impl Entity for NoFields {
    fn meta(&self) -> &'static [FieldMeta] {
        &[]
    }

    fn type_key(&self) -> TypeId {
        TypeId::of::<NoFields>()
    }

    fn type_name(&self) -> &'static str {
        "NoFields"
    }

    fn field(&self, _index: usize) -> RawField<'_> {
        unreachable!("NoFields has no fields")
    }

    fn field_mut(&mut self, _index: usize) -> FieldMut<'_> {
        unreachable!("NoFields has no fields")
    }
}

scan_as_entity!(User, Account, Route, NoFields);

/// Destination with its own whole-value codec.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCell {
    pub data: Value,
}

impl Default for RawCell {
    fn default() -> Self {
        RawCell { data: Value::Null }
    }
}

impl ScanDest for RawCell {
    fn shape(&self) -> Shape {
        Shape::Custom
    }

    fn read_value(&mut self, value: Value) -> Result<()> {
        self.data = value;
        Ok(())
    }
}

/// In-memory [`RowSource`].
pub struct MockRows {
    columns: Vec<String>,
    rows: VecDeque<Vec<Value>>,
    error: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl MockRows {
    pub fn new(columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        MockRows {
            columns: columns.iter().map(|c| (*c).to_owned()).collect(),
            rows: rows.into(),
            error: None,
        }
    }

    /// A source whose terminal signal reports `message`.
    pub fn failing(columns: &[&str], rows: Vec<Vec<Value>>, message: &str) -> Self {
        let mut source = MockRows::new(columns, rows);
        source.error = Some(Box::new(std::io::Error::new(
            std::io::ErrorKind::Other,
            message.to_owned(),
        )));
        source
    }
}

impl RowSource for MockRows {
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
        self.error.take()
    }
}

/// Shorthand for [`MockRows::new`].
pub fn rows(columns: &[&str], data: Vec<Vec<Value>>) -> MockRows {
    MockRows::new(columns, data)
}
