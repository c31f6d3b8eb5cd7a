//! Row scanning: resolving result columns onto destinations.
//!
//! [`Iter`] wraps a synchronous [`RowSource`] and populates scalar or
//! struct destinations row by row. Column resolution happens once, on the
//! first scan, and is cached for the iterator's remaining lifetime;
//! reusing one iterator with structurally different destination types is
//! unsupported. Per-row failures are recorded, never raised in place, and
//! surface from [`Iter::close`]; a caller that only watches the per-row
//! boolean still observes them there.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::entity::{walk_mut, Entity, FieldMut, Traversal};
use crate::error::{Error, Result};
use crate::mapper::{default_mapper, Mapper};
use crate::value::{Value, ValueSink};

/// Reserved first-column name of lightweight-transaction results. Exempt
/// from missing-field validation; captured into [`Iter::was_applied`].
pub const APPLIED_COLUMN: &str = "[applied]";

static DEFAULT_UNSAFE: AtomicBool = AtomicBool::new(false);

/// Sets the process-wide default for unsafe mode. Iterators created
/// afterwards start with this flag; [`Iter::unsafe_mode`] overrides it
/// per iterator.
pub fn set_default_unsafe(value: bool) {
    DEFAULT_UNSAFE.store(value, Ordering::Relaxed);
}

pub(crate) fn default_unsafe() -> bool {
    DEFAULT_UNSAFE.load(Ordering::Relaxed)
}

/// The synchronous row source contract: everything this crate sees of
/// the transport.
pub trait RowSource {
    /// Column names of the result set, in positional order.
    fn columns(&self) -> &[String];

    /// Scans the current row into `dest` (one slot per column) and
    /// advances. Returns `false` on exhaustion or transport failure; the
    /// failure itself is reported through [`RowSource::take_error`].
    fn scan(&mut self, dest: &mut [Value]) -> bool;

    /// Terminal error signal, consumed once when the iterator closes.
    fn take_error(&mut self) -> Option<Box<dyn std::error::Error + Send + Sync>>;
}

/// How the iterator treats a destination type, decided once per iterator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// One opaque value; the row must have exactly one column.
    Scalar,
    /// Decomposed column by column through the mapper.
    Struct,
    /// A struct with its own whole-value codec; scanned like a scalar.
    Custom,
}

/// A destination for scanned rows.
pub trait ScanDest {
    fn shape(&self) -> Shape;

    /// Scalar and custom-codec path: consume the single column value.
    fn read_value(&mut self, value: Value) -> Result<()>;

    /// Struct path: the entity view used for field-wise population.
    fn entity_mut(&mut self) -> Option<&mut dyn Entity> {
        None
    }
}

macro_rules! scan_as_value {
    ($($ty:ty),+ $(,)?) => {$(
        impl ScanDest for $ty {
            fn shape(&self) -> Shape {
                Shape::Scalar
            }

            fn read_value(&mut self, value: Value) -> Result<()> {
                ValueSink::put(self, value)
            }
        }
    )+};
}

scan_as_value! {
    bool, i8, i16, i32, i64, f32, f64, String,
    crate::value::Bytes, [u8; 16], Value,
}

impl<T: crate::value::FromValue> ScanDest for Option<T> {
    fn shape(&self) -> Shape {
        Shape::Scalar
    }

    fn read_value(&mut self, value: Value) -> Result<()> {
        ValueSink::put(self, value)
    }
}

/// Implements [`ScanDest`] for entity types, routing them through the
/// struct path.
#[macro_export]
macro_rules! scan_as_entity {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::iter::ScanDest for $ty {
            fn shape(&self) -> $crate::iter::Shape {
                $crate::iter::Shape::Struct
            }

            fn read_value(&mut self, _value: $crate::value::Value) -> $crate::error::Result<()> {
                Err($crate::error::Error::Shape(format!(
                    "{} has no whole-value codec and no mappable fields matched",
                    $crate::entity::Entity::type_name(self)
                )))
            }

            fn entity_mut(&mut self) -> Option<&mut dyn $crate::entity::Entity> {
                Some(self)
            }
        }
    )+};
}

enum State {
    NotStarted,
    Scanning,
    Closed,
}

enum Resolution {
    /// Single opaque destination (scalar, custom codec, or a struct with
    /// zero mappable fields).
    Whole,
    /// Field-wise destination; one traversal per column, empty meaning
    /// "skipped" (only reachable in unsafe mode).
    Fields {
        traversals: Vec<Traversal>,
        applied_slot: Option<usize>,
    },
}

/// Per-iterator scanning engine over a [`RowSource`].
pub struct Iter<S> {
    source: S,
    mapper: Arc<Mapper>,
    lenient: bool,
    state: State,
    resolution: Option<Resolution>,
    scratch: Vec<Value>,
    first_err: Option<Error>,
    applied: Option<bool>,
}

impl<S: RowSource> Iter<S> {
    pub fn new(source: S) -> Self {
        Iter {
            source,
            mapper: default_mapper(),
            lenient: default_unsafe(),
            state: State::NotStarted,
            resolution: None,
            scratch: Vec::new(),
            first_err: None,
            applied: None,
        }
    }

    pub fn with_mapper(mut self, mapper: Arc<Mapper>) -> Self {
        self.mapper = mapper;
        self
    }

    /// Downgrades "result column without matching field" from a hard
    /// error to a logged skip for this iterator.
    pub fn unsafe_mode(mut self) -> Self {
        self.lenient = true;
        self
    }

    /// Scans the next row into `dest`. Returns `false` on exhaustion or
    /// failure; failures are recorded and surface from [`Iter::close`].
    pub fn scan_one<T: ScanDest>(&mut self, dest: &mut T) -> bool {
        if matches!(self.state, State::Closed) || self.first_err.is_some() {
            return false;
        }
        if matches!(self.state, State::NotStarted) {
            self.state = State::Scanning;
            self.scratch = vec![Value::Null; self.source.columns().len()];
        }
        if self.resolution.is_none() {
            match resolve(&self.mapper, self.lenient, &self.source, dest) {
                Ok(resolution) => self.resolution = Some(resolution),
                Err(err) => {
                    self.record(err);
                    return false;
                }
            }
        }
        if !self.source.scan(&mut self.scratch) {
            return false;
        }
        let resolution = match self.resolution.as_ref() {
            Some(resolution) => resolution,
            None => return false,
        };
        match fill_row(resolution, &mut self.scratch, &mut self.applied, dest) {
            Ok(()) => true,
            Err(err) => {
                self.record(err);
                false
            }
        }
    }

    /// Single-row fetch: scans exactly one row into `dest` and closes.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when the result has zero rows; any recorded
    /// scan or transport error takes precedence.
    pub fn get<T: ScanDest>(&mut self, dest: &mut T) -> Result<()> {
        if self.scan_one(dest) {
            return self.close();
        }
        self.close()?;
        Err(Error::NotFound)
    }

    /// Multi-row fetch: appends one `T` per row to `out` and closes.
    ///
    /// Zero rows is success; `out` is left untouched rather than
    /// allocated empty.
    pub fn select<T: ScanDest + Default>(&mut self, out: &mut Vec<T>) -> Result<()> {
        loop {
            let mut row = T::default();
            if !self.scan_one(&mut row) {
                break;
            }
            out.push(row);
        }
        self.close()
    }

    /// Closes the iterator and returns the first recorded error, if any.
    /// Idempotent; every call reports the same outcome.
    pub fn close(&mut self) -> Result<()> {
        if !matches!(self.state, State::Closed) {
            self.state = State::Closed;
            if self.first_err.is_none() {
                if let Some(source_err) = self.source.take_error() {
                    self.first_err = Some(Error::transport(source_err));
                }
            }
        }
        match &self.first_err {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// The captured lightweight-transaction sentinel, if the result's
    /// first column was [`APPLIED_COLUMN`].
    pub fn was_applied(&self) -> Option<bool> {
        self.applied
    }

    fn record(&mut self, err: Error) {
        if self.first_err.is_none() {
            self.first_err = Some(err);
        }
    }
}

fn resolve<S: RowSource, T: ScanDest>(
    mapper: &Mapper,
    lenient: bool,
    source: &S,
    dest: &mut T,
) -> Result<Resolution> {
    let shape = dest.shape();
    let columns = source.columns();
    match shape {
        Shape::Scalar | Shape::Custom => {
            if columns.len() != 1 {
                return Err(Error::shape(format!(
                    "single-value destination paired with a {}-column result",
                    columns.len()
                )));
            }
            Ok(Resolution::Whole)
        }
        Shape::Struct => {
            let entity = dest
                .entity_mut()
                .ok_or_else(|| Error::shape("struct-shaped destination without entity view"))?;
            if entity.meta().is_empty() {
                // structs with no mappable fields scan as one opaque value
                if columns.len() != 1 {
                    return Err(Error::shape(format!(
                        "single-value destination paired with a {}-column result",
                        columns.len()
                    )));
                }
                tracing::debug!(entity = entity.type_name(), "classified as scannable");
                return Ok(Resolution::Whole);
            }
            let applied_slot = columns
                .first()
                .and_then(|name| (name == APPLIED_COLUMN).then_some(0));
            let traversals = mapper.traversals(&*entity, columns);
            for (index, (column, traversal)) in columns.iter().zip(&traversals).enumerate() {
                if Some(index) == applied_slot || !traversal.is_empty() {
                    continue;
                }
                if lenient {
                    tracing::warn!(
                        column = %column,
                        entity = entity.type_name(),
                        "no matching field for result column; skipping (unsafe mode)"
                    );
                } else {
                    return Err(Error::resolution(column, entity.type_name()));
                }
            }
            tracing::debug!(
                entity = entity.type_name(),
                columns = columns.len(),
                "resolved result columns"
            );
            Ok(Resolution::Fields {
                traversals,
                applied_slot,
            })
        }
    }
}

fn fill_row<T: ScanDest>(
    resolution: &Resolution,
    scratch: &mut [Value],
    applied: &mut Option<bool>,
    dest: &mut T,
) -> Result<()> {
    match resolution {
        Resolution::Whole => {
            let value = std::mem::replace(&mut scratch[0], Value::Null);
            dest.read_value(value)
        }
        Resolution::Fields {
            traversals,
            applied_slot,
        } => {
            let entity = dest
                .entity_mut()
                .ok_or_else(|| Error::shape("struct-shaped destination without entity view"))?;
            for (index, traversal) in traversals.iter().enumerate() {
                let value = std::mem::replace(&mut scratch[index], Value::Null);
                if Some(index) == *applied_slot {
                    *applied = Some(matches!(value, Value::Boolean(true)));
                    continue;
                }
                if traversal.is_empty() {
                    continue;
                }
                match walk_mut(&mut *entity, traversal)? {
                    FieldMut::Scalar(slot) => slot.put(value)?,
                    FieldMut::Struct(_) => {
                        return Err(Error::shape(
                            "result column resolved to a flattened struct, not a field",
                        ))
                    }
                }
            }
            Ok(())
        }
    }
}
