//! Name → traversal resolution with a per-type, build-once cache.
//!
//! A [`Mapper`] turns the static field table of an [`Entity`] into a
//! [`TypeMap`]: an immutable name → traversal index, computed once per
//! distinct type and shared by every caller afterwards. The rename
//! function and tag handling are fixed at `Mapper` construction, so a
//! mapper's cache can never go stale under reconfiguration.

use std::any::TypeId;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::OnceCell;

use crate::entity::{Entity, FieldMeta, Traversal};
use crate::error::{Error, Result};

/// Pluggable conversion from a declared field name to its query-side name.
pub type RenameFn = fn(&str) -> String;

/// Default rename function: folds `CamelCase` and `mixedCase` names to
/// `snake_case`; names that are already snake case pass through unchanged.
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Alternative rename function: plain lower-casing.
pub fn lower_case(name: &str) -> String {
    name.to_lowercase()
}

/// Immutable name → traversal table for one type.
///
/// Entries keep field declaration order (outer fields before flattened
/// ones), which also fixes the attribute order of UDT encoding.
pub struct TypeMap {
    entries: Vec<(String, Traversal)>,
    by_name: HashMap<String, usize>,
}

impl TypeMap {
    /// Looks up the traversal for a resolved name.
    pub fn traversal(&self, name: &str) -> Option<&Traversal> {
        self.by_name.get(name).map(|&i| &self.entries[i].1)
    }

    /// All resolved names with their traversals, in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Traversal)> {
        self.entries.iter().map(|(n, t)| (n.as_str(), t))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn build_type_map(meta: &'static [FieldMeta], rename: RenameFn) -> TypeMap {
    let mut map = TypeMap {
        entries: Vec::new(),
        by_name: HashMap::new(),
    };
    // Breadth-first so a parent field shadows a flattened one of the same name.
    let mut queue: VecDeque<(Traversal, &'static [FieldMeta])> = VecDeque::new();
    queue.push_back((Vec::new(), meta));
    while let Some((prefix, fields)) = queue.pop_front() {
        for (index, field) in fields.iter().enumerate() {
            let mut path = prefix.clone();
            path.push(index);
            if let Some(nested) = field.nested {
                queue.push_back((path, nested()));
                continue;
            }
            let name = match field.tag {
                Some(tag) => tag.to_owned(),
                None => rename(field.name),
            };
            if !map.by_name.contains_key(&name) {
                map.by_name.insert(name.clone(), map.entries.len());
                map.entries.push((name, path));
            }
        }
    }
    map
}

/// Compiles and caches field resolution tables, one per destination type.
///
/// Safe for concurrent use: the first caller for a type builds its table,
/// every other caller sees the fully built, immutable result.
pub struct Mapper {
    rename: RenameFn,
    cache: DashMap<TypeId, Arc<TypeMap>>,
}

impl Mapper {
    pub fn new(rename: RenameFn) -> Self {
        Mapper {
            rename,
            cache: DashMap::new(),
        }
    }

    /// Returns the cached table for the entity's type, building it on
    /// first use.
    pub fn type_map(&self, entity: &dyn Entity) -> Arc<TypeMap> {
        self.cache
            .entry(entity.type_key())
            .or_insert_with(|| {
                let map = build_type_map(entity.meta(), self.rename);
                tracing::debug!(
                    entity = entity.type_name(),
                    fields = map.len(),
                    "compiled field map"
                );
                Arc::new(map)
            })
            .clone()
    }

    /// Resolves `names` against the entity's type.
    ///
    /// The output preserves the input order and length; an unresolved name
    /// yields an empty traversal so callers can detect "missing"
    /// positionally.
    pub fn traversals<S: AsRef<str>>(&self, entity: &dyn Entity, names: &[S]) -> Vec<Traversal> {
        let map = self.type_map(entity);
        names
            .iter()
            .map(|name| map.traversal(name.as_ref()).cloned().unwrap_or_default())
            .collect()
    }
}

impl Default for Mapper {
    fn default() -> Self {
        Mapper::new(snake_case)
    }
}

static DEFAULT_MAPPER: OnceCell<Arc<Mapper>> = OnceCell::new();

/// The process-wide mapper used when none is configured explicitly.
///
/// Initialized on first use with [`snake_case`] naming. Note that a
/// mapper's cached tables always reflect the rename function it was
/// constructed with; replacing the default after types have been cached
/// would leave them resolving under the old convention, which is why
/// [`set_default_mapper`] refuses to run once this instance exists.
pub fn default_mapper() -> Arc<Mapper> {
    DEFAULT_MAPPER
        .get_or_init(|| Arc::new(Mapper::default()))
        .clone()
}

/// Installs the process-wide default mapper.
///
/// Must run before the first use of [`default_mapper`]; afterwards the
/// default is frozen and this returns [`Error::MapperFrozen`].
pub fn set_default_mapper(mapper: Mapper) -> Result<()> {
    DEFAULT_MAPPER
        .set(Arc::new(mapper))
        .map_err(|_| Error::MapperFrozen)
}
