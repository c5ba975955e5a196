// Datasources - positionable producers of (key, item) pairs
use crate::error::SourceError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::iter::Fuse;
use std::str::FromStr;

/// Cursor-based producer of keyed items.
///
/// After [`rewind`](Datasource::rewind) the cursor sits before the first
/// element; each [`advance`](Datasource::advance) moves it one element
/// forward. [`key`](Datasource::key) returning `None` marks the end.
pub trait Datasource {
    type Key;
    type Item;

    fn rewind(&mut self);

    fn advance(&mut self);

    fn key(&self) -> Option<&Self::Key>;

    fn value(&self) -> Option<&Self::Item>;
}

/// Cursor over a slice-like collection. `None` is before the first element.
#[derive(Debug, Clone, Copy, Default)]
struct Position(Option<usize>);

impl Position {
    fn advance(&mut self, len: usize) {
        self.0 = Some(match self.0 {
            None => 0,
            Some(index) => (index + 1).min(len),
        });
    }

    fn index(&self, len: usize) -> Option<usize> {
        self.0.filter(|index| *index < len)
    }
}

/// Vector datasource keyed by index
#[derive(Debug, Clone, Default)]
pub struct VecSource<T> {
    items: Vec<T>,
    position: Position,
    // keys live here so `key()` can hand out a reference
    key: Option<usize>,
}

impl<T> VecSource<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            position: Position::default(),
            key: None,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_inner(self) -> Vec<T> {
        self.items
    }
}

impl<T> From<Vec<T>> for VecSource<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

impl<T> Datasource for VecSource<T> {
    type Key = usize;
    type Item = T;

    fn rewind(&mut self) {
        self.position = Position::default();
        self.key = None;
    }

    fn advance(&mut self) {
        self.position.advance(self.items.len());
        self.key = self.position.index(self.items.len());
    }

    fn key(&self) -> Option<&usize> {
        self.key.as_ref()
    }

    fn value(&self) -> Option<&T> {
        self.key.and_then(|index| self.items.get(index))
    }
}

/// Ordered map datasource keyed by the map keys
#[derive(Debug, Clone)]
pub struct MapSource<K, V> {
    entries: IndexMap<K, V>,
    position: Position,
}

impl<K, V> MapSource<K, V> {
    pub fn new(entries: IndexMap<K, V>) -> Self {
        Self {
            entries,
            position: Position::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_inner(self) -> IndexMap<K, V> {
        self.entries
    }

    fn current(&self) -> Option<(&K, &V)> {
        self.position
            .index(self.entries.len())
            .and_then(|index| self.entries.get_index(index))
    }
}

impl<K, V> FromIterator<(K, V)> for MapSource<K, V>
where
    K: std::hash::Hash + Eq,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<K, V> Datasource for MapSource<K, V> {
    type Key = K;
    type Item = V;

    fn rewind(&mut self) {
        self.position = Position::default();
    }

    fn advance(&mut self) {
        self.position.advance(self.entries.len());
    }

    fn key(&self) -> Option<&K> {
        self.current().map(|(key, _)| key)
    }

    fn value(&self) -> Option<&V> {
        self.current().map(|(_, value)| value)
    }
}

/// Datasource over an external iterator.
///
/// The factory is called lazily, on the first advance after a rewind, so the
/// source can be iterated again; elements are pulled one at a time and never
/// buffered. Once the iterator ends the source stays at the end until the
/// next rewind.
pub struct IterSource<F, It, K, V>
where
    F: FnMut() -> It,
    It: Iterator<Item = (K, V)>,
{
    factory: F,
    iter: Option<Fuse<It>>,
    current: Option<(K, V)>,
}

impl<F, It, K, V> IterSource<F, It, K, V>
where
    F: FnMut() -> It,
    It: Iterator<Item = (K, V)>,
{
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            iter: None,
            current: None,
        }
    }
}

impl<F, It, K, V> Datasource for IterSource<F, It, K, V>
where
    F: FnMut() -> It,
    It: Iterator<Item = (K, V)>,
{
    type Key = K;
    type Item = V;

    fn rewind(&mut self) {
        self.iter = None;
        self.current = None;
    }

    fn advance(&mut self) {
        let iter = self
            .iter
            .get_or_insert_with(|| (self.factory)().fuse());
        self.current = iter.next();
    }

    fn key(&self) -> Option<&K> {
        self.current.as_ref().map(|(key, _)| key)
    }

    fn value(&self) -> Option<&V> {
        self.current.as_ref().map(|(_, value)| value)
    }
}

/// Key of an element of a JSON document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonKey {
    Index(usize),
    Field(String),
}

impl fmt::Display for JsonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonKey::Index(index) => write!(f, "{}", index),
            JsonKey::Field(name) => write!(f, "{}", name),
        }
    }
}

impl From<&JsonKey> for Value {
    fn from(key: &JsonKey) -> Self {
        match key {
            JsonKey::Index(index) => Value::from(*index),
            JsonKey::Field(name) => Value::from(name.as_str()),
        }
    }
}

/// Datasource over a JSON array (index keys) or object (field keys)
#[derive(Debug, Clone)]
pub struct JsonSource {
    entries: MapSource<JsonKey, Value>,
}

impl JsonSource {
    /// Fails with [`SourceError::InvalidDatasource`] unless `value` is an
    /// array or an object.
    pub fn new(value: Value) -> Result<Self, SourceError> {
        let entries = match value {
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| (JsonKey::Index(index), item))
                .collect(),
            Value::Object(fields) => fields
                .into_iter()
                .map(|(name, item)| (JsonKey::Field(name), item))
                .collect(),
            other => {
                return Err(SourceError::invalid(format!(
                    "expected a JSON array or object, found {}",
                    json_type_name(&other)
                )));
            }
        };
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromStr for JsonSource {
    type Err = SourceError;

    fn from_str(json: &str) -> Result<Self, Self::Err> {
        let value: Value = serde_json::from_str(json)
            .map_err(|err| SourceError::invalid(format!("malformed JSON: {}", err)))?;
        Self::new(value)
    }
}

impl Datasource for JsonSource {
    type Key = JsonKey;
    type Item = Value;

    fn rewind(&mut self) {
        self.entries.rewind();
    }

    fn advance(&mut self) {
        self.entries.advance();
    }

    fn key(&self) -> Option<&JsonKey> {
        self.entries.key()
    }

    fn value(&self) -> Option<&Value> {
        self.entries.value()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
