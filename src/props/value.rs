//! Prop values and ordered prop collections.
//!
//! # Design Decisions
//! - `Prop` is a closed sum type; selection logic matches on `PropKind` exhaustively
//! - Producers are `Fn` (not `FnOnce`) so shared props can be materialized on every request
//! - Collections keep insertion order, which is the order props are serialized in

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::error::BoxError;

/// Zero-argument producer returning a JSON value or a failure.
pub type Producer = Arc<dyn Fn() -> Result<Value, BoxError> + Send + Sync>;

/// Kind tag of a [`Prop`], used by the resolver's selection rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropKind {
    /// Already-computed value, passed through unchanged.
    Value,
    /// Computed on every load where the prop is selected.
    Deferred,
    /// Only computed when a partial reload names it explicitly.
    Lazy,
    /// Computed on every load, partial or full, unless excluded by name.
    Always,
}

/// A single page prop before resolution.
#[derive(Clone)]
pub enum Prop {
    Value(Value),
    Deferred(Producer),
    Lazy(Producer),
    Always(Producer),
}

impl Prop {
    /// Serialize any value into a plain prop.
    pub fn serialize<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Prop::Value)
    }

    /// Infallible deferred prop.
    pub fn deferred<F, T>(f: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
        T: Serialize,
    {
        Prop::Deferred(producer(move || Ok::<_, BoxError>(f())))
    }

    /// Deferred prop whose producer may fail.
    pub fn try_deferred<F, T, E>(f: F) -> Self
    where
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
        T: Serialize,
        E: Into<BoxError>,
    {
        Prop::Deferred(producer(f))
    }

    /// Infallible lazy prop.
    pub fn lazy<F, T>(f: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
        T: Serialize,
    {
        Prop::Lazy(producer(move || Ok::<_, BoxError>(f())))
    }

    /// Lazy prop whose producer may fail.
    pub fn try_lazy<F, T, E>(f: F) -> Self
    where
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
        T: Serialize,
        E: Into<BoxError>,
    {
        Prop::Lazy(producer(f))
    }

    /// Infallible always-included prop.
    pub fn always<F, T>(f: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
        T: Serialize,
    {
        Prop::Always(producer(move || Ok::<_, BoxError>(f())))
    }

    /// Always-included prop whose producer may fail.
    pub fn try_always<F, T, E>(f: F) -> Self
    where
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
        T: Serialize,
        E: Into<BoxError>,
    {
        Prop::Always(producer(f))
    }

    pub fn kind(&self) -> PropKind {
        match self {
            Prop::Value(_) => PropKind::Value,
            Prop::Deferred(_) => PropKind::Deferred,
            Prop::Lazy(_) => PropKind::Lazy,
            Prop::Always(_) => PropKind::Always,
        }
    }

    /// Produce the final value, invoking the producer if there is one.
    pub fn materialize(&self) -> Result<Value, BoxError> {
        match self {
            Prop::Value(value) => Ok(value.clone()),
            Prop::Deferred(f) | Prop::Lazy(f) | Prop::Always(f) => f(),
        }
    }
}

fn producer<F, T, E>(f: F) -> Producer
where
    F: Fn() -> Result<T, E> + Send + Sync + 'static,
    T: Serialize,
    E: Into<BoxError>,
{
    Arc::new(move || {
        let value = f().map_err(Into::<BoxError>::into)?;
        serde_json::to_value(value).map_err(BoxError::from)
    })
}

impl fmt::Debug for Prop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prop::Value(value) => f.debug_tuple("Value").field(value).finish(),
            other => write!(f, "{:?}(<producer>)", other.kind()),
        }
    }
}

impl From<Value> for Prop {
    fn from(value: Value) -> Self {
        Prop::Value(value)
    }
}

macro_rules! prop_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Prop {
                fn from(value: $ty) -> Self {
                    Prop::Value(Value::from(value))
                }
            }
        )*
    };
}

prop_from!(&str, String, bool, i32, i64, u32, u64, f64);

/// Ordered set of named props.
#[derive(Debug, Clone, Default)]
pub struct Props(IndexMap<String, Prop>);

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a prop, replacing any prop of the same name in place.
    pub fn insert(&mut self, name: impl Into<String>, prop: impl Into<Prop>) -> Option<Prop> {
        self.0.insert(name.into(), prop.into())
    }

    /// Builder-style [`Props::insert`].
    pub fn with(mut self, name: impl Into<String>, prop: impl Into<Prop>) -> Self {
        self.insert(name, prop);
        self
    }

    /// Overlay `other` on top of `self`; same-named entries are replaced entirely.
    pub fn extend(&mut self, other: &Props) {
        for (name, prop) in other.iter() {
            self.0.insert(name.clone(), prop.clone());
        }
    }

    pub fn get(&self, name: &str) -> Option<&Prop> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Prop> {
        self.0.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<Prop>> FromIterator<(K, V)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl IntoIterator for Props {
    type Item = (String, Prop);
    type IntoIter = indexmap::map::IntoIter<String, Prop>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Validation messages keyed by field name, serialized under the `errors` prop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(IndexMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn extend(&mut self, other: &ValidationErrors) {
        for (field, message) in &other.0 {
            self.0.insert(field.clone(), message.clone());
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ValidationErrors {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kinds() {
        assert_eq!(Prop::from("bar").kind(), PropKind::Value);
        assert_eq!(Prop::deferred(|| 1).kind(), PropKind::Deferred);
        assert_eq!(Prop::lazy(|| 1).kind(), PropKind::Lazy);
        assert_eq!(Prop::always(|| 1).kind(), PropKind::Always);
    }

    #[test]
    fn test_materialize_serializes_output() {
        #[derive(Serialize)]
        struct User {
            name: &'static str,
        }

        let prop = Prop::deferred(|| User { name: "ada" });
        assert_eq!(prop.materialize().unwrap(), json!({"name": "ada"}));
    }

    #[test]
    fn test_materialize_propagates_failure() {
        let prop = Prop::try_always(|| Err::<u8, _>("nope"));
        let err = prop.materialize().unwrap_err();
        assert_eq!(err.to_string(), "nope");
    }

    #[test]
    fn test_insert_keeps_original_position() {
        let mut props = Props::new().with("a", 1).with("b", 2);
        props.insert("a", 3);

        let names: Vec<_> = props.names().collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(props.get("a").unwrap().materialize().unwrap(), json!(3));
    }

    #[test]
    fn test_validation_errors_serialize_as_object() {
        let errors: ValidationErrors = [("email", "is required")].into_iter().collect();
        assert_eq!(errors.to_value(), json!({"email": "is required"}));
        assert_eq!(serde_json::to_value(&errors).unwrap(), json!({"email": "is required"}));
    }
}
