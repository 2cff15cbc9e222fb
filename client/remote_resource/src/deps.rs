//! Dependency keys for declared resources.

/// One dependency value.  Compared by value, shallowly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DepValue {
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Str(String),
}

impl From<bool> for DepValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for DepValue {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<i64> for DepValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for DepValue {
    fn from(v: u32) -> Self {
        Self::Uint(v.into())
    }
}

impl From<u64> for DepValue {
    fn from(v: u64) -> Self {
        Self::Uint(v)
    }
}

impl From<&str> for DepValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for DepValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<&String> for DepValue {
    fn from(v: &String) -> Self {
        Self::Str(v.clone())
    }
}

impl<T: Into<DepValue>> From<Option<T>> for DepValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Ordered, finite list of values a fetch depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Dependencies(Vec<DepValue>);

impl Dependencies {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, value: impl Into<DepValue>) -> Self {
        self.0.push(value.into());
        self
    }

    pub fn values(&self) -> &[DepValue] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V: Into<DepValue>> FromIterator<V> for Dependencies {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Dependencies(iter.into_iter().map(Into::into).collect())
    }
}
