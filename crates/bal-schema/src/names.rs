use std::collections::HashMap;

/// Display names keyed by internal unit identifier.
///
/// Used by the classifier as a display-name fallback for properties that are
/// themselves unit identifiers (the top-level key of a unit file).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnitNames {
    names: HashMap<String, String>,
}

impl UnitNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    pub fn insert(&mut self, id: impl Into<String>, name: impl Into<String>) -> Option<String> {
        self.names.insert(id.into(), name.into())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for UnitNames {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            names: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
