//! Nested attribute storage addressed by paths such as `stats/hp`.

use std::collections::BTreeMap;

/// Errors raised when reading or writing attributes by path.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AttributeError {
    /// No attribute exists at the given path.
    #[error("attribute `{0}` not found")]
    PathNotFound(String),

    /// The path resolves to a group instead of a numeric leaf.
    #[error("attribute `{0}` is not numeric")]
    NotANumber(String),

    /// The path has no segments.
    #[error("attribute path is empty")]
    EmptyPath,
}

/// Read/write access to numeric attributes by path.
///
/// Reads return `None` when the path is absent; callers treat that as an
/// aborted calculation rather than a crash.
pub trait AttributeAccess {
    /// Returns the numeric value stored at `path`.
    fn property(&self, path: &str) -> Option<f64>;

    /// Overwrites the numeric value stored at `path`.
    ///
    /// The path must already exist.
    fn set_property(&mut self, path: &str, value: f64) -> Result<(), AttributeError>;
}

/// Splits `stats/hp` or `stats.hp` into its segments.
pub fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(['/', '.']).filter(|segment| !segment.is_empty())
}

/// A node of the attribute tree.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum AttributeValue {
    Number(f64),
    Group(BTreeMap<String, AttributeValue>),
}

/// Tree of named numeric attributes owned by an entity.
///
/// ```
/// # use rpg_core::attributes::{AttributeAccess, Attributes};
/// let mut attrs = Attributes::new().with("stats/hp", 80.0).with("stats/atk", 12.0);
/// assert_eq!(attrs.property("stats/hp"), Some(80.0));
/// attrs.set_property("stats.hp", 70.0).unwrap();
/// assert_eq!(attrs.property("stats/hp"), Some(70.0));
/// assert_eq!(attrs.property("stats/mp"), None);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Attributes {
    root: BTreeMap<String, AttributeValue>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Attributes::insert`].
    pub fn with(mut self, path: &str, value: f64) -> Self {
        self.insert(path, value);
        self
    }

    /// Creates or overwrites the leaf at `path`, creating intermediate groups.
    ///
    /// A numeric leaf standing where a group is needed is replaced by a group.
    pub fn insert(&mut self, path: &str, value: f64) {
        let segments: Vec<&str> = path_segments(path).collect();
        let Some((last, parents)) = segments.split_last() else {
            return;
        };

        let mut node = &mut self.root;
        for segment in parents {
            let entry = node
                .entry((*segment).to_string())
                .or_insert_with(|| AttributeValue::Group(BTreeMap::new()));
            if let AttributeValue::Number(_) = entry {
                *entry = AttributeValue::Group(BTreeMap::new());
            }
            let AttributeValue::Group(children) = entry else {
                return;
            };
            node = children;
        }
        node.insert((*last).to_string(), AttributeValue::Number(value));
    }

    /// Returns true when `path` resolves to a numeric leaf.
    pub fn contains(&self, path: &str) -> bool {
        self.property(path).is_some()
    }

    /// Iterates over every numeric leaf as `(path, value)` using `/` separators.
    pub fn leaves(&self) -> Vec<(String, f64)> {
        let mut out = Vec::new();
        collect_leaves(&self.root, String::new(), &mut out);
        out
    }

    fn leaf_mut(&mut self, path: &str) -> Result<&mut f64, AttributeError> {
        let mut segments = path_segments(path).peekable();
        if segments.peek().is_none() {
            return Err(AttributeError::EmptyPath);
        }

        let mut node = &mut self.root;
        while let Some(segment) = segments.next() {
            let value = node
                .get_mut(segment)
                .ok_or_else(|| AttributeError::PathNotFound(path.to_string()))?;
            match value {
                AttributeValue::Number(number) if segments.peek().is_none() => return Ok(number),
                AttributeValue::Number(_) => {
                    return Err(AttributeError::PathNotFound(path.to_string()));
                }
                AttributeValue::Group(_) if segments.peek().is_none() => {
                    return Err(AttributeError::NotANumber(path.to_string()));
                }
                AttributeValue::Group(children) => node = children,
            }
        }

        Err(AttributeError::PathNotFound(path.to_string()))
    }
}

fn collect_leaves(node: &BTreeMap<String, AttributeValue>, prefix: String, out: &mut Vec<(String, f64)>) {
    for (name, value) in node {
        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}/{name}")
        };
        match value {
            AttributeValue::Number(number) => out.push((path, *number)),
            AttributeValue::Group(children) => collect_leaves(children, path, out),
        }
    }
}

impl AttributeAccess for Attributes {
    fn property(&self, path: &str) -> Option<f64> {
        let mut segments = path_segments(path).peekable();
        segments.peek()?;

        let mut node = &self.root;
        while let Some(segment) = segments.next() {
            match node.get(segment)? {
                AttributeValue::Number(number) if segments.peek().is_none() => return Some(*number),
                AttributeValue::Group(children) if segments.peek().is_some() => node = children,
                _ => return None,
            }
        }
        None
    }

    fn set_property(&mut self, path: &str, value: f64) -> Result<(), AttributeError> {
        *self.leaf_mut(path)? = value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_property_rejects_absent_paths() {
        let mut attrs = Attributes::new().with("stats/hp", 10.0);

        assert_eq!(
            attrs.set_property("stats/mp", 5.0),
            Err(AttributeError::PathNotFound("stats/mp".to_string()))
        );
        assert_eq!(
            attrs.set_property("stats", 5.0),
            Err(AttributeError::NotANumber("stats".to_string()))
        );
        assert_eq!(attrs.set_property("", 5.0), Err(AttributeError::EmptyPath));
        assert_eq!(attrs.property("stats/hp"), Some(10.0));
    }

    #[test]
    fn insert_replaces_leaf_with_group() {
        let mut attrs = Attributes::new().with("stats", 3.0);
        attrs.insert("stats/hp", 7.0);

        assert_eq!(attrs.property("stats"), None);
        assert_eq!(attrs.property("stats/hp"), Some(7.0));
    }

    #[test]
    fn leaves_are_listed_in_path_order() {
        let attrs = Attributes::new()
            .with("stats/hp", 1.0)
            .with("stats/atk", 2.0)
            .with("gold", 3.0);

        assert_eq!(
            attrs.leaves(),
            vec![
                ("gold".to_string(), 3.0),
                ("stats/atk".to_string(), 2.0),
                ("stats/hp".to_string(), 1.0),
            ]
        );
    }
}
