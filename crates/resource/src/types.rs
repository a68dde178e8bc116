//! Core types shared by the resource tree, the matcher and the store.

use std::fmt;

/// Delimiter binding a segment directly to its parent.
pub const TIGHT_BINDING: char = '.';

/// Delimiter letting a segment skip any number of intermediate levels.
pub const LOOSE_BINDING: char = '*';

/// Segment matching exactly one arbitrary segment.
pub const SINGLE_MATCH: &str = "?";

/// Separator inside type paths, e.g. `widgets/Button`.
pub const TYPE_PATH_SEPARATOR: char = '/';

/// Separator between the values of a multi-valued resource.
pub const VALUE_DELIMITER: char = '|';

/// Name used to register an unregistered object for the duration of a
/// single relative lookup. It is rejected by `is_valid_name`.
pub(crate) const PROBE_NAME: &str = "_probe$7Qx2rL9";

/// How a segment is bound to the node above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Binding {
    Tight = 0,
    Loose = 1,
}

impl Binding {
    /// Both bindings in search order.
    pub const ALL: [Binding; 2] = [Binding::Tight, Binding::Loose];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn delimiter(self) -> char {
        match self {
            Self::Tight => TIGHT_BINDING,
            Self::Loose => LOOSE_BINDING,
        }
    }
}

/// Classification of a single key segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Ordinary lowercase-first name, e.g. `button1`.
    ByName,
    /// Runtime type reference: uppercase-first or containing `/`.
    ByType,
    /// The single-match wildcard `?`.
    SingleMatch,
}

/// A resolved resource value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceValue {
    Single(String),
    List(Vec<String>),
}

impl ResourceValue {
    /// Returns the scalar value, if this is not a list.
    pub fn as_single(&self) -> Option<&str> {
        match self {
            Self::Single(value) => Some(value.as_str()),
            Self::List(_) => None,
        }
    }

    /// Returns the values as a slice-like list; a scalar is a list of one.
    pub fn to_list(&self) -> Vec<String> {
        match self {
            Self::Single(value) => vec![value.clone()],
            Self::List(values) => values.clone(),
        }
    }

    /// Canonical stored form: scalars as-is, lists joined with `" | "`.
    pub fn to_stored(&self) -> String {
        match self {
            Self::Single(value) => value.clone(),
            Self::List(values) => join_values(values),
        }
    }

    /// Interprets a stored string the way lookups report it.
    ///
    /// Returns `None` for the empty string. Strings containing the value
    /// delimiter become lists; empty pieces between delimiters are dropped
    /// and the remaining pieces are trimmed.
    pub fn from_stored(data: &str) -> Option<Self> {
        if data.is_empty() {
            return None;
        }
        if memchr::memchr(VALUE_DELIMITER as u8, data.as_bytes()).is_none() {
            return Some(Self::Single(data.to_string()));
        }
        let values = data
            .split(VALUE_DELIMITER)
            .filter(|piece| !piece.is_empty())
            .map(|piece| piece.trim().to_string())
            .collect();
        Some(Self::List(values))
    }
}

impl From<&str> for ResourceValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for ResourceValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<String>> for ResourceValue {
    fn from(values: Vec<String>) -> Self {
        Self::List(values)
    }
}

impl fmt::Display for ResourceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_stored())
    }
}

/// Joins values into the delimited form used for storage.
pub fn join_values<S: AsRef<str>>(values: &[S]) -> String {
    let delimiter = format!(" {VALUE_DELIMITER} ");
    values
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(delimiter.as_str())
}

/// Counts reported by a bulk property load.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Number of pairs stored in the tree.
    pub inserted: usize,
    /// Keys that failed the key grammar and were skipped.
    pub skipped: Vec<String>,
}

impl LoadReport {
    /// Adds the counts of a later load to this one.
    pub fn merge(&mut self, other: LoadReport) {
        self.inserted += other.inserted;
        self.skipped.extend(other.skipped);
    }
}
