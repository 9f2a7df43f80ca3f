//! # Triage Schema
//!
//! This module declares the column model shared by records, the triage file
//! writer and the triage file reader. A [`Schema`] is an ordered table of
//! [`Column`] descriptors; each descriptor names a machine key, the label
//! used as the on-disk header, a [`ValueType`] and a default.
//!
//! The same table drives validation ([`crate::record::Record::set`]),
//! serialization (header order and value rendering) and parsing (label to
//! key lookup and cell coercion), so adding a column is a one-line change.
//!
//! ## Example
//!
//! ```
//! use codetriage::schema::{keys, Schema, ValueType};
//!
//! let schema = Schema::triage();
//! let forks = schema.column(keys::FORKS).unwrap();
//! assert_eq!(forks.label, "Forks");
//! assert_eq!(forks.value_type, ValueType::Integer);
//! ```

use std::collections::HashSet;
use std::fmt;

use crate::error::{Error, Result};

/// The type a column's values must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Text,
    Boolean,
    Integer,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Text => "text",
            ValueType::Boolean => "boolean",
            ValueType::Integer => "integer",
        };
        f.write_str(name)
    }
}

/// A typed cell value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Boolean(bool),
    Integer(i64),
}

impl Value {
    /// The declared type this value satisfies.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Text(_) => ValueType::Text,
            Value::Boolean(_) => ValueType::Boolean,
            Value::Integer(_) => ValueType::Integer,
        }
    }

    /// Render the value in its fixed on-disk form.
    ///
    /// Booleans are written as `True`/`False` and integers in decimal, which
    /// is what spreadsheet tools round-trip without reinterpreting.
    pub fn render(&self) -> String {
        match self {
            Value::Text(text) => text.clone(),
            Value::Boolean(true) => "True".to_string(),
            Value::Boolean(false) => "False".to_string(),
            Value::Integer(number) => number.to_string(),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Integer(i64::from(value))
    }
}

/// A column default that can live in a `static` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal {
    Text(&'static str),
    Boolean(bool),
    Integer(i64),
}

impl Literal {
    pub fn value_type(&self) -> ValueType {
        match self {
            Literal::Text(_) => ValueType::Text,
            Literal::Boolean(_) => ValueType::Boolean,
            Literal::Integer(_) => ValueType::Integer,
        }
    }

    pub fn to_value(&self) -> Value {
        match *self {
            Literal::Text(text) => Value::Text(text.to_string()),
            Literal::Boolean(flag) => Value::Boolean(flag),
            Literal::Integer(number) => Value::Integer(number),
        }
    }
}

/// Descriptor for a single triage column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Machine identifier, lower_snake_case.
    pub key: &'static str,
    /// Header text written to and matched in the triage file.
    pub label: &'static str,
    pub value_type: ValueType,
    pub default: Literal,
}

impl Column {
    const fn text(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            value_type: ValueType::Text,
            default: Literal::Text(""),
        }
    }

    const fn boolean(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            value_type: ValueType::Boolean,
            default: Literal::Boolean(false),
        }
    }

    const fn integer(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            value_type: ValueType::Integer,
            default: Literal::Integer(0),
        }
    }
}

/// Keys of the triage columns.
pub mod keys {
    pub const NAME: &str = "name";
    pub const OWNER: &str = "owner";
    pub const PULL: &str = "pull";
    pub const PULL_BRANCH_TAG: &str = "pull_branch_tag";
    pub const NOTES: &str = "notes";
    pub const EMPTY: &str = "empty";
    pub const ARCHIVED: &str = "archived";
    pub const FORK: &str = "fork";
    pub const DESCRIPTION: &str = "description";
    pub const FORKS: &str = "forks";
    pub const OPEN_ISSUES: &str = "open_issues";
    pub const LAST_UPDATED: &str = "last_updated";
    pub const URL: &str = "url";
    pub const CLONE_URL: &str = "clone_url";
    pub const DEFAULT_BRANCH: &str = "default_branch";
    pub const BRANCH_LIST: &str = "branch_list";
    pub const RELEASE_TAGS: &str = "release_tags";
    pub const LATEST_TAG: &str = "latest_tag";
}

static TRIAGE_COLUMNS: &[Column] = &[
    Column::text(keys::NAME, "Name"),
    Column::text(keys::OWNER, "Owner"),
    Column::text(keys::PULL, "Pull (Y/N)"),
    Column::text(keys::PULL_BRANCH_TAG, "Pull Branch/Tag"),
    Column::text(keys::NOTES, "Notes"),
    Column::boolean(keys::EMPTY, "Empty"),
    Column::boolean(keys::ARCHIVED, "Archived"),
    Column::boolean(keys::FORK, "Fork"),
    Column::text(keys::DESCRIPTION, "Description"),
    Column::integer(keys::FORKS, "Forks"),
    Column::integer(keys::OPEN_ISSUES, "Open Issues"),
    Column::text(keys::LAST_UPDATED, "Last Updated"),
    Column::text(keys::URL, "URL"),
    Column::text(keys::CLONE_URL, "Clone URL"),
    Column::text(keys::DEFAULT_BRANCH, "Default Branch"),
    Column::text(keys::BRANCH_LIST, "Branch List"),
    Column::integer(keys::RELEASE_TAGS, "Release Tags"),
    Column::text(keys::LATEST_TAG, "Latest Tag"),
];

/// An ordered, validated set of column descriptors.
///
/// `Schema` is a cheap handle over a `'static` table, so records and stores
/// carry it by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    columns: &'static [Column],
}

impl Schema {
    /// Builds a schema from a descriptor table, checking its invariants.
    ///
    /// Keys and labels must each be unique, labels must not be blank, keys must
    /// be lower_snake_case starting with a letter, and every default must have
    /// the column's declared type.
    pub fn new(columns: &'static [Column]) -> Result<Self> {
        let mut seen_keys = HashSet::new();
        let mut seen_labels = HashSet::new();

        for column in columns {
            if !is_valid_key(column.key) {
                return Err(invalid(format!(
                    "key '{}' must be lower_snake_case and start with a letter",
                    column.key
                )));
            }
            if column.label.trim().is_empty() {
                return Err(invalid(format!("label for '{}' is blank", column.key)));
            }
            if !seen_keys.insert(column.key) {
                return Err(invalid(format!("duplicate key '{}'", column.key)));
            }
            if !seen_labels.insert(column.label) {
                return Err(invalid(format!("duplicate label '{}'", column.label)));
            }
            if column.default.value_type() != column.value_type {
                return Err(invalid(format!(
                    "default for '{}' is {}, declared {}",
                    column.key,
                    column.default.value_type(),
                    column.value_type
                )));
            }
        }

        Ok(Self { columns })
    }

    /// The fixed triage column set, in on-disk order.
    pub fn triage() -> Self {
        Self {
            columns: TRIAGE_COLUMNS,
        }
    }

    /// The ordered descriptor list.
    pub fn describe(&self) -> &'static [Column] {
        self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column(&self, key: &str) -> Option<&'static Column> {
        self.columns.iter().find(|column| column.key == key)
    }

    /// Looks a column up by its header label. Matching is exact.
    pub fn column_by_label(&self, label: &str) -> Option<&'static Column> {
        self.columns.iter().find(|column| column.label == label)
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.key == key)
    }

    pub fn labels(&self) -> impl Iterator<Item = &'static str> {
        self.columns.iter().map(|column| column.label)
    }
}

fn invalid(message: String) -> Error {
    Error::InvalidSchema { message }
}

fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}
