//! # Triage Records
//!
//! A [`Record`] is one typed row bound to a [`Schema`]. It holds exactly one
//! value per schema column, starts out with the schema defaults, and refuses
//! any write whose value type disagrees with the column declaration.

use crate::error::{Error, Result};
use crate::schema::{Column, Schema, Value, ValueType};

/// One row of the triage sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    schema: Schema,
    values: Vec<Value>,
}

impl Record {
    /// Create a record holding the schema defaults.
    pub fn new(schema: Schema) -> Self {
        let values = schema
            .describe()
            .iter()
            .map(|column| column.default.to_value())
            .collect();
        Self { schema, values }
    }

    pub fn schema(&self) -> Schema {
        self.schema
    }

    pub fn get(&self, key: &str) -> Result<&Value> {
        let index = self.index_of(key)?;
        Ok(&self.values[index])
    }

    /// Write a field.
    ///
    /// Fails with `UnknownKey` or `TypeMismatch` and leaves the record
    /// unchanged when the key or the value type does not fit the schema.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
        let index = self.index_of(key)?;
        let value = value.into();
        let column = &self.schema.describe()[index];

        if value.value_type() != column.value_type {
            return Err(Error::TypeMismatch {
                key: key.to_string(),
                expected: column.value_type,
                actual: value.value_type(),
            });
        }

        self.values[index] = value;
        Ok(())
    }

    pub fn text(&self, key: &str) -> Result<&str> {
        match self.get(key)? {
            Value::Text(text) => Ok(text),
            other => Err(self.mismatch(key, ValueType::Text, other)),
        }
    }

    pub fn boolean(&self, key: &str) -> Result<bool> {
        match self.get(key)? {
            Value::Boolean(flag) => Ok(*flag),
            other => Err(self.mismatch(key, ValueType::Boolean, other)),
        }
    }

    pub fn integer(&self, key: &str) -> Result<i64> {
        match self.get(key)? {
            Value::Integer(number) => Ok(*number),
            other => Err(self.mismatch(key, ValueType::Integer, other)),
        }
    }

    /// Iterate over fields in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static Column, &Value)> {
        self.schema.describe().iter().zip(self.values.iter())
    }

    fn index_of(&self, key: &str) -> Result<usize> {
        self.schema.position(key).ok_or_else(|| Error::UnknownKey {
            key: key.to_string(),
        })
    }

    fn mismatch(&self, key: &str, wanted: ValueType, found: &Value) -> Error {
        Error::TypeMismatch {
            key: key.to_string(),
            expected: wanted,
            actual: found.value_type(),
        }
    }
}
