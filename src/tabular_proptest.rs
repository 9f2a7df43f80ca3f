//! Property-based tests for triage records and the tabular store.
//!
//! These tests use proptest to generate random records and verify that
//! invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::record::Record;
    use crate::schema::{Schema, Value, ValueType};
    use crate::tabular::{coerce, TabularStore};
    use proptest::prelude::*;
    use tempfile::TempDir;

    /// A value of the given type. Text covers the characters CSV has to quote.
    fn value_of(value_type: ValueType) -> BoxedStrategy<Value> {
        match value_type {
            ValueType::Text => "[ -~\n]{0,24}".prop_map(Value::Text).boxed(),
            ValueType::Boolean => any::<bool>().prop_map(Value::Boolean).boxed(),
            ValueType::Integer => any::<i64>().prop_map(Value::Integer).boxed(),
        }
    }

    fn arb_record() -> impl Strategy<Value = Record> {
        let schema = Schema::triage();
        let fields: Vec<_> = schema
            .describe()
            .iter()
            .map(|column| value_of(column.value_type))
            .collect();

        fields.prop_map(move |values| {
            let mut record = Record::new(schema);
            for (column, value) in schema.describe().iter().zip(values) {
                record.set(column.key, value).unwrap();
            }
            record
        })
    }

    fn arb_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            value_of(ValueType::Text),
            value_of(ValueType::Boolean),
            value_of(ValueType::Integer),
        ]
    }

    // ============================================================================
    // Round trip
    // ============================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Property: writing records and reading them back yields equal records
        #[test]
        fn write_then_read_reproduces_records(records in prop::collection::vec(arb_record(), 0..6)) {
            let temp = TempDir::new().unwrap();
            let path = temp.path().join("triage.csv");
            let store = TabularStore::new(Schema::triage());

            let written = store.write(&records, &path, false).unwrap();
            prop_assert_eq!(written, records.len());

            let read_back = store.read(&path).unwrap().records().unwrap();
            prop_assert_eq!(read_back, records);
        }

        /// Property: rendering a value and coercing it back is lossless
        #[test]
        fn render_then_coerce_is_identity(value in arb_value()) {
            let coerced = coerce(value.value_type(), &value.render()).unwrap();
            prop_assert_eq!(coerced, value);
        }
    }

    // ============================================================================
    // Record type invariant
    // ============================================================================

    proptest! {
        /// Property: a write succeeds exactly when the value type matches the
        /// column, and a rejected write leaves the record unchanged
        #[test]
        fn set_accepts_only_the_declared_type(
            column_index in 0..Schema::triage().len(),
            value in arb_value(),
        ) {
            let schema = Schema::triage();
            let column = &schema.describe()[column_index];
            let mut record = Record::new(schema);
            let before = record.clone();

            let result = record.set(column.key, value.clone());

            if value.value_type() == column.value_type {
                prop_assert!(result.is_ok());
                prop_assert_eq!(record.get(column.key).unwrap(), &value);
            } else {
                prop_assert!(result.is_err());
                prop_assert_eq!(record, before);
            }
        }

        /// Property: boolean coercion never fails and is true only for "true"
        #[test]
        fn boolean_coercion_is_total(cell in ".*") {
            let value = coerce(ValueType::Boolean, &cell).unwrap();
            let expected = cell.trim().eq_ignore_ascii_case("true");
            prop_assert_eq!(value, Value::Boolean(expected));
        }
    }
}
