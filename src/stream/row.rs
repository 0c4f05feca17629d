//! Decoded sample rows and the channel plan that gives them meaning

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::{VarDescriptor, VarTable, Value};
use crate::{ParseError, Result};

/// Requested channels resolved against a file's var table.
///
/// Rows carry one value per planned channel, in plan order. Requested names the file does not
/// declare are kept aside in [`missing`](Self::missing).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelPlan {
    descriptors: Vec<VarDescriptor>,
    slots: HashMap<String, usize>,
    missing: Vec<String>,
}

impl ChannelPlan {
    /// Resolve `requested` against `table`. Duplicate requests collapse onto one slot.
    pub fn new<I, N>(table: &VarTable, requested: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: AsRef<str>,
    {
        let mut plan = Self::default();
        for name in requested {
            plan.push(table, name.as_ref());
        }
        plan
    }

    /// Add one channel; returns its slot when the table declares it.
    pub fn push(&mut self, table: &VarTable, name: &str) -> Option<usize> {
        if let Some(&slot) = self.slots.get(name) {
            return Some(slot);
        }
        match table.get(name) {
            Some(descriptor) => {
                let slot = self.descriptors.len();
                self.descriptors.push(descriptor.clone());
                self.slots.insert(name.to_string(), slot);
                Some(slot)
            }
            None => {
                if !self.missing.iter().any(|m| m == name) {
                    self.missing.push(name.to_string());
                }
                None
            }
        }
    }

    pub fn slot(&self, name: &str) -> Option<usize> {
        self.slots.get(name).copied()
    }

    pub fn descriptors(&self) -> &[VarDescriptor] {
        &self.descriptors
    }

    /// Planned channel names in slot order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.descriptors.iter().map(|d| d.name.as_str())
    }

    /// Requested names absent from the var table, in request order.
    pub fn missing(&self) -> &[String] {
        &self.missing
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// One decoded sample: its index in the file and a value per planned channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRow {
    pub index: usize,
    pub values: Vec<Value>,
}

impl SampleRow {
    pub fn get(&self, slot: usize) -> Option<&Value> {
        self.values.get(slot)
    }

    /// Value of a named channel.
    pub fn named<'r>(&'r self, plan: &ChannelPlan, name: &str) -> Option<&'r Value> {
        self.get(plan.slot(name)?)
    }

    /// Numeric value in an optional slot.
    pub fn f64_at(&self, slot: Option<usize>) -> Option<f64> {
        self.get(slot?)?.as_f64()
    }

    pub fn i64_at(&self, slot: Option<usize>) -> Option<i64> {
        self.get(slot?)?.as_i64()
    }

    pub fn bool_at(&self, slot: Option<usize>) -> Option<bool> {
        self.get(slot?)?.as_bool()
    }

    /// Value of a named channel, failing when the channel was not planned.
    pub fn require<'r>(&'r self, plan: &ChannelPlan, name: &str) -> Result<&'r Value> {
        self.named(plan, name)
            .ok_or_else(|| ParseError::FieldNotFound { channel: name.to_string() })
    }

    /// Numeric value of a named channel.
    pub fn require_f64(&self, plan: &ChannelPlan, name: &str) -> Result<f64> {
        let value = self.require(plan, name)?;
        value.as_f64().ok_or_else(|| ParseError::TypeConversion {
            details: format!("channel '{}' holds {:?}, not a number", name, value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VariableType;

    fn table() -> VarTable {
        let descriptor = |name: &str, offset| VarDescriptor {
            name: name.to_string(),
            var_type: VariableType::Float32,
            offset,
            count: 1,
            count_as_time: false,
            unit: String::new(),
            description: String::new(),
        };
        VarTable::from_descriptors(vec![descriptor("Speed", 0), descriptor("RPM", 4)], 8)
            .expect("valid table")
    }

    #[test]
    fn plan_keeps_request_order_and_reports_missing() {
        let plan = ChannelPlan::new(&table(), ["RPM", "Throttle", "Speed", "RPM", "Throttle"]);
        assert_eq!(plan.names().collect::<Vec<_>>(), vec!["RPM", "Speed"]);
        assert_eq!(plan.missing(), ["Throttle".to_string()]);
        assert_eq!(plan.slot("Speed"), Some(1));
        assert_eq!(plan.slot("Throttle"), None);
    }

    #[test]
    fn rows_resolve_names_through_plan() {
        let plan = ChannelPlan::new(&table(), ["Speed"]);
        let row = SampleRow { index: 4, values: vec![Value::Float(42.0)] };
        assert_eq!(row.named(&plan, "Speed"), Some(&Value::Float(42.0)));
        assert_eq!(row.named(&plan, "RPM"), None);
        assert_eq!(row.f64_at(plan.slot("Speed")), Some(42.0));
        assert_eq!(row.f64_at(None), None);
    }

    #[test]
    fn require_reports_missing_and_mistyped_channels() {
        let plan = ChannelPlan::new(&table(), ["Speed", "RPM"]);
        let row = SampleRow {
            index: 0,
            values: vec![Value::Float(42.0), Value::Text("n/a".into())],
        };
        assert_eq!(row.require_f64(&plan, "Speed").ok(), Some(42.0));
        assert!(matches!(
            row.require(&plan, "Throttle"),
            Err(ParseError::FieldNotFound { channel }) if channel == "Throttle"
        ));
        assert!(matches!(row.require_f64(&plan, "RPM"), Err(ParseError::TypeConversion { .. })));
    }
}
