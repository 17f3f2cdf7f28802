//! A flat, human-oriented view of a finished job.

use crate::job::JobResult;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// `(label, path into outputs)` for every figure a summary may contain, in display order.
const FIELDS: &[(&str, &[&str])] = &[
    ("npv", &["Financial", "npv"]),
    ("lcc", &["Financial", "lcc"]),
    ("lcc_bau", &["Financial", "lcc_bau"]),
    ("initial_capital_costs", &["Financial", "initial_capital_costs"]),
    ("simple_payback_years", &["Financial", "simple_payback_years"]),
    ("pv_size_kw", &["PV", "size_kw"]),
    ("wind_size_kw", &["Wind", "size_kw"]),
    ("storage_size_kw", &["ElectricStorage", "size_kw"]),
    ("storage_size_kwh", &["ElectricStorage", "size_kwh"]),
    ("generator_size_kw", &["Generator", "size_kw"]),
];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    fields: Vec<(&'static str, f64)>,
}

impl Summary {
    pub fn get(&self, label: &str) -> Option<f64> {
        self.fields
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.fields.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, value) in &self.fields {
            writeln!(f, "{label}: {value}")?;
        }
        Ok(())
    }
}

/// Extracts the known financial and sizing figures from a result.
///
/// Never fails: absent or non-numeric fields are left out, and a failed job summarizes empty.
pub fn summarize(result: &JobResult) -> Summary {
    let Some(output) = result.output() else {
        return Summary::default();
    };

    let fields = FIELDS
        .iter()
        .filter_map(|(label, path)| {
            path.iter()
                .try_fold(&output.outputs, |node, key| node.get(*key))
                .and_then(Value::as_f64)
                .map(|value| (*label, value))
        })
        .collect();

    Summary { fields }
}
