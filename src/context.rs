//! Rows of tabular data and their numeric view.

use std::collections::BTreeMap;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One cell of a row, as supplied by the grid.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Null,
    /// Absent or of a type with no numeric meaning (booleans, arrays, objects).
    Missing,
}

impl CellValue {
    /// Numeric operand for this cell. Text goes through [`parse_float`];
    /// anything that ends up NaN becomes 0.
    pub fn as_operand(&self) -> f64 {
        let n = match self {
            CellValue::Number(n) => *n,
            CellValue::Text(s) if s.is_empty() => 0.0,
            CellValue::Text(s) => parse_float(s),
            CellValue::Null | CellValue::Missing => 0.0,
        };
        if n.is_nan() { 0.0 } else { n }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<Value> for CellValue {
    fn from(v: Value) -> Self {
        match v {
            Value::Number(n) => n.as_f64().map_or(CellValue::Missing, CellValue::Number),
            Value::String(s) => CellValue::Text(s),
            Value::Null => CellValue::Null,
            Value::Bool(_) | Value::Array(_) | Value::Object(_) => CellValue::Missing,
        }
    }
}

impl From<&CellValue> for Value {
    fn from(c: &CellValue) -> Self {
        match c {
            CellValue::Number(n) => serde_json::Number::from_f64(*n).map_or(Value::Null, Value::Number),
            CellValue::Text(s) => Value::String(s.clone()),
            CellValue::Null | CellValue::Missing => Value::Null,
        }
    }
}

/// Lenient float parsing: skip leading whitespace, then take the longest
/// prefix that reads as a decimal number (optional sign, digits, fraction,
/// exponent) or `Infinity`. Returns NaN when no prefix qualifies, so
/// `"7 units"` is 7 and `"n/a"` is NaN.
pub fn parse_float(s: &str) -> f64 {
    let t = s.trim_start();
    let b = t.as_bytes();
    let mut i = 0;
    if i < b.len() && (b[i] == b'+' || b[i] == b'-') {
        i += 1;
    }
    if t[i..].starts_with("Infinity") {
        return if b[0] == b'-' { f64::NEG_INFINITY } else { f64::INFINITY };
    }
    let int_start = i;
    while i < b.len() && b[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;
    if i < b.len() && b[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < b.len() && b[j].is_ascii_digit() {
            j += 1;
        }
        digits += j - frac_start;
        i = j;
    }
    if digits == 0 {
        return f64::NAN;
    }
    // Exponent only counts when followed by at least one digit.
    if i < b.len() && (b[i] == b'e' || b[i] == b'E') {
        let mut j = i + 1;
        if j < b.len() && (b[j] == b'+' || b[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < b.len() && b[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    // `5.` and `5.e3` are fine prefixes but not Rust float literals.
    let lit = t[..i].trim_end_matches('.').replace(".e", "e").replace(".E", "E");
    lit.parse::<f64>().unwrap_or(f64::NAN)
}

/// A row: field name → cell value. Ordered so that iteration, and therefore
/// any tie-breaking downstream, is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationContext {
    fields: BTreeMap<String, CellValue>,
}

impl EvaluationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<CellValue>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&CellValue> {
        self.fields.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Build from a JSON object; anything else is an empty row.
    pub fn from_json(v: &Value) -> Self {
        match v {
            Value::Object(map) => map
                .iter()
                .map(|(k, v)| (k.clone(), CellValue::from(v.clone())))
                .collect(),
            _ => Self::default(),
        }
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for EvaluationContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut ctx = Self::default();
        for (k, v) in iter {
            ctx.insert(k, v);
        }
        ctx
    }
}

impl Serialize for EvaluationContext {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, &Value::from(v))?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for EvaluationContext {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct RowVisitor;

        impl<'de> Visitor<'de> for RowVisitor {
            type Value = EvaluationContext;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a JSON object of field values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
                let mut ctx = EvaluationContext::default();
                while let Some((k, v)) = access.next_entry::<String, Value>()? {
                    ctx.insert(k, CellValue::from(v));
                }
                Ok(ctx)
            }
        }

        deserializer.deserialize_map(RowVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn text_operands() {
        assert_eq!(CellValue::from("12.5").as_operand(), 12.5);
        assert_eq!(CellValue::from("").as_operand(), 0.0);
        assert_eq!(CellValue::from("abc").as_operand(), 0.0);
        assert_eq!(CellValue::from("7 units").as_operand(), 7.0);
        assert_eq!(CellValue::from("  -3").as_operand(), -3.0);
        assert_eq!(CellValue::from("1e3").as_operand(), 1000.0);
        assert_eq!(CellValue::from("2e").as_operand(), 2.0);
        assert_eq!(CellValue::from("$1,200").as_operand(), 0.0);
    }

    #[test]
    fn non_numeric_operands_are_zero() {
        assert_eq!(CellValue::Null.as_operand(), 0.0);
        assert_eq!(CellValue::Missing.as_operand(), 0.0);
        assert_eq!(CellValue::Number(f64::NAN).as_operand(), 0.0);
    }

    #[test]
    fn parse_float_prefixes() {
        assert_eq!(parse_float("3.5kg"), 3.5);
        assert_eq!(parse_float(".25"), 0.25);
        assert_eq!(parse_float("5."), 5.0);
        assert_eq!(parse_float("5.e2"), 500.0);
        assert_eq!(parse_float("-Infinity"), f64::NEG_INFINITY);
        assert!(parse_float("-").is_nan());
        assert!(parse_float(".").is_nan());
        assert!(parse_float("").is_nan());
    }

    #[test]
    fn row_from_json() {
        let row: EvaluationContext =
            serde_json::from_value(json!({"Revenue": 100, "Note": "x", "Flag": true, "Gone": null})).unwrap();
        assert_eq!(row.get("Revenue"), Some(&CellValue::Number(100.0)));
        assert_eq!(row.get("Note"), Some(&CellValue::Text("x".into())));
        assert_eq!(row.get("Flag"), Some(&CellValue::Missing));
        assert_eq!(row.get("Gone"), Some(&CellValue::Null));
        assert_eq!(row, EvaluationContext::from_json(&json!({"Revenue": 100, "Note": "x", "Flag": true, "Gone": null})));
    }
}
