use serde::Serialize;

use super::resolved::Constraints;

/// What a boundary value measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryTarget {
    /// The numeric value itself.
    Value,
    /// String length.
    Length,
    /// Array item count.
    Items,
}

/// A representative scalar sitting on or just past a declared bound.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundaryValue {
    pub label: &'static str,
    pub target: BoundaryTarget,
    pub value: f64,
    pub valid: bool,
}

impl BoundaryValue {
    fn new(label: &'static str, target: BoundaryTarget, value: f64, valid: bool) -> Self {
        Self {
            label,
            target,
            value,
            valid,
        }
    }
}

/// Step used to move just inside or outside a numeric bound.
pub fn numeric_step(constraints: &Constraints, integer: bool) -> f64 {
    if integer {
        return 1.0;
    }
    let low = constraints.minimum.or(constraints.exclusive_minimum);
    let high = constraints.maximum.or(constraints.exclusive_maximum);
    match (low, high) {
        (Some(lo), Some(hi)) if hi - lo < 2.0 => 0.01,
        _ => 1.0,
    }
}

/// min, min−1, max, max+1 and the exclusive variants for every declared bound.
pub fn get_boundary_values(constraints: &Constraints, integer: bool) -> Vec<BoundaryValue> {
    use BoundaryTarget::*;

    let mut values = Vec::new();
    let step = numeric_step(constraints, integer);

    if let Some(min) = constraints.minimum {
        values.push(BoundaryValue::new("min", Value, min, true));
        values.push(BoundaryValue::new("below_min", Value, min - step, false));
    }
    if let Some(max) = constraints.maximum {
        values.push(BoundaryValue::new("max", Value, max, true));
        values.push(BoundaryValue::new("above_max", Value, max + step, false));
    }
    if let Some(min) = constraints.exclusive_minimum {
        values.push(BoundaryValue::new("exclusive_min", Value, min, false));
        values.push(BoundaryValue::new("above_exclusive_min", Value, min + step, true));
    }
    if let Some(max) = constraints.exclusive_maximum {
        values.push(BoundaryValue::new("exclusive_max", Value, max, false));
        values.push(BoundaryValue::new("below_exclusive_max", Value, max - step, true));
    }

    if let Some(min) = constraints.min_length {
        values.push(BoundaryValue::new("min_length", Length, min as f64, true));
        if min > 0 {
            values.push(BoundaryValue::new("below_min_length", Length, (min - 1) as f64, false));
        }
    }
    if let Some(max) = constraints.max_length {
        values.push(BoundaryValue::new("max_length", Length, max as f64, true));
        if let Some(above) = max.checked_add(1) {
            values.push(BoundaryValue::new("above_max_length", Length, above as f64, false));
        }
    }

    if let Some(min) = constraints.min_items {
        values.push(BoundaryValue::new("min_items", Items, min as f64, true));
        if min > 0 {
            values.push(BoundaryValue::new("below_min_items", Items, (min - 1) as f64, false));
        }
    }
    if let Some(max) = constraints.max_items {
        values.push(BoundaryValue::new("max_items", Items, max as f64, true));
        if let Some(above) = max.checked_add(1) {
            values.push(BoundaryValue::new("above_max_items", Items, above as f64, false));
        }
    }

    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inclusive_range() {
        let constraints = Constraints {
            minimum: Some(0.0),
            maximum: Some(100.0),
            ..Constraints::default()
        };
        let values = get_boundary_values(&constraints, true);
        let pairs: Vec<(f64, bool)> = values.iter().map(|v| (v.value, v.valid)).collect();
        assert_eq!(
            pairs,
            vec![(0.0, true), (-1.0, false), (100.0, true), (101.0, false)]
        );
    }

    #[test]
    fn test_length_limit_at_u64_max() {
        let constraints = Constraints {
            max_length: Some(u64::MAX),
            ..Constraints::default()
        };
        let labels: Vec<&str> = get_boundary_values(&constraints, false)
            .iter()
            .map(|v| v.label)
            .collect();
        assert_eq!(labels, vec!["max_length"]);
    }

    #[test]
    fn test_exclusive_bounds() {
        let constraints = Constraints {
            exclusive_minimum: Some(0.0),
            exclusive_maximum: Some(10.0),
            ..Constraints::default()
        };
        let values = get_boundary_values(&constraints, true);
        assert!(values.contains(&BoundaryValue::new("exclusive_min", BoundaryTarget::Value, 0.0, false)));
        assert!(values.contains(&BoundaryValue::new(
            "below_exclusive_max",
            BoundaryTarget::Value,
            9.0,
            true
        )));
    }

    #[test]
    fn test_narrow_number_range_uses_fine_step() {
        let constraints = Constraints {
            minimum: Some(0.0),
            maximum: Some(1.0),
            ..Constraints::default()
        };
        let values = get_boundary_values(&constraints, false);
        assert_eq!(values[1].value, -0.01);
    }

    #[test]
    fn test_zero_min_length_has_no_below() {
        let constraints = Constraints {
            min_length: Some(0),
            max_length: Some(5),
            ..Constraints::default()
        };
        let labels: Vec<&str> = get_boundary_values(&constraints, false)
            .iter()
            .map(|v| v.label)
            .collect();
        assert_eq!(labels, vec!["min_length", "max_length", "above_max_length"]);
    }
}
