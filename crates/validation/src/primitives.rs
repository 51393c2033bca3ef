use crate::error::ValidationError;
use crate::raw::{QueryValue, RawQuery};
use crate::rules::ValidationRules;
use core_types::Timeframe;

/// A validated value together with every violation recorded while building it.
///
/// Invalid fields already hold their fallback (default or clamped) value, so
/// `value` is always fully populated.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated<T> {
    pub value: T,
    pub violations: Vec<String>,
}

impl<T> Validated<T> {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Fails with a single aggregated error if anything was violated.
    pub fn into_result(self) -> Result<T, ValidationError> {
        if self.violations.is_empty() {
            Ok(self.value)
        } else {
            Err(ValidationError::new(self.violations))
        }
    }
}

enum Scalar {
    Missing,
    Invalid,
    Value(String),
}

/// Reads fields out of a `RawQuery`, collecting violations instead of stopping at the first.
pub(crate) struct FieldChecker<'a> {
    raw: &'a RawQuery,
    violations: Vec<String>,
}

impl<'a> FieldChecker<'a> {
    pub fn new(raw: &'a RawQuery) -> Self {
        Self {
            raw,
            violations: Vec::new(),
        }
    }

    pub fn finish<T>(self, value: T) -> Validated<T> {
        Validated {
            value,
            violations: self.violations,
        }
    }

    fn violation(&mut self, message: String) {
        self.violations.push(message);
    }

    fn scalar(&mut self, field: &str) -> Scalar {
        match self.raw.get(field) {
            None => Scalar::Missing,
            Some(QueryValue::Text(s)) if s.trim().is_empty() => Scalar::Missing,
            Some(QueryValue::Text(s)) => Scalar::Value(s.trim().to_string()),
            Some(QueryValue::List(_)) => {
                self.violation(format!("{} must be a single value", field));
                Scalar::Invalid
            }
            Some(QueryValue::Other(_)) => {
                self.violation(format!("{} must be a string", field));
                Scalar::Invalid
            }
        }
    }

    /// A value from a fixed allow-list; anything else records an error and keeps `default`.
    pub fn enumerated<T: Copy>(&mut self, field: &str, allowed: &[(&str, T)], default: T) -> T {
        let Scalar::Value(input) = self.scalar(field) else {
            return default;
        };
        let wanted = compact(&input);
        if let Some((_, value)) = allowed.iter().find(|(name, _)| compact(name) == wanted) {
            return *value;
        }
        let names: Vec<&str> = allowed.iter().map(|(name, _)| *name).collect();
        self.violation(format!(
            "Invalid {} '{}'. Must be one of: {}",
            field,
            input.to_lowercase(),
            names.join(", ")
        ));
        default
    }

    pub fn timeframe(&mut self, field: &str, default: Timeframe) -> Timeframe {
        let allowed: Vec<(&str, Timeframe)> = Timeframe::ALL.iter().map(|t| (t.as_str(), *t)).collect();
        self.enumerated(field, &allowed, default)
    }

    /// A bounded integer: non-numeric or too low resets to `default`, too high clamps to `max`.
    pub fn bounded_int(&mut self, field: &str, min: u64, max: u64, default: u64) -> u64 {
        let Some(value) = self.number(field) else {
            return default;
        };
        if value < min as f64 {
            self.violation(format!("{} must be at least {}", field, min));
            default
        } else if value > max as f64 {
            self.violation(format!("{} cannot exceed {}", field, max));
            max
        } else {
            value.floor() as u64
        }
    }

    /// The floating-point counterpart of `bounded_int`, with the same reject-low / clamp-high rule.
    pub fn bounded_float(&mut self, field: &str, min: f64, max: f64, default: f64) -> f64 {
        let Some(value) = self.number(field) else {
            return default;
        };
        if value < min {
            self.violation(format!("{} must be at least {}", field, min));
            default
        } else if value > max {
            self.violation(format!("{} cannot exceed {}", field, max));
            max
        } else {
            value
        }
    }

    fn number(&mut self, field: &str) -> Option<f64> {
        let Scalar::Value(input) = self.scalar(field) else {
            return None;
        };
        match input.parse::<f64>() {
            Ok(v) if v.is_finite() => Some(v),
            _ => {
                self.violation(format!("{} must be a number", field));
                None
            }
        }
    }

    pub fn flag(&mut self, field: &str, default: bool) -> bool {
        let Scalar::Value(input) = self.scalar(field) else {
            return default;
        };
        match input.to_lowercase().as_str() {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            _ => {
                self.violation(format!("{} must be true or false", field));
                default
            }
        }
    }

    /// A de-duplicated, size-capped list filtered against `allowed`.
    ///
    /// Unknown members are reported by name but do not block the valid ones.
    /// `None` when nothing valid remains.
    pub fn list(&mut self, field: &str, max_items: usize, allowed: &[&str]) -> Option<Vec<String>> {
        let items: Vec<String> = match self.raw.get(field)? {
            QueryValue::Text(s) => split_items(std::iter::once(s.as_str())),
            QueryValue::List(values) => split_items(values.iter().map(String::as_str)),
            QueryValue::Other(_) => {
                self.violation(format!(
                    "{} must be a comma-separated string or an array of strings",
                    field
                ));
                return None;
            }
        };

        let mut unique: Vec<String> = Vec::new();
        for item in items {
            if !unique.contains(&item) {
                unique.push(item);
            }
        }
        if unique.len() > max_items {
            tracing::debug!(field, supplied = unique.len(), max_items, "Truncating list parameter.");
            unique.truncate(max_items);
        }

        let (valid, invalid): (Vec<String>, Vec<String>) =
            unique.into_iter().partition(|item| allowed.contains(&item.as_str()));
        if !invalid.is_empty() {
            self.violation(format!("Invalid {}: {}", field, invalid.join(", ")));
        }

        if valid.is_empty() { None } else { Some(valid) }
    }

    /// Timeframe list that falls back to `[default]` when nothing valid is supplied.
    pub fn timeframes(&mut self, field: &str, max_items: usize, default: Timeframe) -> Vec<Timeframe> {
        let labels: Vec<&str> = Timeframe::ALL.iter().map(Timeframe::as_str).collect();
        self.list(field, max_items, &labels)
            .map(|items| items.iter().filter_map(|i| i.parse().ok()).collect::<Vec<_>>())
            .filter(|parsed: &Vec<Timeframe>| !parsed.is_empty())
            .unwrap_or_else(|| vec![default])
    }

    /// A required chain, lower-cased, alias-resolved and checked against the supported list.
    pub fn supported_chain(&mut self, field: &str, rules: &ValidationRules) -> String {
        let fallback = rules
            .supported_chains
            .first()
            .map(|(id, _)| id.to_string())
            .unwrap_or_default();

        let input = match self.scalar(field) {
            Scalar::Value(v) => v,
            Scalar::Missing => {
                self.violation(format!("{} is required", field));
                return fallback;
            }
            Scalar::Invalid => return fallback,
        };

        let lowered = input.to_lowercase();
        let canonical = rules
            .chain_aliases
            .iter()
            .find(|(alias, _)| *alias == lowered)
            .map(|(_, target)| target.to_string())
            .unwrap_or(lowered);

        if rules.supported_chains.iter().any(|(id, _)| *id == canonical) {
            canonical
        } else {
            let supported: Vec<&str> = rules.supported_chains.iter().map(|(id, _)| *id).collect();
            self.violation(format!(
                "Unsupported chain '{}'. Supported chains: {}",
                canonical,
                supported.join(", ")
            ));
            fallback
        }
    }
}

fn compact(s: &str) -> String {
    s.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

fn split_items<'s>(values: impl Iterator<Item = &'s str>) -> Vec<String> {
    values
        .flat_map(|v| v.split(','))
        .map(|item| item.trim().to_lowercase())
        .filter(|item| !item.is_empty())
        .collect()
}
