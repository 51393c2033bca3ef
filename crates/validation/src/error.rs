use thiserror::Error;

/// Every violation found while validating one query, in field order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid query parameters: {}", .violations.join("; "))]
pub struct ValidationError {
    pub violations: Vec<String>,
}

impl ValidationError {
    pub fn new(violations: Vec<String>) -> Self {
        Self { violations }
    }

    /// True if any violation message contains `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        self.violations.iter().any(|v| v.contains(needle))
    }
}
