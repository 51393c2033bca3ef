use analytics::Benchmarks;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationType {
    Opportunity,
    Warning,
    Strategy,
    Timing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationType,
    pub message: String,
    /// In [0, 1].
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
}

impl Recommendation {
    pub fn new(kind: RecommendationType, message: impl Into<String>, confidence: f64) -> Self {
        Self {
            kind,
            message: message.into(),
            confidence: confidence.clamp(0.0, 1.0),
            risk_level: None,
        }
    }

    pub fn with_risk(mut self, risk: RiskLevel) -> Self {
        self.risk_level = Some(risk);
        self
    }
}

/// Narrative layer attached to every successful response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Intelligence {
    pub insights: Vec<String>,
    pub recommendations: Vec<Recommendation>,
    /// Qualitative labels such as `marketPhase` or `concentrationLevel`.
    pub context: BTreeMap<String, String>,
}

impl Intelligence {
    pub fn insight(&mut self, text: impl Into<String>) {
        self.insights.push(text.into());
    }

    pub fn recommend(&mut self, recommendation: Recommendation) {
        self.recommendations.push(recommendation);
    }

    pub fn label(&mut self, key: &str, value: impl Into<String>) {
        self.context.insert(key.to_string(), value.into());
    }
}

/// What the cache stores for one endpoint query: everything except per-request metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    pub data: Value,
    pub intelligence: Intelligence,
    #[serde(default)]
    pub benchmarks: Option<Benchmarks>,
    pub computed_at: DateTime<Utc>,
    /// Fraction of the considered records that carried usable TVL.
    pub coverage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub request_id: String,
    pub response_time_ms: u64,
    pub data_source: String,
    pub computed_at: DateTime<Utc>,
    pub data_freshness_seconds: i64,
    pub methodology: String,
    pub coverage: f64,
    pub cache_hit: bool,
}

/// The success envelope returned by every analytics endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    pub data: Value,
    pub intelligence: Intelligence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benchmarks: Option<Benchmarks>,
    pub metadata: Metadata,
    pub timestamp: DateTime<Utc>,
}
