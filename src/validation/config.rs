use super::rules::{
    CompanyNameRule, IntegerRangeRule, LengthRule, NonNegativeNumberRule, UrlRule,
};
use super::ValidationRule;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Serializable description of a field rule, as written in settings YAML:
///
/// ```yaml
/// tagline: { kind: length, min: 10, max: 200 }
/// website: { kind: url }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleConfig {
    Length {
        min: usize,
        max: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    CompanyName,
    Url,
    IntegerRange {
        min: i64,
        max: i64,
    },
    NonNegativeNumber,
}

impl RuleConfig {
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Length { min, max, .. } if min > max => {
                Err(format!("length rule min {min} exceeds max {max}"))
            }
            Self::IntegerRange { min, max } if min > max => {
                Err(format!("integer_range rule min {min} exceeds max {max}"))
            }
            _ => Ok(()),
        }
    }

    pub fn build(&self) -> Box<dyn ValidationRule> {
        match self {
            Self::Length { min, max, label } => Box::new(LengthRule {
                min: *min,
                max: *max,
                label: label.clone(),
            }),
            Self::CompanyName => Box::new(CompanyNameRule),
            Self::Url => Box::new(UrlRule),
            Self::IntegerRange { min, max } => Box::new(IntegerRangeRule {
                min: *min,
                max: *max,
            }),
            Self::NonNegativeNumber => Box::new(NonNegativeNumberRule),
        }
    }
}

pub fn default_rule_configs() -> BTreeMap<String, RuleConfig> {
    let mut rules = BTreeMap::new();
    rules.insert("company_name".to_string(), RuleConfig::CompanyName);
    rules.insert(
        "tagline".to_string(),
        RuleConfig::Length {
            min: 10,
            max: 200,
            label: None,
        },
    );
    rules.insert(
        "description".to_string(),
        RuleConfig::Length {
            min: 50,
            max: 1000,
            label: None,
        },
    );
    for field in ["website", "demo_url", "pitch_deck_url"] {
        rules.insert(field.to_string(), RuleConfig::Url);
    }
    rules.insert(
        "employees_count".to_string(),
        RuleConfig::IntegerRange { min: 1, max: 10_000 },
    );
    for field in [
        "monthly_revenue",
        "funding_amount",
        "seeking_amount",
        "monthly_users",
    ] {
        rules.insert(field.to_string(), RuleConfig::NonNegativeNumber);
    }
    rules
}
