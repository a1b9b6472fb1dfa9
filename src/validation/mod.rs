//! Pure field validation: every rule maps a raw input value to an optional
//! error message and never touches wizard state.

pub mod config;
pub mod number;
pub mod rules;

pub use config::{default_rule_configs, RuleConfig};
pub use rules::{
    CompanyNameRule, IntegerRangeRule, LengthRule, NonNegativeNumberRule, RequiredRule, UrlRule,
    REQUIRED_MESSAGE,
};

/// Capability shared by every field rule. Rules travel with their controller,
/// so they must be `Send`.
pub trait ValidationRule: Send {
    fn validate(&self, field: &str, value: &str) -> Option<String>;
}

impl<F> ValidationRule for F
where
    F: Fn(&str, &str) -> Option<String> + Send,
{
    fn validate(&self, field: &str, value: &str) -> Option<String> {
        self(field, value)
    }
}

/// Turns `company_name` into `Company name` for messages.
pub fn field_label(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
