use super::number::{parse_leading_float, parse_leading_int};
use super::{field_label, ValidationRule};

pub const REQUIRED_MESSAGE: &str = "This field is required";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequiredRule;

impl ValidationRule for RequiredRule {
    fn validate(&self, _field: &str, value: &str) -> Option<String> {
        value.is_empty().then(|| REQUIRED_MESSAGE.to_string())
    }
}

/// Bounds on the number of characters (not bytes) in a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthRule {
    pub min: usize,
    pub max: usize,
    pub label: Option<String>,
}

impl LengthRule {
    pub fn new(min: usize, max: usize) -> Self {
        Self {
            min,
            max,
            label: None,
        }
    }

    pub fn labelled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    fn label_for(&self, field: &str) -> String {
        self.label.clone().unwrap_or_else(|| field_label(field))
    }
}

impl ValidationRule for LengthRule {
    fn validate(&self, field: &str, value: &str) -> Option<String> {
        let len = value.chars().count();
        if len < self.min {
            return Some(format!(
                "{} must be at least {} characters",
                self.label_for(field),
                self.min
            ));
        }
        if len > self.max {
            return Some(format!(
                "{} cannot exceed {} characters",
                self.label_for(field),
                self.max
            ));
        }
        None
    }
}

const COMPANY_NAME_MIN: usize = 2;
const COMPANY_NAME_MAX: usize = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompanyNameRule;

fn is_company_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric()
        || ('\u{00C0}'..='\u{00FF}').contains(&ch)
        || ch.is_whitespace()
        || matches!(ch, '&' | '.' | '-')
}

impl ValidationRule for CompanyNameRule {
    fn validate(&self, field: &str, value: &str) -> Option<String> {
        if let Some(message) = LengthRule::new(COMPANY_NAME_MIN, COMPANY_NAME_MAX)
            .labelled("Name")
            .validate(field, value)
        {
            return Some(message);
        }
        if !value.chars().all(is_company_name_char) {
            return Some("Name contains invalid characters".to_string());
        }
        None
    }
}

/// `http(s)://` followed by something host-shaped and no whitespace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UrlRule;

fn is_line_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

pub fn looks_like_url(value: &str) -> bool {
    let Some(rest) = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"))
    else {
        return false;
    };
    let mut chars = rest.chars();
    match chars.next() {
        Some(first) if !first.is_whitespace() && !matches!(first, '$' | '.' | '?' | '#') => {}
        _ => return false,
    }
    match chars.next() {
        Some(second) if !is_line_terminator(second) => {}
        _ => return false,
    }
    chars.all(|ch| !ch.is_whitespace())
}

impl ValidationRule for UrlRule {
    fn validate(&self, _field: &str, value: &str) -> Option<String> {
        if looks_like_url(value) {
            None
        } else {
            Some("Please enter a valid URL (e.g. https://example.com)".to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegerRangeRule {
    pub min: i64,
    pub max: i64,
}

impl ValidationRule for IntegerRangeRule {
    fn validate(&self, _field: &str, value: &str) -> Option<String> {
        match parse_leading_int(value) {
            Some(number) if number > self.max => {
                Some(format!("The number seems too high (maximum {})", self.max))
            }
            Some(number) if number >= self.min => None,
            _ => Some(format!(
                "Must be a whole number between {} and {}",
                self.min, self.max
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NonNegativeNumberRule;

impl ValidationRule for NonNegativeNumberRule {
    fn validate(&self, _field: &str, value: &str) -> Option<String> {
        match parse_leading_float(value) {
            Some(amount) if amount >= 0.0 => None,
            _ => Some("Must be a positive number".to_string()),
        }
    }
}
