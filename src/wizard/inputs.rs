use std::collections::BTreeMap;

/// The rendered form: where current values are read from and where
/// per-field messages are shown.
pub trait FormInputs {
    fn value(&self, name: &str) -> Option<String>;
    fn values(&self) -> BTreeMap<String, String>;
    fn set_value(&mut self, name: &str, value: &str);
    fn show_error(&mut self, name: &str, message: Option<&str>);
}

/// Form surface held entirely in memory; also records what was displayed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryForm {
    values: BTreeMap<String, String>,
    displayed_errors: BTreeMap<String, String>,
}

impl InMemoryForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            displayed_errors: BTreeMap::new(),
        }
    }

    pub fn clear(&mut self, name: &str) {
        self.values.remove(name);
    }

    pub fn displayed_error(&self, name: &str) -> Option<&str> {
        self.displayed_errors.get(name).map(String::as_str)
    }
}

impl FormInputs for InMemoryForm {
    fn value(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }

    fn values(&self) -> BTreeMap<String, String> {
        self.values.clone()
    }

    fn set_value(&mut self, name: &str, value: &str) {
        self.values.insert(name.to_string(), value.to_string());
    }

    fn show_error(&mut self, name: &str, message: Option<&str>) {
        match message {
            Some(message) => {
                self.displayed_errors
                    .insert(name.to_string(), message.to_string());
            }
            None => {
                self.displayed_errors.remove(name);
            }
        }
    }
}
