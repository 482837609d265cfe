//! Form controls, native-style constraint validation and the serializers the
//! console uses to build request payloads.

use client_core::request::{FilePart, MultipartForm};
use regex::Regex;
use serde_json::{Map, Value};

use super::{markup::Attributes, region::RegionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Text,
    Password,
    Email,
    Number,
    Hidden,
    Checkbox,
    Radio,
    File,
    Select,
    TextArea,
    Button,
}

impl ControlKind {
    pub fn from_input_type(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "password" => Self::Password,
            "email" => Self::Email,
            "number" | "range" => Self::Number,
            "hidden" => Self::Hidden,
            "checkbox" => Self::Checkbox,
            "radio" => Self::Radio,
            "file" => Self::File,
            "submit" | "button" | "reset" | "image" => Self::Button,
            _ => Self::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub id: Option<String>,
    pub name: Option<String>,
    pub kind: ControlKind,
    pub value: String,
    pub checked: bool,
    pub required: bool,
    pub disabled: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<String>,
    pub options: Vec<String>,
    pub files: Vec<FilePart>,
    pub form: Option<String>,
    pub region: Option<RegionId>,
}

impl Control {
    pub fn new(kind: ControlKind) -> Self {
        Self {
            id: None,
            name: None,
            kind,
            value: String::new(),
            checked: false,
            required: false,
            disabled: false,
            min_length: None,
            max_length: None,
            pattern: None,
            options: Vec::new(),
            files: Vec::new(),
            form: None,
            region: None,
        }
    }

    pub(crate) fn from_attributes(kind: ControlKind, attrs: &Attributes, form: Option<String>) -> Self {
        let non_empty = |name: &str| {
            attrs
                .get(name)
                .map(str::to_string)
                .filter(|value| !value.is_empty())
        };
        let value = match kind {
            ControlKind::Checkbox | ControlKind::Radio => {
                attrs.get("value").unwrap_or("on").to_string()
            }
            _ => attrs.get("value").unwrap_or_default().to_string(),
        };
        Self {
            id: non_empty("id"),
            name: non_empty("name"),
            kind,
            value,
            checked: attrs.has("checked"),
            required: attrs.has("required"),
            disabled: attrs.has("disabled"),
            min_length: attrs.get("minlength").and_then(|v| v.trim().parse().ok()),
            max_length: attrs.get("maxlength").and_then(|v| v.trim().parse().ok()),
            pattern: non_empty("pattern"),
            options: Vec::new(),
            files: Vec::new(),
            form: non_empty("form").or(form),
            region: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        if self.name.is_none() {
            self.name = Some(id.clone());
        }
        self.id = Some(id);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn in_form(mut self, form: impl Into<String>) -> Self {
        self.form = Some(form.into());
        self
    }

    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = Some(min_length);
        self
    }

    /// Whether the control takes part in serialization (a "successful"
    /// control in form-submission terms).
    fn is_successful(&self) -> bool {
        if self.disabled || self.name.is_none() {
            return false;
        }
        match self.kind {
            ControlKind::Button | ControlKind::File => false,
            ControlKind::Checkbox | ControlKind::Radio => self.checked,
            _ => true,
        }
    }

    fn is_validated(&self) -> bool {
        !self.disabled && !matches!(self.kind, ControlKind::Hidden | ControlKind::Button)
    }

    fn value_problem(&self) -> Option<ValidityProblem> {
        let value = self.value.as_str();
        let len = value.chars().count();
        match self.kind {
            ControlKind::Checkbox => {
                return (self.required && !self.checked).then_some(ValidityProblem::ValueMissing)
            }
            ControlKind::Radio => return None,
            ControlKind::File => {
                return (self.required && self.files.is_empty())
                    .then_some(ValidityProblem::ValueMissing)
            }
            _ => {}
        }
        if value.is_empty() {
            return self.required.then_some(ValidityProblem::ValueMissing);
        }
        if matches!(
            self.kind,
            ControlKind::Select | ControlKind::Hidden | ControlKind::Button
        ) {
            return None;
        }
        if self.min_length.is_some_and(|min| len < min) {
            return Some(ValidityProblem::TooShort);
        }
        if self.max_length.is_some_and(|max| len > max) {
            return Some(ValidityProblem::TooLong);
        }
        if self.kind == ControlKind::Email && !looks_like_email(value) {
            return Some(ValidityProblem::TypeMismatch);
        }
        if self.kind == ControlKind::Number && value.trim().parse::<f64>().is_err() {
            return Some(ValidityProblem::BadInput);
        }
        if let Some(pattern) = &self.pattern {
            // An unparsable pattern is ignored, as browsers do.
            if let Ok(re) = Regex::new(&format!("^(?:{pattern})$")) {
                if !re.is_match(value) {
                    return Some(ValidityProblem::PatternMismatch);
                }
            }
        }
        None
    }
}

fn looks_like_email(value: &str) -> bool {
    let mut parts = value.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidityProblem {
    ValueMissing,
    TooShort,
    TooLong,
    TypeMismatch,
    BadInput,
    PatternMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidControl {
    pub control: String,
    pub problem: ValidityProblem,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub region: Option<RegionId>,
    /// Set once validation feedback has been requested for the form.
    pub validated: bool,
}

/// Runs constraint validation over the controls of one form.
pub fn check_validity<'a>(controls: impl Iterator<Item = &'a Control>) -> Vec<InvalidControl> {
    let controls: Vec<&Control> = controls.filter(|c| c.is_validated()).collect();
    let mut invalid = Vec::new();

    for control in &controls {
        let label = control
            .id
            .clone()
            .or_else(|| control.name.clone())
            .unwrap_or_default();
        if let Some(problem) = control.value_problem() {
            invalid.push(InvalidControl {
                control: label,
                problem,
            });
            continue;
        }
        if control.kind == ControlKind::Radio && control.required {
            let group_checked = controls.iter().any(|other| {
                other.kind == ControlKind::Radio && other.name == control.name && other.checked
            });
            if !group_checked {
                invalid.push(InvalidControl {
                    control: label,
                    problem: ValidityProblem::ValueMissing,
                });
            }
        }
    }
    invalid
}

/// Name/value pairs of the successful controls, in document order.
pub fn serialize_pairs<'a>(controls: impl Iterator<Item = &'a Control>) -> Vec<(String, String)> {
    controls
        .filter(|c| c.is_successful())
        .filter_map(|c| c.name.clone().map(|name| (name, c.value.clone())))
        .collect()
}

/// JSON object of the successful controls. Repeated names collect into an
/// array.
pub fn serialize_json<'a>(controls: impl Iterator<Item = &'a Control>) -> Value {
    let mut object = Map::new();
    for (name, value) in serialize_pairs(controls) {
        match object.get_mut(&name) {
            Some(Value::Array(values)) => values.push(Value::String(value)),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, Value::String(value)]);
            }
            None => {
                object.insert(name, Value::String(value));
            }
        }
    }
    Value::Object(object)
}

/// Multipart body: every selected file of every named file control, then the
/// successful controls.
pub fn serialize_files<'a>(controls: impl Iterator<Item = &'a Control> + Clone) -> MultipartForm {
    let mut form = MultipartForm::new();
    for control in controls.clone() {
        if control.kind != ControlKind::File {
            continue;
        }
        let Some(name) = &control.name else {
            continue;
        };
        for file in &control.files {
            form.append_file(FilePart {
                field: name.clone(),
                ..file.clone()
            });
        }
    }
    for (name, value) in serialize_pairs(controls) {
        form.append_text(name, value);
    }
    form
}
