//! HTML form definitions.
//!
//! Each form is a plain struct deserialized from the submitted body, validated
//! with `validator` derives plus a `clean` step for rules that need context
//! (known categories, password strength). Every form also describes its
//! fields as [`FieldHint`]s so templates can render inputs without
//! hard-coding widgets, labels or CSS classes.

pub mod account;
pub mod category;
pub mod film;

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::Serialize;
use validator::{ValidationError, ValidationErrors};

/// Key under which errors that belong to no single field are stored.
pub const NON_FIELD: &str = "__all__";

pub(crate) const REQUIRED: &str = "This field is required.";

/// Field name -> ordered list of messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.add(NON_FIELD, message);
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn non_field(&self) -> &[String] {
        self.get(NON_FIELD)
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fold another set of errors into this one.
    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        for (field, list) in errors.field_errors() {
            for err in list.iter() {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({})", err.code));
                out.add(&field.to_string(), message);
            }
        }
        out
    }
}

/// Run the derive-generated validation and collect the failures.
pub(crate) fn collect<T: validator::Validate>(form: &T) -> FieldErrors {
    match form.validate() {
        Ok(()) => FieldErrors::new(),
        Err(errors) => errors.into(),
    }
}

/// Build a `ValidationError` with a human-readable message.
pub(crate) fn error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// Rejects blank (empty or whitespace-only) values.
pub(crate) fn required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("required", REQUIRED));
    }
    Ok(())
}

/// Input widget used to render a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Widget {
    Text,
    Textarea,
    Email,
    Password,
    File,
    Select,
    Checkbox,
}

/// Presentation hints for one form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldHint {
    pub name: &'static str,
    pub label: &'static str,
    pub widget: Widget,
    pub css_class: &'static str,
    pub autocomplete: Option<&'static str>,
    pub autofocus: bool,
    pub required: bool,
    pub help_text: Option<&'static str>,
}

impl FieldHint {
    pub const fn new(name: &'static str, label: &'static str, widget: Widget) -> Self {
        let css_class = match widget {
            Widget::Checkbox => "form-check-input",
            _ => "form-control",
        };
        Self {
            name,
            label,
            widget,
            css_class,
            autocomplete: None,
            autofocus: false,
            required: true,
            help_text: None,
        }
    }

    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub const fn autocomplete(mut self, value: &'static str) -> Self {
        self.autocomplete = Some(value);
        self
    }

    pub const fn autofocus(mut self) -> Self {
        self.autofocus = true;
        self
    }

    pub const fn help(mut self, text: &'static str) -> Self {
        self.help_text = Some(text);
        self
    }
}
