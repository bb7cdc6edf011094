//! Category form used by the administration pages.

use std::collections::BTreeMap;

use serde::Deserialize;
use validator::{Validate, ValidationError};

use super::{collect, error, required, FieldErrors, FieldHint, Widget};
use crate::slug::is_valid_slug;

pub const SLUG_TAKEN: &str = "Category with this slug already exists.";

const FIELDS: [FieldHint; 2] = [
    FieldHint::new("name", "Name", Widget::Text).autofocus(),
    FieldHint::new("slug", "Slug", Widget::Text)
        .help("Letters, numbers, underscores or hyphens. Used in the category URL."),
];

fn valid_slug(value: &str) -> Result<(), ValidationError> {
    if is_valid_slug(value) {
        Ok(())
    } else {
        Err(error(
            "invalid_slug",
            "Enter a valid slug consisting of letters, numbers, underscores or hyphens (at most 50).",
        ))
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CategoryForm {
    #[validate(
        custom(function = "required"),
        length(max = 50, message = "Ensure this value has at most 50 characters.")
    )]
    pub name: String,
    #[validate(custom(function = "valid_slug"))]
    pub slug: String,
}

impl CategoryForm {
    pub fn hints() -> &'static [FieldHint] {
        &FIELDS
    }

    pub fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.slug = self.slug.trim().to_string();
    }

    /// Slug uniqueness needs the store and is checked by the caller.
    pub fn clean(&self) -> Result<(), FieldErrors> {
        collect(self).into_result()
    }

    pub fn values(&self) -> BTreeMap<&'static str, String> {
        BTreeMap::from([("name", self.name.clone()), ("slug", self.slug.clone())])
    }
}
