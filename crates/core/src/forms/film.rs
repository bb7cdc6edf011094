//! Film submission form.

use std::collections::BTreeMap;

use validator::Validate;

use super::{collect, required, FieldErrors, FieldHint, Widget, REQUIRED};
use crate::error::CoreError;
use crate::media::{inspect_image, ImageInfo, UploadedImage};
use crate::types::DbId;

const FIELDS_CREATE: [FieldHint; 5] = [
    FieldHint::new("title", "Title", Widget::Text).autofocus(),
    FieldHint::new("description", "Description", Widget::Textarea),
    FieldHint::new("image", "Image", Widget::File),
    FieldHint::new("category", "Category", Widget::Select),
    FieldHint::new("is_published", "Published", Widget::Checkbox).optional(),
];

const FIELDS_EDIT: [FieldHint; 5] = [
    FieldHint::new("title", "Title", Widget::Text).autofocus(),
    FieldHint::new("description", "Description", Widget::Textarea),
    FieldHint::new("image", "Image", Widget::File)
        .optional()
        .help("Leave empty to keep the current image."),
    FieldHint::new("category", "Category", Widget::Select),
    FieldHint::new("is_published", "Published", Widget::Checkbox).optional(),
];

/// A film as submitted through the create or edit page.
///
/// The form has no author field: the author is always taken from the session.
#[derive(Debug, Clone, Validate)]
pub struct FilmForm {
    #[validate(
        custom(function = "required"),
        length(max = 100, message = "Ensure this value has at most 100 characters.")
    )]
    pub title: String,
    #[validate(custom(function = "required"))]
    pub description: String,
    pub category_id: Option<DbId>,
    pub is_published: bool,
    pub image: Option<UploadedImage>,
}

impl Default for FilmForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            category_id: None,
            // New films start out published.
            is_published: true,
            image: None,
        }
    }
}

impl FilmForm {
    /// Field hints; the image becomes optional once a film already has one.
    pub fn hints(editing: bool) -> &'static [FieldHint] {
        if editing {
            &FIELDS_EDIT
        } else {
            &FIELDS_CREATE
        }
    }

    /// Strip surrounding whitespace from the title.
    pub fn normalize(&mut self) {
        self.title = self.title.trim().to_string();
    }

    /// Validate the whole form.
    ///
    /// `category_ids` are the categories that exist right now. When
    /// `has_existing_image` is set a missing upload keeps the old image.
    /// On success returns the inspected upload, if there was one.
    pub fn clean(
        &self,
        category_ids: &[DbId],
        has_existing_image: bool,
        max_upload_bytes: usize,
    ) -> Result<Option<ImageInfo>, FieldErrors> {
        let mut errors = collect(self);

        match self.category_id {
            None => errors.add("category", REQUIRED),
            Some(id) if !category_ids.contains(&id) => errors.add(
                "category",
                "Select a valid choice. That choice is not one of the available choices.",
            ),
            Some(_) => {}
        }

        let mut info = None;
        match &self.image {
            None if !has_existing_image => errors.add("image", REQUIRED),
            None => {}
            Some(upload) if upload.bytes.len() > max_upload_bytes => errors.add(
                "image",
                format!("The file is too large (limit is {max_upload_bytes} bytes)."),
            ),
            Some(upload) => match inspect_image(&upload.bytes) {
                Ok(found) => info = Some(found),
                Err(CoreError::Validation(msg)) => errors.add("image", msg),
                Err(other) => errors.add("image", other.to_string()),
            },
        }

        errors.into_result().map(|()| info)
    }

    /// Submitted values keyed by field name, for re-rendering the form.
    pub fn values(&self) -> BTreeMap<&'static str, String> {
        BTreeMap::from([
            ("title", self.title.clone()),
            ("description", self.description.clone()),
            (
                "category",
                self.category_id.map(|id| id.to_string()).unwrap_or_default(),
            ),
            (
                "is_published",
                if self.is_published { "on" } else { "" }.to_string(),
            ),
        ])
    }
}
