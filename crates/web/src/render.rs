//! Template environment and page rendering.
//!
//! Every page is rendered through [`render_page`], which merges the shared
//! navigation context (categories, viewer, pending flash messages) with the
//! page's own data.

use std::collections::BTreeMap;

use axum::response::Html;
use chrono::DateTime;
use filmhub_core::forms::{FieldErrors, FieldHint};
use filmhub_db::models::category::Category;
use filmhub_db::models::user::PublicUser;
use minijinja::Environment;
use serde::Serialize;

use crate::error::AppResult;
use crate::flash::{Flash, FlashMessage};
use crate::middleware::auth::CurrentUser;
use crate::state::AppState;

const TEMPLATES: [(&str, &str); 10] = [
    ("base.html", include_str!("../templates/base.html")),
    ("forms.html", include_str!("../templates/forms.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("film_detail.html", include_str!("../templates/film_detail.html")),
    ("edit_film.html", include_str!("../templates/edit_film.html")),
    ("user_auth.html", include_str!("../templates/user_auth.html")),
    ("profile.html", include_str!("../templates/profile.html")),
    ("edit_profile.html", include_str!("../templates/edit_profile.html")),
    ("admin_films.html", include_str!("../templates/admin_films.html")),
    ("admin_categories.html", include_str!("../templates/admin_categories.html")),
];

/// Build the template environment with every page template compiled in.
pub fn build_environment() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    for (name, source) in TEMPLATES {
        env.add_template(name, source)?;
    }
    env.add_filter("datetime", datetime);
    env.add_filter("truncate", truncate);
    Ok(env)
}

/// Cut text to at most `length` characters, ending in an ellipsis.
fn truncate(value: String, length: Option<usize>) -> String {
    let length = length.unwrap_or(255);
    if value.chars().count() <= length {
        return value;
    }
    let kept: String = value.chars().take(length.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}

/// Format an RFC 3339 timestamp for display; anything else passes through.
fn datetime(value: String) -> String {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or(value)
}

/// Context shared by every page.
#[derive(Serialize)]
struct PageContext<T: Serialize> {
    categories: Vec<Category>,
    user: Option<PublicUser>,
    messages: Vec<FlashMessage>,
    #[serde(flatten)]
    page: T,
}

/// Render `template` with the navigation context plus `page`.
///
/// Pending flash messages are moved out of `flash` into the page, so the
/// caller must return `flash` with the response to clear the cookie.
pub async fn render_page<T: Serialize>(
    state: &AppState,
    viewer: &CurrentUser,
    flash: &mut Flash,
    template: &str,
    page: T,
) -> AppResult<Html<String>> {
    let context = PageContext {
        categories: state.store.list_categories().await?,
        user: viewer.public(),
        messages: flash.take(),
        page,
    };
    let html = state.templates.get_template(template)?.render(context)?;
    Ok(Html(html))
}

/// One option of a `<select>`.
#[derive(Debug, Clone, Serialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

impl From<&Category> for Choice {
    fn from(category: &Category) -> Self {
        Self {
            value: category.id.to_string(),
            label: category.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldView {
    #[serde(flatten)]
    pub hint: FieldHint,
    pub value: String,
    pub errors: Vec<String>,
    pub choices: Vec<Choice>,
}

/// A form ready for the `forms.html` macros: hints, submitted values and
/// errors, in field order.
#[derive(Debug, Clone, Serialize)]
pub struct FormView {
    pub fields: Vec<FieldView>,
    pub non_field_errors: Vec<String>,
}

impl FormView {
    pub fn new(
        hints: &[FieldHint],
        values: &BTreeMap<&'static str, String>,
        errors: &FieldErrors,
    ) -> Self {
        let fields = hints
            .iter()
            .map(|hint| FieldView {
                hint: *hint,
                value: values.get(hint.name).cloned().unwrap_or_default(),
                errors: errors.get(hint.name).to_vec(),
                choices: Vec::new(),
            })
            .collect();
        Self {
            fields,
            non_field_errors: errors.non_field().to_vec(),
        }
    }

    /// Attach options to a select field.
    pub fn with_choices(mut self, field: &str, choices: Vec<Choice>) -> Self {
        if let Some(view) = self.fields.iter_mut().find(|f| f.hint.name == field) {
            view.choices = choices;
        }
        self
    }
}
