pub mod add_allocation;
pub mod available_resources;
pub mod dashboard;
pub mod delete_resources;
pub mod login;
pub mod person_view;
pub mod update_allocation;

use axum::{
    extract::{rejection::FormRejection, Form},
    http::{HeaderMap, Uri},
    response::Html,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::session;
use crate::views;

/// Unwraps a form body, turning a rejection into a 400 page.
pub(crate) fn form_or_400<T: DeserializeOwned>(form: Result<Form<T>, FormRejection>) -> Result<T, AppError> {
    form.map(|Form(inner)| inner)
        .map_err(|rejection| AppError::MalformedForm(rejection.body_text()))
}

/// Wraps page content in the shell with the signed-in user's name.
pub(crate) fn shell(headers: &HeaderMap, title: &str, active: &str, content: &str) -> Html<String> {
    let user = session::username(headers);
    Html(views::app_shell(title, active, user.as_deref(), content))
}

pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}
