use axum::{
    extract::{rejection::FormRejection, Query, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
    Form,
};
use inventory_core::auth_gate::safe_return_path;
use inventory_core::models::{Credentials, RemoteStatus, LOGIN_PAGE};
use inventory_core::validation::validate_login;
use serde::Deserialize;
use tracing::{error, info, warn};

use super::form_or_400;
use crate::error::AppError;
use crate::gate::redirect;
use crate::session;
use crate::views::{bare_page, escape_html, Banner};
use crate::AppState;

pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
pub const LOGIN_UNAVAILABLE: &str = "Unable to login. Please try again.";

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub from: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub from: String,
}

fn render(username: &str, from: &str, banner: Option<Banner>) -> Html<String> {
    let banner = banner.map(|b| b.render()).unwrap_or_default();
    let content = format!(
        r#"<section class="panel login-panel">
    <h1>Sign in</h1>
    {}
    <form method="post" action="/" class="form">
        <input type="hidden" name="from" value="{}"/>
        <label class="field"><span>Username</span><input type="text" name="username" value="{}" autocomplete="username"/></label>
        <label class="field"><span>Password</span><input type="password" name="password" autocomplete="current-password"/></label>
        <button type="submit" class="btn btn-primary">Login</button>
    </form>
</section>"#,
        banner,
        escape_html(from),
        escape_html(username)
    );
    Html(bare_page("Login", &content))
}

pub async fn show(Query(query): Query<LoginQuery>) -> Html<String> {
    render("", query.from.as_deref().unwrap_or(""), None)
}

pub async fn submit(
    State(state): State<AppState>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Response, AppError> {
    let form = form_or_400(form)?;

    if let Err(message) = validate_login(&form.username, &form.password) {
        return Ok(render(&form.username, &form.from, Some(Banner::error(message))).into_response());
    }

    info!("🔑 Login attempt for {}", form.username);
    let credentials = Credentials {
        username: form.username.clone(),
        password: form.password,
    };

    match state.api.authorize(&credentials).await {
        Ok(RemoteStatus::Success) => {
            let target = safe_return_path(Some(&form.from));
            info!("✅ {} signed in, continuing to {}", form.username, target);
            let mut response = redirect(&target);
            session::append_cookies(
                response.headers_mut(),
                &session::login_cookies(&form.username, state.cookies),
            );
            Ok(response)
        }
        Ok(status) => {
            warn!("⚠️  Login refused for {} ({:?})", form.username, status);
            Ok(render(&form.username, &form.from, Some(Banner::error(INVALID_CREDENTIALS))).into_response())
        }
        Err(e) => {
            error!("❌ Login request failed: {}", e);
            Ok(render(&form.username, &form.from, Some(Banner::error(LOGIN_UNAVAILABLE))).into_response())
        }
    }
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    info!("👋 Logout for {}", session::username(&headers).unwrap_or_default());
    let mut response = redirect(LOGIN_PAGE);
    session::append_cookies(response.headers_mut(), &session::logout_cookies(state.cookies));
    response
}
