//! Route guard decision table.
//!
//! The gate only looks at whether a session cookie is present. It does not
//! validate the cookie; real authorization is the remote service's job.

use crate::encoding::encode_component;
use crate::models::{DEFAULT_PAGE, LOGIN_PAGE};

const STATIC_PREFIXES: [&str; 2] = ["/_next", "/static"];
const API_PREFIX: &str = "/api";
const FAVICON: &str = "/favicon.ico";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    PassThrough,
    /// Unauthenticated access to a protected page; `from` is the original
    /// path plus query so login can send the user back.
    RedirectToLogin { from: String },
    /// Authenticated access to the login page.
    RedirectToDefault,
}

impl GateDecision {
    /// Redirect target, `None` for pass-through.
    pub fn location(&self) -> Option<String> {
        match self {
            GateDecision::PassThrough => None,
            GateDecision::RedirectToDefault => Some(DEFAULT_PAGE.to_string()),
            GateDecision::RedirectToLogin { from } if from.is_empty() => {
                Some(LOGIN_PAGE.to_string())
            }
            GateDecision::RedirectToLogin { from } => {
                Some(format!("{}?from={}", LOGIN_PAGE, encode_component(from)))
            }
        }
    }
}

pub fn is_static_path(path: &str) -> bool {
    path == FAVICON || STATIC_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

pub fn is_api_path(path: &str) -> bool {
    path.starts_with(API_PREFIX)
}

pub fn evaluate(path: &str, query: Option<&str>, has_session: bool) -> GateDecision {
    if is_static_path(path) || is_api_path(path) {
        return GateDecision::PassThrough;
    }

    let is_root = path == LOGIN_PAGE;

    if has_session && is_root {
        return GateDecision::RedirectToDefault;
    }

    if !has_session && !is_root {
        let from = match query.filter(|q| !q.is_empty()) {
            Some(q) => format!("{}?{}", path, q),
            None => path.to_string(),
        };
        return GateDecision::RedirectToLogin { from };
    }

    GateDecision::PassThrough
}

/// Where to send the user after a successful login.
///
/// Only same-origin absolute paths are honoured; anything else, including
/// protocol-relative `//host` forms, falls back to the default page.
/// Browsers drop tabs and newlines while parsing a URL, so a path holding
/// any control or whitespace character is refused too.
pub fn safe_return_path(from: Option<&str>) -> String {
    match from.map(str::trim) {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.chars().any(|c| c.is_control() || c.is_whitespace()) =>
        {
            path.to_string()
        }
        _ => DEFAULT_PAGE.to_string(),
    }
}
