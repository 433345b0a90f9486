//! HTML rendering shared by every page: the app shell, banners and form
//! helpers. Pages are plain server-rendered strings.

pub mod charts;

use axum::http::StatusCode;
use chrono::Local;
use inventory_core::validation::FieldErrors;

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
    Info,
}

impl BannerKind {
    fn class(&self) -> &'static str {
        match self {
            BannerKind::Success => "banner banner-success",
            BannerKind::Error => "banner banner-error",
            BannerKind::Info => "banner banner-info",
        }
    }
}

/// A status line shown above a form.
#[derive(Debug, Clone, PartialEq)]
pub struct Banner {
    pub kind: BannerKind,
    pub text: String,
}

impl Banner {
    pub fn success(text: impl Into<String>) -> Self {
        Self { kind: BannerKind::Success, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { kind: BannerKind::Error, text: text.into() }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self { kind: BannerKind::Info, text: text.into() }
    }

    pub fn render(&self) -> String {
        format!(
            r#"<div class="{}" role="status">{}</div>"#,
            self.kind.class(),
            escape_html(&self.text)
        )
    }
}

pub fn render_banners(banners: &[Banner]) -> String {
    banners.iter().map(Banner::render).collect()
}

struct NavItem {
    href: &'static str,
    label: &'static str,
}

const NAV_ITEMS: [NavItem; 6] = [
    NavItem { href: "/dashboard", label: "Dashboard" },
    NavItem { href: "/add-resource-allocation", label: "Add Resource Allocation" },
    NavItem { href: "/update-resource-allocation", label: "Update Resource Allocation" },
    NavItem { href: "/delete-resources", label: "Delete Resources" },
    NavItem { href: "/person-view", label: "Person View" },
    NavItem { href: "/available-resources", label: "Available Resources" },
];

fn sidebar(active: &str) -> String {
    let links: String = NAV_ITEMS
        .iter()
        .map(|item| {
            let class = if item.href == active { "nav-link active" } else { "nav-link" };
            format!(r#"<a class="{}" href="{}">{}</a>"#, class, item.href, item.label)
        })
        .collect();

    format!(
        r#"<aside class="sidebar"><div class="brand">Inventory</div><nav>{}</nav></aside>"#,
        links
    )
}

fn header(user: Option<&str>) -> String {
    let now = Local::now();
    let user = escape_html(user.unwrap_or("User"));
    format!(
        r#"<header class="topbar">
    <time id="clock" datetime="{}">{}</time>
    <details class="user-menu">
        <summary>{}</summary>
        <form method="post" action="/logout"><button type="submit" class="btn btn-link">Logout</button></form>
    </details>
</header>"#,
        now.to_rfc3339(),
        now.format("%a, %d %b %Y %H:%M:%S"),
        user
    )
}

fn document(title: &str, body_class: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8"/>
    <meta name="viewport" content="width=device-width, initial-scale=1"/>
    <title>{} | Inventory</title>
    <link rel="stylesheet" href="/static/app.css"/>
    <script src="/static/app.js" defer></script>
</head>
<body class="{}">
{}
</body>
</html>"#,
        escape_html(title),
        body_class,
        body
    )
}

/// Sidebar + header layout for every page behind the login.
pub fn app_shell(title: &str, active: &str, user: Option<&str>, content: &str) -> String {
    let body = format!(
        r#"<div class="layout">
{}
<div class="main">
{}
<main class="content">
<h1>{}</h1>
{}
</main>
</div>
</div>"#,
        sidebar(active),
        header(user),
        escape_html(title),
        content
    );
    document(title, "app", &body)
}

/// Page without navigation, used by the login screen.
pub fn bare_page(title: &str, content: &str) -> String {
    document(title, "bare", content)
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let content = format!(
        r#"<section class="panel error-panel">
    <h1>{}</h1>
    <p>{}</p>
    <a class="btn btn-primary" href="/dashboard">Back to dashboard</a>
</section>"#,
        status,
        escape_html(message)
    );
    bare_page("Error", &content)
}

pub fn field_error(errors: &FieldErrors, field: &str) -> String {
    match errors.get(field) {
        Some(message) => format!(r#"<p class="field-error">{}</p>"#, escape_html(message)),
        None => String::new(),
    }
}

pub struct Input<'a> {
    pub name: &'a str,
    pub label: &'a str,
    pub value: &'a str,
    pub kind: &'a str,
    pub readonly: bool,
}

impl<'a> Input<'a> {
    pub fn text(name: &'a str, label: &'a str, value: &'a str) -> Self {
        Self { name, label, value, kind: "text", readonly: false }
    }

    pub fn kind(mut self, kind: &'a str) -> Self {
        self.kind = kind;
        self
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    /// Label, input and any error for `error_key`.
    pub fn render(&self, errors: &FieldErrors, error_key: &str) -> String {
        let invalid = errors.get(error_key).is_some();
        format!(
            r#"<label class="field{}"><span>{}</span><input type="{}" name="{}" value="{}"{}/>{}</label>"#,
            if invalid { " invalid" } else { "" },
            escape_html(self.label),
            self.kind,
            self.name,
            escape_html(self.value),
            if self.readonly { " readonly" } else { "" },
            field_error(errors, error_key)
        )
    }
}

pub fn textarea(name: &str, label: &str, value: &str, errors: &FieldErrors, error_key: &str) -> String {
    format!(
        r#"<label class="field{}"><span>{}</span><textarea name="{}" rows="3">{}</textarea>{}</label>"#,
        if errors.get(error_key).is_some() { " invalid" } else { "" },
        escape_html(label),
        name,
        escape_html(value),
        field_error(errors, error_key)
    )
}

/// `<select>` with a blank first option; `value` is kept selected only if it
/// is one of `options`.
pub fn select(name: &str, label: &str, value: &str, options: &[&str], errors: &FieldErrors, error_key: &str) -> String {
    let mut opts = String::from(r#"<option value="">Select</option>"#);
    for option in options {
        let selected = if *option == value { " selected" } else { "" };
        opts.push_str(&format!(
            r#"<option value="{0}"{1}>{0}</option>"#,
            escape_html(option),
            selected
        ));
    }
    format!(
        r#"<label class="field{}"><span>{}</span><select name="{}">{}</select>{}</label>"#,
        if errors.get(error_key).is_some() { " invalid" } else { "" },
        escape_html(label),
        name,
        opts,
        field_error(errors, error_key)
    )
}

/// Two-column key/value table for a single record.
pub fn record_table(rows: &[(&str, &str)]) -> String {
    let body: String = rows
        .iter()
        .map(|(k, v)| format!("<tr><th>{}</th><td>{}</td></tr>", escape_html(k), escape_html(v)))
        .collect();
    format!(r#"<table class="record-table"><tbody>{}</tbody></table>"#, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x")</script> & 'y'"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; &#39;y&#39;"
        );
    }

    #[test]
    fn test_shell_marks_active_link_and_user() {
        let html = app_shell("Person View", "/person-view", Some("<Asha>"), "<p>body</p>");
        assert!(html.contains(r#"<a class="nav-link active" href="/person-view">"#));
        assert!(html.contains("&lt;Asha&gt;"));
        assert!(html.contains(r#"action="/logout""#));
        assert!(html.contains("<p>body</p>"));
    }

    #[test]
    fn test_shell_defaults_user_label() {
        let html = app_shell("Dashboard", "/dashboard", None, "");
        assert!(html.contains("<summary>User</summary>"));
    }

    #[test]
    fn test_input_shows_error() {
        let mut errors = FieldErrors::new();
        errors.insert("email", "Email is required");
        let html = Input::text("email", "Email", "a\"b").render(&errors, "email");
        assert!(html.contains("field invalid"));
        assert!(html.contains("a&quot;b"));
        assert!(html.contains("Email is required"));
    }

    #[test]
    fn test_select_keeps_known_value_only() {
        let errors = FieldErrors::new();
        let html = select("location", "Location", "Pune", &["Pune", "Bangalore"], &errors, "location");
        assert!(html.contains(r#"<option value="Pune" selected>"#));
        let html = select("location", "Location", "Berlin", &["Pune", "Bangalore"], &errors, "location");
        assert!(!html.contains("selected"));
    }
}
