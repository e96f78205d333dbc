//! Shared HTML fragments for the public site and the dashboard

use axum::response::Html;
use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};

use crate::query::QueryState;

const MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

const NAV: [(&str, &str); 6] = [
    ("/", "Inicio"),
    ("/musica", "Música"),
    ("/shows", "Shows"),
    ("/media", "Media"),
    ("/epk", "EPK"),
    ("/contacto", "Contacto"),
];

/// Escape text for HTML bodies and attribute values
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// "15 de marzo de 2025"
pub fn format_date(date: NaiveDate) -> String {
    format!(
        "{} de {} de {}",
        date.day(),
        MONTHS[date.month0() as usize],
        date.year()
    )
}

/// "8 de noviembre de 2025 · 20:00 UTC"
pub fn format_show_time(at: DateTime<Utc>) -> String {
    format!(
        "{} · {:02}:{:02} UTC",
        format_date(at.date_naive()),
        at.hour(),
        at.minute()
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

impl Severity {
    fn colors(&self) -> (&'static str, &'static str) {
        match self {
            Severity::Info => ("#0c5460", "#d1ecf1"),
            Severity::Success => ("#155724", "#d4edda"),
            Severity::Error => ("#721c24", "#f8d7da"),
        }
    }

    fn class(&self) -> &'static str {
        match self {
            Severity::Info => "alert-info",
            Severity::Success => "alert-success",
            Severity::Error => "alert-error",
        }
    }
}

pub fn alert(severity: Severity, message: &str) -> String {
    let (color, bg) = severity.colors();
    format!(
        r#"<div class="alert {}" role="alert" style="padding: 0.75rem 1rem; margin-bottom: 1rem; border-radius: 0.25rem; color: {}; background-color: {};">{}</div>"#,
        severity.class(),
        color,
        bg,
        escape(message)
    )
}

/// Render a settled query: an error alert, an info alert when there is
/// nothing to show, or the rendered data
pub fn render_query<T>(
    state: &QueryState<T>,
    is_empty: impl Fn(&T) -> bool,
    empty_message: &str,
    render: impl Fn(&T) -> String,
) -> String {
    let mut html = String::new();
    if let Some(error) = &state.error {
        html.push_str(&alert(Severity::Error, error));
    }
    match &state.data {
        Some(data) if !is_empty(data) => html.push_str(&render(data)),
        _ if state.error.is_none() && !state.loading => {
            html.push_str(&alert(Severity::Info, empty_message))
        }
        _ => {}
    }
    html
}

/// Wrap page content in the public site shell
pub fn page(site_name: &str, title: &str, active: &str, content: &str) -> Html<String> {
    let nav: String = NAV
        .iter()
        .map(|(href, label)| {
            let weight = if *href == active { "700" } else { "400" };
            format!(
                r#"<a href="{}" style="color: #f5f5f5; text-decoration: none; font-weight: {};">{}</a>"#,
                href, weight, label
            )
        })
        .collect::<Vec<_>>()
        .join("\n                ");

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="es">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} · {site}</title>
</head>
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 0; background: #0b0b0b; color: #f5f5f5;">
    <header style="display: flex; justify-content: space-between; align-items: center; padding: 1rem 2rem; background: #050505;">
        <a href="/" style="color: #f5f5f5; text-decoration: none; font-size: 1.4rem; font-weight: 800;">{site}</a>
        <nav style="display: flex; gap: 1.25rem;">
                {nav}
        </nav>
    </header>
    <main style="max-width: 1100px; margin: 0 auto; padding: 2rem;">
        <h1>{title}</h1>
        {content}
    </main>
    <footer style="text-align: center; padding: 2rem; color: #888;">© {site}</footer>
</body>
</html>"#,
        title = escape(title),
        site = escape(site_name),
        nav = nav,
        content = content,
    ))
}
