//! Declaration summary documents: a filled HTML template handed to the
//! frontend for display or print. Rasterization is the frontend's problem.

use chrono::Utc;
use serde_json::Value;

use vigil_model::{DeclarationRecord, UserProfile};

const DOCUMENT_TEMPLATE: &str = include_str!("declaration.html");

/// Render a declaration into the summary document template.
pub fn render_declaration_document(
    record: &DeclarationRecord,
    owner: &UserProfile,
) -> String {
    let period = record.period().unwrap_or("—");
    let title = record.kind.display_name(period);

    DOCUMENT_TEMPLATE
        .replace("{{title}}", &escape(&title))
        .replace("{{company}}", &escape(&owner.company_name))
        .replace("{{period}}", &escape(period))
        .replace("{{status}}", record.status.as_str())
        .replace("{{reference}}", &record.id.to_string())
        .replace("{{figure_rows}}", &figure_rows(&record.data))
        .replace(
            "{{generated_at}}",
            &Utc::now().format("%Y-%m-%d %H:%M UTC").to_string(),
        )
}

/// One table row per entry of the `figures` object recorded during the data
/// step. Non-numeric values render verbatim.
fn figure_rows(data: &Value) -> String {
    let Some(figures) = data.get("figures").and_then(Value::as_object) else {
        return "<tr><td colspan=\"2\">No figures recorded</td></tr>"
            .to_string();
    };

    let mut rows = String::new();
    for (label, value) in figures {
        let rendered = match value {
            Value::Number(n) => format!("{n:.2}", n = n.as_f64().unwrap_or(0.0)),
            other => escape(other.as_str().unwrap_or(&other.to_string())),
        };
        rows.push_str(&format!(
            "<tr><td>{}</td><td class=\"amount\">{}</td></tr>\n",
            escape(&label.replace('_', " ")),
            rendered
        ));
    }
    rows
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
