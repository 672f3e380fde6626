//! Server-rendered HTML for the report form

use crate::config::UploadConfig;

/// Status line shown above the form after a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    /// The report reached the chat
    Success(String),
    /// The report was rejected or could not be delivered
    Error(String),
}

impl Banner {
    fn css_class(&self) -> &'static str {
        match self {
            Banner::Success(_) => "banner success",
            Banner::Error(_) => "banner error",
        }
    }

    fn message(&self) -> &str {
        match self {
            Banner::Success(message) | Banner::Error(message) => message,
        }
    }
}

/// Text inputs in display order: (form name, label, input type)
const INPUTS: &[(&str, &str, &str)] = &[
    ("name", "Name", "text"),
    ("shift", "Shift", "text"),
    ("total_glasses", "Glasses sold", "number"),
    ("total_money", "Total money", "text"),
    ("aba_usd", "ABA ($)", "text"),
    ("aba_khr", "ABA (៛)", "text"),
    ("acleda_usd", "ACLEDA ($)", "text"),
    ("acleda_khr", "ACLEDA (៛)", "text"),
    ("other_bank", "Other bank", "text"),
    ("cash_usd", "Cash ($)", "text"),
    ("cash_khr", "Cash (៛)", "text"),
    ("expense", "Expense", "text"),
    ("balance_amount", "Balance amount", "text"),
];

const STYLE: &str = "body{font-family:sans-serif;max-width:40rem;margin:2rem auto;padding:0 1rem}\
label{display:block;margin-top:.75rem}input,select,textarea{width:100%;padding:.4rem}\
.banner{padding:.75rem;border-radius:4px;margin-bottom:1rem}\
.success{background:#e6f4ea;color:#1e4620}.error{background:#fdecea;color:#611a15}\
.warning{background:#fff4e5;color:#663c00;padding:.75rem;border-radius:4px}\
button{margin-top:1rem;padding:.6rem 1.2rem}";

/// Render the report form page.
///
/// `configured` is false when no chat destination is set; the page then
/// warns that submissions cannot be delivered.
pub fn render_form(limits: &UploadConfig, configured: bool, banner: Option<&Banner>) -> String {
    let now = chrono::Local::now();
    let mut html = String::with_capacity(4096);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str("<title>Shift report</title>\n<style>");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n<h1>📋 Shift report</h1>\n");

    if let Some(banner) = banner {
        html.push_str(&format!(
            "<div class=\"{}\" role=\"status\">{}</div>\n",
            banner.css_class(),
            escape_html(banner.message())
        ));
    }
    if !configured {
        html.push_str(
            "<p class=\"warning\">BOT_TOKEN or CHAT_ID is not set. Reports cannot be delivered.</p>\n",
        );
    }

    html.push_str("<form method=\"post\" action=\"/\" enctype=\"multipart/form-data\">\n");
    html.push_str(&format!(
        "<label>Date<input type=\"date\" name=\"date\" value=\"{}\"></label>\n",
        now.format("%Y-%m-%d")
    ));
    html.push_str(&format!(
        "<label>Time<input type=\"time\" name=\"time\" value=\"{}\"></label>\n",
        now.format("%H:%M")
    ));
    for (name, label, kind) in INPUTS {
        if *name == "balance_amount" {
            html.push_str(
                "<label>Balance<select name=\"balance_status\">\
                 <option value=\"balanced\">Balanced</option>\
                 <option value=\"over\">Over</option>\
                 <option value=\"short\">Short</option>\
                 </select></label>\n",
            );
        }
        html.push_str(&format!(
            "<label>{label}<input type=\"{kind}\" name=\"{name}\"></label>\n"
        ));
    }
    html.push_str("<label>Notes<textarea name=\"notes\" rows=\"3\"></textarea></label>\n");
    html.push_str(&format!(
        "<label>Attachment (max {}) <input type=\"file\" name=\"attachment\" accept=\"{}\"></label>\n",
        human_size(limits.max_upload_bytes),
        accept_attribute(limits)
    ));
    html.push_str("<button type=\"submit\">Send report</button>\n</form>\n</body>\n</html>\n");
    html
}

/// `accept` attribute value listing the allowed extensions, e.g. `.jpg,.pdf`
pub fn accept_attribute(limits: &UploadConfig) -> String {
    limits
        .allowed_extensions
        .iter()
        .map(|ext| format!(".{}", escape_html(ext)))
        .collect::<Vec<_>>()
        .join(",")
}

fn human_size(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{} MB", bytes / MIB)
    } else if bytes >= 1024 {
        format!("{} KB", bytes / 1024)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Escape text for use in HTML content and quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
