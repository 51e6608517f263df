//! Server-rendered pages for the two variants.

use super::dto::ask_response;
use shared_types::{AskResponse, AskStatus, PageVariant};
use sqlchat_agents::orchestrator::QueryOutcome;
use sqlchat_agents::transcript::ChatMessage;
use std::fmt::Write;

/// Everything a page render needs, read from the session under its lock
pub struct PageView<'a> {
    pub variant: PageVariant,
    pub has_credential: bool,
    pub database_error: Option<String>,
    pub halted: bool,
    pub banner: Option<AskResponse>,
    pub transcript: &'a [ChatMessage],
    pub question: &'a str,
}

pub fn escape_html(text: &str) -> String {
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

/// Success banner with the answer, error banner, or warning banner
pub fn render_result(outcome: &QueryOutcome) -> String {
    render_banner(&ask_response(outcome))
}

pub fn render_banner(response: &AskResponse) -> String {
    let text = escape_html(&response.text);
    match response.status {
        AskStatus::Success => format!(
            "<div class=\"banner success\">Answer:</div>\n<div class=\"answer\">{}</div>\n",
            text
        ),
        AskStatus::Warning => format!("<div class=\"banner warning\">{}</div>\n", text),
        AskStatus::Error => format!("<div class=\"banner error\">{}</div>\n", text),
    }
}

fn error_banner(text: &str) -> String {
    format!("<div class=\"banner error\">{}</div>\n", escape_html(text))
}

fn credential_form(variant: PageVariant, has_credential: bool) -> String {
    let status = if has_credential {
        "<span class=\"key-status\">API key set for this session</span>\n"
    } else {
        ""
    };

    format!(
        "<form method=\"post\" action=\"/credential\" class=\"credential\">\n\
<label for=\"api_key\">Enter your OpenAI API Key</label>\n\
<input type=\"password\" id=\"api_key\" name=\"api_key\" autocomplete=\"off\">\n\
<input type=\"hidden\" name=\"variant\" value=\"{}\">\n\
<button type=\"submit\">Save key</button>\n\
{}</form>\n",
        variant.as_str(),
        status
    )
}

fn render_query_body(view: &PageView<'_>, body: &mut String) {
    body.push_str("<h1>SQL Agent - Natural Language to SQL</h1>\n");
    body.push_str("<p>Ask questions about your database in plain English.</p>\n");
    body.push_str(&credential_form(view.variant, view.has_credential));

    if let Some(error) = &view.database_error {
        body.push_str(&error_banner(error));
    }

    let _ = write!(
        body,
        "<form method=\"post\" action=\"/query\" class=\"question\">\n\
<label for=\"question\">Ask your question:</label>\n\
<input type=\"text\" id=\"question\" name=\"question\" value=\"{}\" \
placeholder=\"e.g., How many tracks are there?\">\n\
<button type=\"submit\">Run Query</button>\n\
</form>\n",
        escape_html(view.question)
    );

    if let Some(banner) = &view.banner {
        body.push_str(&render_banner(banner));
    }
}

fn render_chat_body(view: &PageView<'_>, body: &mut String) {
    body.push_str("<h1>SQL Chat Agent</h1>\n");
    body.push_str("<p>Chat with your database using natural language.</p>\n");
    body.push_str(&credential_form(view.variant, view.has_credential));

    if view.halted {
        if let Some(error) = &view.database_error {
            body.push_str(&error_banner(error));
        }
        return;
    }

    body.push_str("<div class=\"transcript\">\n");
    for message in view.transcript {
        let _ = writeln!(
            body,
            "<div class=\"chat-message {}\">{}</div>",
            message.role.as_str(),
            escape_html(&message.content)
        );
    }
    body.push_str("</div>\n");

    if let Some(banner) = &view.banner {
        body.push_str(&render_banner(banner));
    }

    body.push_str(
        "<form method=\"post\" action=\"/chat\" class=\"chat-input\">\n\
<input type=\"text\" name=\"message\" placeholder=\"Ask something about your database...\" \
autofocus>\n\
<button type=\"submit\">Send</button>\n\
</form>\n",
    );
}

pub fn render_page(view: &PageView<'_>) -> String {
    let title = match view.variant {
        PageVariant::Query => "SQL Agent Demo",
        PageVariant::Chat => "ChatSQL Agent",
    };

    let mut body = String::new();
    match view.variant {
        PageVariant::Query => render_query_body(view, &mut body),
        PageVariant::Chat => render_chat_body(view, &mut body),
    }

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
<title>{}</title>\n<style>{}</style>\n</head>\n<body>\n<main>\n{}</main>\n</body>\n</html>\n",
        title, STYLE, body
    )
}

const STYLE: &str = "body{font-family:sans-serif;margin:2rem}\
main{max-width:60rem}\
form{margin:1rem 0}\
.banner{padding:.6rem 1rem;border-radius:4px;margin:.5rem 0}\
.success{background:#e6f4ea}\
.warning{background:#fff4e5}\
.error{background:#fdecea}\
.chat-message{padding:.5rem;margin:.3rem 0;white-space:pre-wrap}\
.chat-message.user{background:#f1f3f4}\
.answer{white-space:pre-wrap}";
