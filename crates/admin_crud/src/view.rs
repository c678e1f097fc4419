use serde_json::Value;
use thiserror::Error;

pub type ViewContext = serde_json::Map<String, Value>;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("view `{0}` is not available")]
    UnknownView(String),
    #[error("failed to serialize context for view `{view}`: {source}")]
    Context {
        view: String,
        #[source]
        source: serde_json::Error,
    },
}

pub trait ViewRenderer: Send + Sync {
    fn render(&self, view: &str, context: &ViewContext) -> Result<String, RenderError>;
}

/// Renders every view as an HTML document that embeds its context as JSON,
/// leaving presentation to the client-side scripts of the back-office.
#[derive(Debug, Clone)]
pub struct HtmlViewRenderer {
    title: String,
}

impl HtmlViewRenderer {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

impl Default for HtmlViewRenderer {
    fn default() -> Self {
        Self::new("Administration")
    }
}

impl ViewRenderer for HtmlViewRenderer {
    fn render(&self, view: &str, context: &ViewContext) -> Result<String, RenderError> {
        if !view.starts_with('@') || !view.ends_with(".html") {
            return Err(RenderError::UnknownView(view.to_string()));
        }

        let json = serde_json::to_string(context).map_err(|source| RenderError::Context {
            view: view.to_string(),
            source,
        })?;
        // `</` inside a script element would close it early.
        let json = json.replace("</", "<\\/");

        Ok(format!(
            "<!doctype html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n<main data-view=\"{}\"></main>\n<script type=\"application/json\" id=\"view-context\">{json}</script>\n</body>\n</html>\n",
            escape_html(&self.title),
            escape_html(view),
        ))
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
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

/// Pulls the embedded context back out of a page rendered by [`HtmlViewRenderer`].
pub fn extract_context(html: &str) -> Option<Value> {
    let start = html.find("id=\"view-context\">")? + "id=\"view-context\">".len();
    let end = start + html[start..].find("</script>")?;
    serde_json::from_str(&html[start..end]).ok()
}
