use axum::response::Html;

const INDEX_HTML: &str = include_str!("../templates/index.html");

pub fn render_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Render report Markdown (CommonMark) to HTML for in-page display.
///
/// Raw HTML in the model output is escaped, not passed through.
pub fn render_markdown(markdown: &str) -> String {
    markdown::to_html(markdown)
}
