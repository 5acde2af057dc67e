use anyhow::{Context, Result};
use async_trait::async_trait;
use scraper::{ElementRef, Html, Node};
use std::path::{Path, PathBuf};

use super::{Handler, TaskReply};
use crate::consts::SCRAPE_URL;

/// Elements that never have a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements whose text is emitted as-is.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Downloads a page and stores its parsed markup, one node per line.
pub struct ScrapeHandler {
    url: String,
    output: PathBuf,
}

impl ScrapeHandler {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            url: SCRAPE_URL.to_string(),
            output: data_dir.join("scraped_data.txt"),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

/// Parse `html` and re-emit it indented by nesting depth.
pub fn prettify(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut out = String::new();
    for node in doc.tree.root().children() {
        match node.value() {
            Node::Doctype(doctype) => push_line(&mut out, 0, &format!("<!DOCTYPE {}>", doctype.name())),
            Node::Comment(comment) => push_line(&mut out, 0, &format!("<!--{}-->", &**comment)),
            Node::Element(_) => {
                if let Some(element) = ElementRef::wrap(node) {
                    write_element(element, 0, &mut out);
                }
            }
            _ => {}
        }
    }
    out
}

fn write_element(element: ElementRef<'_>, depth: usize, out: &mut String) {
    let value = element.value();
    let mut open = format!("<{}", value.name());
    for (name, val) in value.attrs() {
        open.push_str(&format!(" {name}={}", quote_attr(val)));
    }
    open.push('>');
    push_line(out, depth, &open);

    for child in element.children() {
        match child.value() {
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    write_element(child, depth + 1, out);
                }
            }
            Node::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                if RAW_TEXT_ELEMENTS.contains(&value.name()) {
                    push_line(out, depth + 1, text);
                } else {
                    push_line(out, depth + 1, &escape_text(text));
                }
            }
            Node::Comment(comment) => {
                push_line(out, depth + 1, &format!("<!--{}-->", &**comment));
            }
            _ => {}
        }
    }

    if !VOID_ELEMENTS.contains(&value.name()) {
        push_line(out, depth, &format!("</{}>", value.name()));
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Double quotes unless the value holds `"` and no `'`; with both, `"` is
/// written as `&quot;`.
fn quote_attr(val: &str) -> String {
    let escaped = escape_text(val);
    match (escaped.contains('"'), escaped.contains('\'')) {
        (true, false) => format!("'{escaped}'"),
        (true, true) => format!("\"{}\"", escaped.replace('"', "&quot;")),
        _ => format!("\"{escaped}\""),
    }
}

fn push_line(out: &mut String, depth: usize, line: &str) {
    out.push_str(&" ".repeat(depth));
    out.push_str(line);
    out.push('\n');
}

#[async_trait]
impl Handler for ScrapeHandler {
    fn name(&self) -> &str {
        "scrape-site"
    }

    fn description(&self) -> &str {
        "download a web page and save its markup to scraped_data.txt"
    }

    async fn run(&self) -> Result<TaskReply> {
        let body = reqwest::get(&self.url)
            .await
            .with_context(|| format!("failed to fetch {}", self.url))?
            .text()
            .await?;
        tokio::fs::write(&self.output, prettify(&body))
            .await
            .with_context(|| format!("failed to write {}", self.output.display()))?;
        Ok(TaskReply::ok("Website scraped"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indents_nested_elements() {
        let out = prettify("<html><head><title>Hi</title></head><body><p>One</p></body></html>");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            vec![
                "<html>",
                " <head>",
                "  <title>",
                "   Hi",
                "  </title>",
                " </head>",
                " <body>",
                "  <p>",
                "   One",
                "  </p>",
                " </body>",
                "</html>",
            ]
        );
    }

    #[test]
    fn keeps_doctype_and_attributes() {
        let out = prettify(r#"<!DOCTYPE html><html><body><a href="/x">link</a></body></html>"#);
        assert!(out.starts_with("<!DOCTYPE html>\n"));
        assert!(out.contains(r#"<a href="/x">"#));
    }

    #[test]
    fn void_elements_have_no_closing_tag() {
        let out = prettify("<html><body>a<br>b</body></html>");
        assert!(out.contains("<br>"));
        assert!(!out.contains("</br>"));
    }

    #[test]
    fn reescapes_text_and_attributes() {
        let out = prettify(
            r#"<html><body><p title='say "hi"'>1 &lt; 2 &amp; &lt;script&gt;</p></body></html>"#,
        );
        assert!(out.contains(r#"<p title='say "hi"'>"#), "{out}");
        assert!(out.contains("1 &lt; 2 &amp; &lt;script&gt;"), "{out}");
    }

    #[test]
    fn attribute_with_both_quotes() {
        assert_eq!(quote_attr(r#"a"b'c"#), r#""a&quot;b'c""#);
        assert_eq!(quote_attr("x & y"), r#""x &amp; y""#);
    }

    #[test]
    fn script_text_is_not_escaped() {
        let out = prettify("<html><head><script>if (a < b && c) {}</script></head></html>");
        assert!(out.contains("if (a < b && c) {}"), "{out}");
    }
}
