//! Markdown input.
//!
//! Existing Markdown is rendered to HTML with pulldown-cmark and then walked
//! like any other HTML document, so headings, lists and code fences come out
//! normalized the same way.

use pulldown_cmark::{html, Options, Parser};

use super::html::parse_html;
use super::options::ParseOptions;
use crate::model::Block;

/// Parse a Markdown body (frontmatter already removed) into blocks.
pub fn parse_markdown(markdown: &str, options: &ParseOptions) -> Vec<Block> {
    parse_html(&markdown_to_html(markdown), options)
}

/// Render Markdown to an HTML fragment.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut cmark_options = Options::empty();
    cmark_options.insert(Options::ENABLE_TABLES);
    cmark_options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, cmark_options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
