//! Layout analysis for font-tagged text runs.
//!
//! PDF extractors often emit a flat stream of `{text, fontSize,
//! verticalPosition}` runs. This module groups runs into lines, learns the
//! body and heading sizes from a font-size histogram, and turns the lines
//! into headings, paragraphs and bullet lists.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use super::heading::{HeadingLevelStack, MAX_HEADING_LEVEL};
use super::options::{LayoutOptions, ParseOptions};
use crate::model::{Block, ListBlock, ListItem};

const LIGATURES: &[(char, &str)] = &[
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
    ('\u{FB05}', "st"),
    ('\u{FB06}', "st"),
];

const BULLET_GLYPHS: &[char] = &['•', '●', '○', '▪', '■', '–', '-', '*'];

/// A run of text sharing one font size and vertical position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    /// The text content
    pub text: String,
    /// Font size in points
    #[serde(alias = "fontSize")]
    pub font_size: f32,
    /// Vertical position on the page
    #[serde(alias = "verticalPosition")]
    pub y: f32,
    /// 1-based page number
    #[serde(default = "first_page")]
    pub page: u32,
    /// Font name, when the extractor reports it
    #[serde(default, alias = "fontName", skip_serializing_if = "Option::is_none")]
    pub font_name: Option<String>,
}

fn first_page() -> u32 {
    1
}

impl TextRun {
    /// Create a run on page 1.
    pub fn new(text: impl Into<String>, font_size: f32, y: f32) -> Self {
        Self {
            text: text.into(),
            font_size,
            y,
            page: 1,
            font_name: None,
        }
    }

    /// Move the run to another page.
    pub fn on_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    fn char_count(&self) -> usize {
        self.text.chars().filter(|c| !c.is_whitespace()).count()
    }
}

/// Runs sharing one baseline.
#[derive(Debug, Clone)]
pub struct TextLine {
    /// The runs of this line, in stream order
    pub runs: Vec<TextRun>,
    /// Vertical position of the first run
    pub y: f32,
    /// Page of the line
    pub page: u32,
    /// Size covering the most characters
    pub font_size: f32,
}

impl TextLine {
    /// Build a line from runs. Returns `None` for an empty run list.
    pub fn from_runs(runs: Vec<TextRun>) -> Option<Self> {
        let first = runs.first()?;
        let (y, page) = (first.y, first.page);

        let mut coverage: BTreeMap<i32, usize> = BTreeMap::new();
        for run in &runs {
            *coverage.entry(size_key(run.font_size)).or_insert(0) += run.char_count();
        }
        let font_size = coverage
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
            .map_or(first.font_size, |(key, _)| key_size(*key));

        Some(Self {
            runs,
            y,
            page,
            font_size,
        })
    }

    /// Concatenated text of the line.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// Font size histogram used to tell headings from body text.
#[derive(Debug, Clone, Default)]
pub struct FontSizeHistogram {
    /// Body text font size (most common)
    pub body_size: f32,
    /// Sizes larger than body, largest first
    pub heading_sizes: Vec<f32>,
    /// Observed sizes (rounded to 0.1) with frequency
    pub size_histogram: BTreeMap<i32, usize>,
}

impl FontSizeHistogram {
    /// Add a font size observation.
    pub fn add_size(&mut self, size: f32) {
        *self.size_histogram.entry(size_key(size)).or_insert(0) += 1;
    }

    /// Calculate body size and up to `max_levels` heading sizes.
    pub fn analyze(&mut self, max_levels: u8) {
        // Ties go to the smaller size.
        let Some((&body_key, _)) = self
            .size_histogram
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
        else {
            self.body_size = 12.0;
            self.heading_sizes.clear();
            return;
        };
        self.body_size = key_size(body_key);

        let levels = max_levels.clamp(1, MAX_HEADING_LEVEL) as usize;
        self.heading_sizes = self
            .size_histogram
            .keys()
            .rev()
            .filter(|&&k| k > body_key)
            .take(levels)
            .map(|&k| key_size(k))
            .collect();
    }

    /// Heading level for a font size, or `None` for body text.
    pub fn heading_level(&self, font_size: f32) -> Option<u8> {
        let key = size_key(font_size);
        self.heading_sizes
            .iter()
            .position(|&s| size_key(s) == key)
            .map(|i| (i + 1) as u8)
    }
}

fn size_key(size: f32) -> i32 {
    (size * 10.0).round() as i32
}

fn key_size(key: i32) -> f32 {
    key as f32 / 10.0
}

/// Parse a run stream into blocks.
pub fn parse_text_runs(runs: &[TextRun], options: &ParseOptions) -> Vec<Block> {
    LayoutAnalyzer::new(&options.layout).analyze(runs)
}

/// Turns a run stream into blocks.
pub struct LayoutAnalyzer<'a> {
    options: &'a LayoutOptions,
    font_stats: FontSizeHistogram,
}

impl<'a> LayoutAnalyzer<'a> {
    /// Create a new layout analyzer.
    pub fn new(options: &'a LayoutOptions) -> Self {
        Self {
            options,
            font_stats: FontSizeHistogram::default(),
        }
    }

    /// Font statistics from the last analysis.
    pub fn font_stats(&self) -> &FontSizeHistogram {
        &self.font_stats
    }

    /// Analyze the whole stream.
    pub fn analyze(&mut self, runs: &[TextRun]) -> Vec<Block> {
        let runs: Vec<TextRun> = runs
            .iter()
            .filter(|r| !r.text.is_empty())
            .map(|r| {
                let mut run = r.clone();
                if self.options.normalize_text {
                    run.text = normalize_text(&run.text);
                }
                run
            })
            .collect();

        self.font_stats = FontSizeHistogram::default();
        for run in runs.iter().filter(|r| !r.text.trim().is_empty()) {
            self.font_stats.add_size(run.font_size);
        }
        self.font_stats.analyze(self.options.max_heading_levels);
        log::debug!(
            "Layout: body size {:.1}, heading sizes {:?}",
            self.font_stats.body_size,
            self.font_stats.heading_sizes
        );

        let lines = self.group_runs_into_lines(runs);
        let blocks = self.group_lines_into_blocks(&lines);
        log::debug!("Layout: {} lines -> {} blocks", lines.len(), blocks.len());
        blocks
    }

    fn group_runs_into_lines(&self, runs: Vec<TextRun>) -> Vec<TextLine> {
        let mut lines = Vec::new();
        let mut current: Vec<TextRun> = Vec::new();

        for run in runs {
            if let Some(prev) = current.last() {
                let new_line = prev.page != run.page
                    || (run.y - prev.y).abs() > self.options.line_threshold;
                if new_line {
                    lines.extend(TextLine::from_runs(std::mem::take(&mut current)));
                }
            }
            current.push(run);
        }
        lines.extend(TextLine::from_runs(current));

        lines.retain(|l| !l.text().trim().is_empty());
        lines
    }

    fn group_lines_into_blocks(&self, lines: &[TextLine]) -> Vec<Block> {
        let avg_spacing = calculate_avg_line_spacing(lines);
        let gap_limit = avg_spacing * self.options.paragraph_gap_factor;

        let mut headings = HeadingLevelStack::new();
        let mut out = BlockSink::default();
        let mut prev: Option<&TextLine> = None;

        for line in lines {
            let text = line.text().trim().to_string();

            if let Some(raw) = self.font_stats.heading_level(line.font_size) {
                out.flush();
                out.blocks.push(Block::heading(headings.adjust(raw), text));
            } else if let Some(item) = strip_bullet(&text) {
                out.flush_paragraph();
                out.items.push(item.to_string());
            } else {
                out.flush_list();
                let breaks = prev.is_some_and(|p| {
                    p.page != line.page || (p.y - line.y).abs() > gap_limit
                });
                if breaks {
                    out.flush_paragraph();
                }
                out.paragraph.push(text);
            }

            prev = Some(line);
        }

        out.flush();
        out.blocks
    }
}

#[derive(Default)]
struct BlockSink {
    blocks: Vec<Block>,
    paragraph: Vec<String>,
    items: Vec<String>,
}

impl BlockSink {
    fn flush(&mut self) {
        self.flush_paragraph();
        self.flush_list();
    }

    fn flush_paragraph(&mut self) {
        if !self.paragraph.is_empty() {
            let text = self.paragraph.join(" ");
            self.paragraph.clear();
            self.blocks.push(Block::paragraph(text));
        }
    }

    fn flush_list(&mut self) {
        if !self.items.is_empty() {
            let mut list = ListBlock::unordered();
            for item in self.items.drain(..) {
                list.push(ListItem::new(item));
            }
            self.blocks.push(Block::List(list));
        }
    }
}

/// Average vertical distance between consecutive lines on the same page.
fn calculate_avg_line_spacing(lines: &[TextLine]) -> f32 {
    let spacings: Vec<f32> = lines
        .windows(2)
        .filter(|w| w[0].page == w[1].page)
        .map(|w| (w[0].y - w[1].y).abs())
        .filter(|s| *s > 0.1)
        .collect();

    if spacings.is_empty() {
        return 12.0;
    }
    spacings.iter().sum::<f32>() / spacings.len() as f32
}

/// Item text of a bullet line, if the line starts with a bullet glyph.
fn strip_bullet(line: &str) -> Option<&str> {
    let first = line.chars().next()?;
    if !BULLET_GLYPHS.contains(&first) {
        return None;
    }
    let rest = &line[first.len_utf8()..];
    // ASCII markers need a following space so "-5" or "*ptr" stay text.
    if first.is_ascii() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let item = rest.trim();
    (!item.is_empty()).then_some(item)
}

/// NFC-normalize and expand typographic ligatures.
pub fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.nfc() {
        match LIGATURES.iter().find(|(lig, _)| *lig == c) {
            Some((_, expanded)) => out.push_str(expanded),
            None => out.push(c),
        }
    }
    out
}
