//! Benchmarks for mdrecon conversion performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks run the structural walkers and the cleanup pipeline
//! over synthetic documents of increasing size.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mdrecon::{
    CleanupOptions, CleanupPipeline, ConvertOptions, InputFormat, TextRun,
};

/// Creates an HTML page with the given number of sections.
fn create_test_html(sections: usize) -> String {
    let mut html = String::from("<html><head><title>Bench</title></head><body>");
    for i in 0..sections {
        html.push_str(&format!("<h2>Section {}</h2>", i));
        html.push_str("<p>Some <b>bold</b> and <a href=\"/link\">linked</a> text.</p>");
        html.push_str("<h4>Details</h4><ul><li>one</li><li>two<ul><li>nested</li></ul></li></ul>");
        html.push_str("<pre><code class=\"language-py\">print('x')</code></pre>");
        html.push_str("<table><tr><th>A</th><th>B</th></tr><tr><td>1</td><td>2</td></tr></table>");
    }
    html.push_str("</body></html>");
    html
}

/// Creates raw extracted text with headings, paragraphs and bullets.
fn create_test_text(sections: usize) -> String {
    let mut text = String::new();
    for i in 0..sections {
        text.push_str(&format!("SECTION {}\n\n", i));
        text.push_str("A paragraph of body text that is long enough to stay a paragraph.\n\n");
        text.push_str("- first item\n- second item\n\n");
    }
    text
}

/// Creates a text-run stream with one heading size and one body size.
fn create_test_runs(sections: usize) -> Vec<TextRun> {
    let mut runs = Vec::new();
    let mut y = 800.0;
    for i in 0..sections {
        runs.push(TextRun::new(format!("Heading {}", i), 18.0, y).on_page((i / 20 + 1) as u32));
        y -= 20.0;
        for _ in 0..3 {
            runs.push(TextRun::new("Body text on a line.", 11.0, y).on_page((i / 20 + 1) as u32));
            y -= 12.0;
        }
    }
    runs
}

fn bench_format_detection(c: &mut Criterion) {
    let html = create_test_html(1);

    c.bench_function("detect_html", |b| {
        b.iter(|| InputFormat::sniff(black_box(&html)))
    });
}

fn bench_conversion(c: &mut Criterion) {
    let options = ConvertOptions::default();
    let mut group = c.benchmark_group("conversion");

    for sections in [10, 100] {
        let html = create_test_html(sections);
        group.bench_function(format!("html_{}_sections", sections), |b| {
            b.iter(|| mdrecon::convert_str(black_box(&html), InputFormat::Html, &options))
        });

        let text = create_test_text(sections);
        group.bench_function(format!("text_{}_sections", sections), |b| {
            b.iter(|| mdrecon::convert_str(black_box(&text), InputFormat::Text, &options))
        });

        let runs = create_test_runs(sections);
        group.bench_function(format!("runs_{}_sections", sections), |b| {
            b.iter(|| mdrecon::runs_to_markdown(black_box(&runs), &options))
        });
    }

    group.finish();
}

fn bench_cleanup(c: &mut Criterion) {
    let pipeline = CleanupPipeline::new(
        CleanupOptions::new()
            .add_pattern(r"Was this page helpful\?.*?No")
            .with_line_patterns([r"^\s*[\d\W]*Provide product feedback.*$"]),
    )
    .unwrap();
    let markdown = mdrecon::html_to_markdown(&create_test_html(100)).unwrap();

    c.bench_function("cleanup_100_sections", |b| {
        b.iter(|| pipeline.process(black_box(&markdown)))
    });
}

criterion_group!(benches, bench_format_detection, bench_conversion, bench_cleanup);
criterion_main!(benches);
