//! Integration tests for batch conversion.

use std::fs;
use std::path::Path;

use mdrecon::{BatchConverter, BatchEvent, BatchOptions, ConvertOptions, Error, ParseOptions};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, content: &[u8]) {
    fs::write(dir.join(name), content).unwrap();
}

/// Input directory with two good documents and one that is not UTF-8.
fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.html", b"<h1>Alpha</h1><p>one</p>");
    write(dir.path(), "b.bin.html", &[0x3c, 0x70, 0x3e, 0xff, 0xfe]);
    write(dir.path(), "c.md", b"### Gamma\n\ntext\n");
    write(dir.path(), "notes.docx", b"ignored");
    dir
}

#[test]
fn test_batch_skips_failures_and_continues() {
    let inputs = fixture();
    let work = TempDir::new().unwrap();
    let out = work.path().join("out");
    let log = work.path().join("bad_inputs.txt");

    for parallel in [false, true] {
        let _ = fs::remove_file(&log);
        let batch = BatchConverter::new(
            ConvertOptions::default(),
            BatchOptions::new(&out)
                .with_failure_log(&log)
                .with_parallel(parallel),
        );

        let files = batch.inputs_from_dir(inputs.path()).unwrap();
        assert_eq!(files.len(), 3);

        let report = batch.run(&files).unwrap();
        assert_eq!(report.total, 3);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, vec!["b.bin.html"]);
        assert!(report.has_failures());

        assert_eq!(
            fs::read_to_string(out.join("a.md")).unwrap(),
            "# Alpha\n\none\n\n"
        );
        assert_eq!(fs::read_to_string(out.join("c.md")).unwrap(), "# Gamma\n\ntext\n\n");
        assert!(!out.join("b.bin.md").exists());
        assert_eq!(fs::read_to_string(&log).unwrap(), "b.bin.html\n");
    }
}

#[test]
fn test_failed_output_is_removed() {
    let inputs = TempDir::new().unwrap();
    write(
        inputs.path(),
        "broken.md",
        b"---\ntitle: [unclosed\n---\nBody",
    );
    let out = TempDir::new().unwrap();
    let log = out.path().join("failures.txt");

    // A stale output from an earlier run must not survive a failure.
    fs::write(out.path().join("broken.md"), "stale").unwrap();

    let options = ConvertOptions::new().with_parse_options(ParseOptions::new().strict());
    let batch = BatchConverter::new(
        options,
        BatchOptions::new(out.path())
            .with_failure_log(&log)
            .with_parallel(false)
            .with_reasons(true),
    );

    let report = batch.run(&[inputs.path().join("broken.md")]).unwrap();
    assert_eq!(report.failed, vec!["broken.md"]);
    assert!(!out.path().join("broken.md").exists());

    let logged = fs::read_to_string(&log).unwrap();
    assert!(logged.starts_with("broken.md - Malformed frontmatter"));
}

#[test]
fn test_failure_log_appends() {
    let inputs = TempDir::new().unwrap();
    write(inputs.path(), "bad.txt", &[0xff]);
    let out = TempDir::new().unwrap();
    let log = out.path().join("bad_inputs.txt");
    fs::write(&log, "earlier.html\n").unwrap();

    let batch = BatchConverter::new(
        ConvertOptions::default(),
        BatchOptions::new(out.path().join("md")).with_failure_log(&log),
    );
    batch.run(&[inputs.path().join("bad.txt")]).unwrap();

    assert_eq!(fs::read_to_string(&log).unwrap(), "earlier.html\nbad.txt\n");
}

#[test]
fn test_missing_input_aborts_batch() {
    let out = TempDir::new().unwrap();
    let batch = BatchConverter::new(
        ConvertOptions::default(),
        BatchOptions::new(out.path().join("md"))
            .with_failure_log(out.path().join("log.txt"))
            .with_parallel(false),
    );

    let err = batch
        .run(&[out.path().join("does-not-exist.html")])
        .unwrap_err();
    assert!(matches!(err, Error::InputNotFound(_)));
}

#[test]
fn test_events_are_reported() {
    let inputs = fixture();
    let out = TempDir::new().unwrap();
    let (tx, rx) = crossbeam_channel::unbounded();

    let batch = BatchConverter::new(
        ConvertOptions::default(),
        BatchOptions::new(out.path().join("md"))
            .with_failure_log(out.path().join("log.txt"))
            .with_jobs(2),
    )
    .with_events(tx);

    let files = batch.inputs_from_dir(inputs.path()).unwrap();
    batch.run(&files).unwrap();
    drop(batch);

    let events: Vec<BatchEvent> = rx.iter().collect();
    let started = events
        .iter()
        .filter(|e| matches!(e, BatchEvent::Started { total: 3, .. }))
        .count();
    let finished = events
        .iter()
        .filter(|e| matches!(e, BatchEvent::Finished { .. }))
        .count();
    let failed: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            BatchEvent::Failed { name, .. } => Some(name.as_str()),
            _ => None,
        })
        .collect();

    assert_eq!(started, 3);
    assert_eq!(finished, 2);
    assert_eq!(failed, vec!["b.bin.html"]);
}

#[test]
fn test_inputs_from_list() {
    let inputs = fixture();
    let list = inputs.path().join("inputs.lst");
    fs::write(
        &list,
        format!(
            "{}\n\n{}\n{}\n",
            inputs.path().join("c.md").display(),
            inputs.path().join("missing.html").display(),
            inputs.path().join("notes.docx").display(),
        ),
    )
    .unwrap();

    let batch = BatchConverter::new(
        ConvertOptions::default(),
        BatchOptions::new(inputs.path().join("out")),
    );
    let files = batch.inputs_from_list(&list).unwrap();
    assert_eq!(files, vec![inputs.path().join("c.md")]);
}

#[test]
fn test_output_dir_equal_to_input_dir_keeps_sources() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "notes.md", &[0x23, 0x20, 0xff]);
    write(dir.path(), "page.html", b"<h1>Page</h1>");
    let log = dir.path().join("failures.log");

    for parallel in [false, true] {
        let batch = BatchConverter::new(
            ConvertOptions::default(),
            BatchOptions::new(dir.path())
                .with_failure_log(&log)
                .with_parallel(parallel),
        );
        let files = vec![dir.path().join("notes.md"), dir.path().join("page.html")];

        let report = batch.run(&files).unwrap();
        assert_eq!(report.failed, vec!["notes.md"]);
        assert_eq!(
            fs::read(dir.path().join("notes.md")).unwrap(),
            vec![0x23, 0x20, 0xff]
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("page.md")).unwrap(),
            "# Page\n\n"
        );
    }
}

#[test]
fn test_shared_output_name_is_refused() {
    let inputs = TempDir::new().unwrap();
    write(inputs.path(), "a.html", b"<p>from html</p>");
    write(inputs.path(), "a.md", &[0xff]);
    let out = TempDir::new().unwrap();
    let log = out.path().join("failures.log");

    for parallel in [false, true] {
        let _ = fs::remove_file(&log);
        let batch = BatchConverter::new(
            ConvertOptions::default(),
            BatchOptions::new(out.path().join("md"))
                .with_failure_log(&log)
                .with_parallel(parallel)
                .with_reasons(true),
        );
        let files = batch.inputs_from_dir(inputs.path()).unwrap();
        assert_eq!(files.len(), 2);

        let report = batch.run(&files).unwrap();
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, vec!["a.md"]);
        assert_eq!(
            fs::read_to_string(out.path().join("md").join("a.md")).unwrap(),
            "from html\n\n"
        );
        let logged = fs::read_to_string(&log).unwrap();
        assert!(logged.starts_with("a.md - "), "{logged}");
        assert!(logged.contains("a.html"), "{logged}");
    }
}
