//! Batch conversion of many documents into one output directory.
//!
//! Documents are independent, so they are converted in parallel with rayon.
//! A document that fails for a recoverable reason is recorded in the
//! failure log, its output file is removed and the batch carries on.
//! Missing inputs and permission problems stop the whole batch.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Local};
use crossbeam_channel::Sender;
use rayon::prelude::*;
use serde::Serialize;

use crate::convert::{ConvertOptions, ConverterRegistry};
use crate::error::{Error, Result};
use crate::render::CleanupPipeline;

/// Failure log written next to the working directory by default.
pub const DEFAULT_FAILURE_LOG: &str = "bad_inputs.txt";

/// Options controlling a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Directory receiving one `.md` file per input
    pub output_dir: PathBuf,

    /// File that failing input names are appended to
    pub failure_log: PathBuf,

    /// Convert documents in parallel
    pub parallel: bool,

    /// Worker threads; `None` uses rayon's default
    pub jobs: Option<usize>,

    /// Append the error message after each failing name
    pub record_reasons: bool,
}

impl BatchOptions {
    /// Create options writing into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            failure_log: PathBuf::from(DEFAULT_FAILURE_LOG),
            parallel: true,
            jobs: None,
            record_reasons: false,
        }
    }

    /// Set the failure log path.
    pub fn with_failure_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.failure_log = path.into();
        self
    }

    /// Enable or disable parallel conversion.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the number of worker threads.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs.max(1));
        self
    }

    /// Record `name - error` instead of just the name.
    pub fn with_reasons(mut self, record: bool) -> Self {
        self.record_reasons = record;
        self
    }
}

/// Progress notifications sent while a batch runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    /// A document was picked up (`index` is 1-based)
    Started {
        /// Position in processing order
        index: usize,
        /// Number of documents in the batch
        total: usize,
        /// Input file name
        name: String,
    },
    /// A document was written
    Finished {
        /// Input file name
        name: String,
    },
    /// A document failed and was skipped
    Failed {
        /// Input file name
        name: String,
        /// Error description
        error: String,
    },
}

/// Summary of a finished batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Number of documents attempted
    pub total: usize,
    /// Number of documents written
    pub succeeded: usize,
    /// Names of documents that failed
    pub failed: Vec<String>,
    /// When the batch started
    pub started_at: DateTime<Local>,
    /// When the batch finished
    pub finished_at: DateTime<Local>,
}

impl BatchReport {
    /// Wall-clock duration of the batch.
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Check if any document failed.
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Runs conversions over many inputs.
pub struct BatchConverter {
    registry: ConverterRegistry,
    convert_options: ConvertOptions,
    options: BatchOptions,
    events: Option<Sender<BatchEvent>>,
}

impl BatchConverter {
    /// Create a batch converter using the default converters.
    pub fn new(convert_options: ConvertOptions, options: BatchOptions) -> Self {
        Self {
            registry: ConverterRegistry::with_defaults(),
            convert_options,
            options,
            events: None,
        }
    }

    /// Use a custom converter registry.
    pub fn with_registry(mut self, registry: ConverterRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Send progress events to `sender`.
    pub fn with_events(mut self, sender: Sender<BatchEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// Every supported file directly inside `dir`, sorted by name.
    pub fn inputs_from_dir(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(dir).map_err(|e| Error::from_io(e, dir))?;

        let mut inputs = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| Error::from_io(e, dir))?.path();
            if path.is_file() && self.registry.supports_path(&path) {
                inputs.push(path);
            }
        }
        inputs.sort();
        Ok(inputs)
    }

    /// Paths listed one per line in `list`.
    ///
    /// Blank lines are ignored. Entries that do not exist or have no
    /// converter are skipped with a warning.
    pub fn inputs_from_list(&self, list: &Path) -> Result<Vec<PathBuf>> {
        let content = fs::read_to_string(list).map_err(|e| Error::from_io(e, list))?;

        let mut inputs = Vec::new();
        for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let path = PathBuf::from(line);
            if !path.is_file() {
                log::warn!("Skipping {}: file not found", path.display());
                continue;
            }
            if !self.registry.supports_path(&path) {
                log::warn!("Skipping {}: unsupported format", path.display());
                continue;
            }
            inputs.push(path);
        }
        Ok(inputs)
    }

    /// Output file for an input: its base name with a `.md` extension.
    pub fn output_path(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        self.options.output_dir.join(format!("{stem}.md"))
    }

    /// Convert every input.
    pub fn run(&self, inputs: &[PathBuf]) -> Result<BatchReport> {
        let started_at = Local::now();

        // A bad pattern would fail every document the same way.
        CleanupPipeline::new(self.convert_options.render.cleanup.clone())?;

        fs::create_dir_all(&self.options.output_dir)
            .map_err(|e| Error::from_io(e, &self.options.output_dir))?;

        let failure_log = Mutex::new(
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.options.failure_log)
                .map_err(|e| Error::from_io(e, &self.options.failure_log))?,
        );
        let counter = AtomicUsize::new(0);
        let total = inputs.len();
        let planned = self.plan(inputs);

        let outcomes: Vec<Option<String>> = if self.options.parallel {
            let work = || {
                planned
                    .par_iter()
                    .map(|job| self.process_one(job, total, &counter, &failure_log))
                    .collect::<Result<Vec<_>>>()
            };
            match self.options.jobs {
                Some(jobs) => rayon::ThreadPoolBuilder::new()
                    .num_threads(jobs)
                    .build()
                    .map_err(|e| Error::Conversion(format!("Failed to start workers: {e}")))?
                    .install(work)?,
                None => work()?,
            }
        } else {
            planned
                .iter()
                .map(|job| self.process_one(job, total, &counter, &failure_log))
                .collect::<Result<Vec<_>>>()?
        };

        let failed: Vec<String> = outcomes.into_iter().flatten().collect();
        let report = BatchReport {
            total,
            succeeded: total - failed.len(),
            failed,
            started_at,
            finished_at: Local::now(),
        };
        log::info!(
            "Batch finished: {} succeeded, {} failed",
            report.succeeded,
            report.failed.len()
        );
        Ok(report)
    }

    /// Assign every input its output file before any work starts.
    ///
    /// An input whose output would be the input itself, or a file already
    /// claimed by an earlier input, is refused and never touched.
    fn plan<'i>(&self, inputs: &'i [PathBuf]) -> Vec<Job<'i>> {
        let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();

        inputs
            .iter()
            .map(|input| {
                let output = self.output_path(input);
                let target = resolve_output(&output);

                let conflict = if resolve_input(input) == target {
                    Some(Error::Conversion(format!(
                        "output {} would overwrite the input",
                        output.display()
                    )))
                } else if let Some(owner) = claimed.get(&target) {
                    Some(Error::Conversion(format!(
                        "output {} is already written for {}",
                        output.display(),
                        owner.display()
                    )))
                } else {
                    claimed.insert(target, input);
                    None
                };

                Job {
                    input,
                    output,
                    conflict,
                }
            })
            .collect()
    }

    /// Convert one input. Returns the input name when it failed recoverably.
    fn process_one(
        &self,
        job: &Job<'_>,
        total: usize,
        counter: &AtomicUsize,
        failure_log: &Mutex<File>,
    ) -> Result<Option<String>> {
        let Job {
            input,
            output,
            conflict,
        } = job;
        let name = input
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| input.display().to_string());

        let index = counter.fetch_add(1, Ordering::SeqCst) + 1;
        log::info!("Processing file {} of {}: {}", index, total, name);
        self.emit(BatchEvent::Started {
            index,
            total,
            name: name.clone(),
        });

        if let Some(e) = conflict {
            log::warn!("Skipping {}: {}", name, e);
            return self.fail(failure_log, name, e);
        }

        let result = self
            .registry
            .convert(input, &self.convert_options)
            .and_then(|converted| {
                fs::write(output, converted.content).map_err(|e| Error::from_io(e, output))
            });

        match result {
            Ok(()) => {
                log::debug!("Wrote {}", output.display());
                self.emit(BatchEvent::Finished { name });
                Ok(None)
            }
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                log::warn!("Failed to convert {}: {}", name, e);
                if output.exists() {
                    fs::remove_file(output).map_err(|err| Error::from_io(err, output))?;
                    log::info!("Deleted offending output file: {}", output.display());
                }
                self.fail(failure_log, name, &e)
            }
        }
    }

    fn fail(
        &self,
        failure_log: &Mutex<File>,
        name: String,
        error: &Error,
    ) -> Result<Option<String>> {
        self.record_failure(failure_log, &name, error)?;
        self.emit(BatchEvent::Failed {
            name: name.clone(),
            error: error.to_string(),
        });
        Ok(Some(name))
    }

    fn record_failure(&self, failure_log: &Mutex<File>, name: &str, error: &Error) -> Result<()> {
        let line = if self.options.record_reasons {
            format!("{name} - {error}\n")
        } else {
            format!("{name}\n")
        };

        let mut file = failure_log
            .lock()
            .map_err(|_| Error::Conversion("failure log lock poisoned".to_string()))?;
        file.write_all(line.as_bytes())
            .map_err(|e| Error::from_io(e, &self.options.failure_log))
    }

    fn emit(&self, event: BatchEvent) {
        if let Some(sender) = &self.events {
            // A dropped receiver only means nobody is watching.
            let _ = sender.send(event);
        }
    }
}

/// One input with its assigned output.
struct Job<'i> {
    input: &'i Path,
    output: PathBuf,
    conflict: Option<Error>,
}

fn resolve_input(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Absolute form of an output path that may not exist yet.
fn resolve_output(path: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(path) {
        return resolved;
    }
    match (path.parent(), path.file_name()) {
        (Some(dir), Some(name)) => resolve_input(dir).join(name),
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, BatchConverter) {
        let dir = TempDir::new().unwrap();
        let options = BatchOptions::new(dir.path().join("out"))
            .with_failure_log(dir.path().join("bad.txt"))
            .with_parallel(false);
        (dir, BatchConverter::new(ConvertOptions::default(), options))
    }

    #[test]
    fn test_output_path_uses_stem() {
        let (dir, batch) = setup();
        assert_eq!(
            batch.output_path(Path::new("/in/page.html")),
            dir.path().join("out").join("page.md")
        );
    }

    #[test]
    fn test_inputs_from_dir_sorted_and_filtered() {
        let (dir, batch) = setup();
        fs::write(dir.path().join("b.html"), "<p>b</p>").unwrap();
        fs::write(dir.path().join("a.md"), "a").unwrap();
        fs::write(dir.path().join("c.pdf"), "x").unwrap();

        let inputs = batch.inputs_from_dir(dir.path()).unwrap();
        let names: Vec<_> = inputs
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.md", "b.html"]);
    }

    #[test]
    fn test_inputs_from_list_skips_missing() {
        let (dir, batch) = setup();
        let good = dir.path().join("good.md");
        fs::write(&good, "# ok").unwrap();
        let list = dir.path().join("list.txt");
        fs::write(
            &list,
            format!("{}\n\n{}\n", good.display(), dir.path().join("gone.md").display()),
        )
        .unwrap();

        assert_eq!(batch.inputs_from_list(&list).unwrap(), vec![good]);
    }

    #[test]
    fn test_missing_input_is_fatal() {
        let (dir, batch) = setup();
        let err = batch.run(&[dir.path().join("nope.md")]).unwrap_err();
        assert!(matches!(err, Error::InputNotFound(_)));
    }

    #[test]
    fn test_events_are_sent() {
        let (dir, batch) = setup();
        let input = dir.path().join("doc.md");
        fs::write(&input, "# T").unwrap();

        let (tx, rx) = crossbeam_channel::unbounded();
        let batch = batch.with_events(tx);
        let report = batch.run(&[input]).unwrap();

        assert_eq!(report.succeeded, 1);
        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                BatchEvent::Started {
                    index: 1,
                    total: 1,
                    name: "doc.md".into()
                },
                BatchEvent::Finished {
                    name: "doc.md".into()
                },
            ]
        );
    }

    #[test]
    fn test_invalid_pattern_aborts_before_work() {
        let dir = TempDir::new().unwrap();
        let mut options = ConvertOptions::default();
        options.render.cleanup = options.render.cleanup.add_pattern("(");
        let batch = BatchConverter::new(options, BatchOptions::new(dir.path().join("out")));

        let err = batch.run(&[]).unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
        assert!(!dir.path().join("out").exists());
    }
}
