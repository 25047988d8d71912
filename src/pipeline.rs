//! One processing run: images in order → source → extractor → combined.
//!
//! Images are processed one at a time in input order. Per-image errors are
//! logged and counted; a fatal error (rejected credential) stops the queue
//! but keeps every record collected so far.

use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::path::PathBuf;

use crate::error::ExtractionError;
use crate::input::{label_for, ImageInput};
use crate::record::{aggregate, CombinedResult};
use crate::source::ImageSource;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Log each image's raw source text
    pub show_raw: bool,
}

/// An image that contributed no records because of an error.
#[derive(Debug)]
pub struct ImageFailure {
    pub label: String,
    pub error: ExtractionError,
}

#[derive(Debug)]
pub struct RunReport {
    pub combined: CombinedResult,
    pub total_images: usize,
    pub succeeded: usize,
    pub failures: Vec<ImageFailure>,
    /// Set when a fatal error stopped the queue early
    pub aborted: bool,
}

impl RunReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Images never attempted because the run was aborted.
    pub fn skipped(&self) -> usize {
        self.total_images - self.succeeded - self.failed()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Extracted {} record(s): {} image(s) processed, {} failed",
            self.combined.len(),
            self.succeeded,
            self.failed()
        )?;
        if self.aborted {
            write!(f, ", {} not processed (run aborted)", self.skipped())?;
        }
        Ok(())
    }
}

pub fn progress_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix:<4} {bar:40.cyan/blue} {pos}/{len} images [{elapsed_precise}] {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

fn note(progress: &ProgressBar, msg: &str) {
    progress.suspend(|| crate::log(msg));
}

/// Processes every image in order. Each run builds a fresh combined result.
pub fn run(
    images: &[PathBuf],
    source: &dyn ImageSource,
    options: &RunOptions,
    progress: &ProgressBar,
) -> RunReport {
    let mut batches = Vec::with_capacity(images.len());
    let mut succeeded = 0;
    let mut failures = Vec::new();
    let mut aborted = false;

    progress.set_length(images.len() as u64);
    progress.set_prefix(source.name());

    for (index, path) in images.iter().enumerate() {
        let label = label_for(path);
        progress.set_message(label.clone());
        note(
            progress,
            &format!("[{}/{}] Processing {}", index + 1, images.len(), label),
        );

        let outcome = ImageInput::load(path).and_then(|image| source.process(&image));

        match outcome {
            Ok(output) => {
                if options.show_raw {
                    note(
                        progress,
                        &format!("Raw text for {}:\n{}", label, output.raw_text.trim_end()),
                    );
                }
                let batch = output.batch;
                if batch.is_empty() {
                    note(progress, &format!("{}: no name/score pairs found", batch.source));
                } else {
                    note(
                        progress,
                        &format!("{}: {} record(s)", batch.source, batch.len()),
                    );
                }
                batches.push(batch);
                succeeded += 1;
            }
            Err(error) => {
                note(progress, &format!("{}: failed: {}", label, error));
                let fatal = error.is_fatal();
                failures.push(ImageFailure { label, error });
                if fatal {
                    note(
                        progress,
                        &format!(
                            "Fatal error, skipping the remaining {} image(s)",
                            images.len() - index - 1
                        ),
                    );
                    aborted = true;
                    progress.inc(1);
                    break;
                }
            }
        }
        progress.inc(1);
    }

    progress.finish_and_clear();

    RunReport {
        combined: aggregate(batches),
        total_images: images.len(),
        succeeded,
        failures,
        aborted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{Extractor, StructuredExtractor};
    use crate::record::Score;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    /// Returns canned AI text per file name and records the call order.
    struct ScriptedSource {
        extractor: StructuredExtractor,
        seen: RefCell<Vec<String>>,
    }

    impl ScriptedSource {
        fn new() -> Self {
            Self {
                extractor: StructuredExtractor::new(),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl ImageSource for ScriptedSource {
        fn name(&self) -> &'static str {
            "test"
        }

        fn read_text(&self, image: &ImageInput) -> Result<String, ExtractionError> {
            self.seen.borrow_mut().push(image.label.clone());
            match image.label.as_str() {
                "auth.png" => Err(ExtractionError::Auth("HTTP 403".to_string())),
                "down.png" => Err(ExtractionError::RateLimitOrTransient {
                    status: 500,
                    attempts: 3,
                    message: "internal".to_string(),
                }),
                "garbled.png" => Ok("I could not read this image.".to_string()),
                "empty.png" => Ok(String::new()),
                _ => Ok(String::from_utf8_lossy(&image.bytes).to_string()),
            }
        }

        fn extractor(&self) -> &dyn Extractor {
            &self.extractor
        }
    }

    /// Writes each (name, contents) file and returns the paths in order.
    fn images(files: &[(&str, &str)]) -> (TempDir, Vec<PathBuf>) {
        let dir = tempdir().unwrap();
        let paths = files
            .iter()
            .map(|(name, contents)| {
                let path = dir.path().join(name);
                fs::write(&path, contents).unwrap();
                path
            })
            .collect();
        (dir, paths)
    }

    fn names(report: &RunReport) -> Vec<String> {
        report
            .combined
            .records()
            .iter()
            .map(|r| r.name().unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn test_batches_combined_in_input_order() {
        let (_dir, paths) = images(&[
            ("b.png", r#"[{"name":"Bob","number":17}]"#),
            ("a.png", r#"```json
[{"name":"Alice","number":42},{"name":"Bob","number":17}]
```"#),
        ]);
        let source = ScriptedSource::new();
        let report = run(&paths, &source, &RunOptions::default(), &ProgressBar::hidden());

        assert_eq!(names(&report), vec!["Bob", "Alice", "Bob"]);
        assert_eq!(report.combined.records()[1].score(), Some(Score::Integer(42)));
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed(), 0);
        assert!(!report.aborted);
    }

    #[test]
    fn test_per_image_errors_do_not_stop_the_run() {
        let (_dir, paths) = images(&[
            ("one.png", r#"[{"name":"Alice","number":1}]"#),
            ("garbled.png", ""),
            ("down.png", ""),
            ("two.png", r#"[{"name":"Carol","number":3}]"#),
        ]);
        let source = ScriptedSource::new();
        let report = run(&paths, &source, &RunOptions::default(), &ProgressBar::hidden());

        assert_eq!(names(&report), vec!["Alice", "Carol"]);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed(), 2);
        assert!(matches!(
            report.failures[0].error,
            ExtractionError::MalformedResponse(_)
        ));
        assert_eq!(report.failures[1].label, "down.png");
        assert!(!report.aborted);
        assert_eq!(report.skipped(), 0);
    }

    #[test]
    fn test_auth_error_aborts_but_keeps_records() {
        let (_dir, paths) = images(&[
            ("one.png", r#"[{"name":"Alice","number":1}]"#),
            ("auth.png", ""),
            ("two.png", r#"[{"name":"Carol","number":3}]"#),
            ("three.png", r#"[{"name":"Dave","number":4}]"#),
        ]);
        let source = ScriptedSource::new();
        let report = run(&paths, &source, &RunOptions::default(), &ProgressBar::hidden());

        assert_eq!(names(&report), vec!["Alice"]);
        assert!(report.aborted);
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.skipped(), 2);
        assert_eq!(*source.seen.borrow(), vec!["one.png", "auth.png"]);
        assert_eq!(
            report.to_string(),
            "Extracted 1 record(s): 1 image(s) processed, 1 failed, 2 not processed (run aborted)"
        );
    }

    #[test]
    fn test_empty_response_is_success_with_no_records() {
        let (_dir, paths) = images(&[("empty.png", "")]);
        let source = ScriptedSource::new();
        let report = run(&paths, &source, &RunOptions::default(), &ProgressBar::hidden());

        assert!(report.combined.is_empty());
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed(), 0);
    }

    #[test]
    fn test_unreadable_image_is_per_image_failure() {
        let (dir, mut paths) = images(&[("ok.png", r#"[{"name":"Eve","number":5}]"#)]);
        paths.insert(0, dir.path().join("missing.png"));
        paths.push(dir.path().join("notes.txt"));
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let source = ScriptedSource::new();
        let report = run(&paths, &source, &RunOptions::default(), &ProgressBar::hidden());

        assert_eq!(names(&report), vec!["Eve"]);
        assert_eq!(report.failed(), 2);
        assert!(report
            .failures
            .iter()
            .all(|f| matches!(f.error, ExtractionError::Image(_))));
        // Source never saw the images that failed to load
        assert_eq!(*source.seen.borrow(), vec!["ok.png"]);
    }

    #[test]
    fn test_each_run_starts_empty() {
        let (_dir, paths) = images(&[("a.png", r#"[{"name":"Alice","number":1}]"#)]);
        let source = ScriptedSource::new();
        let first = run(&paths, &source, &RunOptions::default(), &ProgressBar::hidden());
        let second = run(&paths, &source, &RunOptions::default(), &ProgressBar::hidden());

        assert_eq!(first.combined.len(), 1);
        assert_eq!(second.combined.len(), 1);
    }

    #[test]
    fn test_summary_without_abort() {
        let report = RunReport {
            combined: CombinedResult::new(),
            total_images: 3,
            succeeded: 2,
            failures: vec![ImageFailure {
                label: "x.png".to_string(),
                error: ExtractionError::Ocr("boom".to_string()),
            }],
            aborted: false,
        };
        assert_eq!(
            report.to_string(),
            "Extracted 0 record(s): 2 image(s) processed, 1 failed"
        );
    }

    #[test]
    fn test_no_images_yields_empty_result() {
        let source = ScriptedSource::new();
        let report = run(&[], &source, &RunOptions::default(), &ProgressBar::hidden());

        assert!(report.combined.is_empty());
        assert_eq!(report.total_images, 0);
        assert_eq!(report.to_string(), "Extracted 0 record(s): 0 image(s) processed, 0 failed");
    }
}
