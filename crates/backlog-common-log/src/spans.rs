//! Spans and timing helpers.

use std::path::Path;

use tracing::{info_span, Span};

/// Span covering all work done for one project directory.
pub fn project_span(project: &Path) -> Span {
    info_span!("project", path = %project.display())
}

/// Span for one reconciliation step (`sync`, `rename`, `closure`, ...).
pub fn reconcile_span(operation: &'static str) -> Span {
    info_span!("reconcile", op = operation)
}

/// Span for a single file operation.
pub fn file_span(operation: &'static str, path: &Path) -> Span {
    info_span!("file", op = operation, path = %path.display())
}

/// Timing utility for operations.
pub struct Timer {
    start: std::time::Instant,
    operation: &'static str,
}

impl Timer {
    /// Start a new timer.
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: std::time::Instant::now(),
            operation,
        }
    }

    /// Complete the timer and record duration.
    pub fn finish(self) {
        let duration = self.start.elapsed();
        tracing::debug!(
            operation = %self.operation,
            duration_ms = %duration.as_millis(),
            "operation completed"
        );
    }
}

/// Macro for timing a block of code.
#[macro_export]
macro_rules! timed {
    ($name:expr, $body:expr) => {{
        let _timer = $crate::spans::Timer::start($name);
        let result = $body;
        _timer.finish();
        result
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::EnvFilter;

    fn with_subscriber<F>(f: F)
    where
        F: FnOnce(),
    {
        let subscriber = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(EnvFilter::new("trace"))
            .finish();

        tracing::subscriber::with_default(subscriber, f);
    }

    #[test]
    fn test_span_nesting() {
        with_subscriber(|| {
            let project = project_span(Path::new("/tmp/projects"));
            let _guard1 = project.enter();

            let step = reconcile_span("sync");
            let _guard2 = step.enter();

            let file = file_span("rename", Path::new("/tmp/projects/issues/1_O_a.md"));
            let _guard3 = file.enter();

            tracing::info!("nested operation");
        });
    }

    #[test]
    fn test_timed_macro_returns_value() {
        with_subscriber(|| {
            let result = timed!("macro_test", {
                std::thread::sleep(std::time::Duration::from_millis(1));
                "success"
            });
            assert_eq!(result, "success");
        });
    }
}
