//! Watch mode
//!
//! Renders the project once, then watches the project directory and renders
//! again whenever a source changes. Each rebuild reloads the configuration,
//! builds in fresh staging directories and swaps the result into the output
//! directory with [`publish_atomically`](crate::render::publish_atomically).
//!
//! A failed rebuild is logged and the previous site stays in place. Watching
//! ends when the pipeline's cancellation token is cancelled.

use std::path::{Component, Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

use log::{debug, error, info};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::cancel::CancellationToken;
use crate::config::{PartialConfig, ProjectConfig};
use crate::error::Result;
use crate::render::RenderReport;
use crate::staging::Pipeline;

/// Default quiet period before a burst of changes triggers a rebuild.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Upper bound on how long a Ctrl-C goes unnoticed while waiting for changes
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Directories whose changes never trigger a rebuild
const IGNORED_DIRS: &[&str] = &["target"];

/// Whether a change to `path` should trigger a rebuild.
///
/// Changes inside the output directory, inside hidden directories, inside
/// `target/` or outside the project are ignored.
pub fn should_trigger(path: &Path, project: &Path, output_dir: &Path) -> bool {
    if path.starts_with(output_dir) {
        return false;
    }
    let Ok(relative) = path.strip_prefix(project) else {
        return false;
    };
    relative.components().all(|component| match component {
        Component::Normal(name) => {
            let name = name.to_string_lossy();
            !name.starts_with('.') && !IGNORED_DIRS.contains(&name.as_ref())
        }
        _ => true,
    })
}

/// Why [`next_rebuild`] returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// A relevant change arrived and no further relevant change followed
    /// within the debounce period
    Rebuild,
    /// Every sender is gone
    Disconnected,
    Cancelled,
}

/// Wait for a relevant event, then for `debounce` to pass without another one.
///
/// Only relevant events push the deadline back; irrelevant ones (build
/// output, VCS churn) are drained without delaying the rebuild. `cancel` is
/// polled at least every [`POLL_INTERVAL`].
pub fn next_rebuild<T>(
    rx: &mpsc::Receiver<T>,
    debounce: Duration,
    cancel: &CancellationToken,
    mut is_relevant: impl FnMut(&T) -> bool,
) -> Wake {
    let mut deadline: Option<Instant> = None;
    loop {
        if cancel.is_cancelled() {
            return Wake::Cancelled;
        }
        let wait = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    return Wake::Rebuild;
                }
                (deadline - now).min(POLL_INTERVAL)
            }
            None => POLL_INTERVAL,
        };
        match rx.recv_timeout(wait) {
            Ok(event) => {
                if is_relevant(&event) {
                    deadline = Some(Instant::now() + debounce);
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => return Wake::Disconnected,
        }
    }
}

fn is_content_change(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

/// A project being watched
#[derive(Debug, Clone)]
pub struct WatchSession {
    pub directory: PathBuf,
    pub config_file: PathBuf,
    pub overrides: PartialConfig,
    pub debounce: Duration,
}

impl WatchSession {
    pub fn new(directory: PathBuf, config_file: PathBuf, overrides: PartialConfig) -> Self {
        WatchSession {
            directory,
            config_file,
            overrides,
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Reload the configuration and publish a fresh build.
    pub fn rebuild(&self, pipeline: &Pipeline) -> Result<(ProjectConfig, RenderReport)> {
        let config =
            ProjectConfig::load(&self.directory, &self.config_file, self.overrides.clone())?;
        let report = pipeline.publish(&config)?;
        Ok((config, report))
    }

    /// Build once, then rebuild on every change until the watcher disconnects
    /// or the pipeline's cancellation token is cancelled.
    ///
    /// Only errors from the initial build or from setting up the watcher are
    /// returned; later failures are logged.
    pub fn run(&self, pipeline: &Pipeline) -> Result<()> {
        let (config, report) = self.rebuild(pipeline)?;
        info!(
            "Built {} pages into '{}'",
            report.pages.len(),
            report.output_dir.display()
        );
        let mut output_dir = config.output_dir;

        let (tx, rx) = mpsc::channel::<notify::Result<Event>>();
        let mut watcher: RecommendedWatcher = notify::recommended_watcher(tx)?;
        watcher.watch(&self.directory, RecursiveMode::Recursive)?;
        info!("Watching '{}' for changes", self.directory.display());

        loop {
            let wake = next_rebuild(&rx, self.debounce, pipeline.cancellation(), |event| {
                self.is_relevant(event, &output_dir)
            });
            match wake {
                Wake::Rebuild => {}
                Wake::Disconnected => {
                    debug!("Watcher disconnected");
                    return Ok(());
                }
                Wake::Cancelled => {
                    info!("Stopped watching '{}'", self.directory.display());
                    return Ok(());
                }
            }

            info!("Change detected, rebuilding");
            match self.rebuild(pipeline) {
                Ok((config, report)) => {
                    info!(
                        "Rebuilt {} pages into '{}'",
                        report.pages.len(),
                        report.output_dir.display()
                    );
                    output_dir = config.output_dir;
                }
                Err(e) => error!("Rebuild failed, keeping the previous site: {}", e),
            }
        }
    }

    fn is_relevant(&self, event: &notify::Result<Event>, output_dir: &Path) -> bool {
        match event {
            Ok(event) => {
                is_content_change(event)
                    && event
                        .paths
                        .iter()
                        .any(|path| should_trigger(path, &self.directory, output_dir))
            }
            Err(e) => {
                error!("Watch error: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::thread;
    use tempfile::TempDir;

    fn relevant(path: &&'static str) -> bool {
        should_trigger(Path::new(path), Path::new("/p"), Path::new("/p/site"))
    }

    #[test]
    fn test_irrelevant_churn_does_not_delay_rebuild() {
        let (tx, rx) = mpsc::channel();
        tx.send("/p/docs/a.md").unwrap();
        let churn = thread::spawn(move || {
            // Keeps going until the receiver is dropped or 5s pass
            for _ in 0..500 {
                if tx.send("/p/target/debug/build.o").is_err() {
                    break;
                }
                thread::sleep(Duration::from_millis(10));
            }
        });

        let started = Instant::now();
        let wake = next_rebuild(&rx, Duration::from_millis(50), &CancellationToken::new(), relevant);
        let elapsed = started.elapsed();
        drop(rx);
        churn.join().unwrap();

        assert_eq!(wake, Wake::Rebuild);
        assert!(elapsed < Duration::from_secs(2), "rebuild waited {:?}", elapsed);
    }

    #[test]
    fn test_relevant_changes_extend_the_quiet_period() {
        let (tx, rx) = mpsc::channel();
        let sender = thread::spawn(move || {
            for _ in 0..5 {
                tx.send("/p/docs/a.md").unwrap();
                thread::sleep(Duration::from_millis(40));
            }
            tx
        });

        let started = Instant::now();
        let wake = next_rebuild(&rx, Duration::from_millis(100), &CancellationToken::new(), relevant);
        let elapsed = started.elapsed();
        let _tx = sender.join().unwrap();

        assert_eq!(wake, Wake::Rebuild);
        // Last change lands after ~160ms, then a full quiet period follows
        assert!(elapsed >= Duration::from_millis(250), "rebuilt after {:?}", elapsed);
    }

    #[test]
    fn test_only_irrelevant_events_never_rebuild() {
        let (tx, rx) = mpsc::channel();
        tx.send("/p/.git/index").unwrap();
        tx.send("/p/site/index.html").unwrap();
        drop(tx);

        let wake = next_rebuild(&rx, Duration::from_millis(10), &CancellationToken::new(), relevant);
        assert_eq!(wake, Wake::Disconnected);
    }

    #[test]
    fn test_cancellation_interrupts_waiting() {
        let (_tx, rx) = mpsc::channel::<&'static str>();
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            trigger.cancel();
        });

        let started = Instant::now();
        let wake = next_rebuild(&rx, DEFAULT_DEBOUNCE, &cancel, relevant);
        canceller.join().unwrap();

        assert_eq!(wake, Wake::Cancelled);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_should_trigger() {
        let project = Path::new("/work/project");
        let output = Path::new("/work/project/site");

        assert!(should_trigger(Path::new("/work/project/README.md"), project, output));
        assert!(should_trigger(Path::new("/work/project/docs/a/b.md"), project, output));
        assert!(!should_trigger(Path::new("/work/project/site/index.html"), project, output));
        assert!(!should_trigger(Path::new("/work/project/.git/HEAD"), project, output));
        assert!(!should_trigger(Path::new("/work/project/docs/.draft.md"), project, output));
        assert!(!should_trigger(Path::new("/work/project/target/debug/x"), project, output));
        assert!(!should_trigger(Path::new("/elsewhere/file.md"), project, output));
    }

    #[test]
    fn test_output_outside_project() {
        let project = Path::new("/work/project");
        let output = Path::new("/srv/www");
        assert!(should_trigger(Path::new("/work/project/site/page.md"), project, output));
    }

    #[test]
    fn test_rebuild_publishes_and_replaces() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("project");
        fs::create_dir_all(project.join("docs")).unwrap();
        fs::write(project.join("quire.toml"), "[quire]\noutput-dir = \"public\"\n").unwrap();
        fs::write(project.join("README.md"), "# First\n").unwrap();

        let session = WatchSession::new(
            project.clone(),
            PathBuf::from("quire.toml"),
            PartialConfig {
                modules: Some(vec!["demo".to_string()]),
                ..Default::default()
            },
        )
        .with_debounce(Duration::from_millis(10));
        let pipeline = Pipeline::default();

        let (config, report) = session.rebuild(&pipeline).unwrap();
        assert_eq!(config.output_dir, project.join("public"));
        assert_eq!(report.pages, vec![PathBuf::from("index.html")]);
        let first = fs::read_to_string(project.join("public/index.html")).unwrap();
        assert!(first.contains("<h1>First</h1>"));

        fs::write(project.join("README.md"), "# Second\n").unwrap();
        session.rebuild(&pipeline).unwrap();
        let second = fs::read_to_string(project.join("public/index.html")).unwrap();
        assert!(second.contains("<h1>Second</h1>"));
    }
}
