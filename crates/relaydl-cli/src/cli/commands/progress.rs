//! Terminal rendering of download events.

use relaydl_core::downloader::{DownloadEvent, DownloadState, EventSender, ProgressSnapshot};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const PROGRESS_INTERVAL: Duration = Duration::from_millis(250);

/// Rate limit for progress lines. Snapshots that arrive too soon are held
/// back, and the newest held one is released by `flush`.
#[derive(Debug)]
struct Throttle {
    interval: Duration,
    last_print: Option<Instant>,
    pending: Option<ProgressSnapshot>,
}

impl Throttle {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_print: None,
            pending: None,
        }
    }

    /// The snapshot to print now, if the interval has passed since the last line.
    fn on_progress(
        &mut self,
        snapshot: ProgressSnapshot,
        now: Instant,
    ) -> Option<ProgressSnapshot> {
        let due = self
            .last_print
            .map_or(true, |t| now.duration_since(t) >= self.interval);
        if due {
            self.last_print = Some(now);
            self.pending = None;
            Some(snapshot)
        } else {
            self.pending = Some(snapshot);
            None
        }
    }

    /// Release the held snapshot and restart the interval.
    fn flush(&mut self) -> Option<ProgressSnapshot> {
        self.last_print = None;
        self.pending.take()
    }
}

/// Turns events into stderr lines. Every status line is preceded by the last
/// progress snapshot of its attempt.
#[derive(Debug)]
struct Renderer {
    throttle: Throttle,
    state: DownloadState,
}

impl Renderer {
    fn new(interval: Duration) -> Self {
        Self {
            throttle: Throttle::new(interval),
            state: DownloadState::Idle,
        }
    }

    fn render(&mut self, event: &DownloadEvent, now: Instant) -> Vec<String> {
        if let DownloadEvent::Progress(snapshot) = event {
            return self
                .throttle
                .on_progress(*snapshot, now)
                .map(|s| vec![format!("  {}", s)])
                .unwrap_or_default();
        }

        if let Some(state) = event.state() {
            self.state = state;
        }
        let mut lines: Vec<String> = self
            .throttle
            .flush()
            .map(|s| format!("  {}", s))
            .into_iter()
            .collect();
        lines.push(match event {
            DownloadEvent::Retrying { error, .. } | DownloadEvent::Failed { error, .. } => {
                format!("{} ({})", event, error)
            }
            _ => event.to_string(),
        });
        lines
    }

    /// Lines still held when the event stream ends.
    fn finish(&mut self) -> Option<String> {
        self.throttle.flush().map(|s| format!("  {}", s))
    }
}

/// Spawn a task printing status lines to stderr. Drop every sender to stop it.
pub fn spawn_renderer() -> (EventSender, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<DownloadEvent>();
    let handle = tokio::spawn(async move {
        let mut renderer = Renderer::new(PROGRESS_INTERVAL);
        while let Some(event) = rx.recv().await {
            for line in renderer.render(&event, Instant::now()) {
                eprintln!("{}", line);
            }
            if let DownloadEvent::Complete { path, sha256, .. } = &event {
                println!("{}  {}", sha256, path.display());
            }
        }
        if let Some(line) = renderer.finish() {
            eprintln!("{}", line);
        }
        tracing::debug!(state = ?renderer.state, "event stream closed");
    });
    (tx, handle)
}
