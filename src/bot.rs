//! The poll loop.
//!
//! One cycle:
//!
//! ```text
//! poll ──▶ same hash? ──yes──▶ log, sleep
//!            │ no
//!            ▼
//!         render ──fail──▶ log, sleep (hash not committed, retried next poll)
//!            │ ok
//!            ▼
//!         publish (if enabled) ──▶ commit per CommitPolicy ──▶ sleep
//! ```
//!
//! When `sendOnStart` is off, the first successful poll only primes the
//! tracker with the current hash, so the bot posts the *next* shop rather than
//! the one already live when it started.
//!
//! The bot owns all mutable state and runs on a single thread. Sleeping is a
//! `recv_timeout` on the shutdown channel, so a shutdown request ends the
//! sleep early but never interrupts a cycle in flight. [`supervise`] runs the
//! loop on tokio's blocking pool and also returns if the loop dies on its own.

use crate::catalog::CatalogSnapshot;
use crate::config::{BotConfig, CommitPolicy};
use crate::date::DateLabeler;
use crate::imaging::backend::{AssetError, AssetProvider, Typeface};
use crate::imaging::params::Quality;
use crate::imaging::typeface::RustTypeface;
use crate::publish::Publisher;
use crate::shop::{RenderReport, ShopError, render_to_file};
use crate::tracker::{CatalogSource, CatalogTracker, TrackerError};
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;
use tokio::task::JoinError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Disabled,
    Posted(String),
    Failed(String),
}

/// What one cycle did.
#[derive(Debug)]
pub enum CycleOutcome {
    /// First poll with `sendOnStart` off: hash recorded, nothing rendered.
    Primed { hash: String },
    Unchanged,
    Rendered {
        hash: String,
        report: RenderReport,
        publish: PublishOutcome,
        committed: bool,
    },
    FetchFailed(TrackerError),
    RenderFailed { hash: String, error: ShopError },
}

pub struct ShopBot<S> {
    tracker: CatalogTracker<S>,
    assets: Box<dyn AssetProvider + Send>,
    face: Option<Box<dyn Typeface + Send>>,
    fonts_dir: Option<PathBuf>,
    publisher: Option<Publisher>,
    dates: DateLabeler,
    output: PathBuf,
    quality: Quality,
    policy: CommitPolicy,
    interval: Duration,
    primed: bool,
}

impl<S: CatalogSource> ShopBot<S> {
    pub fn new(
        config: &BotConfig,
        source: S,
        assets: Box<dyn AssetProvider + Send>,
        output: PathBuf,
    ) -> Self {
        Self {
            tracker: CatalogTracker::new(source),
            assets,
            face: None,
            fonts_dir: None,
            publisher: None,
            dates: DateLabeler::new(&config.language),
            output,
            quality: Quality::default(),
            policy: config.commit_policy,
            interval: config.poll_interval(),
            primed: config.send_on_start,
        }
    }

    /// Use an already loaded typeface.
    pub fn with_typeface(mut self, face: Box<dyn Typeface + Send>) -> Self {
        self.face = Some(face);
        self
    }

    /// Load the display font from `dir` on first render.
    pub fn with_fonts_dir(mut self, dir: PathBuf) -> Self {
        self.fonts_dir = Some(dir);
        self
    }

    pub fn with_publisher(mut self, publisher: Publisher) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn tracker(&self) -> &CatalogTracker<S> {
        &self.tracker
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    fn ensure_typeface(&mut self) -> Result<(), AssetError> {
        if self.face.is_none()
            && let Some(dir) = &self.fonts_dir
        {
            let face = RustTypeface::load(dir)?;
            tracing::info!(font = %face.path().display(), "Loaded display font");
            self.face = Some(Box::new(face));
        }
        Ok(())
    }

    fn render(
        &mut self,
        snapshot: &CatalogSnapshot,
        date: &str,
    ) -> Result<RenderReport, ShopError> {
        self.ensure_typeface()?;
        let face = self
            .face
            .as_deref()
            .ok_or_else(|| AssetError::Font("no typeface configured".into()))?;
        render_to_file(
            snapshot,
            date,
            self.assets.as_ref(),
            face,
            &self.output,
            self.quality,
        )
    }

    /// Run one poll/render/publish cycle for the given calendar date.
    pub fn run_cycle(&mut self, today: NaiveDate) -> CycleOutcome {
        if !self.primed {
            return match self.tracker.prime() {
                Ok(hash) => {
                    self.primed = true;
                    tracing::info!(
                        hash = %hash,
                        "Recorded current Item Shop, waiting for the next one"
                    );
                    CycleOutcome::Primed { hash }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to GET Item Shop");
                    CycleOutcome::FetchFailed(e)
                }
            };
        }

        let poll = match self.tracker.poll() {
            Ok(poll) => poll,
            Err(e) => {
                tracing::error!(error = %e, "Failed to GET Item Shop");
                return CycleOutcome::FetchFailed(e);
            }
        };
        let Some(hash) = poll.new_hash else {
            tracing::info!("Data checked, nothing was changed.");
            return CycleOutcome::Unchanged;
        };

        let date = self.dates.label(today);
        tracing::info!(hash = %hash, "Retrieved Item Shop for {date}");

        let report = match self.render(&poll.snapshot, &date) {
            Ok(report) => report,
            Err(error) => {
                tracing::error!(error = %error, "Failed to render Item Shop");
                return CycleOutcome::RenderFailed { hash, error };
            }
        };

        let publish = match &self.publisher {
            None => PublishOutcome::Disabled,
            Some(publisher) => match publisher.publish(&date, &self.output) {
                Ok(id) => PublishOutcome::Posted(id),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to publish Item Shop");
                    PublishOutcome::Failed(e.to_string())
                }
            },
        };

        let committed = !matches!(
            (self.policy, &publish),
            (CommitPolicy::PublishSuccess, PublishOutcome::Failed(_))
        );
        if committed {
            self.tracker.commit(hash.clone());
        } else {
            tracing::warn!(hash = %hash, "hash not committed, will retry on the next poll");
        }

        CycleOutcome::Rendered {
            hash,
            report,
            publish,
            committed,
        }
    }

    /// Cycle, then sleep, until `shutdown` receives a message or disconnects.
    pub fn run(&mut self, shutdown: &Receiver<()>) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            output = %self.output.display(),
            "Watching Item Shop"
        );
        loop {
            self.run_cycle(Local::now().date_naive());
            match shutdown.recv_timeout(self.interval) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    }
}

/// Why [`supervise`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stop {
    /// The interrupt fired and the loop exited after its current cycle.
    Interrupted,
    /// The loop exited without being asked to.
    WorkerExited,
}

/// Run `bot` on the blocking pool until `interrupt` resolves.
///
/// A loop that panics ends the wait at once with the join error instead of
/// leaving the process idle until the next interrupt.
pub async fn supervise<S, F>(mut bot: ShopBot<S>, interrupt: F) -> Result<Stop, JoinError>
where
    S: CatalogSource + Send + 'static,
    F: Future,
{
    let (shutdown_tx, shutdown_rx) = mpsc::channel();
    let mut worker = tokio::task::spawn_blocking(move || bot.run(&shutdown_rx));

    tokio::select! {
        _ = interrupt => {
            tracing::info!("Shutting down after the current cycle");
            // A worker that already died reports through the join below.
            let _ = shutdown_tx.send(());
            worker.await?;
            Ok(Stop::Interrupted)
        }
        joined = &mut worker => {
            tracing::error!("Poll loop stopped unexpectedly");
            joined?;
            Ok(Stop::WorkerExited)
        }
    }
}
