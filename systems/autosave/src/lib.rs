#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Debounced autosave system that turns layout edits into save requests.

use std::time::Duration;

use lab_layout_core::{ChangeCause, Event, SaveRequest};
use tracing::{debug, trace};

/// Quiet period the editor waits after the last edit before saving.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(900);

/// Configuration parameters required to construct the autosave system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    quiet_period: Duration,
}

impl Config {
    /// Creates a new configuration using the provided quiet period.
    #[must_use]
    pub const fn new(quiet_period: Duration) -> Self {
        Self { quiet_period }
    }

    /// Quiet period required between the last edit and the save.
    #[must_use]
    pub const fn quiet_period(&self) -> Duration {
        self.quiet_period
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_PERIOD)
    }
}

/// Pure system that debounces edits into a single plain save.
#[derive(Clone, Debug)]
pub struct Autosave {
    quiet_period: Duration,
    elapsed: Option<Duration>,
}

impl Autosave {
    /// Creates an idle autosave system using the supplied configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self {
            quiet_period: config.quiet_period,
            elapsed: None,
        }
    }

    /// Reports whether a save is scheduled but has not fired yet.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.elapsed.is_some()
    }

    /// Consumes world events and emits save requests once edits settle.
    ///
    /// Edits restart the quiet period. Ingestion of a loaded or restored grid
    /// cancels any pending save without scheduling a new one, so freshly
    /// loaded content is never echoed back to the store.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<SaveRequest>) {
        for event in events {
            match event {
                Event::LayoutChanged {
                    cause: ChangeCause::Edit,
                } => {
                    if self.elapsed.is_none() {
                        trace!("autosave scheduled");
                    }
                    self.elapsed = Some(Duration::ZERO);
                }
                Event::LayoutChanged {
                    cause: ChangeCause::Ingest,
                } => {
                    if self.elapsed.take().is_some() {
                        debug!("pending autosave cancelled by grid ingestion");
                    }
                }
                Event::TimeAdvanced { dt } => self.advance(*dt, out),
                _ => {}
            }
        }
    }

    fn advance(&mut self, dt: Duration, out: &mut Vec<SaveRequest>) {
        let Some(elapsed) = self.elapsed else {
            return;
        };
        let elapsed = elapsed.saturating_add(dt);
        if elapsed >= self.quiet_period {
            debug!(quiet_period = ?self.quiet_period, "autosave due");
            self.elapsed = None;
            out.push(SaveRequest {
                save_version: false,
            });
        } else {
            self.elapsed = Some(elapsed);
        }
    }
}

impl Default for Autosave {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
