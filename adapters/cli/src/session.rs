use std::time::Duration;

use anyhow::{bail, Context, Result};
use lab_layout_core::{Command, Event, GridDimensions, GridSnapshot, LayoutStore, SnapshotSource};
use lab_layout_system_autosave::{Autosave, Config as AutosaveConfig};
use lab_layout_world::{apply, query, Layout};
use tracing::{debug, info};

/// One editing session: the authoritative layout, its autosave and the store.
pub(crate) struct Session<S: LayoutStore> {
    layout: Layout,
    autosave: Autosave,
    quiet_period: Duration,
    store: S,
}

impl<S: LayoutStore> Session<S> {
    /// Opens a session by ingesting the store's current grid.
    pub(crate) fn open(
        store: S,
        dimensions: GridDimensions,
        quiet_period: Duration,
    ) -> Result<Self> {
        let layout = Layout::with_dimensions(dimensions)?;
        let mut session = Self {
            layout,
            autosave: Autosave::new(AutosaveConfig::new(quiet_period)),
            quiet_period,
            store,
        };
        let snapshot = session
            .store
            .load_grid()
            .context("failed to load the current grid")?;
        let _ = session.execute(Command::ReplaceGrid {
            snapshot,
            source: SnapshotSource::Store,
        })?;
        Ok(session)
    }

    pub(crate) fn layout(&self) -> &Layout {
        &self.layout
    }

    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Applies a command, feeds the resulting events to the autosave and
    /// performs any save it requests.
    pub(crate) fn execute(&mut self, command: Command) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        apply(&mut self.layout, command, &mut events);
        let mut saves = Vec::new();
        self.autosave.handle(&events, &mut saves);
        if !saves.is_empty() {
            let snapshot = query::snapshot(&self.layout);
            for request in saves {
                self.store
                    .save_grid(&snapshot, request.save_version)
                    .context("autosave failed")?;
            }
            debug!("autosaved current grid");
        }
        Ok(events)
    }

    /// Lets the quiet period elapse so a pending autosave is written.
    ///
    /// Returns whether a save was pending.
    pub(crate) fn settle(&mut self) -> Result<bool> {
        if !self.autosave.is_pending() {
            return Ok(false);
        }
        let _ = self.execute(Command::Tick {
            dt: self.quiet_period,
        })?;
        Ok(true)
    }

    /// Saves the current grid and archives it as a new version.
    pub(crate) fn save_version(&mut self) -> Result<()> {
        let snapshot = query::snapshot(&self.layout);
        self.store
            .save_grid(&snapshot, true)
            .context("failed to save a new version")?;
        info!("saved layout version");
        Ok(())
    }

    /// Restores an archived version and makes it the current grid.
    ///
    /// The restored grid is written back without archiving a new version.
    pub(crate) fn restore(&mut self, id: &str) -> Result<Vec<Event>> {
        let Some(snapshot) = self
            .store
            .load_version(id)
            .with_context(|| format!("failed to load version {id}"))?
        else {
            bail!("version {id} does not exist");
        };
        self.replace(snapshot, SnapshotSource::Version)
    }

    /// Replaces the grid with a snapshot decoded from a transfer string.
    pub(crate) fn import(&mut self, snapshot: GridSnapshot) -> Result<Vec<Event>> {
        self.replace(snapshot, SnapshotSource::Transfer)
    }

    fn replace(&mut self, snapshot: GridSnapshot, source: SnapshotSource) -> Result<Vec<Event>> {
        let previous = (self.layout.clone(), self.autosave.clone());
        let events = self.execute(Command::ReplaceGrid {
            snapshot: Some(snapshot),
            source,
        })?;
        if let Some(Event::SnapshotDiscarded { reason, .. }) = events
            .iter()
            .find(|event| matches!(event, Event::SnapshotDiscarded { .. }))
        {
            (self.layout, self.autosave) = previous;
            bail!("{source:?} snapshot was rejected: {reason}");
        }
        self.store
            .save_grid(&query::snapshot(&self.layout), false)
            .context("failed to save the replaced grid")?;
        Ok(events)
    }
}
