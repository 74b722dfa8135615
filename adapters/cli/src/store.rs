use std::{
    fs, io,
    path::{Path, PathBuf},
};

use chrono::{SecondsFormat, Utc};
use lab_layout_core::{
    GridSnapshot, LayoutStore, LayoutVersion, OccupiedSeat, Reservation, RoomKey, RoomStatus,
    RoomStatuses,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

const GRID_FILE: &str = "grid.json";
const ROOMS_FILE: &str = "rooms.json";
const OCCUPIED_FILE: &str = "occupied.json";
const RESERVATIONS_FILE: &str = "reservations.json";
const VERSIONS_DIR: &str = "versions";

/// Failures raised by [`FileStore`].
#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("failed to access {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode {}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("version id '{0}' is not valid")]
    InvalidVersionId(String),
}

/// Archived version as written to `versions/<id>.json`.
#[derive(Debug, Serialize, Deserialize)]
struct StoredVersion {
    #[serde(flatten)]
    version: LayoutVersion,
    #[serde(flatten)]
    snapshot: GridSnapshot,
}

/// Directory-backed [`LayoutStore`].
#[derive(Clone, Debug)]
pub(crate) struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Opens the store rooted at `root`, creating the directory tree when absent.
    pub(crate) fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        let versions = root.join(VERSIONS_DIR);
        fs::create_dir_all(&versions).map_err(|source| StoreError::Io {
            path: versions,
            source,
        })?;
        Ok(Self { root })
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    fn read<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>, StoreError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StoreError::Json {
                path: path.to_path_buf(),
                source,
            })
    }

    fn write<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn version_path(&self, id: &str) -> Result<PathBuf, StoreError> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidVersionId(id.to_owned()));
        }
        Ok(self.root.join(VERSIONS_DIR).join(format!("{id}.json")))
    }

    fn archive(&self, snapshot: &GridSnapshot) -> Result<LayoutVersion, StoreError> {
        let now = Utc::now();
        let stem = now.format("%Y%m%dT%H%M%S%3fZ").to_string();
        let mut id = stem.clone();
        let mut suffix = 1;
        while self.version_path(&id)?.exists() {
            suffix += 1;
            id = format!("{stem}-{suffix}");
        }

        let version = LayoutVersion {
            id,
            saved_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        let path = self.version_path(&version.id)?;
        self.write(
            &path,
            &StoredVersion {
                version: version.clone(),
                snapshot: snapshot.clone(),
            },
        )?;
        info!(id = %version.id, "archived layout version");
        Ok(version)
    }
}

impl LayoutStore for FileStore {
    type Error = StoreError;

    fn load_grid(&self) -> Result<Option<GridSnapshot>, Self::Error> {
        self.read(&self.root.join(GRID_FILE))
    }

    fn save_grid(
        &mut self,
        snapshot: &GridSnapshot,
        save_version: bool,
    ) -> Result<(), Self::Error> {
        self.write(&self.root.join(GRID_FILE), snapshot)?;
        debug!(save_version, "saved current grid");
        if save_version {
            let _ = self.archive(snapshot)?;
        }
        Ok(())
    }

    fn list_versions(&self) -> Result<Vec<LayoutVersion>, Self::Error> {
        let dir = self.root.join(VERSIONS_DIR);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::Io { path: dir, source }),
        };

        let mut versions = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|source| StoreError::Io {
                    path: dir.clone(),
                    source,
                })?
                .path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stored) = self.read::<StoredVersion>(&path)? {
                versions.push(stored.version);
            }
        }
        versions.sort_by(|a, b| b.saved_at.cmp(&a.saved_at).then_with(|| b.id.cmp(&a.id)));
        Ok(versions)
    }

    fn load_version(&self, id: &str) -> Result<Option<GridSnapshot>, Self::Error> {
        let path = self.version_path(id)?;
        Ok(self
            .read::<StoredVersion>(&path)?
            .map(|stored| stored.snapshot))
    }

    fn room_statuses(&self) -> Result<RoomStatuses, Self::Error> {
        Ok(self.read(&self.root.join(ROOMS_FILE))?.unwrap_or_default())
    }

    fn set_room_status(
        &mut self,
        key: RoomKey,
        status: RoomStatus,
    ) -> Result<RoomStatuses, Self::Error> {
        let mut statuses = self.room_statuses()?;
        statuses.set(key, status);
        self.write(&self.root.join(ROOMS_FILE), &statuses)?;
        Ok(statuses)
    }

    fn occupied_seats(&self) -> Result<Vec<OccupiedSeat>, Self::Error> {
        let mut seats: Vec<OccupiedSeat> = self
            .read(&self.root.join(OCCUPIED_FILE))?
            .unwrap_or_default();
        for reservation in self.reservations()? {
            let seat = reservation.occupied();
            if !seats.iter().any(|known| known.seat() == seat.seat()) {
                seats.push(seat);
            }
        }
        Ok(seats)
    }

    fn reservations(&self) -> Result<Vec<Reservation>, Self::Error> {
        Ok(self
            .read(&self.root.join(RESERVATIONS_FILE))?
            .unwrap_or_default())
    }

    fn save_reservations(&mut self, reservations: &[Reservation]) -> Result<(), Self::Error> {
        self.write(&self.root.join(RESERVATIONS_FILE), &reservations)?;
        debug!(count = reservations.len(), "saved reservation ledger");
        Ok(())
    }
}
