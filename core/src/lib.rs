#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the lab layout engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative layout, and pure systems. Adapters submit [`Command`] values
//! describing desired grid mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. The plain data shapes exchanged with the
//! persistence and reservation collaborators ([`GridSnapshot`],
//! [`OccupiedSeat`], [`RoomStatuses`], ...) also live here so that every crate
//! agrees on their wire representation.

use std::{error::Error, fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

/// Number of rows in the default lab grid.
pub const DEFAULT_GRID_ROWS: u32 = 10;
/// Number of columns in the default lab grid, wall column included.
pub const DEFAULT_GRID_COLUMNS: u32 = 24;
/// Column index of the dividing wall in the default lab grid.
pub const DEFAULT_WALL_COLUMN: u32 = 12;

/// Commands that express all permissible layout mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the session clock by the provided delta time.
    Tick {
        /// Duration of time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests placement of a fixture anchored at the provided origin cell.
    ///
    /// Placing [`CellKind::Empty`] is equivalent to [`Command::EraseAt`].
    PlaceFixture {
        /// Kind of fixture to place.
        kind: CellKind,
        /// Upper-left cell that defines the fixture's footprint.
        origin: CellCoord,
    },
    /// Requests removal of whatever occupies the provided cell.
    EraseAt {
        /// Cell targeted by the eraser.
        cell: CellCoord,
    },
    /// Replaces the grid with a freshly constructed empty grid.
    ResetGrid,
    /// Replaces the grid wholesale with an externally sourced snapshot.
    ReplaceGrid {
        /// Raw snapshot, or `None` when the collaborator reported no grid.
        snapshot: Option<GridSnapshot>,
        /// Origin of the snapshot.
        source: SnapshotSource,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the session clock advanced.
    TimeAdvanced {
        /// Duration of time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a fixture was placed into the grid.
    FixturePlaced {
        /// Identifier generated for the new fixture.
        group: GroupId,
        /// Kind of fixture that was placed.
        kind: CellKind,
        /// Region of cells occupied by the fixture.
        region: CellRect,
    },
    /// Reports that a placement request was rejected and the grid is unchanged.
    FixturePlacementRejected {
        /// Kind requested for placement.
        kind: CellKind,
        /// Origin cell provided in the placement request.
        origin: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a fixture (or a single stray cell) was cleared.
    FixtureErased {
        /// Identifier of the removed fixture, absent for ungrouped cells.
        group: Option<GroupId>,
        /// Kind of the removed cells.
        kind: CellKind,
        /// Region of cells returned to [`CellKind::Empty`].
        region: CellRect,
    },
    /// Reports that an erase request was rejected and the grid is unchanged.
    EraseRejected {
        /// Cell targeted by the request.
        cell: CellCoord,
        /// Specific reason the erase failed.
        reason: RemovalError,
    },
    /// Confirms that the grid was reset to its empty state.
    GridCleared,
    /// Reports that an external snapshot was malformed and replaced by an empty grid.
    SnapshotDiscarded {
        /// Origin of the discarded snapshot.
        source: SnapshotSource,
        /// Defect that caused the snapshot to be discarded.
        reason: SnapshotDefect,
    },
    /// Confirms that the grid was replaced by an ingested snapshot.
    GridReplaced {
        /// Origin of the snapshot.
        source: SnapshotSource,
    },
    /// Announces that the canonical grid changed.
    LayoutChanged {
        /// Whether the change came from an edit or from ingesting a snapshot.
        cause: ChangeCause,
    },
}

/// Distinguishes edits made in the session from wholesale grid replacement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChangeCause {
    /// The grid changed because of a user edit.
    Edit,
    /// The grid was replaced by a snapshot loaded from outside the engine.
    Ingest,
}

/// Where an ingested snapshot came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SnapshotSource {
    /// The current grid held by the persistence collaborator.
    Store,
    /// An archived version being restored.
    Version,
    /// A layout transfer string pasted by the operator.
    Transfer,
}

/// Structural defects that cause a snapshot to be discarded wholesale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnapshotDefect {
    /// The snapshot's declared rows or columns differ from the layout's.
    DimensionMismatch,
    /// The snapshot's declared wall column differs from the layout's.
    WallMismatch,
    /// The snapshot carries no grid at all.
    MissingGrid,
    /// The snapshot's grid does not have the declared number of rows or columns.
    RaggedGrid,
}

impl fmt::Display for SnapshotDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::DimensionMismatch => "grid dimensions do not match the layout",
            Self::WallMismatch => "wall column does not match the layout",
            Self::MissingGrid => "snapshot carries no grid",
            Self::RaggedGrid => "grid rows do not match the declared dimensions",
        };
        f.write_str(text)
    }
}

/// Kinds of content a grid cell can hold.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// Free floor space.
    #[default]
    #[serde(rename = "empty")]
    Empty,
    /// A reservable 1×1 computer seat.
    #[serde(rename = "pc")]
    Workstation,
    /// A 2×2 table.
    #[serde(rename = "desk2")]
    Desk2x2,
    /// A long table five cells wide and three cells tall.
    #[serde(rename = "desk3x5")]
    Desk3x5,
    /// A reception counter one cell wide and seven cells tall.
    #[serde(rename = "reception")]
    Reception,
    /// The dividing wall between the two rooms.
    #[serde(rename = "wall")]
    Wall,
}

impl CellKind {
    /// Every placeable fixture kind, in palette order.
    pub const FIXTURES: [CellKind; 4] = [
        CellKind::Workstation,
        CellKind::Desk2x2,
        CellKind::Desk3x5,
        CellKind::Reception,
    ];

    /// Short identifier used on the wire and as the prefix of generated group ids.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Workstation => "pc",
            Self::Desk2x2 => "desk2",
            Self::Desk3x5 => "desk3x5",
            Self::Reception => "reception",
            Self::Wall => "wall",
        }
    }

    /// Reports whether the kind is a reservable seat.
    #[must_use]
    pub const fn is_seat(self) -> bool {
        matches!(self, Self::Workstation)
    }

    /// Reports whether the kind counts as furniture in layout statistics.
    #[must_use]
    pub const fn is_desk(self) -> bool {
        matches!(self, Self::Desk2x2 | Self::Desk3x5 | Self::Reception)
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for CellKind {
    type Err = ParseKindError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "empty" | "erase" => Ok(Self::Empty),
            "pc" | "workstation" => Ok(Self::Workstation),
            "desk2" | "desk2x2" => Ok(Self::Desk2x2),
            "desk3x5" => Ok(Self::Desk3x5),
            "reception" => Ok(Self::Reception),
            "wall" => Ok(Self::Wall),
            other => Err(ParseKindError(other.to_owned())),
        }
    }
}

/// Error returned when a cell kind name is not recognised.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseKindError(String);

impl fmt::Display for ParseKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown cell kind '{}'", self.0)
    }
}

impl Error for ParseKindError {}

/// Identifier shared by every cell of one placed fixture.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    /// Wraps the provided identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrows the textual identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single grid cell together with the metadata of the fixture covering it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Content of the cell.
    #[serde(rename = "type")]
    pub kind: CellKind,
    /// Fixture the cell belongs to, if any.
    #[serde(rename = "stamp", default, skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupId>,
    /// Width of the owning fixture in cells.
    #[serde(rename = "w", default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Height of the owning fixture in cells.
    #[serde(rename = "h", default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Marks the top-left cell of the owning fixture.
    #[serde(default)]
    pub head: bool,
}

impl Cell {
    /// Bare empty floor cell.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Bare wall cell.
    #[must_use]
    pub fn wall() -> Self {
        Self {
            kind: CellKind::Wall,
            ..Self::default()
        }
    }

    /// Cell belonging to a fixture of the provided kind and size.
    #[must_use]
    pub fn fixture(kind: CellKind, group: GroupId, size: CellRectSize, head: bool) -> Self {
        Self {
            kind,
            group: Some(group),
            width: Some(size.width()),
            height: Some(size.height()),
            head,
        }
    }

    /// Reports whether the cell holds free floor space.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kind == CellKind::Empty
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Axis-aligned rectangle expressed in cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    origin: CellCoord,
    size: CellRectSize,
}

impl CellRect {
    /// Constructs a rectangle from an origin cell and size.
    #[must_use]
    pub const fn from_origin_and_size(origin: CellCoord, size: CellRectSize) -> Self {
        Self { origin, size }
    }

    /// Upper-left cell that anchors the rectangle.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Dimensions of the rectangle measured in whole cells.
    #[must_use]
    pub const fn size(&self) -> CellRectSize {
        self.size
    }

    /// Last column covered by the rectangle, inclusive.
    ///
    /// Saturates at the origin column for zero-width rectangles.
    #[must_use]
    pub const fn last_column(&self) -> u32 {
        self.origin
            .column()
            .saturating_add(self.size.width().saturating_sub(1))
    }

    /// Last row covered by the rectangle, inclusive.
    #[must_use]
    pub const fn last_row(&self) -> u32 {
        self.origin
            .row()
            .saturating_add(self.size.height().saturating_sub(1))
    }

    /// Reports whether the inclusive column range of the rectangle contains `column`.
    #[must_use]
    pub const fn spans_column(&self, column: u32) -> bool {
        self.origin.column() <= column && column <= self.last_column()
    }

    /// Reports whether the rectangle covers the provided cell.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        self.spans_column(cell.column())
            && self.origin.row() <= cell.row()
            && cell.row() <= self.last_row()
    }

    /// Iterates over every cell of the rectangle in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let origin = self.origin;
        let size = self.size;
        (0..size.height()).flat_map(move |dy| {
            (0..size.width())
                .map(move |dx| CellCoord::new(origin.column() + dx, origin.row() + dy))
        })
    }
}

/// Size of a [`CellRect`] measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRectSize {
    width: u32,
    height: u32,
}

impl CellRectSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width of the rectangle in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the rectangle in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Number of cells covered by the rectangle.
    #[must_use]
    pub const fn area(&self) -> u32 {
        self.width * self.height
    }
}

/// Fixed dimensions of the shared grid, including the dividing wall column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridDimensions {
    rows: u32,
    columns: u32,
    wall_column: u32,
}

impl GridDimensions {
    /// The 10 × 24 lab grid divided at column 12.
    pub const DEFAULT: GridDimensions =
        GridDimensions::new(DEFAULT_GRID_ROWS, DEFAULT_GRID_COLUMNS, DEFAULT_WALL_COLUMN);

    /// Creates a new dimension descriptor. Use [`GridDimensions::is_valid`] to check it.
    #[must_use]
    pub const fn new(rows: u32, columns: u32, wall_column: u32) -> Self {
        Self {
            rows,
            columns,
            wall_column,
        }
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns in the grid, wall column included.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Column permanently occupied by the dividing wall.
    #[must_use]
    pub const fn wall_column(&self) -> u32 {
        self.wall_column
    }

    /// Reports whether the grid is non-empty and the wall lies inside it.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.rows > 0 && self.columns > 0 && self.wall_column < self.columns
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }
}

impl Default for GridDimensions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Raw grid snapshot exchanged with the persistence collaborator.
///
/// Snapshots are untrusted: the world validates their dimensions and
/// re-derives fixture metadata before treating them as canonical.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    /// Row-major cell matrix, absent when the collaborator stored no grid.
    #[serde(alias = "cells", default)]
    pub grid: Option<Vec<Vec<Cell>>>,
    /// Declared number of rows.
    #[serde(default)]
    pub rows: u32,
    /// Declared number of columns.
    #[serde(default)]
    pub cols: u32,
    /// Declared wall column.
    #[serde(rename = "wallCol", default)]
    pub wall_col: u32,
}

/// Request to persist the current grid through the persistence collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaveRequest {
    /// Asks the collaborator to also archive a timestamped copy.
    pub save_version: bool,
}

/// Archived grid version reported by the persistence collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutVersion {
    /// Opaque identifier of the version.
    pub id: String,
    /// RFC 3339 timestamp at which the version was archived.
    #[serde(rename = "savedAt")]
    pub saved_at: String,
}

/// Identifies one of the two rooms separated by the wall column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RoomKey {
    /// Room to the left of the wall.
    #[serde(rename = "sala1")]
    Sala1,
    /// Room to the right of the wall.
    #[serde(rename = "sala2")]
    Sala2,
}

impl RoomKey {
    /// Both rooms in left-to-right order.
    pub const ALL: [RoomKey; 2] = [RoomKey::Sala1, RoomKey::Sala2];

    /// Stable key used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sala1 => "sala1",
            Self::Sala2 => "sala2",
        }
    }

    /// Display name of the room.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sala1 => "Sala 1",
            Self::Sala2 => "Sala 2",
        }
    }
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomKey {
    type Err = ParseRoomKeyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sala1" | "1" => Ok(Self::Sala1),
            "sala2" | "2" => Ok(Self::Sala2),
            other => Err(ParseRoomKeyError(other.to_owned())),
        }
    }
}

/// Error returned when a room key is not recognised.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseRoomKeyError(String);

impl fmt::Display for ParseRoomKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown room '{}'", self.0)
    }
}

impl Error for ParseRoomKeyError {}

/// Availability of a room as set by the operator.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomStatus {
    /// Whether the whole room is closed to seat reservations.
    pub disabled: bool,
    /// Holder of a whole-room reservation, only meaningful while disabled.
    #[serde(rename = "reservedBy", default)]
    pub reserved_by: Option<String>,
}

impl RoomStatus {
    /// Builds a status, keeping the trimmed holder name only while disabled.
    #[must_use]
    pub fn new(disabled: bool, reserved_by: &str) -> Self {
        let trimmed = reserved_by.trim();
        let reserved_by = if disabled && !trimmed.is_empty() {
            Some(trimmed.to_owned())
        } else {
            None
        };
        Self {
            disabled,
            reserved_by,
        }
    }
}

/// Status of both rooms, keyed the way the room collaborator reports them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomStatuses {
    /// Status of [`RoomKey::Sala1`].
    #[serde(default)]
    pub sala1: RoomStatus,
    /// Status of [`RoomKey::Sala2`].
    #[serde(default)]
    pub sala2: RoomStatus,
}

impl RoomStatuses {
    /// Status of the requested room.
    #[must_use]
    pub fn get(&self, key: RoomKey) -> &RoomStatus {
        match key {
            RoomKey::Sala1 => &self.sala1,
            RoomKey::Sala2 => &self.sala2,
        }
    }

    /// Replaces the status of the requested room.
    pub fn set(&mut self, key: RoomKey, status: RoomStatus) {
        match key {
            RoomKey::Sala1 => self.sala1 = status,
            RoomKey::Sala2 => self.sala2 = status,
        }
    }
}

/// Lifecycle of a seat reservation reported by the reservation collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    /// Requested but not yet validated at the front desk.
    Pending,
    /// Validated; the seat is in use.
    Active,
}

/// A seat reported as taken by the reservation collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OccupiedSeat {
    /// Room that contains the seat.
    pub room_key: RoomKey,
    /// Row of the seat within the room.
    pub seat_row: u32,
    /// Column of the seat within the room.
    pub seat_col: u32,
    /// Reservation lifecycle state.
    pub status: ReservationStatus,
}

impl OccupiedSeat {
    /// Identifier of the reported seat.
    #[must_use]
    pub const fn seat(&self) -> SeatId {
        SeatId::new(self.room_key, CellCoord::new(self.seat_col, self.seat_row))
    }
}

/// One entry of the reservation ledger, from request until release.
///
/// Requests start `Pending`; the front desk validates the access code shown
/// on the holder's voucher, which makes them `Active`. Released reservations
/// leave the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    /// Ledger identifier.
    pub id: String,
    /// Lifecycle state.
    pub status: ReservationStatus,
    /// Access code printed on the voucher, uppercase.
    pub code: String,
    /// Room that contains the seat.
    pub room_key: RoomKey,
    /// Row of the seat within the room.
    pub seat_row: u32,
    /// Column of the seat within the room.
    pub seat_col: u32,
    /// RFC 3339 timestamp of the request.
    pub requested_at: String,
    /// Person holding the reservation.
    pub holder: String,
}

impl Reservation {
    /// Identifier of the reserved seat.
    #[must_use]
    pub const fn seat(&self) -> SeatId {
        SeatId::new(self.room_key, CellCoord::new(self.seat_col, self.seat_row))
    }

    /// The seat as reported to the occupancy merger.
    #[must_use]
    pub const fn occupied(&self) -> OccupiedSeat {
        OccupiedSeat {
            room_key: self.room_key,
            seat_row: self.seat_row,
            seat_col: self.seat_col,
            status: self.status,
        }
    }
}

/// Identifies a seat by room and room-local cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeatId {
    room: RoomKey,
    cell: CellCoord,
}

impl SeatId {
    /// Creates a seat identifier.
    #[must_use]
    pub const fn new(room: RoomKey, cell: CellCoord) -> Self {
        Self { room, cell }
    }

    /// Room that contains the seat.
    #[must_use]
    pub const fn room(&self) -> RoomKey {
        self.room
    }

    /// Room-local cell of the seat.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }
}

impl fmt::Display for SeatId {
    /// Formats the seat the way front-desk staff read it, `F<row>-E<column>`, one-based.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "F{}-E{}",
            self.cell.row().saturating_add(1),
            self.cell.column().saturating_add(1)
        )
    }
}

/// Render-ready state of a single seat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    /// Available for selection.
    Free,
    /// The current global selection.
    Selected,
    /// Reported as reserved or in use.
    Occupied,
}

/// Reservation payload handed to the reservation collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequest {
    /// Room that contains the seat.
    pub room_key: RoomKey,
    /// Row of the seat within the room.
    pub seat_row: u32,
    /// Column of the seat within the room.
    pub seat_col: u32,
}

/// Reasons a fixture placement request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The requested kind has no footprint (walls cannot be placed).
    NoFootprint,
    /// The requested footprint extends beyond the grid bounds.
    OutOfBounds,
    /// The requested footprint contains the wall column.
    CrossesWall,
    /// The requested footprint overlaps a non-empty cell.
    Occupied,
}

/// Reasons an erase request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemovalError {
    /// The targeted cell lies outside the grid.
    OutOfBounds,
    /// The targeted cell belongs to the wall column.
    Wall,
    /// The targeted cell is already empty.
    AlreadyEmpty,
}

/// Persistence and reservation collaborator consumed by adapters.
///
/// Implementations move plain data around; they never validate grid
/// contents. Every snapshot they return must be ingested through
/// [`Command::ReplaceGrid`] before use.
pub trait LayoutStore {
    /// Error reported by the underlying storage.
    type Error: Error + Send + Sync + 'static;

    /// Loads the current grid, or `None` when nothing has been saved yet.
    fn load_grid(&self) -> Result<Option<GridSnapshot>, Self::Error>;

    /// Saves the grid as current, optionally archiving a timestamped version.
    fn save_grid(&mut self, snapshot: &GridSnapshot, save_version: bool)
        -> Result<(), Self::Error>;

    /// Lists archived versions, newest first.
    fn list_versions(&self) -> Result<Vec<LayoutVersion>, Self::Error>;

    /// Loads an archived version, or `None` when the identifier is unknown.
    fn load_version(&self, id: &str) -> Result<Option<GridSnapshot>, Self::Error>;

    /// Reads the status of both rooms.
    fn room_statuses(&self) -> Result<RoomStatuses, Self::Error>;

    /// Updates the status of one room, returning the stored statuses.
    fn set_room_status(
        &mut self,
        key: RoomKey,
        status: RoomStatus,
    ) -> Result<RoomStatuses, Self::Error>;

    /// Lists seats currently reserved or in use, ledger reservations included.
    fn occupied_seats(&self) -> Result<Vec<OccupiedSeat>, Self::Error>;

    /// Loads the reservation ledger in request order.
    fn reservations(&self) -> Result<Vec<Reservation>, Self::Error>;

    /// Replaces the reservation ledger.
    fn save_reservations(&mut self, reservations: &[Reservation]) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::{
        Cell, CellCoord, CellKind, CellRect, CellRectSize, GridDimensions, GridSnapshot, GroupId,
        OccupiedSeat, PlacementError, Reservation, ReservationRequest, ReservationStatus, RoomKey,
        RoomStatus, SeatId,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn seat_id_round_trips_through_bincode() {
        assert_round_trip(&SeatId::new(RoomKey::Sala2, CellCoord::new(4, 1)));
    }

    #[test]
    fn placement_error_round_trips_through_bincode() {
        assert_round_trip(&PlacementError::CrossesWall);
    }

    #[test]
    fn cell_uses_compact_wire_names() {
        let cell = Cell::fixture(
            CellKind::Desk2x2,
            GroupId::new("desk2-3"),
            CellRectSize::new(2, 2),
            true,
        );
        let json = serde_json::to_value(&cell).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({ "type": "desk2", "stamp": "desk2-3", "w": 2, "h": 2, "head": true })
        );

        let bare = serde_json::to_value(Cell::wall()).expect("serialize");
        assert_eq!(bare, serde_json::json!({ "type": "wall", "head": false }));
    }

    #[test]
    fn cell_tolerates_missing_and_null_metadata() {
        let cell: Cell =
            serde_json::from_str(r#"{ "type": "pc", "stamp": "pc-1", "w": null }"#).expect("parse");
        assert_eq!(cell.kind, CellKind::Workstation);
        assert_eq!(cell.group, Some(GroupId::new("pc-1")));
        assert_eq!(cell.width, None);
        assert_eq!(cell.height, None);
        assert!(!cell.head);
    }

    #[test]
    fn snapshot_accepts_cells_alias_and_missing_fields() {
        let snapshot: GridSnapshot =
            serde_json::from_str(r#"{ "cells": [[{ "type": "empty" }]], "rows": 1 }"#)
                .expect("parse");
        assert_eq!(snapshot.rows, 1);
        assert_eq!(snapshot.cols, 0);
        assert_eq!(snapshot.wall_col, 0);
        assert_eq!(snapshot.grid, Some(vec![vec![Cell::empty()]]));

        let missing: GridSnapshot =
            serde_json::from_str(r#"{ "rows": 10, "cols": 24, "wallCol": 12 }"#).expect("parse");
        assert!(missing.grid.is_none());
    }

    #[test]
    fn occupied_seat_parses_backend_shape() {
        let seat: OccupiedSeat = serde_json::from_str(
            r#"{ "room_key": "sala1", "seat_row": 2, "seat_col": 3, "status": "pending" }"#,
        )
        .expect("parse");
        assert_eq!(seat.seat(), SeatId::new(RoomKey::Sala1, CellCoord::new(3, 2)));
    }

    #[test]
    fn reservation_request_uses_camel_case() {
        let request = ReservationRequest {
            room_key: RoomKey::Sala2,
            seat_row: 0,
            seat_col: 5,
        };
        let json = serde_json::to_value(request).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({ "roomKey": "sala2", "seatRow": 0, "seatCol": 5 })
        );
    }

    #[test]
    fn reservation_ledger_entry_parses_voucher_shape() {
        let reservation: Reservation = serde_json::from_str(
            r#"{
                "id": "r-1", "status": "pending", "code": "K7Q2ZX",
                "roomKey": "sala1", "seatRow": 2, "seatCol": 3,
                "requestedAt": "2024-05-02T10:00:00.000Z", "holder": "Ana"
            }"#,
        )
        .expect("parse");
        assert_eq!(reservation.seat(), SeatId::new(RoomKey::Sala1, CellCoord::new(3, 2)));
        assert_eq!(
            reservation.occupied(),
            OccupiedSeat {
                room_key: RoomKey::Sala1,
                seat_row: 2,
                seat_col: 3,
                status: ReservationStatus::Pending,
            }
        );
        assert_round_trip(&reservation);
    }

    #[test]
    fn seat_label_is_one_based() {
        let seat = SeatId::new(RoomKey::Sala1, CellCoord::new(3, 2));
        assert_eq!(seat.to_string(), "F3-E4");
    }

    #[test]
    fn room_status_keeps_holder_only_while_disabled() {
        assert_eq!(
            RoomStatus::new(true, "  Ana Gómez "),
            RoomStatus {
                disabled: true,
                reserved_by: Some("Ana Gómez".to_owned()),
            }
        );
        assert_eq!(RoomStatus::new(true, "   ").reserved_by, None);
        assert_eq!(RoomStatus::new(false, "Ana").reserved_by, None);
    }

    #[test]
    fn rect_spans_inclusive_column_range() {
        let rect =
            CellRect::from_origin_and_size(CellCoord::new(11, 0), CellRectSize::new(2, 2));
        assert!(rect.spans_column(12));
        assert!(!rect.spans_column(13));
        assert_eq!(rect.cells().count(), 4);
        assert!(rect.contains(CellCoord::new(12, 1)));
        assert!(!rect.contains(CellCoord::new(12, 2)));
    }

    #[test]
    fn kind_parses_wire_and_long_names() {
        assert_eq!("pc".parse::<CellKind>(), Ok(CellKind::Workstation));
        assert_eq!("Desk3x5".parse::<CellKind>(), Ok(CellKind::Desk3x5));
        assert_eq!("erase".parse::<CellKind>(), Ok(CellKind::Empty));
        assert!("sofa".parse::<CellKind>().is_err());
    }

    #[test]
    fn default_dimensions_are_valid() {
        assert!(GridDimensions::DEFAULT.is_valid());
        assert!(!GridDimensions::new(10, 12, 12).is_valid());
        assert!(!GridDimensions::new(0, 24, 12).is_valid());
    }
}
