#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for editing lab layouts and inspecting room availability.

mod config;
mod front_desk;
mod layout_transfer;
mod render;
mod session;
mod store;

use std::{
    io::{self, Read as _},
    path::PathBuf,
};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use lab_layout_core::{
    CellCoord, CellKind, Command, Event, LayoutStore, RoomKey, RoomStatus, SeatId,
};
use lab_layout_system_editor::{Editor, PointerInput};
use lab_layout_system_seating::{merge, summarize, ReservationLedger, Seating};
use lab_layout_world::{query, Layout, RoomLayout};
use tracing::{debug, info, Level as TraceLevel};
use tracing_subscriber::FmtSubscriber;

use config::Config;
use session::Session;
use store::FileStore;

#[derive(Parser)]
#[command(name = "lab-layout")]
#[command(about = "Edit two-room lab layouts and inspect seat availability")]
struct Cli {
    /// Configuration file (defaults to ./lab-layout.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Store directory, overriding the configured one
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty layout in the store
    Init {
        /// Overwrite an existing layout
        #[arg(long)]
        force: bool,
    },
    /// Print the current grid
    Show,
    /// Place a fixture with its top-left cell at COLUMN, ROW
    Place {
        /// pc, desk2, desk3x5, reception or empty
        kind: CellKind,
        column: u32,
        row: u32,
    },
    /// Erase the fixture covering COLUMN, ROW
    Erase { column: u32, row: u32 },
    /// Drag a tool across cells given as COLUMN,ROW
    Paint {
        /// pc, desk2, desk3x5, reception or empty
        kind: CellKind,
        #[arg(required = true, value_parser = parse_cell)]
        cells: Vec<CellCoord>,
    },
    /// Remove every fixture
    Reset,
    /// Save the grid and archive it as a new version
    Save,
    /// List archived versions, newest first
    Versions,
    /// Make an archived version the current grid
    Restore { id: String },
    /// Print the grid as a single-line transfer string
    Export,
    /// Replace the grid with a transfer string ("-" reads stdin)
    Import { value: String },
    /// Show both rooms with seat availability
    Rooms {
        /// Toggle the selection of a seat given as ROOM:ROW:COL (repeatable)
        #[arg(long, value_parser = parse_seat)]
        select: Vec<SeatId>,
        /// Print the reservation request for the selected seat
        #[arg(long)]
        request: bool,
    },
    /// Request a reservation for the seat given as ROOM:ROW:COL
    Reserve {
        #[arg(value_parser = parse_seat)]
        seat: SeatId,
        /// Name printed on the voucher
        #[arg(long)]
        holder: String,
    },
    /// List reservation requests
    Requests {
        /// Only show requests waiting for validation
        #[arg(long)]
        pending: bool,
    },
    /// Activate a pending reservation with the code from its voucher
    Validate { id: String, code: String },
    /// Free the seat held by an active reservation
    Release { id: String },
    /// Block or release a whole room
    RoomStatus {
        room: RoomKey,
        /// Mark the room as unavailable
        #[arg(long)]
        disabled: bool,
        /// Who holds the room while it is disabled
        #[arg(long)]
        reserved_by: Option<String>,
    },
}

fn parse_cell(value: &str) -> Result<CellCoord, String> {
    let (column, row) = value
        .split_once(',')
        .ok_or_else(|| format!("expected COLUMN,ROW but got '{value}'"))?;
    let column = column
        .trim()
        .parse()
        .map_err(|_| format!("invalid column in '{value}'"))?;
    let row = row
        .trim()
        .parse()
        .map_err(|_| format!("invalid row in '{value}'"))?;
    Ok(CellCoord::new(column, row))
}

fn parse_seat(value: &str) -> Result<SeatId, String> {
    let mut parts = value.splitn(3, ':');
    let (Some(room), Some(row), Some(column)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!("expected ROOM:ROW:COL but got '{value}'"));
    };
    let room = room.parse::<RoomKey>().map_err(|error| error.to_string())?;
    let row = row
        .parse()
        .map_err(|_| format!("invalid row in '{value}'"))?;
    let column = column
        .parse()
        .map_err(|_| format!("invalid column in '{value}'"))?;
    Ok(SeatId::new(room, CellCoord::new(column, row)))
}

fn init_tracing(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => match std::env::var("LOG_LEVEL")
            .unwrap_or_else(|_| "info".to_string())
            .to_lowercase()
            .as_str()
        {
            "trace" => TraceLevel::TRACE,
            "debug" => TraceLevel::DEBUG,
            "warn" => TraceLevel::WARN,
            "error" => TraceLevel::ERROR,
            _ => TraceLevel::INFO,
        },
        1 => TraceLevel::DEBUG,
        _ => TraceLevel::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")
}

/// Entry point for the lab layout command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let directory = cli.store.unwrap_or_else(|| config.store.directory.clone());
    let store = FileStore::open(&directory)
        .with_context(|| format!("failed to open store at {}", directory.display()))?;
    debug!(store = %store.root().display(), "opened layout store");

    if let Commands::Init { force } = cli.command {
        return init(store, &config, force);
    }

    let mut session = Session::open(store, config.dimensions(), config.quiet_period())?;
    match cli.command {
        Commands::Init { .. } => {}
        Commands::Show => print_grid(session.layout()),
        Commands::Place { kind, column, row } => {
            let events = session.execute(Command::PlaceFixture {
                kind,
                origin: CellCoord::new(column, row),
            })?;
            report_single(&events)?;
        }
        Commands::Erase { column, row } => {
            let events = session.execute(Command::EraseAt {
                cell: CellCoord::new(column, row),
            })?;
            report_single(&events)?;
        }
        Commands::Paint { kind, cells } => paint(&mut session, kind, &cells)?,
        Commands::Reset => report(&session.execute(Command::ResetGrid)?),
        Commands::Save => {
            session.save_version()?;
            let versions = session.store().list_versions()?;
            if let Some(latest) = versions.first() {
                println!("saved version {}", latest.id);
            }
        }
        Commands::Versions => print!("{}", render::versions(&session.store().list_versions()?)),
        Commands::Restore { id } => {
            report(&session.restore(&id)?);
            println!("restored version {id}");
            print_grid(session.layout());
        }
        Commands::Export => {
            println!(
                "{}",
                layout_transfer::encode(&query::snapshot(session.layout()))?
            );
        }
        Commands::Import { value } => {
            let value = if value == "-" {
                let mut buffer = String::new();
                let _ = io::stdin()
                    .read_to_string(&mut buffer)
                    .context("failed to read transfer string from stdin")?;
                buffer
            } else {
                value
            };
            let snapshot = layout_transfer::decode(&value)?;
            report(&session.import(snapshot)?);
            print_grid(session.layout());
        }
        Commands::Rooms { select, request } => rooms(&session, &select, request)?,
        Commands::Reserve { seat, holder } => reserve(&mut session, seat, &holder)?,
        Commands::Requests { pending } => {
            let ledger = ReservationLedger::new(session.store().reservations()?);
            if pending {
                print!("{}", render::reservations(ledger.pending()));
            } else {
                print!("{}", render::reservations(ledger.entries()));
            }
        }
        Commands::Validate { id, code } => {
            let mut ledger = ReservationLedger::new(session.store().reservations()?);
            let reservation = ledger.validate(&id, &code)?.clone();
            session.store_mut().save_reservations(ledger.entries())?;
            info!(%id, seat = %reservation.seat(), "validated reservation");
            println!(
                "reserva {id} validada: {} puede ingresar al PC {} de {}",
                reservation.holder,
                reservation.seat(),
                reservation.room_key.name()
            );
        }
        Commands::Release { id } => {
            let mut ledger = ReservationLedger::new(session.store().reservations()?);
            let released = ledger.release(&id)?;
            session.store_mut().save_reservations(ledger.entries())?;
            info!(%id, seat = %released.seat(), "released reservation");
            println!("PC {} de {} liberado", released.seat(), released.room_key.name());
        }
        Commands::RoomStatus {
            room,
            disabled,
            reserved_by,
        } => {
            let status = RoomStatus::new(disabled, reserved_by.as_deref().unwrap_or_default());
            let statuses = session.store_mut().set_room_status(room, status)?;
            info!(%room, disabled, "updated room status");
            println!("{}", serde_json::to_string_pretty(&statuses)?);
        }
    }

    if session.settle()? {
        debug!("pending edits saved");
    }
    Ok(())
}

fn init(mut store: FileStore, config: &Config, force: bool) -> Result<()> {
    if !force && store.load_grid()?.is_some() {
        bail!(
            "a layout already exists in {}; pass --force to replace it",
            store.root().display()
        );
    }
    let layout = Layout::with_dimensions(config.dimensions())?;
    store.save_grid(&query::snapshot(&layout), false)?;
    let dimensions = config.dimensions();
    println!(
        "initialized empty {}x{} layout in {}",
        dimensions.rows(),
        dimensions.columns(),
        store.root().display()
    );
    Ok(())
}

fn paint(session: &mut Session<FileStore>, kind: CellKind, cells: &[CellCoord]) -> Result<()> {
    let mut editor = Editor::new();
    editor.set_tool(kind);

    let mut inputs = Vec::with_capacity(cells.len() + 1);
    let mut path = cells.iter().copied();
    if let Some(first) = path.next() {
        inputs.push(PointerInput::Down(first));
    }
    inputs.extend(path.map(PointerInput::Enter));
    inputs.push(PointerInput::Up);

    for input in inputs {
        let mut commands = Vec::new();
        editor.handle(input, &mut commands);
        for command in commands {
            report(&session.execute(command)?);
        }
    }
    Ok(())
}

fn is_seat(rooms: &[RoomLayout], seat: SeatId) -> bool {
    rooms
        .iter()
        .find(|room| room.key() == seat.room())
        .and_then(|room| room.cell(seat.cell()))
        .is_some_and(|cell| cell.kind.is_seat())
}

fn rooms(session: &Session<FileStore>, select: &[SeatId], request: bool) -> Result<()> {
    let statuses = session.store().room_statuses()?;
    let occupied = session.store().occupied_seats()?;
    let rooms = query::rooms(session.layout());

    let mut seating = Seating::new();
    for seat in select {
        let _ = seating
            .select(*seat, |seat| is_seat(&rooms, seat), &occupied, &statuses)
            .with_context(|| format!("cannot select {seat} in {}", seat.room().name()))?;
    }

    for room in &rooms {
        let seats: Vec<CellCoord> = room.seats().collect();
        let map = merge(room.key(), &seats, &occupied, seating.selection());
        let summary = summarize(room.key(), &seats, &occupied, seating.selection());
        print!(
            "{}",
            render::room(room, &map, statuses.get(room.key()), summary)
        );
    }

    if request {
        let payload = seating.reservation_request()?;
        println!("{}", serde_json::to_string(&payload)?);
    }
    Ok(())
}

fn reserve(session: &mut Session<FileStore>, seat: SeatId, holder: &str) -> Result<()> {
    let statuses = session.store().room_statuses()?;
    let occupied = session.store().occupied_seats()?;
    let rooms = query::rooms(session.layout());

    let mut seating = Seating::new();
    let _ = seating
        .select(seat, |seat| is_seat(&rooms, seat), &occupied, &statuses)
        .with_context(|| format!("cannot reserve {seat} in {}", seat.room().name()))?;
    let request = seating.reservation_request()?;

    let mut ledger = ReservationLedger::new(session.store().reservations()?);
    let ticket = front_desk::issue_ticket(&ledger, Utc::now(), &mut rand::thread_rng());
    let reservation = ledger.submit(request, holder, ticket)?.clone();
    session.store_mut().save_reservations(ledger.entries())?;
    info!(id = %reservation.id, %seat, "requested reservation");
    print!("{}", render::voucher(&reservation));
    Ok(())
}

fn print_grid(layout: &Layout) {
    print!("{}", render::grid(query::grid(layout)));
    println!("{}", render::fixture_counts(query::fixture_counts(layout)));
}

fn report(events: &[Event]) {
    for event in events {
        if let Some(line) = render::event(event) {
            println!("{line}");
        }
    }
}

/// Reports the outcome of a single edit, failing when the world rejected it.
fn report_single(events: &[Event]) -> Result<()> {
    report(events);
    if let Some(rejection) = events.iter().find(|event| {
        matches!(
            event,
            Event::FixturePlacementRejected { .. } | Event::EraseRejected { .. }
        )
    }) {
        bail!("{}", render::event(rejection).unwrap_or_default());
    }
    Ok(())
}
