#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure editor system translating pointer gestures into fixture commands.

use lab_layout_core::{CellCoord, CellKind, Command};

/// Tools offered by the editor palette, in display order.
pub const PALETTE: [CellKind; 5] = [
    CellKind::Workstation,
    CellKind::Desk2x2,
    CellKind::Desk3x5,
    CellKind::Reception,
    CellKind::Empty,
];

/// Pointer gesture reported by an adapter for a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerInput {
    /// Primary button pressed over the cell.
    Down(CellCoord),
    /// Pointer moved onto the cell.
    Enter(CellCoord),
    /// Primary button released.
    Up,
    /// Pointer left the grid.
    Leave,
}

/// Drag-paint editor that applies the selected tool to each visited cell.
#[derive(Clone, Debug)]
pub struct Editor {
    tool: CellKind,
    dragging: bool,
    last_cell: Option<CellCoord>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    /// Creates an idle editor with the workstation tool selected.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tool: CellKind::Workstation,
            dragging: false,
            last_cell: None,
        }
    }

    /// Currently selected tool. `CellKind::Empty` is the eraser.
    #[must_use]
    pub const fn tool(&self) -> CellKind {
        self.tool
    }

    /// Selects a new tool. The wall is not a paintable tool and is ignored.
    pub fn set_tool(&mut self, tool: CellKind) {
        if tool != CellKind::Wall {
            self.tool = tool;
        }
    }

    /// Reports whether a drag gesture is in progress.
    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Consumes a pointer gesture and emits the resulting placement commands.
    pub fn handle(&mut self, input: PointerInput, out: &mut Vec<Command>) {
        match input {
            PointerInput::Down(cell) => {
                self.dragging = true;
                self.paint(cell, out);
            }
            PointerInput::Enter(cell) => {
                if self.dragging && self.last_cell != Some(cell) {
                    self.paint(cell, out);
                }
            }
            PointerInput::Up | PointerInput::Leave => {
                self.dragging = false;
                self.last_cell = None;
            }
        }
    }

    fn paint(&mut self, cell: CellCoord, out: &mut Vec<Command>) {
        self.last_cell = Some(cell);
        out.push(Command::PlaceFixture {
            kind: self.tool,
            origin: cell,
        });
    }
}
