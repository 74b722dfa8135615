//! Footprint catalog for placeable fixtures.

use lab_layout_core::{CellKind, CellRectSize};

/// Reports the footprint size associated with a cell kind.
///
/// Only placeable fixtures have a footprint; `Empty` and `Wall` yield `None`.
#[must_use]
pub fn footprint_for(kind: CellKind) -> Option<CellRectSize> {
    match kind {
        CellKind::Workstation => Some(CellRectSize::new(1, 1)),
        CellKind::Desk2x2 => Some(CellRectSize::new(2, 2)),
        CellKind::Desk3x5 => Some(CellRectSize::new(5, 3)),
        CellKind::Reception => Some(CellRectSize::new(1, 7)),
        CellKind::Empty | CellKind::Wall => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workstation_footprint_is_single_cell() {
        assert_eq!(
            footprint_for(CellKind::Workstation),
            Some(CellRectSize::new(1, 1))
        );
    }

    #[test]
    fn long_desk_is_five_wide_three_tall() {
        let footprint = footprint_for(CellKind::Desk3x5).expect("desk has a footprint");
        assert_eq!(footprint.width(), 5);
        assert_eq!(footprint.height(), 3);
    }

    #[test]
    fn reception_is_one_wide_seven_tall() {
        let footprint = footprint_for(CellKind::Reception).expect("reception has a footprint");
        assert_eq!(footprint.width(), 1);
        assert_eq!(footprint.height(), 7);
    }

    #[test]
    fn empty_and_wall_have_no_footprint() {
        assert_eq!(footprint_for(CellKind::Empty), None);
        assert_eq!(footprint_for(CellKind::Wall), None);
    }
}
