//! # Page Break Decisions
//!
//! Given the room left in a column and the heights of a block's lines,
//! decide whether the block goes here whole, moves on, or splits, honoring
//! keep-together and the orphan/widow minimums.

/// What to do with a block at the current position.
#[derive(Debug, Clone, PartialEq)]
pub enum BreakDecision {
    /// Everything fits.
    Place,
    /// Start the block on the next page or column.
    MoveToNextPage,
    /// Put this many lines here and the rest on the next page.
    Split { items_on_current_page: usize },
}

/// Decide how `child_heights` (millipoints) go into `remaining_height`.
pub fn decide_break(
    remaining_height: i32,
    child_heights: &[i32],
    is_breakable: bool,
    min_orphan_lines: usize,
    min_widow_lines: usize,
) -> BreakDecision {
    let total: i32 = child_heights.iter().sum();
    if total <= remaining_height {
        return BreakDecision::Place;
    }
    if !is_breakable {
        return BreakDecision::MoveToNextPage;
    }

    let mut running = 0;
    let mut fit_count = 0;
    for &h in child_heights {
        if running + h > remaining_height {
            break;
        }
        running += h;
        fit_count += 1;
    }

    let total_items = child_heights.len();

    // Orphans: too few lines would stay behind.
    if fit_count < min_orphan_lines && fit_count < total_items {
        return BreakDecision::MoveToNextPage;
    }

    // Widows: too few lines would move on. Pull some back.
    let remaining_items = total_items - fit_count;
    if remaining_items < min_widow_lines && remaining_items > 0 {
        let adjusted = fit_count.saturating_sub(min_widow_lines - remaining_items);
        if adjusted == 0 || adjusted < min_orphan_lines {
            return BreakDecision::MoveToNextPage;
        }
        return BreakDecision::Split {
            items_on_current_page: adjusted,
        };
    }

    if fit_count == 0 {
        return BreakDecision::MoveToNextPage;
    }

    BreakDecision::Split {
        items_on_current_page: fit_count,
    }
}
