use ratatui::layout::{Constraint, Direction, Layout, Rect};

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = split_vertical(
        r,
        &[
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ],
    );
    let horizontal = split_horizontal(
        vertical[1],
        &[
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ],
    );
    horizontal[1]
}

pub fn split_vertical(area: Rect, constraints: &[Constraint]) -> Vec<Rect> {
    split(area, Direction::Vertical, constraints)
}

pub fn split_horizontal(area: Rect, constraints: &[Constraint]) -> Vec<Rect> {
    split(area, Direction::Horizontal, constraints)
}

/// Cut `area` into `rows` x `cols` equal cells, row-major.
pub fn grid(area: Rect, rows: u16, cols: u16) -> Vec<Rect> {
    let row_constraints = vec![Constraint::Ratio(1, u32::from(rows.max(1))); usize::from(rows.max(1))];
    let col_constraints = vec![Constraint::Ratio(1, u32::from(cols.max(1))); usize::from(cols.max(1))];
    split_vertical(area, &row_constraints)
        .into_iter()
        .flat_map(|row| split_horizontal(row, &col_constraints))
        .collect()
}

pub fn spinner_frame(tick: usize) -> &'static str {
    SPINNER[tick % SPINNER.len()]
}

fn split(area: Rect, direction: Direction, constraints: &[Constraint]) -> Vec<Rect> {
    Layout::default()
        .direction(direction)
        .constraints(constraints.to_vec())
        .split(area)
        .to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_yields_row_major_cells() {
        let cells = grid(Rect::new(0, 0, 90, 20), 2, 3);
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[0], Rect::new(0, 0, 30, 10));
        assert_eq!(cells[2].x, 60);
        assert_eq!(cells[3].y, 10);
    }

    #[test]
    fn centered_rect_stays_inside() {
        let outer = Rect::new(0, 0, 100, 40);
        let inner = centered_rect(60, 50, outer);
        assert!(inner.x >= outer.x && inner.right() <= outer.right());
        assert!(inner.y >= outer.y && inner.bottom() <= outer.bottom());
    }
}
