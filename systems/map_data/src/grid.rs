//! Run-length codec for the generator's walkability rows.
//!
//! Each row is a sequence of run lengths with alternating walkability. The
//! first run is consumed without being written, which leaves it blocked, and
//! every later run is written with the flag toggled after the previous run.
//! Whatever remains of the row after the last run takes the final flag.

use waypoint_core::{CollisionGrid, Position};

/// Decodes run-length encoded rows into a dense collision grid.
///
/// The grid always spans `width * height` cells. Rows beyond the recorded
/// ones stay blocked, and writes falling outside the row are clipped.
#[must_use]
pub fn decode_grid(origin: Position, width: u32, height: u32, rows: &[Vec<i32>]) -> CollisionGrid {
    let row_len = width as usize;
    let mut cells = vec![false; row_len.saturating_mul(height as usize)];

    for (row_runs, row) in rows.iter().zip(cells.chunks_mut(row_len.max(1))) {
        decode_row(row_runs, row);
    }

    CollisionGrid::from_cells(origin, width, height, cells)
}

fn decode_row(runs: &[i32], row: &mut [bool]) {
    let width = row.len() as i64;
    let mut walkable = false;
    let mut cursor: i64 = 0;

    for (index, &run) in runs.iter().enumerate() {
        let run = i64::from(run);
        if index != 0 {
            fill(row, cursor, cursor.saturating_add(run), walkable);
        }
        walkable = !walkable;
        cursor = cursor.saturating_add(run);
    }

    fill(row, cursor, width, walkable);
}

fn fill(row: &mut [bool], start: i64, end: i64, value: bool) {
    let len = row.len() as i64;
    let start = start.clamp(0, len);
    let end = end.clamp(0, len);
    if start < end {
        row[start as usize..end as usize].fill(value);
    }
}

/// Encodes a row of walkability flags into the generator's run format.
///
/// The first run counts the leading blocked cells and may be zero. Runs then
/// alternate between walkable and blocked, and the trailing run is always
/// emitted so the decoder never has to fill a remainder.
#[must_use]
pub fn encode_row(row: &[bool]) -> Vec<i32> {
    let mut runs = Vec::new();
    let mut current = false;
    let mut length: i32 = 0;

    for &cell in row {
        if cell == current {
            length += 1;
        } else {
            runs.push(length);
            current = cell;
            length = 1;
        }
    }
    runs.push(length);

    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_single(width: u32, runs: Vec<i32>) -> Vec<bool> {
        let grid = decode_grid(Position::default(), width, 1, &[runs]);
        grid.row(0).expect("row exists").to_vec()
    }

    #[test]
    fn first_run_is_never_written() {
        // runs: 2 blocked (skipped), 3 walkable, 1 blocked, 2 walkable; rest blocked
        let row = decode_single(10, vec![2, 3, 1, 2]);
        assert_eq!(
            row,
            vec![false, false, true, true, true, false, true, true, false, false]
        );
    }

    #[test]
    fn remainder_takes_final_toggled_flag() {
        let row = decode_single(6, vec![1, 2]);
        assert_eq!(row, vec![false, true, true, false, false, false]);

        let row = decode_single(5, vec![2]);
        assert_eq!(row, vec![false, false, true, true, true]);
    }

    #[test]
    fn unrecorded_rows_stay_blocked() {
        let grid = decode_grid(Position::default(), 3, 3, &[vec![0, 3]]);
        assert_eq!(grid.row(0), Some(&[true, true, true][..]));
        assert_eq!(grid.row(1), Some(&[false, false, false][..]));
        assert_eq!(grid.row(2), Some(&[false, false, false][..]));
    }

    #[test]
    fn over_long_runs_are_clipped() {
        let row = decode_single(4, vec![1, 10, 3]);
        assert_eq!(row, vec![false, true, true, true]);
    }

    #[test]
    fn rows_beyond_height_are_ignored() {
        let grid = decode_grid(Position::default(), 2, 1, &[vec![0, 2], vec![0, 2]]);
        assert_eq!(grid.dimensions(), (2, 1));
        assert_eq!(grid.row(0), Some(&[true, true][..]));
    }

    #[test]
    fn encoding_then_decoding_reproduces_row() {
        let row = vec![
            false, true, true, false, false, false, true, false, true, true,
        ];
        let runs = encode_row(&row);
        assert_eq!(runs, vec![1, 2, 3, 1, 1, 2]);
        assert_eq!(decode_single(row.len() as u32, runs), row);
    }

    #[test]
    fn encoding_row_starting_walkable_emits_empty_first_run() {
        let row = vec![true, true, false, true];
        let runs = encode_row(&row);
        assert_eq!(runs, vec![0, 2, 1, 1]);
        assert_eq!(decode_single(4, runs), row);
    }

    #[test]
    fn decoding_is_deterministic() {
        let rows = vec![vec![3, 4, 2, 1], vec![0, 5, 5], vec![10]];
        let first = decode_grid(Position::new(5, 5), 10, 4, &rows);
        let second = decode_grid(Position::new(5, 5), 10, 4, &rows);
        assert_eq!(first, second);
    }
}
