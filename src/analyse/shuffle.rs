//! Step order permutations

use crate::error::{invalid, ErrorKind, Result};

/// Reorder `items` into step order.
///
/// Items with an explicit position take it; the rest fill the remaining
/// slots in declaration order. Positions must be unique and smaller than
/// the number of items.
pub fn shuffle<T>(items: Vec<T>, positions: &[Option<usize>], element: &str) -> Result<Vec<T>> {
    let n = items.len();
    let mut slots: Vec<Option<T>> = (0..n).map(|_| None).collect();
    let mut floating = Vec::new();

    for (item, position) in items.into_iter().zip(positions.iter().copied()) {
        match position {
            Some(p) if p >= n => return invalid(ErrorKind::StepPosition, element),
            Some(p) => {
                if slots[p].is_some() {
                    return invalid(ErrorKind::StepPosition, element);
                }
                slots[p] = Some(item);
            }
            None => floating.push(item),
        }
    }

    let mut floating = floating.into_iter();
    let mut out = Vec::with_capacity(n);
    for slot in slots {
        match slot.or_else(|| floating.next()) {
            Some(item) => out.push(item),
            None => return invalid(ErrorKind::StepPosition, element),
        }
    }
    Ok(out)
}
