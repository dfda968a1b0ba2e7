//! Pure order computations. Every function takes the current order by
//! reference and returns a fresh `Vec`; callers decide when to commit it.

use std::collections::HashSet;

use thiserror::Error;

use crate::types::{Direction, PageId, PageRecord};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReorderError {
    #[error("index {index} is out of range for {len} pages")]
    IndexOutOfRange { index: usize, len: usize },
}

fn check_index(index: usize, len: usize) -> Result<(), ReorderError> {
    if index >= len {
        return Err(ReorderError::IndexOutOfRange { index, len });
    }
    Ok(())
}

/// Swaps the page at `index` with its neighbour in `direction`.
///
/// Moving the first page up or the last page down returns the order unchanged.
/// Collections with fewer than two pages are returned as-is for any index.
pub fn move_adjacent(
    order: &[PageRecord],
    index: usize,
    direction: Direction,
) -> Result<Vec<PageRecord>, ReorderError> {
    if order.len() < 2 {
        return Ok(order.to_vec());
    }
    check_index(index, order.len())?;

    let target = match direction {
        Direction::Up if index == 0 => return Ok(order.to_vec()),
        Direction::Down if index + 1 == order.len() => return Ok(order.to_vec()),
        Direction::Up => index - 1,
        Direction::Down => index + 1,
    };

    let mut next = order.to_vec();
    next.swap(index, target);
    Ok(next)
}

/// Removes the page at `from` and reinserts it at `to`.
pub fn splice_move(
    order: &[PageRecord],
    from: usize,
    to: usize,
) -> Result<Vec<PageRecord>, ReorderError> {
    if order.len() < 2 {
        return Ok(order.to_vec());
    }
    check_index(from, order.len())?;
    check_index(to, order.len())?;

    let mut next = order.to_vec();
    if from != to {
        let moved = next.remove(from);
        next.insert(to, moved);
    }
    Ok(next)
}

/// Rewrites every position as `index + 1`.
pub fn reindex(order: &[PageRecord]) -> Vec<PageRecord> {
    order
        .iter()
        .enumerate()
        .map(|(index, record)| PageRecord {
            position: index as u32 + 1,
            ..record.clone()
        })
        .collect()
}

/// Builds the order without the given pages, keeping survivors in their
/// relative order, and reindexes it.
pub fn remove_ids(order: &[PageRecord], ids: &HashSet<PageId>) -> Vec<PageRecord> {
    let survivors: Vec<PageRecord> = order
        .iter()
        .filter(|record| !ids.contains(&record.id))
        .cloned()
        .collect();
    reindex(&survivors)
}

/// Appends freshly created pages at the tail, each taking the next position.
pub fn append_records(order: &[PageRecord], created: &[PageRecord]) -> Vec<PageRecord> {
    let mut next = Vec::with_capacity(order.len() + created.len());
    next.extend_from_slice(order);
    next.extend_from_slice(created);
    reindex(&next)
}

pub fn is_contiguous(order: &[PageRecord]) -> bool {
    order
        .iter()
        .enumerate()
        .all(|(index, record)| record.position == index as u32 + 1)
}
