//! Validation and arithmetic for sibling order indices.
//!
//! Blocks within a playlist and entries within a block are ordered by a
//! 1-based index. A reorder request must assign every sibling exactly one
//! position in `1..=N`.

use thiserror::Error;

/// Why a proposed order is not a permutation of the siblings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("id {0} appears more than once")]
    DuplicateId(i64),

    #[error("id {0} does not belong to this container")]
    UnknownId(i64),

    #[error("id {0} is missing from the new order")]
    MissingId(i64),

    #[error("order {order} is outside 1..={len}")]
    OrderOutOfRange { order: i32, len: usize },

    #[error("order {0} is assigned more than once")]
    DuplicateOrder(i32),

    #[error("position {position} is outside 1..={max}")]
    PositionOutOfRange { position: i32, max: usize },
}

/// Check that `proposed` maps the sibling IDs in `current` one-to-one onto
/// `1..=current.len()`.
pub fn validate_permutation(current: &[i64], proposed: &[(i64, i32)]) -> Result<(), OrderError> {
    let len = current.len();
    let mut seen_ids = Vec::with_capacity(proposed.len());
    let mut seen_orders = vec![false; len];

    for &(id, order) in proposed {
        if !current.contains(&id) {
            return Err(OrderError::UnknownId(id));
        }
        if seen_ids.contains(&id) {
            return Err(OrderError::DuplicateId(id));
        }
        seen_ids.push(id);

        let slot = usize::try_from(order)
            .ok()
            .filter(|o| (1..=len).contains(o))
            .ok_or(OrderError::OrderOutOfRange { order, len })?;
        if std::mem::replace(&mut seen_orders[slot - 1], true) {
            return Err(OrderError::DuplicateOrder(order));
        }
    }

    if let Some(missing) = current.iter().find(|id| !seen_ids.contains(id)) {
        return Err(OrderError::MissingId(*missing));
    }

    Ok(())
}

/// Next order index when appending to `count` existing siblings.
pub fn next_order(count: i64) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX - 1) + 1
}

/// Resolve an optional 1-based insertion position against `len` existing
/// siblings. `None` appends. Valid positions are `1..=len + 1`.
pub fn insertion_position(position: Option<i32>, len: usize) -> Result<i32, OrderError> {
    let max = len + 1;
    let Some(position) = position else {
        return Ok(next_order(len as i64));
    };
    match usize::try_from(position) {
        Ok(p) if (1..=max).contains(&p) => Ok(position),
        _ => Err(OrderError::PositionOutOfRange { position, max }),
    }
}

/// Move `id` to 1-based `position` within `ordered`, returning the new
/// sequence. Valid positions are `1..=ordered.len()`.
pub fn reposition(ordered: &[i64], id: i64, position: i32) -> Result<Vec<i64>, OrderError> {
    let from = ordered
        .iter()
        .position(|&x| x == id)
        .ok_or(OrderError::UnknownId(id))?;
    let max = ordered.len();
    let to = match usize::try_from(position) {
        Ok(p) if (1..=max).contains(&p) => p - 1,
        _ => return Err(OrderError::PositionOutOfRange { position, max }),
    };

    let mut out = ordered.to_vec();
    let moved = out.remove(from);
    out.insert(to, moved);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_full_permutation() {
        assert_eq!(validate_permutation(&[10, 20, 30], &[(30, 1), (10, 2), (20, 3)]), Ok(()));
    }

    #[test]
    fn accepts_empty_for_empty() {
        assert_eq!(validate_permutation(&[], &[]), Ok(()));
    }

    #[test]
    fn rejects_unknown_id() {
        assert_eq!(
            validate_permutation(&[10, 20], &[(10, 1), (99, 2)]),
            Err(OrderError::UnknownId(99))
        );
    }

    #[test]
    fn rejects_duplicate_id() {
        assert_eq!(
            validate_permutation(&[10, 20], &[(10, 1), (10, 2)]),
            Err(OrderError::DuplicateId(10))
        );
    }

    #[test]
    fn rejects_missing_id() {
        assert_eq!(
            validate_permutation(&[10, 20, 30], &[(10, 1), (20, 2)]),
            Err(OrderError::MissingId(30))
        );
    }

    #[test]
    fn rejects_out_of_range_order() {
        assert_eq!(
            validate_permutation(&[10, 20], &[(10, 1), (20, 3)]),
            Err(OrderError::OrderOutOfRange { order: 3, len: 2 })
        );
        assert_eq!(
            validate_permutation(&[10], &[(10, 0)]),
            Err(OrderError::OrderOutOfRange { order: 0, len: 1 })
        );
    }

    #[test]
    fn rejects_duplicate_order() {
        assert_eq!(
            validate_permutation(&[10, 20], &[(10, 1), (20, 1)]),
            Err(OrderError::DuplicateOrder(1))
        );
    }

    #[test]
    fn next_order_is_count_plus_one() {
        assert_eq!(next_order(0), 1);
        assert_eq!(next_order(4), 5);
    }

    #[test]
    fn insertion_position_defaults_to_append() {
        assert_eq!(insertion_position(None, 3), Ok(4));
        assert_eq!(insertion_position(Some(1), 3), Ok(1));
        assert_eq!(insertion_position(Some(4), 3), Ok(4));
        assert_eq!(
            insertion_position(Some(5), 3),
            Err(OrderError::PositionOutOfRange { position: 5, max: 4 })
        );
        assert!(insertion_position(Some(0), 0).is_err());
    }

    #[test]
    fn reposition_moves_forward_and_back() {
        assert_eq!(reposition(&[1, 2, 3, 4], 1, 3), Ok(vec![2, 3, 1, 4]));
        assert_eq!(reposition(&[1, 2, 3, 4], 4, 1), Ok(vec![4, 1, 2, 3]));
        assert_eq!(reposition(&[1, 2, 3], 2, 2), Ok(vec![1, 2, 3]));
    }

    #[test]
    fn reposition_rejects_append_slot() {
        assert_eq!(
            reposition(&[1, 2], 1, 3),
            Err(OrderError::PositionOutOfRange { position: 3, max: 2 })
        );
    }
}
