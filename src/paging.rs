//! Paging window over root rows, and the `(items, count)` result shape.

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Paging {
    pub offset: i64,
    pub limit: i64,
}

impl Paging {
    /// Offsets below 1 become 0; limits below 1 become `max_limit`; limits are capped at `max_limit`.
    pub fn new(offset: Option<i64>, limit: Option<i64>, max_limit: i64) -> Self {
        let max_limit = max_limit.max(1);
        Paging {
            offset: offset.filter(|o| *o > 0).unwrap_or(0),
            limit: limit.filter(|l| *l > 0).map(|l| l.min(max_limit)).unwrap_or(max_limit),
        }
    }
}

/// One page of root items plus the total number of matching roots (independent of the window).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub count: i64,
}

impl<T> Paged<T> {
    pub fn new(items: Vec<T>, count: i64) -> Self {
        Paged { items, count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_max_limit() {
        assert_eq!(Paging::new(None, None, 50), Paging { offset: 0, limit: 50 });
    }

    #[test]
    fn clamps_limit_and_ignores_non_positive_values() {
        assert_eq!(Paging::new(Some(-4), Some(500), 50), Paging { offset: 0, limit: 50 });
        assert_eq!(Paging::new(Some(10), Some(0), 50), Paging { offset: 10, limit: 50 });
        assert_eq!(Paging::new(Some(3), Some(7), 50), Paging { offset: 3, limit: 7 });
    }
}
