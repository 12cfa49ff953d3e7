//! Pagination offset arithmetic.

/// The engine's result-window cap; pages beyond it cannot be fetched, so
/// pagination links never point past it even when more documents match.
pub const MAX_PAGEABLE_ITEMS: usize = 10_000;

/// Page offsets derived from `(total, limit, offset)`.
///
/// Absent fields mean "no such link". A `limit` of zero yields no offsets
/// at all (there is nothing to paginate over).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Offsets {
    /// Offset of the first page; present only when not already there.
    pub first: Option<usize>,
    /// Offset of the previous page.
    pub prev: Option<usize>,
    /// Offset of the next page.
    pub next: Option<usize>,
    /// Offset of the final page.
    pub last: usize,
}

impl Offsets {
    /// Computes the offsets, or `None` when `limit` is zero. Negative
    /// inputs are rejected upstream at parameter validation.
    pub fn new(total: usize, limit: usize, offset: usize) -> Option<Self> {
        if limit == 0 {
            return None;
        }

        let first = (offset != 0).then_some(0);

        let prev = offset.checked_sub(limit);

        let next = if offset + limit >= total {
            None
        } else if offset == 0 {
            Some(limit)
        } else {
            Some(offset + limit)
        };

        let last = if offset + limit >= total {
            offset
        } else if total % limit == 0 {
            total - limit
        } else {
            total - total % limit
        };

        Some(Self {
            first,
            prev,
            next,
            last,
        })
    }
}
