//! Pagination request shared by every list operation.

/// Page selector for list queries.
///
/// `size = None` is the "no limit" sentinel: the whole table is returned and
/// `page` is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageRequest {
    /// Zero-based page index.
    pub page: u32,
    /// Maximum rows per page; `None` means no limit.
    pub size: Option<u32>,
}

impl PageRequest {
    /// Selects every row.
    pub const ALL: Self = Self {
        page: 0,
        size: None,
    };

    /// Creates a bounded page request.
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size: Some(size),
        }
    }

    /// Returns `(limit, offset)` in SQLite terms, where `-1` means no limit.
    pub fn limit_offset(&self) -> (i64, i64) {
        match self.size {
            Some(size) => (i64::from(size), i64::from(self.page) * i64::from(size)),
            None => (-1, 0),
        }
    }
}
