use serde::Serialize;

/// Messages shown per page on the board.
pub const PER_PAGE: u32 = 5;

/// Page number from a raw `?page=` value. Missing, unparsable and
/// non-positive values all mean the first page.
pub fn requested_page(raw: Option<&str>) -> u32 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .map(|p| p.clamp(1, u32::MAX as i64) as u32)
        .unwrap_or(1)
}

/// Navigation state for one page of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub total_pages: u64,
    pub has_prev: bool,
    pub has_next: bool,
}

impl Pagination {
    pub fn new(page: u32, per_page: u32, total: u64) -> Self {
        let per_page = u64::from(per_page.max(1));
        let total_pages = total.div_ceil(per_page);

        Self {
            page,
            total_pages,
            has_prev: page > 1,
            has_next: u64::from(page) < total_pages,
        }
    }
}
