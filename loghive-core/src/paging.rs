/// Resolved window over a list of `total` items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Selected page, 1-based. 0 only when there is nothing to show.
    pub page: usize,
    /// Last valid page number for this total and page size.
    pub max_page: usize,
    pub per_page: usize,
}

impl Page {
    /// Index range of this page within the list, clamped to `total`.
    pub fn bounds(&self, total: usize) -> (usize, usize) {
        if self.page == 0 {
            return (0, 0);
        }
        let start = (self.page - 1) * self.per_page;
        (start.min(total), (start + self.per_page).min(total))
    }
}

/// Resolves raw `epp` / `p` query strings into a valid window. Malformed
/// input never fails: an absent, non-numeric, non-positive or
/// larger-than-total page size falls back to `default_per_page`, and an
/// out-of-range page number falls back to the first page.
pub fn paginate(
    total: usize,
    per_page: Option<&str>,
    page: Option<&str>,
    default_per_page: usize,
) -> Page {
    let per_page = per_page
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .filter(|&n| n > 0 && n <= total)
        .unwrap_or_else(|| default_per_page.max(1));

    let max_page = total.div_ceil(per_page);

    let page = if total == 0 {
        0
    } else {
        page.and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|&n| n >= 1 && n <= max_page)
            .unwrap_or(1)
    };

    Page {
        page,
        max_page,
        per_page,
    }
}
