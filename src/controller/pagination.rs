//! Page-count and page-window math.

/// `ceil(count / page_size)`; zero results give zero pages
pub fn total_pages(count: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    let pages = count.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Whether `page` may be selected given the (possibly unknown) total
pub fn is_valid_page(page: u32, total: Option<u32>) -> bool {
    match total {
        _ if page < 1 => false,
        Some(total) => page <= total,
        None => true,
    }
}

/// Up to `width` consecutive page numbers centred on `current`, kept inside
/// `[1, total]` and shifted at the edges so the window stays full.
pub fn page_window(current: u32, total: u32, width: u32) -> Vec<u32> {
    if total == 0 || width == 0 {
        return Vec::new();
    }

    let width = width.min(total);
    let current = current.clamp(1, total);

    let mut start = current.saturating_sub(width / 2).max(1);
    if start + width - 1 > total {
        start = total - width + 1;
    }

    (start..start + width).collect()
}
