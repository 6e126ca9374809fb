//! Page-number window for a bounded pagination control.
//!
//! Pages are partitioned into contiguous blocks of `size`; the window is the block
//! containing the current page. Button positions stay fixed while paging inside a
//! block and shift by a whole block when crossing a boundary.

/// Default number of page buttons shown
pub const DEFAULT_WINDOW_SIZE: u32 = 5;

/// Computes the page numbers to display for `current_page` out of `total_pages`
///
/// `current_page` is clamped into `[1, total_pages]` first. Returns an empty window
/// when there are no pages or `size` is zero.
pub fn window(current_page: u32, total_pages: u32, size: u32) -> Vec<u32> {
    if total_pages < 1 || size == 0 {
        return Vec::new();
    }

    let start = block_start(current_page, total_pages, size);
    let end = total_pages.min(start.saturating_add(size - 1));

    (start..=end).collect()
}

/// First page (1-based) of the block containing `current_page`
pub fn block_start(current_page: u32, total_pages: u32, size: u32) -> u32 {
    let size = size.max(1);
    let current = current_page.clamp(1, total_pages.max(1));
    ((current - 1) / size) * size + 1
}
