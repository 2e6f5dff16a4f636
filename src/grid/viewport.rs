//! Row windowing for virtual scrolling.
//!
//! The grid renders only the rows whose offsets intersect the viewport,
//! plus an overscan buffer on each side. Geometry is in abstract units
//! (pixels in a GUI, cells in a terminal); row height is fixed.
//!
//! Architecture:
//!   DataTable (immutable storage)
//!       -> DataView (filtered/sorted/projected data)
//!           -> Viewport (visible window)
//!               -> renderer

use tracing::trace;

/// One row of the visible window, with its absolute vertical placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualItem {
    /// Position in the filtered/sorted view (not a stable row index).
    pub index: usize,
    /// Absolute offset of the row's top edge from the content origin.
    pub offset: f64,
    pub size: f64,
}

/// The windowing result: which rows to render and how tall the full
/// content is.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleRange {
    pub items: Vec<VirtualItem>,
    pub total_content_height: f64,
}

impl VisibleRange {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_content_height: 0.0,
        }
    }

    /// View positions covered by this window, as a half-open range.
    pub fn index_range(&self) -> std::ops::Range<usize> {
        match (self.items.first(), self.items.last()) {
            (Some(first), Some(last)) => first.index..last.index + 1,
            _ => 0..0,
        }
    }
}

/// Clamp a scroll offset so the viewport never extends past the content.
/// Must be applied whenever the row count shrinks under the current scroll
/// position (filter change, new result set).
pub fn clamp_scroll(scroll_offset: f64, total_content_height: f64, viewport_height: f64) -> f64 {
    let max_scroll = (total_content_height - viewport_height).max(0.0);
    scroll_offset.clamp(0.0, max_scroll)
}

/// Compute the window of rows intersecting
/// `[scroll_offset, scroll_offset + viewport_height]`, expanded by
/// `overscan` rows on each side and clamped to `[0, total_count)`.
///
/// Degenerate geometry (non-positive row or viewport height) yields an
/// empty window rather than dividing by zero.
pub fn compute_visible_range(
    total_count: usize,
    scroll_offset: f64,
    viewport_height: f64,
    row_height: f64,
    overscan: usize,
) -> VisibleRange {
    if row_height <= 0.0 || viewport_height <= 0.0 || total_count == 0 {
        return VisibleRange {
            items: Vec::new(),
            total_content_height: if row_height > 0.0 {
                total_count as f64 * row_height
            } else {
                0.0
            },
        };
    }

    let total_content_height = total_count as f64 * row_height;
    let scroll = clamp_scroll(scroll_offset, total_content_height, viewport_height);

    let first_visible = (scroll / row_height).floor() as usize;
    // Exclusive end: the first row whose top edge is at or past the bottom.
    let end_visible = ((scroll + viewport_height) / row_height).ceil() as usize;

    let start = first_visible.saturating_sub(overscan);
    let end = end_visible.saturating_add(overscan).min(total_count);

    let items = (start..end)
        .map(|index| VirtualItem {
            index,
            offset: index as f64 * row_height,
            size: row_height,
        })
        .collect();

    trace!(target: "viewport",
           "window {}..{} of {} (scroll {:.1})", start, end, total_count, scroll);

    VisibleRange {
        items,
        total_content_height,
    }
}

/// Scroll state owner for one result view. Wraps the pure windowing
/// functions and keeps the offset clamped across row-count and geometry
/// changes.
#[derive(Debug, Clone)]
pub struct Viewport {
    scroll_offset: f64,
    viewport_height: f64,
    row_height: f64,
    overscan: usize,
}

impl Viewport {
    pub fn new(row_height: f64, overscan: usize) -> Self {
        Self {
            scroll_offset: 0.0,
            viewport_height: 0.0,
            row_height,
            overscan,
        }
    }

    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    pub fn row_height(&self) -> f64 {
        self.row_height
    }

    pub fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    /// The rows actually on screen, with no overscan: what cursor-follow
    /// and page-wise movement reason about.
    pub fn strict_range(&self, total_count: usize) -> std::ops::Range<usize> {
        let range = compute_visible_range(
            total_count,
            self.scroll_offset,
            self.viewport_height,
            self.row_height,
            0,
        );
        range.index_range()
    }

    /// Container resize. Re-clamps scroll against the new geometry.
    pub fn set_viewport_height(&mut self, height: f64, total_count: usize) {
        self.viewport_height = height;
        self.clamp(total_count);
    }

    pub fn scroll_by(&mut self, delta: f64, total_count: usize) {
        self.scroll_offset += delta;
        self.clamp(total_count);
    }

    pub fn scroll_to(&mut self, offset: f64, total_count: usize) {
        self.scroll_offset = offset;
        self.clamp(total_count);
    }

    /// Scroll by whole rows (terminal adapter's unit of motion).
    pub fn scroll_rows(&mut self, rows: i64, total_count: usize) {
        self.scroll_by(rows as f64 * self.row_height, total_count);
    }

    pub fn scroll_page(&mut self, pages: i64, total_count: usize) {
        self.scroll_by(pages as f64 * self.viewport_height, total_count);
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll_offset = 0.0;
    }

    pub fn scroll_to_bottom(&mut self, total_count: usize) {
        self.scroll_offset = f64::MAX;
        self.clamp(total_count);
    }

    /// Called when the view's row count changes (filter/sort/new data):
    /// an out-of-range scroll position is never preserved.
    pub fn on_row_count_changed(&mut self, total_count: usize) {
        self.clamp(total_count);
    }

    pub fn visible_range(&self, total_count: usize) -> VisibleRange {
        compute_visible_range(
            total_count,
            self.scroll_offset,
            self.viewport_height,
            self.row_height,
            self.overscan,
        )
    }

    fn clamp(&mut self, total_count: usize) {
        let total = if self.row_height > 0.0 {
            total_count as f64 * self.row_height
        } else {
            0.0
        };
        self.scroll_offset = clamp_scroll(self.scroll_offset, total, self.viewport_height);
    }
}
