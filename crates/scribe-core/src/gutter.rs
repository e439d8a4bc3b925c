//! Line-number gutter.
//!
//! The gutter is a fixed-width panel on the left of a surface showing the
//! 1-based number of every visible line, with the caret's line emphasized.
//! Nothing about what it draws is cached: `paint` walks the surface's
//! visible blocks each time, so the gutter cannot drift out of sync with
//! the text. The only state kept between calls is the current width, the
//! panel geometry, and which line was last emphasized (to know which rows
//! to refresh when the caret moves).

use crate::config::GutterConfig;
use crate::geometry::{Color, Rect};
use crate::surface::{LineHighlight, SurfaceEvent, TextSurface};

/// What the host must do to the gutter panel after a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GutterUpdate {
    /// Shift the already painted pixels vertically by `dy`.
    Scroll { dy: i32 },
    /// Repaint this region (gutter coordinates).
    Repaint(Rect),
    /// The panel width changed; the surface margin has been updated.
    WidthChanged(i32),
    /// The panel was placed at a new rectangle (surface coordinates).
    Moved(Rect),
}

/// One right-aligned line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineNumberLabel {
    /// 1-based line number
    pub number: usize,
    /// Box the number is right-aligned and vertically centred in
    pub rect: Rect,
    pub color: Color,
    pub emphasized: bool,
}

/// Output of one gutter paint pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GutterPaint {
    /// Area to fill with `background` before drawing labels
    pub fill: Rect,
    pub background: Color,
    pub labels: Vec<LineNumberLabel>,
}

/// Result of a caret move.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CaretUpdate {
    /// Gutter rows whose emphasis changed
    pub repaint: Vec<Rect>,
    /// Highlight installed on the surface, if any
    pub highlight: Option<LineHighlight>,
}

/// Number of decimal digits in the largest line number.
pub fn digit_count(line_count: usize) -> u32 {
    line_count.max(1).ilog10() + 1
}

/// Keeps one surface's gutter sized, placed and painted.
#[derive(Debug, Clone)]
pub struct GutterController {
    config: GutterConfig,
    width: i32,
    geometry: Rect,
    emphasized: Option<usize>,
}

impl GutterController {
    pub fn new(config: GutterConfig) -> Self {
        let width = config.padding + config.digit_width;
        Self {
            config,
            width,
            geometry: Rect::default(),
            emphasized: None,
        }
    }

    /// Binds the gutter to a freshly created surface: reserves the margin,
    /// places the panel and highlights the caret line.
    pub fn attach<S: TextSurface + ?Sized>(&mut self, surface: &mut S) -> Vec<GutterUpdate> {
        self.width = self.compute_gutter_width(surface.block_count());
        surface.set_viewport_margins(self.width);

        let mut updates = vec![self.on_resize(surface)];
        let caret = self.on_caret_moved(surface);
        updates.extend(caret.repaint.into_iter().map(GutterUpdate::Repaint));
        updates
    }

    pub fn config(&self) -> &GutterConfig {
        &self.config
    }

    /// Current panel width in pixels.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Current panel rectangle in surface coordinates.
    pub fn geometry(&self) -> Rect {
        self.geometry
    }

    /// Line whose number was last drawn emphasized.
    pub fn emphasized_line(&self) -> Option<usize> {
        self.emphasized
    }

    /// Width needed to show every number up to `line_count` unclipped.
    pub fn compute_gutter_width(&self, line_count: usize) -> i32 {
        self.config.padding + self.config.digit_width * digit_count(line_count) as i32
    }

    /// Re-derives the width from the surface's line count. Returns the new
    /// width if it changed.
    pub fn update_width<S: TextSurface + ?Sized>(&mut self, surface: &mut S) -> Option<GutterUpdate> {
        let width = self.compute_gutter_width(surface.block_count());
        if width == self.width {
            return None;
        }

        tracing::trace!(from = self.width, to = width, "gutter width changed");
        self.width = width;
        self.geometry.width = width;
        surface.set_viewport_margins(width);
        Some(GutterUpdate::WidthChanged(width))
    }

    /// Reacts to a surface update request.
    ///
    /// Scrolls take the fast path and shift the painted pixels; anything
    /// else repaints just the dirty band. A request covering the whole
    /// viewport also rechecks the width.
    pub fn on_viewport_changed<S: TextSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        rect: Rect,
        dy: i32,
    ) -> Vec<GutterUpdate> {
        let mut updates = Vec::with_capacity(2);

        if dy != 0 {
            updates.push(GutterUpdate::Scroll { dy });
        } else if !rect.is_empty() {
            updates.push(GutterUpdate::Repaint(Rect::new(
                0,
                rect.y,
                self.width,
                rect.height,
            )));
        }

        if rect.contains(&surface.viewport_rect()) {
            updates.extend(self.update_width(surface));
        }
        updates
    }

    /// Places the panel along the left edge of the surface contents.
    pub fn on_resize<S: TextSurface + ?Sized>(&mut self, surface: &S) -> GutterUpdate {
        let contents = surface.contents_rect();
        self.geometry = Rect::new(contents.left(), contents.top(), self.width, contents.height);
        GutterUpdate::Moved(self.geometry)
    }

    /// Draws the numbers of every line intersecting `region`.
    ///
    /// Starts at the first visible block and stops at the first block below
    /// the region, so the cost depends on the viewport, not the document.
    pub fn paint<S: TextSurface + ?Sized>(&self, surface: &S, region: Rect) -> GutterPaint {
        let caret_line = surface.caret_line();
        let block_count = surface.block_count();
        let label_width = (self.width - self.config.number_margin).max(0);

        let mut labels = Vec::new();
        let mut block = surface.first_visible_block();
        while block < block_count {
            let top = surface.block_top(block);
            if top > region.bottom() {
                break;
            }

            let height = surface.block_height(block);
            if top + height >= region.top() {
                let emphasized = block == caret_line;
                labels.push(LineNumberLabel {
                    number: block + 1,
                    rect: Rect::new(0, top, label_width, height),
                    color: if emphasized {
                        self.config.foreground
                    } else {
                        self.config.foreground_dim
                    },
                    emphasized,
                });
            }
            block += 1;
        }

        GutterPaint {
            fill: region,
            background: self.config.background,
            labels,
        }
    }

    /// Moves the emphasis to the caret's line and refreshes the surface's
    /// current-line band.
    pub fn on_caret_moved<S: TextSurface + ?Sized>(&mut self, surface: &mut S) -> CaretUpdate {
        let current = surface.caret_line();
        let previous = self.emphasized.replace(current);

        let mut repaint = Vec::with_capacity(2);
        if previous != Some(current) {
            let visible = Rect::new(0, 0, self.width, surface.viewport_rect().height);
            for line in previous.into_iter().chain(Some(current)) {
                if line >= surface.block_count() {
                    continue;
                }
                let row = Rect::new(0, surface.block_top(line), self.width, surface.block_height(line));
                if row.intersects(&visible) {
                    repaint.push(row);
                }
            }
        }

        let highlight = (!surface.is_read_only()).then_some(LineHighlight {
            line: current,
            color: self.config.current_line,
        });
        surface.set_extra_selections(highlight.into_iter().collect());

        CaretUpdate { repaint, highlight }
    }

    /// Routes one surface notification.
    pub fn handle<S: TextSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        event: SurfaceEvent,
    ) -> Vec<GutterUpdate> {
        match event {
            SurfaceEvent::UpdateRequest { rect, dy } => self.on_viewport_changed(surface, rect, dy),
            SurfaceEvent::BlockCountChanged(_) => self.update_width(surface).into_iter().collect(),
            SurfaceEvent::CursorPositionChanged => self
                .on_caret_moved(surface)
                .repaint
                .into_iter()
                .map(GutterUpdate::Repaint)
                .collect(),
            SurfaceEvent::Resized => vec![self.on_resize(surface)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::surface::{CaretMove, EditorSurface};

    fn surface_with_lines(lines: usize) -> EditorSurface {
        let config = EditorConfig {
            font_size: 10.0,
            line_height_factor: 1.0,
            viewport_width: 300,
            viewport_height: 100,
            ..EditorConfig::default()
        };
        let mut surface = EditorSurface::new(&config);
        surface.set_text(&vec!["text"; lines].join("\n"));
        surface.drain_events();
        surface
    }

    fn attached(lines: usize) -> (EditorSurface, GutterController) {
        let mut surface = surface_with_lines(lines);
        let mut gutter = GutterController::new(GutterConfig::default());
        gutter.attach(&mut surface);
        (surface, gutter)
    }

    #[test]
    fn test_digit_count() {
        assert_eq!(digit_count(0), 1);
        assert_eq!(digit_count(9), 1);
        assert_eq!(digit_count(10), 2);
        assert_eq!(digit_count(12_345), 5);
    }

    #[test]
    fn test_width_grows_at_digit_boundary() {
        let gutter = GutterController::new(GutterConfig::default());
        assert_eq!(gutter.compute_gutter_width(9), 24);
        assert_eq!(gutter.compute_gutter_width(10), 32);
        assert!(gutter.compute_gutter_width(9) < gutter.compute_gutter_width(10));
    }

    #[test]
    fn test_appending_tenth_line_widens_gutter() {
        let (mut surface, mut gutter) = attached(9);
        assert_eq!(gutter.width(), 24);
        assert_eq!(surface.viewport_margin(), 24);

        surface.move_caret(CaretMove::DocumentEnd);
        surface.insert_text("\nten").unwrap();
        let updates: Vec<_> = surface
            .drain_events()
            .into_iter()
            .flat_map(|event| gutter.handle(&mut surface, event))
            .collect();

        assert!(updates.contains(&GutterUpdate::WidthChanged(32)));
        assert_eq!(surface.viewport_margin(), 32);
        assert_eq!(gutter.geometry().width, 32);
    }

    #[test]
    fn test_scroll_takes_fast_path() {
        let (mut surface, mut gutter) = attached(50);
        surface.scroll_by(30);
        let events = surface.drain_events();
        assert_eq!(events.len(), 1);

        let updates = gutter.handle(&mut surface, events[0]);
        assert_eq!(updates, vec![GutterUpdate::Scroll { dy: -30 }]);
    }

    #[test]
    fn test_partial_update_repaints_band() {
        let (mut surface, mut gutter) = attached(50);
        let updates = gutter.on_viewport_changed(&mut surface, Rect::new(0, 40, 268, 20), 0);
        assert_eq!(updates, vec![GutterUpdate::Repaint(Rect::new(0, 40, 32, 20))]);
    }

    #[test]
    fn test_full_viewport_update_rechecks_width() {
        let (mut surface, mut gutter) = attached(5);
        surface.set_text(&vec!["x"; 120].join("\n"));
        let viewport = surface.viewport_rect();

        let updates = gutter.on_viewport_changed(&mut surface, viewport, 0);
        assert!(updates.contains(&GutterUpdate::WidthChanged(40)));
    }

    #[test]
    fn test_paint_covers_only_visible_lines() {
        let (mut surface, gutter) = attached(1000);
        surface.scroll_by(205);

        let paint = gutter.paint(&surface, Rect::new(0, 0, gutter.width(), 100));
        let numbers: Vec<usize> = paint.labels.iter().map(|l| l.number).collect();
        assert_eq!(numbers.first(), Some(&21));
        assert_eq!(numbers.last(), Some(&31));
        assert_eq!(paint.labels[0].rect, Rect::new(0, -5, gutter.width() - 8, 10));
        assert_eq!(paint.background, GutterConfig::default().background);
    }

    #[test]
    fn test_paint_region_limits_labels() {
        let (surface, gutter) = attached(20);
        let paint = gutter.paint(&surface, Rect::new(0, 30, gutter.width(), 10));
        let numbers: Vec<usize> = paint.labels.iter().map(|l| l.number).collect();
        assert_eq!(numbers, vec![3, 4]);
    }

    #[test]
    fn test_caret_line_is_emphasized() {
        let (mut surface, mut gutter) = attached(5);
        surface.move_caret(CaretMove::Down(2));
        gutter.on_caret_moved(&mut surface);

        let paint = gutter.paint(&surface, surface.viewport_rect());
        let config = GutterConfig::default();
        for label in &paint.labels {
            if label.number == 3 {
                assert!(label.emphasized);
                assert_eq!(label.color, config.foreground);
            } else {
                assert!(!label.emphasized);
                assert_eq!(label.color, config.foreground_dim);
            }
        }
    }

    #[test]
    fn test_caret_move_repaints_old_and_new_rows() {
        let (mut surface, mut gutter) = attached(5);
        assert_eq!(gutter.emphasized_line(), Some(0));

        surface.move_caret(CaretMove::Down(3));
        let update = gutter.on_caret_moved(&mut surface);
        assert_eq!(
            update.repaint,
            vec![Rect::new(0, 0, 24, 10), Rect::new(0, 30, 24, 10)]
        );
        assert_eq!(gutter.emphasized_line(), Some(3));

        let highlight = update.highlight.unwrap();
        assert_eq!(highlight.line, 3);
        assert_eq!(surface.extra_selections(), &[highlight]);
    }

    #[test]
    fn test_caret_move_within_line_repaints_nothing() {
        let (mut surface, mut gutter) = attached(5);
        surface.move_caret(CaretMove::LineEnd);
        let update = gutter.on_caret_moved(&mut surface);
        assert!(update.repaint.is_empty());
        assert!(update.highlight.is_some());
    }

    #[test]
    fn test_read_only_surface_has_no_line_highlight() {
        let (mut surface, mut gutter) = attached(5);
        surface.set_read_only(true);
        let update = gutter.on_caret_moved(&mut surface);
        assert!(update.highlight.is_none());
        assert!(surface.extra_selections().is_empty());
    }

    #[test]
    fn test_resize_moves_panel() {
        let (mut surface, mut gutter) = attached(5);
        surface.resize(640, 480);
        let updates: Vec<_> = surface
            .drain_events()
            .into_iter()
            .flat_map(|event| gutter.handle(&mut surface, event))
            .collect();
        assert_eq!(updates, vec![GutterUpdate::Moved(Rect::new(0, 0, 24, 480))]);
    }

    proptest::proptest! {
        #[test]
        fn prop_width_never_shrinks_as_lines_grow(a in 0usize..1_000_000, b in 0usize..1_000_000) {
            let gutter = GutterController::new(GutterConfig::default());
            let (low, high) = (a.min(b), a.max(b));
            proptest::prop_assert!(gutter.compute_gutter_width(low) <= gutter.compute_gutter_width(high));
        }
    }
}
