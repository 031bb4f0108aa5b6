//! Off-screen layers.
//!
//! A [`Layer`] owns a content [`Buffer`] the application draws into at its
//! own pace, plus a viewport and scroll offsets. At render time the engine
//! sets the viewport to the space the layer op was allocated and blits the
//! visible window into the main buffer. This decouples expensive content
//! (logs, large panes) from the per-frame render walk.

use super::Buffer;

/// An off-screen buffer with a scrollable viewport.
#[derive(Debug, Clone)]
pub struct Layer {
    content: Buffer,
    view_w: i16,
    view_h: i16,
    scroll_x: i16,
    scroll_y: i16,
}

impl Layer {
    /// Create a layer with the given content dimensions.
    pub fn new(content_w: i16, content_h: i16) -> Layer {
        Layer {
            content: Buffer::new(content_w, content_h),
            view_w: 0,
            view_h: 0,
            scroll_x: 0,
            scroll_y: 0,
        }
    }

    /// The content buffer, for the application to draw into.
    pub fn buffer_mut(&mut self) -> &mut Buffer {
        &mut self.content
    }

    pub fn buffer(&self) -> &Buffer {
        &self.content
    }

    /// Resize the content buffer (clears it) and clamp scroll offsets.
    pub fn resize_content(&mut self, content_w: i16, content_h: i16) {
        self.content.resize(content_w, content_h);
        self.clamp_scroll();
    }

    /// Set the visible window size. Called by the engine each frame with
    /// the space the layout allocated.
    pub fn set_viewport(&mut self, w: i16, h: i16) {
        self.view_w = w.max(0);
        self.view_h = h.max(0);
        self.clamp_scroll();
    }

    pub fn viewport_width(&self) -> i16 {
        self.view_w
    }

    pub fn viewport_height(&self) -> i16 {
        self.view_h
    }

    /// Scroll so the viewport's top-left is at (x, y), clamped to content.
    pub fn scroll_to(&mut self, x: i16, y: i16) {
        self.scroll_x = x;
        self.scroll_y = y;
        self.clamp_scroll();
    }

    /// Scroll relative to the current offset.
    pub fn scroll_by(&mut self, dx: i16, dy: i16) {
        self.scroll_to(self.scroll_x + dx, self.scroll_y + dy);
    }

    pub fn scroll_x(&self) -> i16 {
        self.scroll_x
    }

    pub fn scroll_y(&self) -> i16 {
        self.scroll_y
    }

    fn clamp_scroll(&mut self) {
        let max_x = (self.content.width() - self.view_w).max(0);
        let max_y = (self.content.height() - self.view_h).max(0);
        self.scroll_x = self.scroll_x.clamp(0, max_x);
        self.scroll_y = self.scroll_y.clamp(0, max_y);
    }

    /// Blit the visible window into `dest` at (x, y), clipped to (w, h).
    pub(crate) fn blit(&self, dest: &mut Buffer, x: i16, y: i16, w: i16, h: i16) {
        let w = w.min(self.content.width());
        let h = h.min(self.content.height());
        dest.copy_rect(&self.content, self.scroll_x, self.scroll_y, x, y, w, h);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Style;

    fn row_text(buf: &Buffer, y: i16, width: i16) -> String {
        (0..width)
            .map(|x| buf.get(x, y).map(|c| c.ch).unwrap_or(' '))
            .collect()
    }

    #[test]
    fn test_blit_visible_window() {
        let mut layer = Layer::new(10, 4);
        layer.buffer_mut().write_str(0, 0, "0123456789", Style::new(), 10);
        layer.buffer_mut().write_str(0, 1, "abcdefghij", Style::new(), 10);
        layer.set_viewport(4, 2);

        let mut dest = Buffer::new(10, 5);
        layer.blit(&mut dest, 1, 1, 4, 2);
        assert_eq!(row_text(&dest, 1, 6), " 0123 ");
        assert_eq!(row_text(&dest, 2, 6), " abcd ");
    }

    #[test]
    fn test_scroll_offsets_shift_window() {
        let mut layer = Layer::new(10, 4);
        layer.buffer_mut().write_str(0, 0, "0123456789", Style::new(), 10);
        layer.buffer_mut().write_str(0, 2, "abcdefghij", Style::new(), 10);
        layer.set_viewport(4, 2);
        layer.scroll_to(3, 2);

        let mut dest = Buffer::new(10, 5);
        layer.blit(&mut dest, 0, 0, 4, 2);
        assert_eq!(row_text(&dest, 0, 4), "defg");
    }

    #[test]
    fn test_scroll_clamps_to_content() {
        let mut layer = Layer::new(10, 4);
        layer.set_viewport(4, 2);
        layer.scroll_to(100, 100);
        assert_eq!(layer.scroll_x(), 6);
        assert_eq!(layer.scroll_y(), 2);

        layer.scroll_by(-200, -200);
        assert_eq!(layer.scroll_x(), 0);
        assert_eq!(layer.scroll_y(), 0);
    }
}
