//! Render: top-down walk with accumulating global offsets.
//!
//! The parent passes its absolute position as the child's origin; each op
//! adds its local offset and dispatches on kind. Sub-templates (branches,
//! cases, iteration bodies) render at the owning op's position, with the
//! current iteration element carried down so element-bound leaves resolve.
//!
//! Rendering mutates nothing in the template - all geometry was settled by
//! the layout phases.

use std::any::Any;

use crate::buffer::Buffer;
use crate::template::{ListOp, OpKind, Template, ROOT};
use crate::types::Style;

impl Template {
    /// Render every root op at the given origin.
    pub(crate) fn render(
        &self,
        buf: &mut Buffer,
        global_x: i16,
        global_y: i16,
        max_w: i16,
        elem: Option<&dyn Any>,
    ) {
        for i in 0..self.ops.len() {
            if self.ops[i].parent == ROOT {
                self.render_op(buf, i, global_x, global_y, max_w, elem);
            }
        }
    }

    fn render_op(
        &self,
        buf: &mut Buffer,
        idx: usize,
        global_x: i16,
        global_y: i16,
        max_w: i16,
        elem: Option<&dyn Any>,
    ) {
        let op = &self.ops[idx];
        let geom = self.geom[idx];

        let abs_x = global_x + geom.local_x;
        let abs_y = global_y + geom.local_y;

        match &op.kind {
            OpKind::Text(src) => src.with(elem, |s| {
                buf.write_str(abs_x, abs_y, s, Style::new(), max_w);
            }),

            OpKind::Progress(value) => {
                let ratio = value.get(elem) as f32 / 100.0;
                buf.write_progress_bar(abs_x, abs_y, op.width, ratio, Style::new());
            }

            OpKind::RichText(spans) => spans.with(elem, |spans| {
                buf.write_spans(abs_x, abs_y, spans, max_w);
            }),

            OpKind::SelectionList(list) => {
                self.render_selection_list(buf, list, abs_x, abs_y, max_w);
            }

            OpKind::Custom(renderer) => {
                renderer.render(buf, abs_x, abs_y, geom.w, geom.h);
            }

            OpKind::Layout(_) => {
                // Children were arranged during layout; just walk them.
                for i in op.child_start..op.child_end {
                    let i = i as usize;
                    if self.ops[i].is_child_of(idx as i16) {
                        self.render_op(buf, i, abs_x, abs_y, geom.w, elem);
                    }
                }
            }

            OpKind::Layer(layer_op) => {
                let layer_w = if layer_op.view_w > 0 {
                    layer_op.view_w
                } else {
                    geom.w
                };
                let mut layer = layer_op.layer.borrow_mut();
                layer.set_viewport(layer_w, geom.h);
                layer.blit(buf, abs_x, abs_y, layer_w, geom.h);
            }

            OpKind::Container(container) => {
                if container.border != crate::types::BorderStyle::None {
                    let mut style = Style::new();
                    if let Some(fg) = container.border_fg {
                        style.fg = fg;
                    }
                    buf.draw_border(abs_x, abs_y, geom.w, geom.h, container.border, style);

                    if !container.title.is_empty() {
                        let title = format!("─ {} ", container.title);
                        buf.write_str(abs_x + 1, abs_y, &title, style, geom.w - 2);
                    }
                }

                for i in op.child_start..op.child_end {
                    let i = i as usize;
                    if self.ops[i].is_child_of(idx as i16) {
                        self.render_op(buf, i, abs_x, abs_y, geom.w, elem);
                    }
                }
            }

            OpKind::If(if_op) => {
                let active = if_op.cond.eval(elem);
                if let Some(branch) = if_op.active(active) {
                    branch.render(buf, abs_x, abs_y, geom.w, elem);
                }
            }

            OpKind::ForEach(for_each) => {
                let len = for_each.items.len().min(for_each.item_geoms.len());
                for i in 0..len {
                    let item_geom = for_each.item_geoms[i];
                    for_each.items.with_elem(i, &mut |e| {
                        for_each.body.render(
                            buf,
                            abs_x + item_geom.local_x,
                            abs_y + item_geom.local_y,
                            item_geom.w,
                            Some(e),
                        );
                    });
                }
            }

            OpKind::Switch(switch) => {
                if let Some(tmpl) = switch.active() {
                    tmpl.render(buf, abs_x, abs_y, geom.w, elem);
                }
            }
        }
    }

    /// Selection list: marker column plus one content line per visible
    /// item.
    ///
    /// Item content comes from the body template's first op only - a text
    /// or rich text leaf with any binding. Deeper bodies render just that
    /// first leaf.
    fn render_selection_list(
        &self,
        buf: &mut Buffer,
        list: &ListOp,
        abs_x: i16,
        abs_y: i16,
        max_w: i16,
    ) {
        let len = list.items.len();
        if len == 0 {
            return;
        }

        let selected = *list.selected.borrow();
        let (start, end) = if list.max_visible > 0 {
            let start = *list.offset.borrow();
            (start, (start + list.max_visible).min(len))
        } else {
            (0, len)
        };

        let spaces = " ".repeat(list.marker_width.max(0) as usize);
        let content_w = max_w - list.marker_width;
        let content_x = abs_x + list.marker_width;

        let first_kind = list
            .body
            .as_ref()
            .and_then(|body| body.ops.first())
            .map(|op| &op.kind);

        let mut y = abs_y;
        for i in start..end {
            let marker_text = if i == selected {
                list.marker.as_str()
            } else {
                spaces.as_str()
            };
            buf.write_str(abs_x, y, marker_text, Style::new(), max_w);

            if let Some(kind) = first_kind {
                list.items.with_elem(i, &mut |e| match kind {
                    OpKind::Text(src) => src.with(Some(e), |s| {
                        buf.write_str(content_x, y, s, Style::new(), content_w);
                    }),
                    OpKind::RichText(spans) => spans.with(Some(e), |spans| {
                        buf.write_spans(content_x, y, spans, content_w);
                    }),
                    _ => {}
                });
            }
            y += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::buffer::Buffer;
    use crate::node::{shared, Col, Progress, RichText, Row, Text};
    use crate::template::build;
    use crate::types::{BorderStyle, Color, Style};

    fn frame(node: impl Into<crate::Node>, w: i16, h: i16) -> Buffer {
        let mut tmpl = build(node).unwrap();
        let mut buf = Buffer::new(w, h);
        tmpl.execute(&mut buf, w, h);
        buf
    }

    fn row_text(buf: &Buffer, y: i16, width: i16) -> String {
        (0..width)
            .map(|x| buf.get(x, y).map(|c| c.ch).unwrap_or(' '))
            .collect()
    }

    #[test]
    fn test_text_renders_at_origin() {
        let buf = frame(Text::new("hi"), 10, 3);
        assert_eq!(row_text(&buf, 0, 4), "hi  ");
    }

    #[test]
    fn test_col_renders_rows() {
        let buf = frame(
            Col::new().child(Text::new("AAA")).child(Text::new("BBB")),
            20,
            5,
        );
        assert_eq!(row_text(&buf, 0, 5), "AAA  ");
        assert_eq!(row_text(&buf, 1, 5), "BBB  ");
        assert_eq!(row_text(&buf, 2, 5), "     ");
    }

    #[test]
    fn test_row_renders_adjacent() {
        let buf = frame(
            Row::new()
                .child(Text::new("AAA"))
                .child(Text::new("BBB"))
                .child(Text::new("CCC")),
            20,
            5,
        );
        assert_eq!(row_text(&buf, 0, 12), "AAABBBCCC   ");
    }

    #[test]
    fn test_progress_render() {
        let pct = shared(50_i32);
        let buf = frame(Progress::new(&pct).bar_width(10), 20, 3);
        assert_eq!(row_text(&buf, 0, 10), "█████░░░░░");
    }

    #[test]
    fn test_rich_text_render() {
        use crate::buffer::Span;

        let buf = frame(
            RichText::new(vec![
                Span::new("ok", Style::new().fg(Color::GREEN)),
                Span::plain(" ready"),
            ]),
            20,
            3,
        );
        assert_eq!(row_text(&buf, 0, 8), "ok ready");
        assert_eq!(buf.get(0, 0).unwrap().style.fg, Color::GREEN);
        assert_eq!(buf.get(3, 0).unwrap().style.fg, Color::Default);
    }

    #[test]
    fn test_bordered_container_with_title() {
        let buf = frame(
            Col::new()
                .border(BorderStyle::Single)
                .title("log")
                .width(12)
                .child(Text::new("entry")),
            20,
            5,
        );
        assert_eq!(row_text(&buf, 0, 12), "┌─ log ────┐");
        assert_eq!(row_text(&buf, 1, 8), "│entry  ");
        assert_eq!(row_text(&buf, 2, 12), "└──────────┘");
    }

    #[test]
    fn test_custom_renderer() {
        use crate::node::{Node, Renderer};
        use crate::types::Cell;

        struct Dot;

        impl Renderer for Dot {
            fn min_size(&self) -> (i16, i16) {
                (1, 1)
            }

            fn render(&self, buf: &mut Buffer, x: i16, y: i16, _w: i16, _h: i16) {
                buf.set(x, y, Cell::new('*', Style::new()));
            }
        }

        let buf = frame(Col::new().child(Text::new("a")).child(Node::renderer(Dot)), 10, 4);
        assert_eq!(row_text(&buf, 0, 2), "a ");
        assert_eq!(row_text(&buf, 1, 2), "* ");
    }

    #[test]
    fn test_layer_blit() {
        use crate::node::LayerView;

        let layer = shared(crate::buffer::Layer::new(10, 2));
        layer
            .borrow_mut()
            .buffer_mut()
            .write_str(0, 0, "offscreen", Style::new(), 10);

        let buf = frame(
            Col::new().child(LayerView::new(&layer).view_width(6).view_height(1)),
            20,
            4,
        );
        assert_eq!(row_text(&buf, 0, 8), "offscr  ");
        // Engine pushed the allocated viewport into the layer.
        assert_eq!(layer.borrow().viewport_width(), 6);
        assert_eq!(layer.borrow().viewport_height(), 1);
    }
}
