//! Phase 1: width distribution, top-down.
//!
//! Every op receives its width before any height is known. Text width is
//! intrinsic and cheap, so row flex resolves entirely in this pass;
//! column (height) flex has to wait for content heights and runs as a
//! separate pass after layout.

use std::any::Any;

use crate::template::{OpKind, Template};
use crate::text_measure::cell_width;

impl Template {
    /// Assign a width to every op, top-down. Containers size their direct
    /// children; rows resolve flex here.
    pub(crate) fn distribute_widths(&mut self, screen_w: i16, elem: Option<&dyn Any>) {
        if self.ops.is_empty() {
            return;
        }

        // Root ops get the full available width first.
        for k in 0..self.by_depth[0].len() {
            let idx = self.by_depth[0][k] as usize;
            self.set_op_width(idx, screen_w, elem);
        }

        // Containers then size their children, depth by depth.
        for depth in 0..self.by_depth.len() {
            for k in 0..self.by_depth[depth].len() {
                let idx = self.by_depth[depth][k] as usize;
                if matches!(self.ops[idx].kind, OpKind::Container(_)) {
                    self.distribute_widths_to_children(idx, elem);
                }
            }
        }
    }

    /// Set a single op's width from the available space.
    fn set_op_width(&mut self, idx: usize, avail_w: i16, elem: Option<&dyn Any>) {
        let op = &self.ops[idx];
        let w = match &op.kind {
            OpKind::Text(src) => src.with(elem, cell_width),

            OpKind::Progress(_) => op.width,

            OpKind::Custom(renderer) => renderer.min_size().0,

            OpKind::Layout(_) => avail_w,

            OpKind::Layer(layer) => {
                if layer.view_w > 0 {
                    layer.view_w
                } else {
                    avail_w
                }
            }

            OpKind::SelectionList(_) => avail_w,

            OpKind::Container(_) => {
                if op.width > 0 {
                    op.width
                } else if op.percent_w > 0.0 {
                    (avail_w as f32 * op.percent_w).floor() as i16
                } else {
                    avail_w
                }
            }

            // Rich text and control flow fill the available width; control
            // flow adopts its sub-template's width during layout.
            _ => avail_w,
        };
        self.geom[idx].w = w;
    }

    /// Set widths for all direct children of a container.
    fn distribute_widths_to_children(&mut self, idx: usize, elem: Option<&dyn Any>) {
        let (is_row, inset) = match &self.ops[idx].kind {
            OpKind::Container(c) => (c.is_row, c.border.inset()),
            _ => return,
        };
        let content_w = self.geom[idx].w - inset;

        if is_row {
            self.distribute_row_child_widths(idx, content_w, elem);
        } else {
            self.distribute_col_child_widths(idx, content_w, elem);
        }
    }

    /// Column children stack full-width.
    fn distribute_col_child_widths(&mut self, idx: usize, avail_w: i16, elem: Option<&dyn Any>) {
        let (child_start, child_end) = {
            let op = &self.ops[idx];
            (op.child_start as usize, op.child_end as usize)
        };

        for i in child_start..child_end {
            if self.ops[i].is_child_of(idx as i16) {
                self.set_op_width(i, avail_w, elem);
            }
        }
    }

    /// Row children get two-pass flex: fixed children first, then the
    /// remainder split across flex children.
    ///
    /// Containers without explicit width, percent width or flex are
    /// treated as implicit flex and share the remainder evenly.
    fn distribute_row_child_widths(&mut self, idx: usize, avail_w: i16, elem: Option<&dyn Any>) {
        let (child_start, child_end, gap) = {
            let op = &self.ops[idx];
            (op.child_start as usize, op.child_end as usize, op.gap)
        };

        // Pass 1: size fixed children, collect flex and implicit-flex ones.
        let mut used_w: i16 = 0;
        let mut total_flex: f32 = 0.0;
        let mut flex_children: Vec<usize> = Vec::new();
        let mut implicit_flex: Vec<usize> = Vec::new();

        for i in child_start..child_end {
            if !self.ops[i].is_child_of(idx as i16) {
                continue;
            }

            let (flex_grow, implicit) = {
                let child = &self.ops[i];
                let implicit = matches!(child.kind, OpKind::Container(_))
                    && child.width == 0
                    && child.percent_w == 0.0;
                (child.flex_grow, implicit)
            };

            if flex_grow > 0.0 {
                total_flex += flex_grow;
                flex_children.push(i);
            } else if implicit {
                implicit_flex.push(i);
            } else {
                self.set_op_width(i, avail_w, elem);
                used_w += self.geom[i].w;
            }
        }

        let child_count = self.child_count(idx as i16);
        if child_count > 1 && gap > 0 {
            used_w += gap * (child_count - 1);
        }

        // Pass 2: split what is left.
        let remaining = avail_w - used_w;
        if remaining > 0 && total_flex > 0.0 {
            let mut distributed: i16 = 0;
            let last = flex_children.len() - 1;
            for (k, &child_idx) in flex_children.iter().enumerate() {
                let share = self.ops[child_idx].flex_grow / total_flex;
                let mut w = (remaining as f32 * share).floor() as i16;
                // Last flex child takes the rounding remainder.
                if k == last {
                    w = remaining - distributed;
                }
                distributed += w;
                self.geom[child_idx].w = w;
            }
        } else if remaining > 0 && !implicit_flex.is_empty() {
            let share = remaining / implicit_flex.len() as i16;
            let mut distributed: i16 = 0;
            let last = implicit_flex.len() - 1;
            for (k, &child_idx) in implicit_flex.iter().enumerate() {
                let mut w = share;
                if k == last {
                    w = remaining - distributed;
                }
                distributed += w;
                self.geom[child_idx].w = w;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::node::{shared, Col, Progress, Row, Text};
    use crate::template::build;

    #[test]
    fn test_text_width_is_display_width() {
        let mut tmpl = build(Text::new("hello")).unwrap();
        tmpl.distribute_widths(80, None);
        assert_eq!(tmpl.geom[0].w, 5);

        let mut tmpl = build(Text::new("a中b")).unwrap();
        tmpl.distribute_widths(80, None);
        assert_eq!(tmpl.geom[0].w, 4);
    }

    #[test]
    fn test_pointer_text_width_tracks_cell() {
        let content = shared(String::from("abc"));
        let mut tmpl = build(Text::new(&content)).unwrap();
        tmpl.distribute_widths(80, None);
        assert_eq!(tmpl.geom[0].w, 3);

        *content.borrow_mut() = String::from("abcdef");
        tmpl.distribute_widths(80, None);
        assert_eq!(tmpl.geom[0].w, 6);
    }

    #[test]
    fn test_progress_width_is_bar_width() {
        let mut tmpl = build(Progress::new(50).bar_width(30)).unwrap();
        tmpl.distribute_widths(80, None);
        assert_eq!(tmpl.geom[0].w, 30);
    }

    #[test]
    fn test_container_width_rules() {
        // Explicit width wins.
        let mut tmpl = build(Col::new().width(25)).unwrap();
        tmpl.distribute_widths(80, None);
        assert_eq!(tmpl.geom[0].w, 25);

        // Percent of available.
        let mut tmpl = build(Col::new().percent_width(0.5)).unwrap();
        tmpl.distribute_widths(80, None);
        assert_eq!(tmpl.geom[0].w, 40);

        // Otherwise available.
        let mut tmpl = build(Col::new()).unwrap();
        tmpl.distribute_widths(80, None);
        assert_eq!(tmpl.geom[0].w, 80);
    }

    #[test]
    fn test_row_flex_distribution_is_exact() {
        let mut tmpl = build(
            Row::new()
                .child(Col::new().flex(1.0))
                .child(Col::new().flex(2.0)),
        )
        .unwrap();
        tmpl.distribute_widths(30, None);
        assert_eq!(tmpl.geom[1].w, 10);
        assert_eq!(tmpl.geom[2].w, 20);
    }

    #[test]
    fn test_row_flex_last_child_absorbs_remainder() {
        // 3 children, flex 1 each, width 10: 3 + 3 + 4.
        let mut tmpl = build(
            Row::new()
                .child(Col::new().flex(1.0))
                .child(Col::new().flex(1.0))
                .child(Col::new().flex(1.0)),
        )
        .unwrap();
        tmpl.distribute_widths(10, None);
        assert_eq!(tmpl.geom[1].w, 3);
        assert_eq!(tmpl.geom[2].w, 3);
        assert_eq!(tmpl.geom[3].w, 4);
        assert_eq!(
            tmpl.geom[1].w + tmpl.geom[2].w + tmpl.geom[3].w,
            10,
            "flex must distribute the full remainder"
        );
    }

    #[test]
    fn test_row_flex_after_fixed_children() {
        let mut tmpl = build(
            Row::new()
                .child(Text::new("abcde"))
                .child(Col::new().flex(1.0)),
        )
        .unwrap();
        tmpl.distribute_widths(20, None);
        assert_eq!(tmpl.geom[1].w, 5);
        assert_eq!(tmpl.geom[2].w, 15);
    }

    #[test]
    fn test_row_gap_reduces_flex_space() {
        let mut tmpl = build(
            Row::new()
                .gap(2)
                .child(Text::new("abcde"))
                .child(Col::new().flex(1.0)),
        )
        .unwrap();
        tmpl.distribute_widths(20, None);
        assert_eq!(tmpl.geom[2].w, 13);
    }

    #[test]
    fn test_row_implicit_flex_containers_share_evenly() {
        // Containers with no sizing split the row; width 21 over 2 → 10 + 11.
        let mut tmpl = build(Row::new().child(Col::new()).child(Col::new())).unwrap();
        tmpl.distribute_widths(21, None);
        assert_eq!(tmpl.geom[1].w, 10);
        assert_eq!(tmpl.geom[2].w, 11);
    }

    #[test]
    fn test_col_children_fill_content_width() {
        let mut tmpl = build(Col::new().child(Col::new()).child(Col::new())).unwrap();
        tmpl.distribute_widths(40, None);
        assert_eq!(tmpl.geom[1].w, 40);
        assert_eq!(tmpl.geom[2].w, 40);
    }

    #[test]
    fn test_border_insets_content_width() {
        use crate::types::BorderStyle;

        let mut tmpl = build(
            Col::new()
                .border(BorderStyle::Single)
                .child(Col::new()),
        )
        .unwrap();
        tmpl.distribute_widths(40, None);
        assert_eq!(tmpl.geom[0].w, 40);
        assert_eq!(tmpl.geom[1].w, 38);
    }
}
