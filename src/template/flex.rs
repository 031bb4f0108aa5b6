//! Phase 3: column flex distribution, top-down.
//!
//! Row (width) flex resolves during width distribution because text width
//! is intrinsic. Height flex needs content heights first, so columns get
//! this separate top-down pass after layout: remaining vertical space is
//! split across flex children, child positions are re-swept, and new
//! heights propagate into conditional branches whose root is itself a
//! flex container.

use std::any::Any;

use crate::template::{OpKind, Template, ROOT};

impl Template {
    /// Distribute remaining height to column flex children, depth by depth.
    pub(crate) fn distribute_flex(&mut self, root_h: i16, elem: Option<&dyn Any>) {
        for depth in 0..self.by_depth.len() {
            for k in 0..self.by_depth[depth].len() {
                let idx = self.by_depth[depth][k] as usize;
                let is_col = matches!(&self.ops[idx].kind, OpKind::Container(c) if !c.is_row);
                if is_col {
                    self.distribute_flex_in_col(idx, root_h, elem);
                }
            }
        }
    }

    fn distribute_flex_in_col(&mut self, idx: usize, root_h: i16, elem: Option<&dyn Any>) {
        let inset = match &self.ops[idx].kind {
            OpKind::Container(c) => c.border.inset(),
            _ => return,
        };
        let (gap, child_start, child_end, flex_grow, explicit_h, parent) = {
            let op = &self.ops[idx];
            (
                op.gap,
                op.child_start as usize,
                op.child_end as usize,
                op.flex_grow,
                op.height,
                op.parent,
            )
        };

        // Available content height: a flex child already had its height
        // set by the parent's distribution; otherwise the parent's content
        // region; at the root, the screen.
        let mut avail_h = if flex_grow > 0.0 && self.geom[idx].h > 0 {
            self.geom[idx].h - inset
        } else if parent != ROOT {
            let p = parent as usize;
            let parent_inset = match &self.ops[p].kind {
                OpKind::Container(c) => c.border.inset(),
                _ => 0,
            };
            self.geom[p].h - parent_inset
        } else {
            root_h
        };

        if explicit_h > 0 {
            avail_h = explicit_h - inset;
        }

        // Sum used height; flex-capable children count at their content
        // height since their current height is what we are replacing.
        let mut used_h: i16 = 0;
        let mut total_flex: f32 = 0.0;
        let mut flex_children: Vec<usize> = Vec::new();
        let mut flex_values: Vec<f32> = Vec::new();

        for i in child_start..child_end {
            if !self.ops[i].is_child_of(idx as i16) {
                continue;
            }

            let direct_flex = {
                let child = &self.ops[i];
                match child.kind {
                    OpKind::Container(_) | OpKind::Layer(_) => child.flex_grow,
                    _ => 0.0,
                }
            };

            let child_flex = if direct_flex > 0.0 {
                direct_flex
            } else if matches!(self.ops[i].kind, OpKind::If(_)) {
                self.if_flex_grow(i, elem)
            } else {
                0.0
            };

            if child_flex > 0.0 {
                total_flex += child_flex;
                flex_children.push(i);
                flex_values.push(child_flex);
                used_h += self.geom[i].content_h;
            } else {
                used_h += self.geom[i].h;
            }
        }

        let child_count = self.child_count(idx as i16);
        if child_count > 1 && gap > 0 {
            used_h += gap * (child_count - 1);
        }

        let remaining = avail_h - used_h;
        if remaining <= 0 || total_flex <= 0.0 {
            return;
        }

        // Expand flex children; last one absorbs the rounding remainder.
        let mut distributed: i16 = 0;
        let last = flex_children.len() - 1;
        for (k, &child_idx) in flex_children.iter().enumerate() {
            let share = flex_values[k] / total_flex;
            let mut extra = (remaining as f32 * share).floor() as i16;
            if k == last {
                extra = remaining - distributed;
            }
            distributed += extra;
            self.geom[child_idx].h = self.geom[child_idx].content_h + extra;
        }

        // Re-sweep child positions with the new heights.
        let content_off = inset / 2;
        let mut cursor: i16 = 0;
        let mut first = true;
        for i in child_start..child_end {
            if !self.ops[i].is_child_of(idx as i16) {
                continue;
            }
            if !first && gap > 0 {
                cursor += gap;
            }
            first = false;

            self.geom[i].local_y = content_off + cursor;
            cursor += self.geom[i].h;
        }

        // Conditional-wrapped flex children: push the new height into the
        // active branch and redistribute inside it.
        for &child_idx in &flex_children {
            if matches!(self.ops[child_idx].kind, OpKind::If(_)) {
                let new_h = self.geom[child_idx].h;
                self.propagate_flex_to_if(child_idx, new_h, elem);
            }
        }

        self.geom[idx].h = avail_h + inset;
    }

    /// Flex weight contributed by a conditional child: the weight of its
    /// active branch's root, when that root is a flex container.
    fn if_flex_grow(&self, i: usize, elem: Option<&dyn Any>) -> f32 {
        let OpKind::If(if_op) = &self.ops[i].kind else {
            return 0.0;
        };
        let active = if_op.cond.eval(elem);
        let Some(tmpl) = if_op.active(active) else {
            return 0.0;
        };
        let Some(root) = tmpl.ops.first() else {
            return 0.0;
        };
        if matches!(root.kind, OpKind::Container(_)) && root.flex_grow > 0.0 {
            root.flex_grow
        } else {
            0.0
        }
    }

    /// Propagate a flexed height into a conditional's active branch.
    fn propagate_flex_to_if(&mut self, i: usize, new_h: i16, elem: Option<&dyn Any>) {
        let OpKind::If(if_op) = &mut self.ops[i].kind else {
            return;
        };
        let active = if_op.cond.eval(elem);
        let Some(tmpl) = if_op.active_mut(active) else {
            return;
        };
        if tmpl.ops.is_empty() {
            return;
        }

        let root_is_flex =
            matches!(tmpl.ops[0].kind, OpKind::Container(_)) && tmpl.ops[0].flex_grow > 0.0;
        if root_is_flex {
            tmpl.geom[0].h = new_h;
            tmpl.distribute_flex(new_h, elem);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::node::{shared, when_true, Col, Row, Text};
    use crate::template::build;
    use crate::types::BorderStyle;

    fn run_phases(tmpl: &mut crate::Template, w: i16, h: i16) {
        tmpl.distribute_widths(w, None);
        tmpl.layout_pass(None);
        tmpl.distribute_flex(h, None);
    }

    #[test]
    fn test_col_flex_splits_height() {
        let mut tmpl = build(
            Col::new()
                .child(Row::new().flex(1.0))
                .child(Row::new().flex(1.0)),
        )
        .unwrap();
        run_phases(&mut tmpl, 20, 10);

        assert_eq!(tmpl.geom[1].h, 5);
        assert_eq!(tmpl.geom[2].h, 5);
        assert_eq!(tmpl.geom[2].local_y, 5);
        assert_eq!(tmpl.geom[0].h, 10);
    }

    #[test]
    fn test_col_flex_weights() {
        let mut tmpl = build(
            Col::new()
                .child(Row::new().flex(1.0))
                .child(Row::new().flex(3.0)),
        )
        .unwrap();
        run_phases(&mut tmpl, 20, 12);

        assert_eq!(tmpl.geom[1].h, 3);
        assert_eq!(tmpl.geom[2].h, 9);
    }

    #[test]
    fn test_col_flex_around_fixed_children() {
        let mut tmpl = build(
            Col::new()
                .child(Text::new("header"))
                .child(Row::new().flex(1.0))
                .child(Text::new("footer")),
        )
        .unwrap();
        run_phases(&mut tmpl, 20, 10);

        assert_eq!(tmpl.geom[1].h, 1);
        assert_eq!(tmpl.geom[2].h, 8);
        assert_eq!(tmpl.geom[3].h, 1);
        assert_eq!(tmpl.geom[3].local_y, 9);

        // Exact fill: heights plus gaps equal the container's content.
        let sum: i16 = (1..4).map(|i| tmpl.geom[i].h).sum();
        assert_eq!(sum, tmpl.geom[0].h);
    }

    #[test]
    fn test_col_flex_last_child_absorbs_remainder() {
        let mut tmpl = build(
            Col::new()
                .child(Row::new().flex(1.0))
                .child(Row::new().flex(1.0))
                .child(Row::new().flex(1.0)),
        )
        .unwrap();
        run_phases(&mut tmpl, 20, 10);

        assert_eq!(tmpl.geom[1].h, 3);
        assert_eq!(tmpl.geom[2].h, 3);
        assert_eq!(tmpl.geom[3].h, 4);
    }

    #[test]
    fn test_flex_respects_gap() {
        let mut tmpl = build(
            Col::new()
                .gap(1)
                .child(Text::new("top"))
                .child(Row::new().flex(1.0)),
        )
        .unwrap();
        run_phases(&mut tmpl, 20, 10);

        // 10 avail - 1 text - 1 gap = 8 for the flex row.
        assert_eq!(tmpl.geom[2].h, 8);
        assert_eq!(tmpl.geom[2].local_y, 2);
    }

    #[test]
    fn test_bordered_flex_col_insets_its_children() {
        // A bordered column that is itself a flex child subtracts its own
        // border before distributing to its children.
        let mut tmpl = build(
            Col::new().height(10).child(
                Col::new()
                    .flex(1.0)
                    .border(BorderStyle::Single)
                    .child(Row::new().flex(1.0)),
            ),
        )
        .unwrap();
        run_phases(&mut tmpl, 20, 10);

        // Inner col absorbed the full 10 rows; its row child gets the 8
        // rows inside the border.
        assert_eq!(tmpl.geom[1].h, 10);
        assert_eq!(tmpl.geom[2].h, 8);
        assert_eq!(tmpl.geom[2].local_y, 1);
    }

    #[test]
    fn test_if_wrapped_flex_child_participates() {
        let flag = shared(true);
        let mut tmpl = build(
            Col::new()
                .child(Text::new("top"))
                .child(when_true(&flag).then(Col::new().flex(1.0).child(Text::new("body")))),
        )
        .unwrap();
        run_phases(&mut tmpl, 20, 10);

        // The conditional child absorbed the remaining 9 rows.
        assert_eq!(tmpl.geom[2].h, 9);

        // And the branch's own root was given the flexed height.
        let crate::template::OpKind::If(if_op) = &tmpl.ops[2].kind else {
            panic!("expected if op");
        };
        let branch = if_op.then_tmpl.as_ref().unwrap();
        assert_eq!(branch.geom[0].h, 9);
    }

    #[test]
    fn test_no_flex_children_leaves_heights_alone() {
        let mut tmpl = build(
            Col::new()
                .child(Text::new("a"))
                .child(Text::new("b")),
        )
        .unwrap();
        run_phases(&mut tmpl, 20, 10);

        assert_eq!(tmpl.geom[1].h, 1);
        assert_eq!(tmpl.geom[2].h, 1);
        // Container keeps its content height.
        assert_eq!(tmpl.geom[0].h, 2);
    }

    #[test]
    fn test_explicit_height_bounds_flex() {
        let mut tmpl = build(
            Col::new()
                .height(6)
                .child(Row::new().flex(1.0)),
        )
        .unwrap();
        run_phases(&mut tmpl, 20, 10);

        assert_eq!(tmpl.geom[1].h, 6);
        assert_eq!(tmpl.geom[0].h, 6);
    }
}
