//! Phase 2: layout, bottom-up.
//!
//! Deepest ops first: leaves report their content height, then containers
//! position their direct children in local coordinates and derive their
//! own height. Control-flow children (conditionals, iterations, switches)
//! are the exception to pure bottom-up order - their size depends on
//! runtime state, so phases 1+2 run on the active sub-template at the
//! moment the parent lays them out, and the parent adopts the
//! sub-template root's dimensions.

use std::any::Any;

use crate::node::list::ensure_visible;
use crate::template::{ForEachOp, Geom, OpKind, Template};
use crate::types::ChildSize;

impl Template {
    /// Compute heights and local positions, deepest depth first.
    pub(crate) fn layout_pass(&mut self, elem: Option<&dyn Any>) {
        for depth in (0..self.by_depth.len()).rev() {
            for k in 0..self.by_depth[depth].len() {
                let idx = self.by_depth[depth][k] as usize;
                self.layout_op(idx, elem);
            }
        }
    }

    fn layout_op(&mut self, idx: usize, elem: Option<&dyn Any>) {
        if matches!(self.ops[idx].kind, OpKind::Container(_)) {
            return self.layout_container(idx, elem);
        }
        if matches!(self.ops[idx].kind, OpKind::Layout(_)) {
            return self.layout_custom(idx);
        }

        let flex_grow = self.ops[idx].flex_grow;
        match &mut self.ops[idx].kind {
            OpKind::Text(_) | OpKind::Progress(_) | OpKind::RichText(_) => {
                self.geom[idx].h = 1;
            }

            OpKind::SelectionList(list) => {
                let len = list.items.len();

                // Keep the selection inside the window before height is
                // derived; render reads the same offset.
                let selected = *list.selected.borrow();
                let current = *list.offset.borrow();
                *list.offset.borrow_mut() =
                    ensure_visible(selected, current, len, list.max_visible);

                let mut visible = len;
                if list.max_visible > 0 && visible > list.max_visible {
                    visible = list.max_visible;
                }
                self.geom[idx].h = visible.max(1).min(i16::MAX as usize) as i16;
            }

            OpKind::Custom(renderer) => {
                let (_, h) = renderer.min_size();
                self.geom[idx].h = h;
            }

            OpKind::Layer(layer) => {
                let h = if layer.view_h > 0 {
                    // Explicit viewport height.
                    layer.view_h
                } else if flex_grow > 0.0 {
                    // Flex layer: minimal height, expanded by the flex pass.
                    1
                } else {
                    // Fall back to the layer's own viewport, then one line.
                    let vh = layer.layer.borrow().viewport_height();
                    if vh > 0 {
                        vh
                    } else {
                        1
                    }
                };
                self.geom[idx].h = h;
                self.geom[idx].content_h = h;
            }

            // Control flow at template root is laid out by the enclosing
            // container of the parent template; nothing to do here.
            OpKind::If(_) | OpKind::ForEach(_) | OpKind::Switch(_) => {}

            // Dispatched before the match.
            OpKind::Container(_) | OpKind::Layout(_) => {}
        }
    }

    /// Position children and compute the container's height.
    fn layout_container(&mut self, idx: usize, elem: Option<&dyn Any>) {
        let (is_row, inset) = match &self.ops[idx].kind {
            OpKind::Container(c) => (c.is_row, c.border.inset()),
            _ => return,
        };
        let (gap, child_start, child_end, explicit_h) = {
            let op = &self.ops[idx];
            (
                op.gap,
                op.child_start as usize,
                op.child_end as usize,
                op.height,
            )
        };

        // Content region offset and width inside an optional border.
        let content_off = inset / 2;
        let avail_w = self.geom[idx].w - inset;

        let mut cursor: i16 = 0;
        let mut max_h: i16 = 0;
        let mut first = true;

        for i in child_start..child_end {
            if !self.ops[i].is_child_of(idx as i16) {
                continue;
            }

            if !first && gap > 0 {
                cursor += gap;
            }
            first = false;

            let is_flow = matches!(
                self.ops[i].kind,
                OpKind::If(_) | OpKind::ForEach(_) | OpKind::Switch(_)
            );

            if is_flow {
                let is_if = matches!(self.ops[i].kind, OpKind::If(_));
                let dims = self.layout_flow_child(i, avail_w, elem);

                if is_row {
                    if let Some((h, w)) = dims {
                        let g = &mut self.geom[i];
                        g.local_x = content_off + cursor;
                        g.local_y = content_off;
                        g.h = h;
                        g.w = w;
                        cursor += w;
                        max_h = max_h.max(h);
                    }
                } else {
                    match dims {
                        Some((h, _)) => {
                            let g = &mut self.geom[i];
                            g.local_x = content_off;
                            g.local_y = content_off + cursor;
                            g.h = h;
                            g.w = avail_w;
                            if is_if {
                                g.content_h = h;
                            }
                            cursor += h;
                        }
                        None => {
                            // Inactive branch or no matching case: no space.
                            let g = &mut self.geom[i];
                            g.h = 0;
                            if is_if {
                                g.content_h = 0;
                            }
                        }
                    }
                }
            } else if is_row {
                let g = &mut self.geom[i];
                g.local_x = content_off + cursor;
                g.local_y = content_off;
                cursor += g.w;
                max_h = max_h.max(g.h);
            } else {
                let g = &mut self.geom[i];
                g.local_x = content_off;
                g.local_y = content_off + cursor;
                cursor += g.h;
            }
        }

        let g = &mut self.geom[idx];
        g.h = if is_row { max_h } else { cursor } + inset;

        // Natural height, kept for the flex pass before any override.
        g.content_h = g.h;

        if explicit_h > 0 {
            g.h = explicit_h;
        }
    }

    /// Run phases 1+2 on the active sub-template of a control-flow child
    /// and return its (height, width). `None` when no branch is active.
    fn layout_flow_child(
        &mut self,
        i: usize,
        avail_w: i16,
        elem: Option<&dyn Any>,
    ) -> Option<(i16, i16)> {
        match &mut self.ops[i].kind {
            OpKind::If(if_op) => {
                let active = if_op.cond.eval(elem);
                let branch = if_op.active_mut(active)?;
                branch.distribute_widths(avail_w, elem);
                branch.layout_pass(elem);
                Some((branch.height(), branch.root_w()))
            }

            OpKind::Switch(switch) => {
                let tmpl = switch.active_mut()?;
                tmpl.distribute_widths(avail_w, elem);
                tmpl.layout_pass(elem);
                Some((tmpl.height(), tmpl.root_w()))
            }

            OpKind::ForEach(for_each) => Some(Self::layout_for_each(for_each, avail_w)),

            _ => None,
        }
    }

    /// Lay out every element of an iteration: the body template is
    /// re-executed per element with that element in scope, and the item
    /// geometry scratch records each item's slot.
    ///
    /// Returns (total height, width).
    fn layout_for_each(for_each: &mut ForEachOp, avail_w: i16) -> (i16, i16) {
        let len = for_each.items.len();
        if for_each.body.ops.is_empty() || len == 0 {
            return (0, 0);
        }

        // The scratch only ever grows capacity; shrinking sequences just
        // truncate the view.
        if for_each.item_geoms.len() != len {
            for_each.item_geoms.resize(len, Geom::default());
        }

        let ForEachOp {
            items,
            body,
            item_geoms,
        } = for_each;

        let mut cursor: i16 = 0;
        for i in 0..len {
            items.with_elem(i, &mut |e| {
                body.distribute_widths(avail_w, Some(e));
                body.layout_pass(Some(e));
                let item_h = body.height();

                item_geoms[i] = Geom {
                    w: avail_w,
                    h: item_h,
                    local_x: 0,
                    local_y: cursor,
                    content_h: item_h,
                };
                cursor += item_h;
            });
        }

        (cursor, avail_w)
    }

    /// Custom layout: gather child minima, let the closure arrange them,
    /// apply the rectangles, enclose the furthest bottom edge.
    fn layout_custom(&mut self, idx: usize) {
        let (arrange, child_start, child_end) = {
            let op = &self.ops[idx];
            match &op.kind {
                OpKind::Layout(arrange) => (
                    arrange.clone(),
                    op.child_start as usize,
                    op.child_end as usize,
                ),
                _ => return,
            }
        };

        let avail_w = self.geom[idx].w;
        let avail_h = self.geom[idx].h;

        let mut sizes: Vec<ChildSize> = Vec::new();
        for i in child_start..child_end {
            if self.ops[i].is_child_of(idx as i16) {
                sizes.push(ChildSize {
                    min_w: self.geom[i].w,
                    min_h: self.geom[i].h,
                });
            }
        }

        let rects = arrange(&sizes, avail_w, avail_h);

        let mut nth = 0;
        let mut max_h: i16 = 0;
        for i in child_start..child_end {
            if !self.ops[i].is_child_of(idx as i16) {
                continue;
            }
            if let Some(rect) = rects.get(nth) {
                let g = &mut self.geom[i];
                g.local_x = rect.x;
                g.local_y = rect.y;
                g.w = rect.w;
                g.h = rect.h;
                max_h = max_h.max(rect.y + rect.h);
            }
            nth += 1;
        }

        self.geom[idx].h = max_h;
    }
}

#[cfg(test)]
mod tests {
    use crate::node::{shared, when_true, Col, Elem, ForEach, Progress, Row, Text};
    use crate::template::build;
    use crate::types::{BorderStyle, ChildSize, Rect};

    fn run_layout(tmpl: &mut crate::Template, w: i16) {
        tmpl.distribute_widths(w, None);
        tmpl.layout_pass(None);
    }

    #[test]
    fn test_leaf_heights_are_one_row() {
        let mut tmpl = build(
            Col::new()
                .child(Text::new("a"))
                .child(Progress::new(50)),
        )
        .unwrap();
        run_layout(&mut tmpl, 40);
        assert_eq!(tmpl.geom[1].h, 1);
        assert_eq!(tmpl.geom[2].h, 1);
    }

    #[test]
    fn test_col_stacks_children() {
        let mut tmpl = build(
            Col::new()
                .child(Text::new("a"))
                .child(Text::new("b"))
                .child(Text::new("c")),
        )
        .unwrap();
        run_layout(&mut tmpl, 40);

        assert_eq!(tmpl.geom[1].local_y, 0);
        assert_eq!(tmpl.geom[2].local_y, 1);
        assert_eq!(tmpl.geom[3].local_y, 2);
        assert_eq!(tmpl.geom[0].h, 3);
        assert_eq!(tmpl.height(), 3);
    }

    #[test]
    fn test_col_gap() {
        let mut tmpl = build(
            Col::new()
                .gap(1)
                .child(Text::new("a"))
                .child(Text::new("b")),
        )
        .unwrap();
        run_layout(&mut tmpl, 40);

        assert_eq!(tmpl.geom[1].local_y, 0);
        assert_eq!(tmpl.geom[2].local_y, 2);
        assert_eq!(tmpl.geom[0].h, 3);
    }

    #[test]
    fn test_row_places_children_horizontally() {
        let mut tmpl = build(
            Row::new()
                .child(Text::new("AAA"))
                .child(Text::new("BB")),
        )
        .unwrap();
        run_layout(&mut tmpl, 40);

        assert_eq!(tmpl.geom[1].local_x, 0);
        assert_eq!(tmpl.geom[2].local_x, 3);
        assert_eq!(tmpl.geom[0].h, 1);
    }

    #[test]
    fn test_row_height_is_tallest_child() {
        let mut tmpl = build(
            Row::new()
                .child(Text::new("x"))
                .child(Col::new().child(Text::new("a")).child(Text::new("b"))),
        )
        .unwrap();
        run_layout(&mut tmpl, 40);
        assert_eq!(tmpl.geom[0].h, 2);
    }

    #[test]
    fn test_border_adds_inset() {
        let mut tmpl = build(
            Col::new()
                .border(BorderStyle::Single)
                .child(Text::new("a")),
        )
        .unwrap();
        run_layout(&mut tmpl, 40);

        // Child sits inside the border.
        assert_eq!(tmpl.geom[1].local_x, 1);
        assert_eq!(tmpl.geom[1].local_y, 1);
        // Container height includes both border rows.
        assert_eq!(tmpl.geom[0].h, 3);
    }

    #[test]
    fn test_explicit_height_overrides_content() {
        let mut tmpl = build(
            Col::new()
                .height(10)
                .child(Text::new("a")),
        )
        .unwrap();
        run_layout(&mut tmpl, 40);

        assert_eq!(tmpl.geom[0].h, 10);
        assert_eq!(tmpl.geom[0].content_h, 1);
    }

    #[test]
    fn test_if_child_adopts_active_branch_height() {
        let flag = shared(true);
        let mut tmpl = build(
            Col::new().child(
                when_true(&flag)
                    .then(Col::new().child(Text::new("a")).child(Text::new("b")))
                    .else_(Text::new("c")),
            ),
        )
        .unwrap();

        run_layout(&mut tmpl, 40);
        assert_eq!(tmpl.geom[1].h, 2);
        assert_eq!(tmpl.geom[0].h, 2);

        *flag.borrow_mut() = false;
        run_layout(&mut tmpl, 40);
        assert_eq!(tmpl.geom[1].h, 1);
        assert_eq!(tmpl.geom[0].h, 1);
    }

    #[test]
    fn test_if_without_active_branch_takes_no_space() {
        let flag = shared(false);
        let mut tmpl = build(
            Col::new()
                .child(when_true(&flag).then(Text::new("hidden")))
                .child(Text::new("below")),
        )
        .unwrap();
        run_layout(&mut tmpl, 40);

        assert_eq!(tmpl.geom[1].h, 0);
        assert_eq!(tmpl.geom[2].local_y, 0);
        assert_eq!(tmpl.geom[0].h, 1);
    }

    #[test]
    fn test_for_each_layout_per_element() {
        let items = shared(vec![
            String::from("a"),
            String::from("b"),
            String::from("c"),
        ]);
        let mut tmpl = build(
            Col::new().child(ForEach::new(&items, |item: &Elem<String>| {
                Text::new(item.text(|s| s.as_str()))
            })),
        )
        .unwrap();
        run_layout(&mut tmpl, 40);

        // One pass of the one-row body per element.
        assert_eq!(tmpl.geom[1].h, 3);
        assert_eq!(tmpl.geom[0].h, 3);
    }

    #[test]
    fn test_for_each_scratch_tracks_length() {
        use crate::template::OpKind;

        let items = shared(vec![1_i32, 2, 3]);
        let mut tmpl = build(
            Col::new().child(ForEach::new(&items, |_item: &Elem<i32>| Text::new("row"))),
        )
        .unwrap();
        run_layout(&mut tmpl, 40);

        let scratch_len = |tmpl: &crate::Template| match &tmpl.ops[1].kind {
            OpKind::ForEach(fe) => fe.item_geoms.len(),
            _ => panic!("expected for-each"),
        };
        assert_eq!(scratch_len(&tmpl), 3);

        // Sequence grows between frames: scratch grows with it.
        items.borrow_mut().push(4);
        items.borrow_mut().push(5);
        run_layout(&mut tmpl, 40);
        assert_eq!(scratch_len(&tmpl), 5);
        assert_eq!(tmpl.geom[1].h, 5);

        // Sequence shrinks: view truncates.
        items.borrow_mut().truncate(1);
        run_layout(&mut tmpl, 40);
        assert_eq!(scratch_len(&tmpl), 1);
        assert_eq!(tmpl.geom[1].h, 1);
    }

    #[test]
    fn test_custom_layout_applies_rects() {
        use crate::node::BoxNode;

        let mut tmpl = build(
            BoxNode::new(|children: &[ChildSize], avail_w, _avail_h| {
                // Stack children diagonally.
                children
                    .iter()
                    .enumerate()
                    .map(|(i, c)| Rect::new(i as i16 * 2, i as i16, avail_w.min(c.min_w + 2), 1))
                    .collect()
            })
            .child(Text::new("a"))
            .child(Text::new("b")),
        )
        .unwrap();
        run_layout(&mut tmpl, 40);

        assert_eq!(tmpl.geom[1].local_x, 0);
        assert_eq!(tmpl.geom[1].local_y, 0);
        assert_eq!(tmpl.geom[2].local_x, 2);
        assert_eq!(tmpl.geom[2].local_y, 1);
        // Container encloses the furthest bottom edge.
        assert_eq!(tmpl.geom[0].h, 2);
    }

    #[test]
    fn test_selection_list_height_and_windowing() {
        let items = shared(vec![
            String::from("a"),
            String::from("b"),
            String::from("c"),
            String::from("d"),
        ]);
        let selected = shared(3_usize);
        let offset = shared(0_usize);
        let mut tmpl = build(
            Col::new().child(
                crate::node::SelectionList::new(&items, &selected, |item: &Elem<String>| {
                    Text::new(item.text(|s| s.as_str()))
                })
                .max_visible(2)
                .offset(&offset),
            ),
        )
        .unwrap();
        run_layout(&mut tmpl, 40);

        // Height capped at max_visible, window scrolled to show index 3.
        assert_eq!(tmpl.geom[1].h, 2);
        assert_eq!(*offset.borrow(), 2);
    }

    #[test]
    fn test_empty_selection_list_is_one_row() {
        let items: crate::Shared<Vec<String>> = shared(Vec::new());
        let selected = shared(0_usize);
        let mut tmpl = build(
            Col::new().child(crate::node::SelectionList::new(
                &items,
                &selected,
                |item: &Elem<String>| Text::new(item.text(|s| s.as_str())),
            )),
        )
        .unwrap();
        run_layout(&mut tmpl, 40);
        assert_eq!(tmpl.geom[1].h, 1);
    }
}
