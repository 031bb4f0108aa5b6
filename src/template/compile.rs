//! Declaration tree -> flat op array.
//!
//! All the expensive, polymorphic work happens here, once: nodes become
//! ops, bindings are classified and frozen, and control-flow branches and
//! iteration bodies become self-contained sub-templates. Execution never
//! inspects a `Node` again.

use tracing::debug;

use crate::node::{Cond, ForEach, Node, SelectionList, SwitchNode};
use crate::template::{
    ContainerOp, ForEachOp, Geom, IfOp, LayerOp, ListOp, Op, OpKind, SwitchOp, Template, ROOT,
};
use crate::text_measure::cell_width;
use crate::types::{BorderStyle, Color};
use crate::BuildError;

/// Default progress bar width when none is given.
const DEFAULT_BAR_WIDTH: i16 = 20;

/// Default selection marker when none is given.
const DEFAULT_MARKER: &str = "> ";

impl Template {
    pub(crate) fn build(node: Node) -> Result<Template, BuildError> {
        let mut tmpl = Template::empty();
        tmpl.compile(node, ROOT, 0, false)?;
        tmpl.finish();
        debug!(
            ops = tmpl.ops.len(),
            depths = tmpl.by_depth.len(),
            "template compiled"
        );
        Ok(tmpl)
    }

    fn empty() -> Template {
        Template {
            ops: Vec::with_capacity(32),
            geom: Vec::new(),
            by_depth: Vec::new(),
        }
    }

    /// Trim trailing empty depth levels and allocate the geometry array.
    fn finish(&mut self) {
        while self.by_depth.last().is_some_and(|level| level.is_empty()) {
            self.by_depth.pop();
        }
        self.geom = vec![Geom::default(); self.ops.len()];
    }

    /// Compile a branch or iteration body as a standalone sub-template.
    fn build_sub(node: Node, in_elem: bool) -> Result<Template, BuildError> {
        let mut sub = Template::empty();
        sub.compile(node, ROOT, 0, in_elem)?;
        sub.finish();
        Ok(sub)
    }

    fn add_op(&mut self, mut op: Op, depth: usize) -> Result<i16, BuildError> {
        let idx = self.ops.len();
        if idx >= i16::MAX as usize {
            return Err(BuildError::TooManyOps(idx + 1));
        }

        op.depth = depth.min(u8::MAX as usize) as u8;
        self.ops.push(op);

        while self.by_depth.len() <= depth {
            self.by_depth.push(Vec::new());
        }
        self.by_depth[depth].push(idx as i16);

        Ok(idx as i16)
    }

    /// Compile one node. Returns the op index, or [`ROOT`] when the node
    /// produced no op.
    ///
    /// `in_elem` tracks whether an iteration element will be in scope at
    /// execution time; element-bound values anywhere else are rejected.
    fn compile(
        &mut self,
        node: Node,
        parent: i16,
        depth: usize,
        in_elem: bool,
    ) -> Result<i16, BuildError> {
        match node {
            Node::Empty => Ok(ROOT),

            Node::Text(text) => {
                if text.content.element_bound() && !in_elem {
                    return Err(BuildError::ElementBindingOutsideIteration);
                }
                self.add_op(Op::new(OpKind::Text(text.content), parent), depth)
            }

            Node::Progress(progress) => {
                if progress.value.element_bound() && !in_elem {
                    return Err(BuildError::ElementBindingOutsideIteration);
                }
                let mut op = Op::new(OpKind::Progress(progress.value), parent);
                op.width = if progress.bar_width > 0 {
                    progress.bar_width
                } else {
                    DEFAULT_BAR_WIDTH
                };
                self.add_op(op, depth)
            }

            Node::RichText(rich) => {
                if rich.spans.element_bound() && !in_elem {
                    return Err(BuildError::ElementBindingOutsideIteration);
                }
                self.add_op(Op::new(OpKind::RichText(rich.spans), parent), depth)
            }

            Node::Row(row) => self.compile_container(
                row.children,
                row.gap,
                true,
                row.hints,
                row.border,
                row.border_fg,
                row.title,
                parent,
                depth,
                in_elem,
            ),

            Node::Col(col) => self.compile_container(
                col.children,
                col.gap,
                false,
                col.hints,
                col.border,
                col.border_fg,
                col.title,
                parent,
                depth,
                in_elem,
            ),

            Node::If(cond) => self.compile_if(cond, parent, depth, in_elem),
            Node::Switch(switch) => self.compile_switch(switch, parent, depth, in_elem),
            Node::ForEach(for_each) => self.compile_for_each(for_each, parent, depth),
            Node::SelectionList(list) => self.compile_selection_list(list, parent, depth),

            Node::Box(boxed) => {
                let idx = self.add_op(Op::new(OpKind::Layout(boxed.arrange), parent), depth)?;
                let child_start = self.ops.len() as i16;
                for child in boxed.children {
                    self.compile(child, idx, depth + 1, in_elem)?;
                }
                let child_end = self.ops.len() as i16;
                self.ops[idx as usize].child_start = child_start;
                self.ops[idx as usize].child_end = child_end;
                Ok(idx)
            }

            Node::Layer(view) => {
                let mut op = Op::new(
                    OpKind::Layer(LayerOp {
                        layer: view.layer,
                        view_w: view.view_w,
                        view_h: view.view_h,
                    }),
                    parent,
                );
                op.flex_grow = view.flex_grow;
                self.add_op(op, depth)
            }

            Node::Renderer(renderer) => {
                self.add_op(Op::new(OpKind::Custom(renderer), parent), depth)
            }

            Node::Component(component) => {
                self.compile(component.build(), parent, depth, in_elem)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn compile_container(
        &mut self,
        children: Vec<Node>,
        gap: i16,
        is_row: bool,
        hints: crate::node::FlexHints,
        border: BorderStyle,
        border_fg: Option<Color>,
        title: String,
        parent: i16,
        depth: usize,
        in_elem: bool,
    ) -> Result<i16, BuildError> {
        let mut op = Op::new(
            OpKind::Container(ContainerOp {
                is_row,
                border,
                border_fg,
                title,
            }),
            parent,
        );
        op.gap = gap;
        op.width = hints.width;
        op.height = hints.height;
        op.percent_w = hints.percent_w;
        op.flex_grow = hints.flex_grow;

        let idx = self.add_op(op, depth)?;

        let child_start = self.ops.len() as i16;
        for child in children {
            self.compile(child, idx, depth + 1, in_elem)?;
        }
        let child_end = self.ops.len() as i16;

        self.ops[idx as usize].child_start = child_start;
        self.ops[idx as usize].child_end = child_end;

        Ok(idx)
    }

    fn compile_if(
        &mut self,
        cond: Cond,
        parent: i16,
        depth: usize,
        in_elem: bool,
    ) -> Result<i16, BuildError> {
        if cond.source.element_bound() && !in_elem {
            return Err(BuildError::ElementBindingOutsideIteration);
        }

        let then_tmpl = match cond.then_node {
            Some(node) => Some(Box::new(Self::build_sub(*node, in_elem)?)),
            None => None,
        };
        let else_tmpl = match cond.else_node {
            Some(node) => Some(Box::new(Self::build_sub(*node, in_elem)?)),
            None => None,
        };

        self.add_op(
            Op::new(
                OpKind::If(IfOp {
                    cond: cond.source,
                    then_tmpl,
                    else_tmpl,
                }),
                parent,
            ),
            depth,
        )
    }

    fn compile_switch(
        &mut self,
        switch: SwitchNode,
        parent: i16,
        depth: usize,
        in_elem: bool,
    ) -> Result<i16, BuildError> {
        let mut cases = Vec::with_capacity(switch.cases.len());
        for case in switch.cases {
            cases.push(Self::build_sub(case, in_elem)?);
        }
        let default_tmpl = match switch.default_node {
            Some(node) => Some(Box::new(Self::build_sub(*node, in_elem)?)),
            None => None,
        };

        self.add_op(
            Op::new(
                OpKind::Switch(SwitchOp {
                    match_fn: switch.match_fn,
                    cases,
                    default_tmpl,
                }),
                parent,
            ),
            depth,
        )
    }

    fn compile_for_each(
        &mut self,
        for_each: ForEach,
        parent: i16,
        depth: usize,
    ) -> Result<i16, BuildError> {
        let body = Self::build_sub(*for_each.body, true)?;

        self.add_op(
            Op::new(
                OpKind::ForEach(ForEachOp {
                    items: for_each.items,
                    body: Box::new(body),
                    item_geoms: Vec::new(),
                }),
                parent,
            ),
            depth,
        )
    }

    fn compile_selection_list(
        &mut self,
        list: SelectionList,
        parent: i16,
        depth: usize,
    ) -> Result<i16, BuildError> {
        let body = Self::build_sub(*list.body, true)?;

        let marker = if list.marker.is_empty() {
            DEFAULT_MARKER.to_owned()
        } else {
            list.marker
        };
        let marker_width = cell_width(&marker);

        self.add_op(
            Op::new(
                OpKind::SelectionList(ListOp {
                    items: list.items,
                    body: Some(Box::new(body)),
                    selected: list.selected,
                    offset: list.offset,
                    marker,
                    marker_width,
                    max_visible: list.max_visible,
                }),
                parent,
            ),
            depth,
        )
    }
}
