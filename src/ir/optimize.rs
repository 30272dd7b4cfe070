//! # IR Optimizer
//!
//! Every byte saved is radio time saved: a sale receipt is a handful of
//! 512-byte writes, and components emit a full style open/close around
//! each row. Three passes run in order:
//!
//! | Pass | Effect |
//! |------|--------|
//! | `drop_repeated_init` | Keep only the first `ESC @` |
//! | `settle_styles` | Emit a style change only when something is printed under it |
//! | `join_text` | Fuse consecutive text ops into one |
//!
//! `settle_styles` holds alignment, emphasis and size changes until the
//! next non-style op, then emits only the attributes that differ from what
//! the printer already has. A bold row followed by another bold row keeps
//! bold on instead of toggling it off and on again.

use super::ops::{Op, Program, StyleState};
use crate::protocol::text::Alignment;

impl Program {
    /// Apply all optimization passes.
    pub fn optimize(self) -> Self {
        let ops = drop_repeated_init(self.ops);
        let ops = settle_styles(ops);
        let ops = join_text(ops);
        Program { ops }
    }
}

fn drop_repeated_init(ops: Vec<Op>) -> Vec<Op> {
    let mut seen = false;
    ops.into_iter()
        .filter(|op| !matches!(op, Op::Init) || !std::mem::replace(&mut seen, true))
        .collect()
}

/// Style changes requested since the last printing op.
#[derive(Debug, Default)]
struct Pending {
    alignment: Option<Alignment>,
    bold: Option<bool>,
    size: Option<(u8, u8)>,
}

impl Pending {
    /// Append the changes that differ from `state`, in alignment, bold, size
    /// order, and fold them into `state`.
    fn flush(&mut self, state: &mut StyleState, out: &mut Vec<Op>) {
        if let Some(a) = self.alignment.take().filter(|a| *a != state.alignment) {
            state.alignment = a;
            out.push(Op::SetAlign(a));
        }
        if let Some(b) = self.bold.take().filter(|b| *b != state.bold) {
            state.bold = b;
            out.push(Op::SetBold(b));
        }
        if let Some((height, width)) = self
            .size
            .take()
            .filter(|&(h, w)| (h, w) != (state.height_mult, state.width_mult))
        {
            state.height_mult = height;
            state.width_mult = width;
            out.push(Op::SetSize { height, width });
        }
    }
}

fn settle_styles(ops: Vec<Op>) -> Vec<Op> {
    let mut out = Vec::with_capacity(ops.len());
    let mut state = StyleState::default();
    let mut pending = Pending::default();

    for op in ops {
        match op {
            Op::SetAlign(a) => pending.alignment = Some(a),
            Op::SetBold(b) => pending.bold = Some(b),
            Op::SetSize { height, width } => pending.size = Some((height, width)),
            Op::Init => {
                // Everything requested before a reset is void
                pending = Pending::default();
                state = StyleState::default();
                out.push(op);
            }
            other => {
                pending.flush(&mut state, &mut out);
                out.push(other);
            }
        }
    }

    // Trailing changes with nothing printed after them are dropped
    out
}

fn join_text(ops: Vec<Op>) -> Vec<Op> {
    let mut out: Vec<Op> = Vec::with_capacity(ops.len());
    for op in ops {
        if let (Some(Op::Text(prev)), Op::Text(next)) = (out.last_mut(), &op) {
            prev.push_str(next);
            continue;
        }
        out.push(op);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Columns, ComponentExt, Divider, Receipt, Text};
    use crate::protocol::commands;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> Op {
        Op::Text(s.into())
    }

    const DOUBLE: Op = Op::SetSize { height: 1, width: 0 };
    const NORMAL: Op = Op::SetSize { height: 0, width: 0 };

    #[test]
    fn test_only_first_init_survives() {
        let ops = vec![Op::Init, text("a"), Op::Init, text("b"), Op::Init];
        assert_eq!(drop_repeated_init(ops), vec![Op::Init, text("a"), text("b")]);
    }

    #[test]
    fn test_defaults_after_init_are_not_sent() {
        let ops = vec![
            Op::Init,
            Op::SetAlign(Alignment::Left),
            Op::SetBold(false),
            NORMAL,
            text("Cajero: Laura"),
        ];
        assert_eq!(settle_styles(ops), vec![Op::Init, text("Cajero: Laura")]);
    }

    #[test]
    fn test_consecutive_bold_rows_keep_bold_on() {
        // Two bold rows, each closing its own style
        let ops = vec![
            Op::SetBold(true),
            text("TOTAL:"),
            Op::Newline,
            Op::SetBold(false),
            Op::SetBold(true),
            text("PAGADO:"),
            Op::Newline,
            Op::SetBold(false),
            text("Cambio:"),
        ];
        assert_eq!(
            settle_styles(ops),
            vec![
                Op::SetBold(true),
                text("TOTAL:"),
                Op::Newline,
                text("PAGADO:"),
                Op::Newline,
                Op::SetBold(false),
                text("Cambio:"),
            ]
        );
    }

    #[test]
    fn test_size_reset_reaches_the_printer() {
        let ops = vec![DOUBLE, text("LA AREPERA"), Op::Newline, NORMAL, text("Calle 10")];
        let out = settle_styles(ops);
        assert_eq!(out[3], NORMAL);
        assert_eq!(out.iter().filter(|op| matches!(op, Op::SetSize { .. })).count(), 2);
    }

    #[test]
    fn test_style_flushed_before_feed_and_cut() {
        // A cut is not text, but the state must be settled before it
        let ops = vec![Op::SetAlign(Alignment::Center), Op::Feed { lines: 3 }, Op::Cut { partial: false }];
        assert_eq!(
            settle_styles(ops),
            vec![Op::SetAlign(Alignment::Center), Op::Feed { lines: 3 }, Op::Cut { partial: false }]
        );
    }

    #[test]
    fn test_init_voids_pending_styles() {
        let ops = vec![Op::SetBold(true), Op::Init, text("x")];
        assert_eq!(settle_styles(ops), vec![Op::Init, text("x")]);
    }

    #[test]
    fn test_trailing_styles_dropped() {
        let ops = vec![text("x"), Op::SetBold(true)];
        assert_eq!(settle_styles(ops), vec![text("x")]);
    }

    #[test]
    fn test_join_text_stops_at_newline() {
        let ops = vec![text("2x "), text("Arepa"), Op::Newline, text("Cód: A1")];
        assert_eq!(
            join_text(ops),
            vec![text("2x Arepa"), Op::Newline, text("Cód: A1")]
        );
    }

    #[test]
    fn test_totals_block_is_smaller_and_prints_the_same() {
        let block = Receipt::new()
            .child(Columns::new("Subtotal:", "$30.000"))
            .child(Divider::dashed())
            .child(Columns::new("TOTAL:", "$30.000").bold().double_height())
            .child(Columns::new("PAGADO:", "$30.000").bold().double_height())
            .child(Divider::dashed())
            .child(Text::new("¡Gracias!").center())
            .cut();

        let raw = block.compile();
        let optimized = raw.clone().optimize();

        assert_eq!(optimized.to_plain_text(32), raw.to_plain_text(32));
        assert!(optimized.to_bytes().len() < raw.to_bytes().len());
        assert!(optimized.to_bytes().ends_with(&commands::cut_full()));

        // The two double-height rows share one size/bold switch
        let bold_on = optimized.iter().filter(|op| **op == Op::SetBold(true)).count();
        assert_eq!(bold_on, 1);
    }
}
