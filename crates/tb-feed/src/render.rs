//! Summary line and tooltip rendering.
//!
//! Both are pure functions of the [`ResultTable`] and use Pango markup, which
//! both supported status bars understand.
//!
//! ```text
//! line:    BTC 29728.55 <span font="sans 6" color="#ee4444">-1.2%</span><span color="#888888"> | </span>Si ?
//! tooltip: .         BTC       Si
//!          open      <span color="#ee4444">30100.00  </span>?
//!          ...
//! ```

use tb_core::{Quote, ResultTable};

/// Markup color for a positive change.
pub const POSITIVE_COLOR: &str = "33aa33";
/// Markup color for a zero or negative change.
pub const NEGATIVE_COLOR: &str = "ee4444";
/// Separator between symbols in the summary line.
pub const SEPARATOR: &str = r##"<span color="#888888"> | </span>"##;
/// Width of every tooltip column.
pub const COLUMN_WIDTH: usize = 10;

/// One cycle's rendered output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Inline summary shown in the bar.
    pub line: String,
    /// Multi-line fixed-width table shown on hover.
    pub tooltip: String,
}

/// Render both parts of a [`Frame`].
pub fn render_frame(table: &ResultTable) -> Frame {
    Frame {
        line: render_line(table),
        tooltip: render_tooltip(table),
    }
}

fn color_of(quote: &Quote) -> &'static str {
    if quote.is_up() { POSITIVE_COLOR } else { NEGATIVE_COLOR }
}

/// `SYMBOL LAST CHANGE%` for one symbol, or `SYMBOL ?` when absent.
pub fn render_fragment(symbol: &str, quote: Option<&Quote>) -> String {
    let Some(q) = quote else {
        return format!("{symbol} ?");
    };
    let sign = if q.is_up() { "+" } else { "" };
    format!(
        r##"{symbol} {:.2} <span font="sans 6" color="#{}">{sign}{:.1}%</span>"##,
        q.last_price(),
        color_of(q),
        q.change_percent(),
    )
}

/// Fragments for every entry, in position order, joined by [`SEPARATOR`].
pub fn render_line(table: &ResultTable) -> String {
    table
        .iter()
        .map(|e| render_fragment(&e.symbol.display_symbol, e.quote.as_ref()))
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

type Field = fn(&Quote) -> f64;

const TOOLTIP_ROWS: [(&str, Field); 5] = [
    ("open", Quote::open_price),
    ("low", Quote::low_price),
    ("high", Quote::high_price),
    ("last", Quote::last_price),
    ("change%", Quote::change_percent),
];

/// Header row of symbols, then one row per quote field, one column per
/// symbol. Cells are left-justified to [`COLUMN_WIDTH`] characters.
pub fn render_tooltip(table: &ResultTable) -> String {
    let w = COLUMN_WIDTH;
    let mut out = format!("{:<w$}", ".");
    for entry in table {
        out.push_str(&format!("{:<w$}", entry.symbol.display_symbol));
    }
    for (title, field) in TOOLTIP_ROWS {
        out.push('\n');
        out.push_str(&format!("{title:<w$}"));
        for entry in table {
            match &entry.quote {
                Some(q) => out.push_str(&format!(
                    r##"<span color="#{}">{:<w$.2}</span>"##,
                    color_of(q),
                    field(q),
                )),
                None => out.push_str(&format!("{:<w$}", "?")),
            }
        }
    }
    out
}
