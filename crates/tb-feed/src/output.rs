//! Status-bar output protocols.
//!
//! | Format    | Consumer          | Shape                                        |
//! |-----------|-------------------|----------------------------------------------|
//! | `waybar`  | waybar `custom/*` | one JSON object per line                     |
//! | `awesome` | awesome widget    | `text`, `tooltipstart`, `tooltip` lines, TSV |

use std::io::Write;

use chrono::{DateTime, Local};
use serde::Serialize;
use tb_core::TbError;
use tb_core::config::OutputFormat;

use crate::render::Frame;

/// Constant `alt` value of the waybar object.
pub const WAYBAR_ALT: &str = "shiftdel";

/// Markup color of the timestamp row in the awesome tooltip.
pub const TIMESTAMP_COLOR: &str = "555555";

#[derive(Serialize)]
struct WaybarLine<'a> {
    text: &'a str,
    tooltip: &'a str,
    alt: &'a str,
}

/// Encode one frame in `format`, including the trailing newline.
///
/// `at` is only used by the awesome format.
pub fn encode(format: OutputFormat, frame: &Frame, at: DateTime<Local>) -> Result<String, TbError> {
    match format {
        OutputFormat::Waybar => {
            let line = WaybarLine {
                text: &frame.line,
                tooltip: &frame.tooltip,
                alt: WAYBAR_ALT,
            };
            let mut out = serde_json::to_string(&line).map_err(|e| TbError::Output(e.to_string()))?;
            out.push('\n');
            Ok(out)
        }
        OutputFormat::Awesome => {
            let mut out = format!("text\t{}\ntooltipstart\n", frame.line);
            out.push_str(&format!(
                "tooltip\t<span color=\"#{TIMESTAMP_COLOR}\">{}</span>\n",
                at.format("%Y-%m-%d %H:%M:%S%.6f")
            ));
            for row in frame.tooltip.split('\n') {
                out.push_str("tooltip\t");
                out.push_str(row);
                out.push('\n');
            }
            Ok(out)
        }
    }
}

/// Destination for rendered frames.
pub trait FrameSink: Send {
    fn emit(&mut self, frame: &Frame, at: DateTime<Local>) -> Result<(), TbError>;
}

/// Writes encoded frames to any `Write` and flushes after each one, so the
/// status bar sees updates immediately even through a pipe.
pub struct WriterSink<W: Write + Send> {
    format: OutputFormat,
    out: W,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(format: OutputFormat, out: W) -> Self {
        Self { format, out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> FrameSink for WriterSink<W> {
    fn emit(&mut self, frame: &Frame, at: DateTime<Local>) -> Result<(), TbError> {
        let text = encode(self.format, frame, at)?;
        self.out.write_all(text.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}
