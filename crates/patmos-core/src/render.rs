//! Namelist-style rendering of coefficient blocks.
//!
//! A block for one satellite looks like:
//!
//! ```text
//! M02
//! 0.1234 0.5678 0.9012  ! ch1 low gain
//! 1.1000 2.2000 3.3000  ! ch1 high gain
//! 40.0000 500.0000  ! ch1 gain switch, ch1 dark count
//! ... ch2, ch3a ...
//!
//! ```
//!
//! Numbers use `%6.4f` semantics. Downstream readers parse everything before
//! the `!`, so the layout must stay byte-for-byte stable.

use std::io::Write;

use serde::Serialize;
use tracing::debug;

use crate::coeffs::{
    self, Channel, ChannelCoefficients, Gain, SatelliteCoefficients, View,
};
use crate::error::Result;
use crate::store::CoeffStore;

/// Lines per rendered block, blank terminator included
pub const BLOCK_LINES: usize = 11;

/// Fixed-point, 4 decimals, minimum width 6.
#[must_use]
pub fn format_coefficient(value: f64) -> String {
    format!("{value:6.4}")
}

/// Values joined by single spaces
#[must_use]
pub fn format_group(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format_coefficient(*v))
        .collect::<Vec<_>>()
        .join(" ")
}

fn annotated(values: &[f64], note: &str) -> String {
    format!("{}  ! {note}", format_group(values))
}

/// Trailing comment for a gain triple, e.g. `ch2 high gain`
#[must_use]
pub fn gain_note(channel: Channel, gain: Gain) -> String {
    format!("{channel} {} gain", gain.label())
}

/// Trailing comment for a channel's dark count/gain switch line.
///
/// ch3a names the pair "dark count, gain switch" while ch1/ch2 say "gain
/// switch, dark count". The values are emitted in the same column order for
/// all three channels; only the label differs. Legacy consumers match on it.
#[must_use]
pub fn switch_note(channel: Channel) -> String {
    match channel {
        Channel::Ch1 | Channel::Ch2 => format!("{channel} gain switch, {channel} dark count"),
        Channel::Ch3a => format!("{channel} dark count, {channel} gain switch"),
    }
}

fn channel_lines(channel: Channel, coeffs: &ChannelCoefficients) -> [String; 3] {
    [
        annotated(coeffs.triple(Gain::Low), &gain_note(channel, Gain::Low)),
        annotated(coeffs.triple(Gain::High), &gain_note(channel, Gain::High)),
        annotated(&coeffs.switch_pair(), &switch_note(channel)),
    ]
}

/// Render a full block: header, three lines per channel, blank line.
#[must_use]
pub fn render_block(record: &SatelliteCoefficients) -> Vec<String> {
    let mut lines = Vec::with_capacity(BLOCK_LINES);
    lines.push(record.id.to_uppercase());
    for channel in Channel::ALL {
        lines.extend(channel_lines(channel, record.channel(channel)));
    }
    lines.push(String::new());
    lines
}

/// Look up and render one satellite.
///
/// Nothing is rendered unless every lookup succeeded.
pub fn render(store: &CoeffStore, view: &View, id: &str) -> Result<Vec<String>> {
    let record = coeffs::read_coefficients(store, view, id)?;
    Ok(render_block(&record))
}

/// The six gain lines only, one lookup per triple.
///
/// This is the short listing of the sample-access script: no header, no
/// dark count/gain switch lines and no blank terminator.
pub fn render_gain_lines(store: &CoeffStore, view: &View, id: &str) -> Result<Vec<String>> {
    let mut lines = Vec::with_capacity(Channel::ALL.len() * Gain::ALL.len());
    for channel in Channel::ALL {
        for gain in Gain::ALL {
            let triple = coeffs::read_triple(store, view, id, channel, gain)?;
            lines.push(annotated(&triple, &gain_note(channel, gain)));
        }
    }
    Ok(lines)
}

/// Write lines, each newline-terminated.
pub fn write_lines<W: Write>(out: &mut W, lines: &[String]) -> Result<()> {
    for line in lines {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

/// Render every satellite of a view to `out`, in the view's row order.
///
/// Stops at the first error. Blocks are fully rendered before being written,
/// so a failing satellite leaves nothing behind. Returns the number of
/// blocks written.
pub fn dump_view<W: Write>(store: &CoeffStore, view: &View, out: &mut W) -> Result<usize> {
    let ids = coeffs::list_satellite_ids(store, view)?;
    for id in &ids {
        let block = render(store, view, id)?;
        write_lines(out, &block)?;
        debug!(view = %view, sat_id = %id, "rendered coefficient block");
    }
    out.flush()?;
    Ok(ids.len())
}

/// JSON document for one or more records
#[derive(Debug, Serialize)]
struct JsonDump<'a> {
    view: &'a View,
    satellites: &'a [SatelliteCoefficients],
}

/// Read every satellite of a view and write them as one JSON document.
pub fn dump_view_json<W: Write>(store: &CoeffStore, view: &View, out: &mut W) -> Result<usize> {
    let records = coeffs::list_satellite_ids(store, view)?
        .iter()
        .map(|id| coeffs::read_coefficients(store, view, id))
        .collect::<Result<Vec<_>>>()?;
    write_json(
        out,
        &JsonDump {
            view,
            satellites: &records,
        },
    )?;
    Ok(records.len())
}

/// Pretty JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SatelliteCoefficients {
        let channel = |base: f64| ChannelCoefficients {
            low: [base, base + 0.5, base + 0.25],
            high: [base * 2.0, -1.5, 12.345_67],
            dark_count: 40.0,
            gain_switch: 500.0,
        };
        SatelliteCoefficients {
            id: "m02".into(),
            view: View::new(View::PATMOS_2013),
            ch1: ChannelCoefficients {
                low: [0.1234, 0.5678, 0.9012],
                ..channel(0.1)
            },
            ch2: channel(0.2),
            ch3a: channel(0.3),
        }
    }

    #[test]
    fn formats_like_printf_six_four() {
        assert_eq!(format_coefficient(0.1234), "0.1234");
        assert_eq!(format_coefficient(1.0), "1.0000");
        assert_eq!(format_coefficient(-1.5), "-1.5000");
        assert_eq!(format_coefficient(500.0), "500.0000");
        assert_eq!(format_coefficient(0.000_04), "0.0000");
        assert_eq!(format_coefficient(1e-7), "0.0000");
    }

    #[test]
    fn block_layout() {
        let lines = render_block(&sample());
        assert_eq!(lines.len(), BLOCK_LINES);
        assert_eq!(lines[0], "M02");
        assert_eq!(lines[1], "0.1234 0.5678 0.9012  ! ch1 low gain");
        assert_eq!(lines[2], "0.2000 -1.5000 12.3457  ! ch1 high gain");
        assert_eq!(lines[3], "40.0000 500.0000  ! ch1 gain switch, ch1 dark count");
        assert!(lines[4].ends_with("  ! ch2 low gain"));
        assert!(lines[5].ends_with("  ! ch2 high gain"));
        assert_eq!(lines[6], "40.0000 500.0000  ! ch2 gain switch, ch2 dark count");
        assert!(lines[7].ends_with("  ! ch3a low gain"));
        assert!(lines[8].ends_with("  ! ch3a high gain"));
        assert_eq!(lines[9], "40.0000 500.0000  ! ch3a dark count, ch3a gain switch");
        assert_eq!(lines[10], "");
    }

    #[test]
    fn switch_note_asymmetry_is_label_only() {
        assert_eq!(switch_note(Channel::Ch1), "ch1 gain switch, ch1 dark count");
        assert_eq!(switch_note(Channel::Ch2), "ch2 gain switch, ch2 dark count");
        assert_eq!(switch_note(Channel::Ch3a), "ch3a dark count, ch3a gain switch");

        let record = sample();
        let lines = render_block(&record);
        let numbers = |line: &str| line.split("  !").next().unwrap().to_string();
        assert_eq!(numbers(&lines[3]), numbers(&lines[9]));
    }

    #[test]
    fn write_lines_terminates_each_line() {
        let mut out = Vec::new();
        write_lines(&mut out, &["A".to_string(), String::new()]).unwrap();
        assert_eq!(out, b"A\n\n");
    }

    #[test]
    fn json_uses_named_pair_fields() {
        let mut out = Vec::new();
        write_json(&mut out, &sample()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["id"], "m02");
        assert_eq!(value["view"], "patmos.2013");
        assert_eq!(value["ch3a"]["dark_count"], 40.0);
        assert_eq!(value["ch3a"]["gain_switch"], 500.0);
        assert_eq!(value["ch1"]["low"][0], 0.1234);
    }
}
