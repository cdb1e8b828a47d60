use std::fmt::Display;
use std::io::{self, Write};

use crate::series::{Frame, FrameSeries};

/// Column order of [`write_csv`].
pub const CSV_HEADER: &str = "frame_number,timestamp,version,gear_state,vehicle_speed_mps,accelerator_pedal_position,steering_wheel_angle,blinker_on_left,blinker_on_right,brake_applied,autopilot_state,latitude_deg,longitude_deg,heading_deg,linear_acceleration_x,linear_acceleration_y,linear_acceleration_z";

fn fixed<T: Into<f64>>(v: Option<T>, decimals: usize) -> String {
    v.map(|v| format!("{:.*}", decimals, v.into()))
        .unwrap_or_default()
}

fn plain<T: Display>(v: Option<T>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

fn csv_row(frame: &Frame) -> String {
    let r = frame.record();
    [
        frame.index().to_string(),
        format!("{:.4}", frame.timestamp()),
        plain(r.version),
        plain(r.gear_state.map(|g| g.mnemonic())),
        fixed(r.vehicle_speed_mps, 2),
        fixed(r.accelerator_pedal_position, 2),
        fixed(r.steering_wheel_angle, 2),
        plain(r.blinker_on_left),
        plain(r.blinker_on_right),
        plain(r.brake_applied),
        plain(r.autopilot_state.map(|a| a.mnemonic())),
        fixed(r.latitude_deg, 6),
        fixed(r.longitude_deg, 6),
        fixed(r.heading_deg, 2),
        fixed(r.linear_acceleration_mps2_x, 4),
        fixed(r.linear_acceleration_mps2_y, 4),
        fixed(r.linear_acceleration_mps2_z, 4),
    ]
    .join(",")
}

/// Write the series as CSV: [`CSV_HEADER`], then one row per frame.
///
/// Absent fields are empty cells. Every value is a number, a bool, or an enum mnemonic,
/// so nothing needs quoting.
pub fn write_csv<W: Write>(series: &FrameSeries, mut out: W) -> io::Result<()> {
    writeln!(out, "{CSV_HEADER}")?;
    for frame in series {
        writeln!(out, "{}", csv_row(frame))?;
    }
    Ok(())
}

pub fn to_csv_string(series: &FrameSeries) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for frame in series {
        out.push_str(&csv_row(frame));
        out.push('\n');
    }
    out
}

/// Pretty-printed JSON array of frames.
pub fn write_json<W: Write>(series: &FrameSeries, mut out: W) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut out, series.frames())?;
    writeln!(out)
}
