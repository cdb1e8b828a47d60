use crate::series::{Frame, FrameSeries};
use crate::telemetry::TelemetryRecord;

fn lerp_f64(a: Option<f64>, b: Option<f64>, frac: f64) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a + (b - a) * frac),
        (a, b) => a.or(b),
    }
}

fn lerp_f32(a: Option<f32>, b: Option<f32>, frac: f64) -> Option<f32> {
    lerp_f64(a.map(f64::from), b.map(f64::from), frac).map(|v| v as f32)
}

fn blend(before: &TelemetryRecord, after: &TelemetryRecord, frac: f64) -> TelemetryRecord {
    TelemetryRecord {
        // discrete: always the earlier frame
        version: before.version,
        gear_state: before.gear_state,
        frame_seq_no: before.frame_seq_no,
        blinker_on_left: before.blinker_on_left,
        blinker_on_right: before.blinker_on_right,
        brake_applied: before.brake_applied,
        autopilot_state: before.autopilot_state,

        vehicle_speed_mps: lerp_f32(before.vehicle_speed_mps, after.vehicle_speed_mps, frac),
        accelerator_pedal_position: lerp_f32(
            before.accelerator_pedal_position,
            after.accelerator_pedal_position,
            frac,
        ),
        steering_wheel_angle: lerp_f32(
            before.steering_wheel_angle,
            after.steering_wheel_angle,
            frac,
        ),
        latitude_deg: lerp_f64(before.latitude_deg, after.latitude_deg, frac),
        longitude_deg: lerp_f64(before.longitude_deg, after.longitude_deg, frac),
        heading_deg: lerp_f64(before.heading_deg, after.heading_deg, frac),
        linear_acceleration_mps2_x: lerp_f64(
            before.linear_acceleration_mps2_x,
            after.linear_acceleration_mps2_x,
            frac,
        ),
        linear_acceleration_mps2_y: lerp_f64(
            before.linear_acceleration_mps2_y,
            after.linear_acceleration_mps2_y,
            frac,
        ),
        linear_acceleration_mps2_z: lerp_f64(
            before.linear_acceleration_mps2_z,
            after.linear_acceleration_mps2_z,
            frac,
        ),
    }
}

/// Telemetry at `t` seconds.
///
/// Continuous signals (speed, pedal, steering, position, heading, acceleration) are
/// interpolated linearly between the frames around `t`; when only one of the two frames
/// carries a value it is used as is. Discrete signals (version, gear, sequence number,
/// blinkers, brake, autopilot) always come from the frame at or before `t`.
///
/// Queries before the first frame or after the last one return that frame's record
/// unchanged, as does a query landing exactly on a frame. Returns `None` only for an
/// empty series.
pub fn interpolate(series: &FrameSeries, t: f64) -> Option<TelemetryRecord> {
    let frames = series.frames();
    let first = frames.first()?;
    if frames.len() == 1 {
        return Some(first.record().clone());
    }

    // frames[..idx] have timestamp <= t
    let idx = frames.partition_point(|f| f.timestamp() <= t);
    let before: &Frame = match idx.checked_sub(1) {
        Some(i) => &frames[i],
        None => return Some(first.record().clone()),
    };
    let Some(after) = frames.get(idx) else {
        return Some(before.record().clone());
    };

    let span = after.timestamp() - before.timestamp();
    if span == 0.0 || before.timestamp() == t {
        return Some(before.record().clone());
    }
    let frac = (t - before.timestamp()) / span;
    Some(blend(before.record(), after.record(), frac))
}
