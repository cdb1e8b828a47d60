use prost::bytes::Buf;
// Same wire primitives prost-generated message code decodes with.
use prost::encoding::{decode_key, decode_varint, WireType};
use serde::Serialize;

/// Transmission state reported by the recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Gear {
    Park,
    Drive,
    Reverse,
    Neutral,
}

impl Gear {
    pub fn from_wire(v: u64) -> Option<Self> {
        match v {
            0 => Some(Gear::Park),
            1 => Some(Gear::Drive),
            2 => Some(Gear::Reverse),
            3 => Some(Gear::Neutral),
            _ => None,
        }
    }

    /// Short label used in exports (`P`, `D`, `R`, `N`).
    pub fn mnemonic(self) -> &'static str {
        match self {
            Gear::Park => "P",
            Gear::Drive => "D",
            Gear::Reverse => "R",
            Gear::Neutral => "N",
        }
    }
}

/// Driver-assistance mode active for the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AutopilotState {
    None,
    SelfDriving,
    Autosteer,
    TrafficAwareCruiseControl,
}

impl AutopilotState {
    pub fn from_wire(v: u64) -> Option<Self> {
        match v {
            0 => Some(AutopilotState::None),
            1 => Some(AutopilotState::SelfDriving),
            2 => Some(AutopilotState::Autosteer),
            3 => Some(AutopilotState::TrafficAwareCruiseControl),
            _ => None,
        }
    }

    /// Short label used in exports (`Off`, `FSD`, `Autosteer`, `TACC`).
    pub fn mnemonic(self) -> &'static str {
        match self {
            AutopilotState::None => "Off",
            AutopilotState::SelfDriving => "FSD",
            AutopilotState::Autosteer => "Autosteer",
            AutopilotState::TrafficAwareCruiseControl => "TACC",
        }
    }
}

/// One telemetry message as embedded in an SEI NAL unit.
///
/// Every field is optional: the recorder omits fields freely, and an absent field carries
/// no information (it is not zero).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TelemetryRecord {
    pub version: Option<u32>,
    pub gear_state: Option<Gear>,
    /// Recorder-side frame counter.
    pub frame_seq_no: Option<u64>,
    /// Speed in m/s. The sign is not reliable; use the magnitude.
    pub vehicle_speed_mps: Option<f32>,
    pub accelerator_pedal_position: Option<f32>,
    /// Steering wheel angle in degrees, not clamped to one turn.
    pub steering_wheel_angle: Option<f32>,
    pub blinker_on_left: Option<bool>,
    pub blinker_on_right: Option<bool>,
    pub brake_applied: Option<bool>,
    pub autopilot_state: Option<AutopilotState>,
    pub latitude_deg: Option<f64>,
    pub longitude_deg: Option<f64>,
    pub heading_deg: Option<f64>,
    pub linear_acceleration_mps2_x: Option<f64>,
    pub linear_acceleration_mps2_y: Option<f64>,
    pub linear_acceleration_mps2_z: Option<f64>,
}

impl TelemetryRecord {
    /// Records without a version are not telemetry frames.
    pub fn is_valid(&self) -> bool {
        self.version.is_some()
    }
}

// -----------------------------
// Protobuf decoding
// -----------------------------

/// Accumulates fields while walking one message, then yields the finished record.
#[derive(Default)]
struct RecordBuilder {
    record: TelemetryRecord,
}

impl RecordBuilder {
    fn varint(&mut self, tag: u32, v: u64) -> bool {
        let r = &mut self.record;
        match tag {
            1 => r.version = Some(v as u32),
            2 => {
                r.gear_state = Gear::from_wire(v);
                if r.gear_state.is_none() {
                    log::debug!("telemetry: unknown gear value {v}");
                }
            }
            3 => r.frame_seq_no = Some(v),
            7 => r.blinker_on_left = Some(v != 0),
            8 => r.blinker_on_right = Some(v != 0),
            9 => r.brake_applied = Some(v != 0),
            10 => {
                r.autopilot_state = AutopilotState::from_wire(v);
                if r.autopilot_state.is_none() {
                    log::debug!("telemetry: unknown autopilot value {v}");
                }
            }
            _ => return false,
        }
        true
    }

    fn fixed32(&mut self, tag: u32, v: f32) -> bool {
        let r = &mut self.record;
        match tag {
            4 => r.vehicle_speed_mps = Some(v),
            5 => r.accelerator_pedal_position = Some(v),
            6 => r.steering_wheel_angle = Some(v),
            _ => return false,
        }
        true
    }

    fn fixed64(&mut self, tag: u32, v: f64) -> bool {
        let r = &mut self.record;
        match tag {
            11 => r.latitude_deg = Some(v),
            12 => r.longitude_deg = Some(v),
            13 => r.heading_deg = Some(v),
            14 => r.linear_acceleration_mps2_x = Some(v),
            15 => r.linear_acceleration_mps2_y = Some(v),
            16 => r.linear_acceleration_mps2_z = Some(v),
            _ => return false,
        }
        true
    }

    fn finish(self) -> TelemetryRecord {
        self.record
    }
}

/// Decode one field into the builder. Returns `None` when the field is truncated or
/// cannot be skipped, which ends decoding.
fn decode_field(buf: &mut &[u8], builder: &mut RecordBuilder) -> Option<()> {
    let (tag, wire_type) = decode_key(buf).ok()?;
    match wire_type {
        WireType::Varint => {
            // 64-bit accumulator; narrower fields are cut down afterwards
            let v = decode_varint(buf).ok()?;
            if !builder.varint(tag, v) {
                log::trace!("telemetry: skipped varint field {tag}");
            }
        }
        WireType::ThirtyTwoBit => {
            if buf.remaining() < 4 {
                return None;
            }
            let v = buf.get_f32_le();
            if !builder.fixed32(tag, v) {
                log::trace!("telemetry: skipped 32-bit field {tag}");
            }
        }
        WireType::SixtyFourBit => {
            if buf.remaining() < 8 {
                return None;
            }
            let v = buf.get_f64_le();
            if !builder.fixed64(tag, v) {
                log::trace!("telemetry: skipped 64-bit field {tag}");
            }
        }
        WireType::LengthDelimited => {
            let len = decode_varint(buf).ok()?;
            if len > buf.remaining() as u64 {
                return None;
            }
            buf.advance(len as usize);
            log::trace!("telemetry: skipped length-delimited field {tag}");
        }
        WireType::StartGroup | WireType::EndGroup => {
            log::trace!("telemetry: group wire type on field {tag}, stopping");
            return None;
        }
    }
    Some(())
}

/// Decode a telemetry protobuf message.
///
/// Unknown fields, and known fields arriving with an unexpected wire type, are skipped.
/// Decoding stops at the first truncated or undecodable field; everything decoded before
/// it is kept.
pub fn decode_record(payload: &[u8]) -> TelemetryRecord {
    let mut buf = payload;
    let mut builder = RecordBuilder::default();
    while buf.has_remaining() {
        if decode_field(&mut buf, &mut builder).is_none() {
            log::trace!(
                "telemetry: stopped with {} undecoded bytes",
                buf.remaining()
            );
            break;
        }
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn varint(mut n: u64) -> Vec<u8> {
        let mut out = Vec::new();
        while n >= 0x80 {
            out.push((n as u8 & 0x7F) | 0x80);
            n >>= 7;
        }
        out.push(n as u8);
        out
    }

    fn key(tag: u32, wire: u8) -> u8 {
        assert!(tag < 16);
        ((tag << 3) | wire as u32) as u8
    }

    fn long_key(tag: u32, wire: u8) -> Vec<u8> {
        varint(((tag << 3) | wire as u32) as u64)
    }

    #[test]
    fn decodes_each_wire_type() {
        let mut p = vec![key(1, 0), 1, key(2, 0), 1, key(4, 5)];
        p.extend_from_slice(&12.5f32.to_le_bytes());
        p.push(key(9, 0));
        p.push(1);
        p.push(key(11, 1));
        p.extend_from_slice(&37.25f64.to_le_bytes());

        let r = decode_record(&p);
        assert_eq!(r.version, Some(1));
        assert_eq!(r.gear_state, Some(Gear::Drive));
        assert_eq!(r.vehicle_speed_mps, Some(12.5));
        assert_eq!(r.brake_applied, Some(true));
        assert_eq!(r.latitude_deg, Some(37.25));
        assert_eq!(r.longitude_deg, None);
        assert!(r.is_valid());
    }

    #[test]
    fn zero_values_are_present_not_absent() {
        let r = decode_record(&[key(1, 0), 0, key(7, 0), 0]);
        assert_eq!(r.version, Some(0));
        assert_eq!(r.blinker_on_left, Some(false));
        assert_eq!(r.blinker_on_right, None);
    }

    #[test]
    fn frame_seq_no_uses_64_bits() {
        // 2^40 + 5
        let v: u64 = (1 << 40) + 5;
        let mut p = vec![key(3, 0)];
        p.extend(varint(v));
        assert_eq!(decode_record(&p).frame_seq_no, Some(v));
    }

    #[test]
    fn unknown_fields_are_skipped() {
        let mut p = long_key(20, 0);
        p.extend_from_slice(&[0x96, 0x01]);
        p.extend(long_key(21, 2));
        p.extend_from_slice(&[3, 0xAA, 0xBB, 0xCC]);
        p.extend(long_key(22, 5));
        p.extend_from_slice(&[0; 4]);
        p.extend(long_key(23, 1));
        p.extend_from_slice(&[0; 8]);
        p.extend_from_slice(&[key(1, 0), 2]);
        let r = decode_record(&p);
        assert_eq!(r.version, Some(2));
    }

    #[test]
    fn known_field_with_wrong_wire_type_is_skipped() {
        // speed sent as varint
        let p = [key(4, 0), 10, key(1, 0), 1];
        let r = decode_record(&p);
        assert_eq!(r.vehicle_speed_mps, None);
        assert_eq!(r.version, Some(1));
    }

    #[test]
    fn truncated_trailing_field_is_dropped() {
        let mut p = vec![key(1, 0), 1, key(12, 1)];
        p.extend_from_slice(&[0x11, 0x22, 0x33]);
        let r = decode_record(&p);
        assert_eq!(r.version, Some(1));
        assert_eq!(r.longitude_deg, None);

        // truncated varint
        let r = decode_record(&[key(1, 0), 1, key(3, 0), 0xFF]);
        assert_eq!(r.frame_seq_no, None);

        // length prefix longer than the rest
        let mut p = vec![key(1, 0), 1];
        p.extend(long_key(30, 2));
        p.extend_from_slice(&[9, 0]);
        let r = decode_record(&p);
        assert_eq!(r.version, Some(1));
    }

    #[test]
    fn group_wire_type_stops_decoding() {
        // field 1 as start-group, then a field that is never reached
        let r = decode_record(&[key(1, 0), 1, 0x0B, key(3, 0), 9]);
        assert_eq!(r.version, Some(1));
        assert_eq!(r.frame_seq_no, None);

        let r = decode_record(&[key(1, 0), 1, key(2, 4)]);
        assert_eq!(r.version, Some(1));
    }

    #[test]
    fn zero_tag_stops_decoding() {
        let r = decode_record(&[key(1, 0), 1, 0x00, key(3, 0), 9]);
        assert_eq!(r.version, Some(1));
        assert_eq!(r.frame_seq_no, None);
        assert!(r.is_valid());
    }

    #[test]
    fn unknown_enum_value_is_absent() {
        let r = decode_record(&[key(1, 0), 1, key(2, 0), 9, key(10, 0), 3]);
        assert_eq!(r.gear_state, None);
        assert_eq!(
            r.autopilot_state,
            Some(AutopilotState::TrafficAwareCruiseControl)
        );
    }

    #[test]
    fn empty_payload_is_not_valid() {
        let r = decode_record(&[]);
        assert_eq!(r, TelemetryRecord::default());
        assert!(!r.is_valid());
    }

    #[test]
    fn mnemonics() {
        assert_eq!(Gear::Reverse.mnemonic(), "R");
        assert_eq!(AutopilotState::None.mnemonic(), "Off");
        assert_eq!(AutopilotState::SelfDriving.mnemonic(), "FSD");
    }
}
