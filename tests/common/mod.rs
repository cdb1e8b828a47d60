#![allow(dead_code)]

/// Wire layout of the dashcam telemetry message, used to encode test payloads.
#[derive(Clone, PartialEq, prost::Message)]
pub struct WireRecord {
    #[prost(uint32, optional, tag = "1")]
    pub version: Option<u32>,
    #[prost(int32, optional, tag = "2")]
    pub gear_state: Option<i32>,
    #[prost(uint64, optional, tag = "3")]
    pub frame_seq_no: Option<u64>,
    #[prost(float, optional, tag = "4")]
    pub vehicle_speed_mps: Option<f32>,
    #[prost(float, optional, tag = "5")]
    pub accelerator_pedal_position: Option<f32>,
    #[prost(float, optional, tag = "6")]
    pub steering_wheel_angle: Option<f32>,
    #[prost(bool, optional, tag = "7")]
    pub blinker_on_left: Option<bool>,
    #[prost(bool, optional, tag = "8")]
    pub blinker_on_right: Option<bool>,
    #[prost(bool, optional, tag = "9")]
    pub brake_applied: Option<bool>,
    #[prost(int32, optional, tag = "10")]
    pub autopilot_state: Option<i32>,
    #[prost(double, optional, tag = "11")]
    pub latitude_deg: Option<f64>,
    #[prost(double, optional, tag = "12")]
    pub longitude_deg: Option<f64>,
    #[prost(double, optional, tag = "13")]
    pub heading_deg: Option<f64>,
    #[prost(double, optional, tag = "14")]
    pub linear_acceleration_mps2_x: Option<f64>,
    #[prost(double, optional, tag = "15")]
    pub linear_acceleration_mps2_y: Option<f64>,
    #[prost(double, optional, tag = "16")]
    pub linear_acceleration_mps2_z: Option<f64>,
}

pub fn init_logger() {
    // Ignore errors initializing the logger if tests race to configure it
    let _ignore = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .is_test(true)
        .try_init();
}

/// Insert emulation prevention bytes the way an H.264 encoder does.
pub fn add_emulation_prevention(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + data.len() / 2);
    let mut zeros = 0usize;
    for &b in data {
        if zeros >= 2 && b <= 0x03 {
            out.push(0x03);
            zeros = 0;
        }
        out.push(b);
        if b == 0x00 {
            zeros += 1;
        } else {
            zeros = 0;
        }
    }
    out
}

pub fn mp4_box(typ: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = ((payload.len() + 8) as u32).to_be_bytes().to_vec();
    out.extend_from_slice(typ);
    out.extend_from_slice(payload);
    out
}

pub fn length_prefixed(nal: &[u8]) -> Vec<u8> {
    let mut out = (nal.len() as u32).to_be_bytes().to_vec();
    out.extend_from_slice(nal);
    out
}

/// A length-prefixed SEI NAL unit carrying `record` in the recorder's framing.
pub fn telemetry_nal(record: &WireRecord) -> Vec<u8> {
    use prost::Message;

    let message = record.encode_to_vec();
    let mut rbsp = vec![0x05, (message.len() + 4).min(0xFF) as u8, 0x42, 0x42, 0x42, 0x69];
    rbsp.extend_from_slice(&message);
    rbsp.push(0x80);

    let mut nal = vec![0x06];
    nal.extend(add_emulation_prevention(&rbsp));
    length_prefixed(&nal)
}

/// A length-prefixed non-SEI slice NAL unit.
pub fn slice_nal(len: usize) -> Vec<u8> {
    let mut nal = vec![0x65];
    nal.extend((0..len).map(|i| (i % 200) as u8 + 0x10));
    length_prefixed(&nal)
}

/// `[ftyp][mdat: units...]`
pub fn clip(units: &[Vec<u8>]) -> Vec<u8> {
    let mut buf = mp4_box(b"ftyp", b"isom\0\0\x02\0isomavc1");
    buf.extend(mp4_box(b"mdat", &units.concat()));
    buf
}

pub fn speed_record(version: u32, speed: f32) -> WireRecord {
    WireRecord {
        version: Some(version),
        vehicle_speed_mps: Some(speed),
        ..Default::default()
    }
}
