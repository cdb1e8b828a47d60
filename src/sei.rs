use crate::mp4::MediaDataRegion;

// -----------------------------
// NAL + SEI scanning
// -----------------------------

/// H.264 `nal_unit_type` for SEI.
pub const NAL_TYPE_SEI: u8 = 6;

/// SEI `payloadType` for user_data_unregistered.
pub const SEI_USER_DATA_UNREGISTERED: u8 = 5;

const LENGTH_PREFIX: usize = 4;

/// Iterator over the SEI user-data-unregistered NAL units of an `mdat` region.
///
/// NAL units are 4-byte big-endian length prefixed. Units with an implausible length are
/// skipped rather than ending the scan, so one corrupt prefix only costs the units it
/// overlaps. The scanner only borrows the buffer; to scan again, build a new one.
#[derive(Debug, Clone)]
pub struct SeiNalUnits<'a> {
    buf: &'a [u8],
    pos: usize,
    end: usize,
}

impl<'a> SeiNalUnits<'a> {
    /// Scan `size` bytes of `buf` starting at `offset`. The range is clamped to the buffer.
    pub fn new(buf: &'a [u8], offset: usize, size: usize) -> Self {
        let end = offset.saturating_add(size).min(buf.len());
        Self {
            buf,
            pos: offset.min(end),
            end,
        }
    }

    pub fn in_region(buf: &'a [u8], region: MediaDataRegion) -> Self {
        Self::new(buf, region.offset, region.size)
    }
}

impl<'a> Iterator for SeiNalUnits<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos + LENGTH_PREFIX <= self.end {
            let b = &self.buf[self.pos..self.pos + LENGTH_PREFIX];
            let len = u32::from_be_bytes([b[0], b[1], b[2], b[3]]) as usize;
            self.pos += LENGTH_PREFIX;

            if len < 2 || len > self.end - self.pos {
                log::trace!(
                    "sei: unusable NAL length {len} at offset {}",
                    self.pos - LENGTH_PREFIX
                );
                self.pos = self
                    .pos
                    .saturating_add(len.saturating_sub(LENGTH_PREFIX))
                    .min(self.end);
                continue;
            }

            let nal = &self.buf[self.pos..self.pos + len];
            self.pos += len;

            if nal[0] & 0x1F == NAL_TYPE_SEI && nal[1] == SEI_USER_DATA_UNREGISTERED {
                return Some(nal);
            }
        }
        None
    }
}

/// Remove H.264 emulation prevention bytes (`0x03` following two or more `0x00`).
pub fn remove_emulation_prevention(rbsp: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(rbsp.len());
    let mut zeros = 0usize;

    for &b in rbsp {
        if zeros >= 2 && b == 0x03 {
            // skip this emulation prevention byte
            zeros = 0;
            continue;
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

// -----------------------------
// Vendor payload framing
// -----------------------------

/// Locates the protobuf message inside a normalized SEI NAL unit.
///
/// Implementations describe one recorder firmware's framing. Returning `None` means the
/// unit does not carry telemetry and is skipped.
pub trait PayloadFraming {
    fn locate<'a>(&self, unit: &'a [u8]) -> Option<&'a [u8]>;
}

/// Framing made of a run of lead-in bytes closed by a marker byte.
///
/// The message starts right after the marker and stops one byte short of the end of the
/// unit; that last byte holds the RBSP stop bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerFraming {
    /// First index inspected (past NAL header, payload type and payload size).
    pub scan_start: usize,
    pub lead_in: u8,
    pub marker: u8,
}

impl MarkerFraming {
    /// Framing written by Tesla dashcam firmware: `0x42`* then `0x69`.
    pub const TESLA_V1: MarkerFraming = MarkerFraming {
        scan_start: 3,
        lead_in: 0x42,
        marker: 0x69,
    };
}

impl Default for MarkerFraming {
    fn default() -> Self {
        Self::TESLA_V1
    }
}

impl PayloadFraming for MarkerFraming {
    fn locate<'a>(&self, unit: &'a [u8]) -> Option<&'a [u8]> {
        let mut i = self.scan_start;
        while i < unit.len() {
            match unit[i] {
                b if b == self.marker => {
                    let start = i + 1;
                    let end = unit.len() - 1;
                    return (start < end).then(|| &unit[start..end]);
                }
                b if b == self.lead_in => i += 1,
                _ => return None,
            }
        }
        None
    }
}
