// -----------------------------
// MP4 top-level box walk (mdat locator)
// -----------------------------

const MDAT: [u8; 4] = *b"mdat";

/// Byte range of the `mdat` payload inside an MP4 buffer.
///
/// `offset + size` never exceeds the length of the buffer it was located in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaDataRegion {
    /// Absolute offset of the first payload byte (just past the box header).
    pub offset: usize,
    /// Payload length in bytes.
    pub size: usize,
}

impl MediaDataRegion {
    pub fn end(&self) -> usize {
        self.offset + self.size
    }
}

#[derive(Debug, Clone)]
struct BoxHeader {
    typ: [u8; 4],
    size: u64,
    header_len: u64,
}

fn be_u32(buf: &[u8], pos: usize) -> Option<u32> {
    let b = buf.get(pos..pos.checked_add(4)?)?;
    Some(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

fn be_u64(buf: &[u8], pos: usize) -> Option<u64> {
    let b = buf.get(pos..pos.checked_add(8)?)?;
    let mut a = [0u8; 8];
    a.copy_from_slice(b);
    Some(u64::from_be_bytes(a))
}

fn read_box_header(buf: &[u8], pos: usize) -> Option<BoxHeader> {
    let size32 = be_u32(buf, pos)? as u64;
    let typ_bytes = buf.get(pos + 4..pos + 8)?;
    let typ = [typ_bytes[0], typ_bytes[1], typ_bytes[2], typ_bytes[3]];
    if size32 == 1 {
        // largesize; missing bytes means the header itself is truncated
        let size64 = be_u64(buf, pos + 8)?;
        Some(BoxHeader {
            typ,
            size: size64,
            header_len: 16,
        })
    } else {
        Some(BoxHeader {
            typ,
            size: size32,
            header_len: 8,
        })
    }
}

fn fourcc_to_string(t: [u8; 4]) -> String {
    t.iter()
        .map(|&c| if c.is_ascii_graphic() { c as char } else { '.' })
        .collect()
}

/// Find the top-level `mdat` box of an MP4 buffer.
///
/// Returns `None` when there is no `mdat`, when a header is truncated, or when a box
/// declares a size smaller than its own header (the walk cannot make progress).
/// A declared size running past the buffer is clamped to the buffer end, which keeps
/// truncated recordings usable.
pub fn find_media_data(buf: &[u8]) -> Option<MediaDataRegion> {
    let len = buf.len() as u64;
    let mut pos = 0u64;

    while pos + 8 <= len {
        let Some(hdr) = read_box_header(buf, pos as usize) else {
            log::debug!("mp4: truncated box header at offset {pos}");
            return None;
        };
        log::trace!(
            "mp4: pos={pos} typ={} size={} header={}",
            fourcc_to_string(hdr.typ),
            hdr.size,
            hdr.header_len
        );

        // ISO-BMFF: size==0 means "extends to end of file".
        let size = if hdr.size == 0 { len - pos } else { hdr.size };
        if size < hdr.header_len {
            log::debug!(
                "mp4: box {} at offset {pos} has size {size} < header_len {}",
                fourcc_to_string(hdr.typ),
                hdr.header_len
            );
            return None;
        }

        let end = pos.saturating_add(size).min(len);
        if hdr.typ == MDAT {
            let offset = pos + hdr.header_len;
            let region = MediaDataRegion {
                offset: offset as usize,
                size: end.saturating_sub(offset) as usize,
            };
            log::debug!("mdat @ 0x{pos:08x}: {} payload bytes", region.size);
            return Some(region);
        }

        pos = end;
    }

    log::debug!("mp4: no mdat box in {len} bytes");
    None
}
