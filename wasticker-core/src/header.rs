//! Header Decoding - Just Enough To Check Compliance
//!
//! Reads pixel dimensions and the animation marker without decoding pixels.
//! PNG: the mandatory leading `IHDR` chunk.
//! WebP: a walk over the RIFF chunks (`VP8X`, `VP8 `, `VP8L`, `ANIM`, `ANMF`).

use thiserror::Error;

use crate::format::{ImageFormat, PNG_SIGNATURE};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    #[error("image header is truncated")]
    Truncated,

    #[error("malformed image header: {0}")]
    Malformed(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHeader {
    pub width: u32,
    pub height: u32,
    pub animated: bool,
}

const VP8_START_CODE: [u8; 3] = [0x9D, 0x01, 0x2A];
const VP8L_SIGNATURE: u8 = 0x2F;
const VP8X_ANIMATION_FLAG: u8 = 0x02;

pub fn read_header(data: &[u8], format: ImageFormat) -> Result<ImageHeader, HeaderError> {
    match format {
        ImageFormat::Png => read_png(data),
        ImageFormat::Webp => read_webp(data),
    }
}

fn read_png(data: &[u8]) -> Result<ImageHeader, HeaderError> {
    // signature(8) + length(4) + type(4) + width(4) + height(4)
    if data.len() < 24 {
        return Err(HeaderError::Truncated);
    }
    if data[..8] != PNG_SIGNATURE {
        return Err(HeaderError::Malformed("missing PNG signature"));
    }
    if &data[12..16] != b"IHDR" {
        return Err(HeaderError::Malformed("first PNG chunk is not IHDR"));
    }
    if be_u32(&data[8..12]) != 13 {
        return Err(HeaderError::Malformed("IHDR chunk has wrong length"));
    }

    let width = be_u32(&data[16..20]);
    let height = be_u32(&data[20..24]);
    if width == 0 || height == 0 {
        return Err(HeaderError::Malformed("zero image dimension"));
    }

    Ok(ImageHeader { width, height, animated: false })
}

fn read_webp(data: &[u8]) -> Result<ImageHeader, HeaderError> {
    if data.len() < 12 {
        return Err(HeaderError::Truncated);
    }
    if &data[0..4] != b"RIFF" || &data[8..12] != b"WEBP" {
        return Err(HeaderError::Malformed("missing RIFF/WEBP container"));
    }

    // The RIFF size counts from offset 8; never trust it past the buffer.
    let riff_end = (le_u32(&data[4..8]) as usize)
        .saturating_add(8)
        .min(data.len());

    let mut canvas: Option<(u32, u32)> = None;
    let mut frame: Option<(u32, u32)> = None;
    let mut animated = false;
    let mut offset = 12;

    while offset + 8 <= riff_end {
        let fourcc = &data[offset..offset + 4];
        let size = le_u32(&data[offset + 4..offset + 8]) as usize;
        let payload_start = offset + 8;
        let payload_end = payload_start.saturating_add(size);
        let payload = &data[payload_start..payload_end.min(riff_end)];

        match fourcc {
            b"VP8X" => {
                let (w, h, anim) = parse_vp8x(payload)?;
                canvas = Some((w, h));
                animated |= anim;
            }
            b"ANIM" | b"ANMF" => animated = true,
            b"VP8 " if frame.is_none() => frame = Some(parse_vp8(payload)?),
            b"VP8L" if frame.is_none() => frame = Some(parse_vp8l(payload)?),
            _ => {}
        }

        if payload_end > riff_end {
            break;
        }
        // chunks are padded to even length
        offset = payload_end + (size & 1);
    }

    // VP8X only describes the canvas; a still image also needs its bitstream
    if frame.is_none() && !animated {
        return Err(HeaderError::Malformed("no image bitstream"));
    }

    let (width, height) = canvas
        .or(frame)
        .ok_or(HeaderError::Malformed("no VP8X, VP8 or VP8L chunk"))?;

    Ok(ImageHeader { width, height, animated })
}

fn parse_vp8x(payload: &[u8]) -> Result<(u32, u32, bool), HeaderError> {
    // flags(1) reserved(3) canvas_width-1(3) canvas_height-1(3)
    if payload.len() < 10 {
        return Err(HeaderError::Truncated);
    }
    let animated = payload[0] & VP8X_ANIMATION_FLAG != 0;
    let width = le_u24(&payload[4..7]) + 1;
    let height = le_u24(&payload[7..10]) + 1;
    Ok((width, height, animated))
}

fn parse_vp8(payload: &[u8]) -> Result<(u32, u32), HeaderError> {
    // frame tag(3) start code(3) width(2) height(2); top two bits are scale
    if payload.len() < 10 {
        return Err(HeaderError::Truncated);
    }
    if payload[3..6] != VP8_START_CODE {
        return Err(HeaderError::Malformed("bad VP8 start code"));
    }
    let width = u32::from(u16::from_le_bytes([payload[6], payload[7]]) & 0x3FFF);
    let height = u32::from(u16::from_le_bytes([payload[8], payload[9]]) & 0x3FFF);
    if width == 0 || height == 0 {
        return Err(HeaderError::Malformed("zero image dimension"));
    }
    Ok((width, height))
}

fn parse_vp8l(payload: &[u8]) -> Result<(u32, u32), HeaderError> {
    // signature(1) then 14 bits width-1, 14 bits height-1
    if payload.len() < 5 {
        return Err(HeaderError::Truncated);
    }
    if payload[0] != VP8L_SIGNATURE {
        return Err(HeaderError::Malformed("bad VP8L signature"));
    }
    let bits = le_u32(&payload[1..5]);
    let width = (bits & 0x3FFF) + 1;
    let height = ((bits >> 14) & 0x3FFF) + 1;
    Ok((width, height))
}

#[inline]
fn be_u32(b: &[u8]) -> u32 {
    u32::from_be_bytes([b[0], b[1], b[2], b[3]])
}

#[inline]
fn le_u32(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

#[inline]
fn le_u24(b: &[u8]) -> u32 {
    u32::from(b[0]) | u32::from(b[1]) << 8 | u32::from(b[2]) << 16
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Minimal byte-level images; only headers are meaningful.

    use super::PNG_SIGNATURE;

    pub fn png(width: u32, height: u32, total_len: usize) -> Vec<u8> {
        let mut data = PNG_SIGNATURE.to_vec();
        data.extend_from_slice(&13u32.to_be_bytes());
        data.extend_from_slice(b"IHDR");
        data.extend_from_slice(&width.to_be_bytes());
        data.extend_from_slice(&height.to_be_bytes());
        data.extend_from_slice(&[8, 6, 0, 0, 0]);
        data.extend_from_slice(&[0; 4]);
        pad(data, total_len)
    }

    pub fn webp_lossy(width: u16, height: u16, total_len: usize) -> Vec<u8> {
        let mut payload = vec![0x30, 0x01, 0x00];
        payload.extend_from_slice(&[0x9D, 0x01, 0x2A]);
        payload.extend_from_slice(&width.to_le_bytes());
        payload.extend_from_slice(&height.to_le_bytes());
        riff(&[(*b"VP8 ", payload)], total_len)
    }

    pub fn webp_lossless(width: u32, height: u32, total_len: usize) -> Vec<u8> {
        riff(&[(*b"VP8L", vp8l_payload(width, height))], total_len)
    }

    pub fn webp_extended(width: u32, height: u32, flags: u8, with_anim: bool, total_len: usize) -> Vec<u8> {
        let mut vp8x = vec![flags, 0, 0, 0];
        vp8x.extend_from_slice(&(width - 1).to_le_bytes()[..3]);
        vp8x.extend_from_slice(&(height - 1).to_le_bytes()[..3]);
        let mut chunks = vec![(*b"VP8X", vp8x)];
        if with_anim {
            chunks.push((*b"ANIM", vec![0; 6]));
            chunks.push((*b"ANMF", vec![0; 16]));
        } else {
            chunks.push((*b"VP8L", vp8l_payload(width, height)));
        }
        riff(&chunks, total_len)
    }

    /// RIFF/WEBP holding nothing but a `VP8X` canvas description.
    pub fn webp_canvas_only(width: u32, height: u32) -> Vec<u8> {
        let mut vp8x = vec![0, 0, 0, 0];
        vp8x.extend_from_slice(&(width - 1).to_le_bytes()[..3]);
        vp8x.extend_from_slice(&(height - 1).to_le_bytes()[..3]);
        riff(&[(*b"VP8X", vp8x)], 0)
    }

    fn vp8l_payload(width: u32, height: u32) -> Vec<u8> {
        let bits = (width - 1) | (height - 1) << 14;
        let mut payload = vec![0x2F];
        payload.extend_from_slice(&bits.to_le_bytes());
        payload
    }

    fn riff(chunks: &[([u8; 4], Vec<u8>)], total_len: usize) -> Vec<u8> {
        let mut body = b"WEBP".to_vec();
        for (fourcc, payload) in chunks {
            body.extend_from_slice(fourcc);
            body.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            body.extend_from_slice(payload);
            if payload.len() % 2 == 1 {
                body.push(0);
            }
        }
        let mut data = b"RIFF".to_vec();
        data.extend_from_slice(&(body.len() as u32).to_le_bytes());
        data.extend_from_slice(&body);
        pad(data, total_len)
    }

    fn pad(mut data: Vec<u8>, total_len: usize) -> Vec<u8> {
        if data.len() < total_len {
            data.resize(total_len, 0);
        }
        data
    }
}
