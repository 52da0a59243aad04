//! Byte-level codec for persisted layer data: base64 text on the outside,
//! a zlib deflate stream on the inside.

use std::io::{Read, Write};

use flate2::bufread::GzDecoder;
use flate2::write::ZlibEncoder;
use flate2::{Compression, Decompress, FlushDecompress, Status};

use crate::error::MapError;

const BASE64_TABLE: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Inflate output is drained through a fixed buffer of this size.
const INFLATE_CHUNK: usize = 32 * 1024;

fn sextet(c: u8) -> Option<u8> {
    match c {
        b'A'..=b'Z' => Some(c - b'A'),
        b'a'..=b'z' => Some(c - b'a' + 26),
        b'0'..=b'9' => Some(c - b'0' + 52),
        b'+' => Some(62),
        b'/' => Some(63),
        _ => None,
    }
}

/// Standard base64: 3-byte groups to 4 symbols, `=` padding on the tail.
pub fn encode64(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len().div_ceil(3) * 4);
    for chunk in bytes.chunks(3) {
        let b = [chunk[0], *chunk.get(1).unwrap_or(&0), *chunk.get(2).unwrap_or(&0)];
        let sym = [
            b[0] >> 2,
            ((b[0] & 0x3) << 4) | (b[1] >> 4),
            ((b[1] & 0xf) << 2) | (b[2] >> 6),
            b[2] & 0x3f,
        ];
        for &s in &sym[..chunk.len() + 1] {
            out.push(BASE64_TABLE[s as usize] as char);
        }
        for _ in chunk.len()..3 {
            out.push('=');
        }
    }
    out
}

/// Inverse of [`encode64`]. Characters outside the alphabet are skipped (map
/// files wrap the blob in whitespace), decoding stops at the first `=`, and a
/// partial group left over at end of input is treated as corrupt.
pub fn decode64(text: &str) -> Result<Vec<u8>, MapError> {
    let mut out = Vec::with_capacity(text.len() / 4 * 3);
    let mut group = [0u8; 4];
    let mut count = 0usize;
    for &c in text.as_bytes() {
        if let Some(v) = sextet(c) {
            group[count] = v;
            count += 1;
        }
        if count == 4 || c == b'=' {
            let bytes = [
                (group[0] << 2) | ((group[1] & 0x30) >> 4),
                ((group[1] & 0xf) << 4) | ((group[2] & 0x3c) >> 2),
                ((group[2] & 0x3) << 6) | group[3],
            ];
            out.extend_from_slice(&bytes[..count.saturating_sub(1)]);
            if count != 4 {
                return Ok(out);
            }
            group = [0; 4];
            count = 0;
        }
    }
    if count != 0 {
        return Err(MapError::CorruptBase64(format!(
            "{count} trailing symbols without padding"
        )));
    }
    Ok(out)
}

/// Compresses into a zlib stream at best compression, the level standard map
/// editors write.
pub fn deflate(bytes: &[u8]) -> Result<Vec<u8>, MapError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(bytes)
        .map_err(|e| MapError::CorruptStream(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| MapError::CorruptStream(e.to_string()))
}

/// Inflates a zlib or gzip stream (sniffed from the header), draining output
/// in 32 KiB chunks. Fails on malformed or truncated streams and on input
/// bytes left over after the stream end; never returns partial data.
pub fn inflate(bytes: &[u8]) -> Result<Vec<u8>, MapError> {
    if bytes.starts_with(&[0x1f, 0x8b]) {
        inflate_gzip(bytes)
    } else {
        inflate_zlib(bytes)
    }
}

fn inflate_zlib(data: &[u8]) -> Result<Vec<u8>, MapError> {
    let mut z = Decompress::new(true);
    let mut out = Vec::new();
    loop {
        let consumed = z.total_in() as usize;
        let produced = z.total_out();
        out.reserve(INFLATE_CHUNK);
        let status = z
            .decompress_vec(&data[consumed..], &mut out, FlushDecompress::Sync)
            .map_err(|e| MapError::CorruptStream(e.to_string()))?;
        match status {
            Status::StreamEnd => break,
            Status::Ok | Status::BufError => {
                if z.total_in() as usize == consumed && z.total_out() == produced {
                    return Err(MapError::CorruptStream("truncated stream".to_owned()));
                }
            }
        }
    }
    let leftover = data.len() - z.total_in() as usize;
    if leftover != 0 {
        return Err(MapError::CorruptStream(format!(
            "{leftover} bytes left after end of stream"
        )));
    }
    Ok(out)
}

fn inflate_gzip(data: &[u8]) -> Result<Vec<u8>, MapError> {
    let mut rest: &[u8] = data;
    let mut decoder = GzDecoder::new(&mut rest);
    let mut out = Vec::new();
    let mut chunk = [0u8; INFLATE_CHUNK];
    loop {
        match decoder.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => out.extend_from_slice(&chunk[..n]),
            Err(e) => return Err(MapError::CorruptStream(e.to_string())),
        }
    }
    drop(decoder);
    if !rest.is_empty() {
        return Err(MapError::CorruptStream(format!(
            "{} bytes left after end of stream",
            rest.len()
        )));
    }
    Ok(out)
}

/// Persisted text form: `encode64(deflate(raw))`.
pub fn compress(bytes: &[u8]) -> Result<String, MapError> {
    Ok(encode64(&deflate(bytes)?))
}

/// Inverse of [`compress`]: `inflate(decode64(text))`. Any stage failure
/// aborts the whole operation.
pub fn decompress(text: &str) -> Result<Vec<u8>, MapError> {
    inflate(&decode64(text)?)
}
