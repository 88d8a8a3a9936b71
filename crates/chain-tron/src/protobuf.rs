//! Minimal protobuf wire-format writer.
//!
//! TRON transactions are protobuf messages, but only a handful of field
//! shapes are needed, so the encoder is written by hand instead of pulling
//! in a protobuf stack:
//!
//! ```text
//! tag     = (field_number << 3) | wire_type
//! varint  = 7-bit groups, little-endian, continuation bit 0x80
//! bytes   = tag, varint(len), payload      (wire type 2)
//! int64   = tag, varint(value)             (wire type 0)
//! ```
//!
//! Scalar fields holding their default value (zero / empty) are omitted,
//! matching proto3 serialization.

/// Wire type 0: varint.
const WIRE_VARINT: u64 = 0;
/// Wire type 2: length-delimited.
const WIRE_LEN: u64 = 2;

/// Appends a varint to `buf`.
pub fn write_varint(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if value == 0 {
            break;
        }
    }
}

fn write_tag(buf: &mut Vec<u8>, field_number: u32, wire_type: u64) {
    write_varint(buf, (u64::from(field_number) << 3) | wire_type);
}

/// An append-only protobuf message writer.
#[derive(Default)]
pub struct MessageWriter {
    buf: Vec<u8>,
}

impl MessageWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes an `int64`/`uint64`/enum field; omitted when zero.
    pub fn int64(&mut self, field_number: u32, value: i64) -> &mut Self {
        if value != 0 {
            write_tag(&mut self.buf, field_number, WIRE_VARINT);
            write_varint(&mut self.buf, value as u64);
        }
        self
    }

    /// Writes a `bytes` field; omitted when empty.
    pub fn bytes(&mut self, field_number: u32, data: &[u8]) -> &mut Self {
        if !data.is_empty() {
            write_tag(&mut self.buf, field_number, WIRE_LEN);
            write_varint(&mut self.buf, data.len() as u64);
            self.buf.extend_from_slice(data);
        }
        self
    }

    /// Writes a `string` field; omitted when empty.
    pub fn string(&mut self, field_number: u32, value: &str) -> &mut Self {
        self.bytes(field_number, value.as_bytes())
    }

    /// Embeds an already-encoded sub-message. Always emitted, so present
    /// sub-messages stay distinguishable from absent ones.
    pub fn message(&mut self, field_number: u32, encoded: &[u8]) -> &mut Self {
        write_tag(&mut self.buf, field_number, WIRE_LEN);
        write_varint(&mut self.buf, encoded.len() as u64);
        self.buf.extend_from_slice(encoded);
        self
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}
