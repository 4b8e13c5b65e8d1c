use bytes::{Buf, BytesMut};
use std::io;
use tokio_util::codec::Decoder;

/// Converts a byte stream in any `encoding_rs` charset into UTF-8 chunks.
pub struct CharsetTranscoder {
    decoder: encoding_rs::Decoder,
}

impl CharsetTranscoder {
    pub fn new(encoding: &'static encoding_rs::Encoding) -> Self {
        Self {
            decoder: encoding.new_decoder(),
        }
    }

    fn transcode(&mut self, src: &[u8], last: bool) -> (usize, BytesMut) {
        let capacity = self
            .decoder
            .max_utf8_buffer_length(src.len())
            .unwrap_or(src.len() * 3 + 4);
        let mut out = vec![0u8; capacity];
        // malformed sequences become U+FFFD; the JSON decoder reports them downstream
        let (_result, read, written, _replaced) = self.decoder.decode_to_utf8(src, &mut out, last);
        out.truncate(written);
        (read, BytesMut::from(&out[..]))
    }
}

impl Decoder for CharsetTranscoder {
    type Item = BytesMut;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }
        let (read, chunk) = self.transcode(src, false);
        src.advance(read);
        if chunk.is_empty() {
            // only a partial multi-byte sequence so far; wait for more input
            return Ok(None);
        }
        Ok(Some(chunk))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if buf.is_empty() {
            return Ok(None);
        }
        let (_read, chunk) = self.transcode(buf, true);
        buf.clear();
        Ok((!chunk.is_empty()).then_some(chunk))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_utf16_code_unit_waits_for_more_input() {
        let mut codec = CharsetTranscoder::new(encoding_rs::UTF_16LE);
        let mut buf = BytesMut::from(&b"A\x00B"[..]);
        let first = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&first[..], b"A");

        buf.extend_from_slice(b"\x00");
        let second = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&second[..], b"B");
        assert!(buf.is_empty());
    }

    #[test]
    fn eof_flushes_remaining_bytes() {
        let mut codec = CharsetTranscoder::new(encoding_rs::WINDOWS_1252);
        let mut buf = BytesMut::from(&b"caf\xe9"[..]);
        let out = codec.decode_eof(&mut buf).unwrap().unwrap();
        assert_eq!(std::str::from_utf8(&out).unwrap(), "café");
        assert!(codec.decode_eof(&mut buf).unwrap().is_none());
    }
}
