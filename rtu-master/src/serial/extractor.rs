use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

use crate::common::frame::{Packet, Response};
use crate::common::phys::PhysLayer;
use crate::decode::{DecodeLevel, FrameDecodeLevel};
use crate::exception::ExceptionCode;
use crate::serial::frame::{constants, decode_response, response_frame_length, RtuDisplay};
use crate::types::ExceptionFrame;

/// Carves response packets out of an unframed byte stream
///
/// Bytes are accumulated until the frame at the head of the buffer decodes into
/// something other than a decode failure. Each packet, valid or not, advances the
/// buffer by the length of its re-encoded frame.
///
/// A frame that fails its CRC re-encodes as a 5 byte exception frame, so the bytes
/// that followed it inside the corrupted frame are kept. They only go away once they
/// form a packet of their own or the buffer is cleared.
#[derive(Debug, Default)]
pub struct RtuExtractor {
    buffer: Vec<u8>,
    decode: FrameDecodeLevel,
}

impl RtuExtractor {
    /// Create an extractor with an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_decode_level(decode: FrameDecodeLevel) -> Self {
        Self {
            buffer: Vec::new(),
            decode,
        }
    }

    /// Number of bytes waiting for the rest of a frame
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// True when no partial frame is buffered
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Discard any buffered bytes
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Append a chunk and return every packet that is now complete, in order
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Packet<Response>> {
        self.buffer.extend_from_slice(chunk);

        let mut packets = Vec::new();
        loop {
            let window_len = response_frame_length(&self.buffer)
                .map_or(self.buffer.len(), |len| len.min(self.buffer.len()));
            let window = &self.buffer[..window_len];

            let packet = decode_response(window);
            if let Response::Exception(ExceptionFrame {
                error: ExceptionCode::DecodeFailure,
                ..
            }) = packet.frame
            {
                // incomplete, wait for more bytes
                break;
            }

            if self.decode.enabled() {
                tracing::info!("RTU RX - {}", RtuDisplay::new(self.decode, window));
            }

            let consumed = (packet.frame.pdu_len() + constants::HEADER_LENGTH + constants::CRC_LENGTH)
                .min(self.buffer.len());
            self.buffer.drain(..consumed);
            packets.push(packet);
        }

        packets
    }
}

/// Reads from the physical layer and hands out packets one at a time
///
/// Partial frames are dropped when no byte arrives within the flush rate.
pub(crate) struct FramedReader {
    extractor: RtuExtractor,
    packets: VecDeque<Packet<Response>>,
    flush_rate: Duration,
    idle_deadline: Option<Instant>,
    buffer: Box<[u8; constants::MAX_FRAME_LENGTH]>,
}

enum ReadOutcome {
    Data(usize),
    Idle,
}

impl FramedReader {
    pub(crate) fn new(flush_rate: Duration, decode: FrameDecodeLevel) -> Self {
        Self {
            extractor: RtuExtractor::with_decode_level(decode),
            packets: VecDeque::new(),
            flush_rate,
            idle_deadline: None,
            buffer: Box::new([0; constants::MAX_FRAME_LENGTH]),
        }
    }

    /// Drop buffered bytes and any packet not yet handed out
    pub(crate) fn reset(&mut self) {
        self.extractor.clear();
        self.packets.clear();
        self.idle_deadline = None;
    }

    /// Wait for the next packet
    ///
    /// Cancel safe: bytes are only consumed together with the packets they produce.
    pub(crate) async fn next_packet(
        &mut self,
        io: &mut PhysLayer,
        decode: DecodeLevel,
    ) -> Result<Packet<Response>, std::io::Error> {
        loop {
            if let Some(packet) = self.packets.pop_front() {
                return Ok(packet);
            }
            self.read_some(io, decode).await?;
        }
    }

    async fn read_some(
        &mut self,
        io: &mut PhysLayer,
        decode: DecodeLevel,
    ) -> Result<(), std::io::Error> {
        let outcome = match self.idle_deadline {
            Some(deadline) => {
                tokio::select! {
                    result = io.read(self.buffer.as_mut_slice(), decode.physical) => ReadOutcome::Data(result?),
                    _ = tokio::time::sleep_until(deadline) => ReadOutcome::Idle,
                }
            }
            None => ReadOutcome::Data(io.read(self.buffer.as_mut_slice(), decode.physical).await?),
        };

        let count = match outcome {
            ReadOutcome::Idle => {
                tracing::warn!(
                    "discarding {} bytes of an incomplete frame after {} ms of silence",
                    self.extractor.len(),
                    self.flush_rate.as_millis()
                );
                self.extractor.clear();
                self.idle_deadline = None;
                return Ok(());
            }
            ReadOutcome::Data(0) => {
                return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof))
            }
            ReadOutcome::Data(count) => count,
        };

        if let Some(chunk) = self.buffer.get(..count) {
            self.packets.extend(self.extractor.push(chunk));
        }

        self.idle_deadline = if self.extractor.is_empty() {
            None
        } else {
            Some(Instant::now() + self.flush_rate)
        };

        Ok(())
    }
}
