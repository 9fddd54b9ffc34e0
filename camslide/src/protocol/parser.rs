// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Byte-at-a-time parser for inbound command frames.
//!
//! Feed every received byte to [`Parser::push`]. A frame is complete once its declared payload
//! and the trailing byte have arrived; completion is driven purely by the length byte, and the
//! trailer's value is ignored.
//!
//! Byte offsets within a frame:
//!
//! ```text
//! 0      1      2     3 ..= len+2    len+3
//! 0xFE   kind   len   payload        trailer
//! ```

use heapless::Vec;

use crate::protocol::messages::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Phase {
    WaitStart,
    WaitType,
    WaitLength { kind: CommandKind },
    Payload { kind: CommandKind, terminal: usize },
}

pub struct Parser {
    phase: Phase,
    /// Offset of the next byte within the current frame.
    byte_index: usize,
    payload: Vec<u8, PAYLOAD_CAPACITY>,
    truncated: bool,
    dropped_frames: u32,
}

impl Parser {
    pub fn new() -> Self {
        Self {
            phase: Phase::WaitStart,
            byte_index: 0,
            payload: Vec::new(),
            truncated: false,
            dropped_frames: 0,
        }
    }

    /// Process a single incoming byte.
    ///
    /// Returns `Ok(Some(command))` when a frame completes, `Err` when the current frame is
    /// abandoned. Either way the parser is ready for the next frame afterwards.
    pub fn push(&mut self, byte: u8) -> Result<Option<Command>, FrameError> {
        match self.phase {
            Phase::WaitStart => {
                if byte == START_BYTE {
                    self.payload.clear();
                    self.truncated = false;
                    self.byte_index = 1;
                    self.phase = Phase::WaitType;
                }
            }
            Phase::WaitType => match CommandKind::try_from(byte) {
                Ok(kind) => {
                    self.byte_index += 1;
                    self.phase = Phase::WaitLength { kind };
                }
                Err(_) => return Err(self.abort(FrameError::UnknownCommand(byte))),
            },
            Phase::WaitLength { kind } => {
                self.byte_index += 1;
                self.phase = Phase::Payload {
                    kind,
                    terminal: usize::from(byte) + 3,
                };
            }
            Phase::Payload { kind, terminal } => {
                if self.byte_index < terminal {
                    if self.payload.push(byte).is_err() {
                        self.truncated = true;
                    }
                    self.byte_index += 1;
                } else {
                    // Trailer at offset len+3, taken whatever its value. A 0xFE here is
                    // consumed as the trailer; completing at len+2 instead would leave it to
                    // WaitStart and misread it as the start of another frame.
                    return self.finish(kind).map(Some);
                }
            }
        }
        Ok(None)
    }

    fn finish(&mut self, kind: CommandKind) -> Result<Command, FrameError> {
        if self.truncated {
            warn!(
                "{} payload truncated to {=usize} bytes",
                kind,
                self.payload.len()
            );
        }
        let decoded = Command::decode(kind, &self.payload);
        self.phase = Phase::WaitStart;
        self.byte_index = 0;
        decoded.map_err(|e| self.abort(e))
    }

    fn abort(&mut self, err: FrameError) -> FrameError {
        self.phase = Phase::WaitStart;
        self.byte_index = 0;
        self.dropped_frames = self.dropped_frames.wrapping_add(1);
        err
    }

    /// Whether the frame being assembled (or the last one completed) overflowed the payload
    /// buffer.
    #[inline]
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// Frames abandoned since construction.
    #[inline]
    pub fn dropped_frames(&self) -> u32 {
        self.dropped_frames
    }

    /// `true` between frames.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.phase == Phase::WaitStart
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}
