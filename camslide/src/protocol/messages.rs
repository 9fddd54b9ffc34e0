// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Wire format of the slider's serial protocol.
//!
//! Inbound (host to slider):
//!
//! ```text
//! 0xFE <kind> <len> <len payload bytes> <trailer>
//! ```
//!
//! The trailer is sent as 0xFF but is not checked.
//!
//! Outbound (slider to host), always 7 bytes:
//!
//! ```text
//! 0xFE <kind> <i32 big-endian> 0xFF
//! ```

use heapless::Vec;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use thiserror::Error;

/// Sync byte that opens every frame.
pub const START_BYTE: u8 = 0xFE;
/// Byte that closes every frame.
pub const END_BYTE: u8 = 0xFF;

/// Payload bytes kept per inbound frame. Longer payloads are counted but not stored.
pub const PAYLOAD_CAPACITY: usize = 127;
/// Size of every outbound message.
pub const MESSAGE_LEN: usize = 7;
/// Payload size of a Start command.
pub const PROGRAM_LEN: usize = 9;

/// Largest frame produced by [`Command::to_frame`].
pub const MAX_COMMAND_FRAME: usize = 3 + PROGRAM_LEN + 1;

/// Framing and decoding failures.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    #[error("unknown command kind {0}")]
    UnknownCommand(u8),
    #[error("unknown message kind {0}")]
    UnknownMessage(u8),
    #[error("payload of {len} bytes is too short")]
    ShortPayload { len: usize },
    #[error("frame of {0} bytes has the wrong length")]
    BadLength(usize),
    #[error("unexpected marker byte {0:#04x}")]
    BadMarker(u8),
}

/// Inbound command identifiers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum CommandKind {
    Stop = 0,
    Forward = 1,
    Reverse = 2,
    Shutter = 3,
    Start = 4,
    Pause = 5,
    Reset = 6,
}

/// A step program, as carried by the Start command.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProgramSpec {
    pub step_distance_um: u32,
    pub inter_shot_delay_ms: u32,
    pub step_count: u8,
}

impl ProgramSpec {
    /// Decode from a Start payload. Bytes past the ninth are ignored.
    pub fn from_payload(payload: &[u8]) -> Result<Self, FrameError> {
        let Some(bytes) = payload.get(..PROGRAM_LEN) else {
            return Err(FrameError::ShortPayload { len: payload.len() });
        };

        Ok(Self {
            step_distance_um: u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            inter_shot_delay_ms: u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            step_count: bytes[8],
        })
    }

    pub fn to_payload(&self) -> [u8; PROGRAM_LEN] {
        let mut out = [0u8; PROGRAM_LEN];
        out[0..4].copy_from_slice(&self.step_distance_um.to_be_bytes());
        out[4..8].copy_from_slice(&self.inter_shot_delay_ms.to_be_bytes());
        out[8] = self.step_count;
        out
    }
}

/// Decoded inbound commands.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    Stop,
    Forward,
    Reverse,
    Shutter,
    Start(ProgramSpec),
    Pause,
    Reset,
}

impl Command {
    /// Build a command from a complete frame's kind and payload.
    pub fn decode(kind: CommandKind, payload: &[u8]) -> Result<Self, FrameError> {
        Ok(match kind {
            CommandKind::Stop => Command::Stop,
            CommandKind::Forward => Command::Forward,
            CommandKind::Reverse => Command::Reverse,
            CommandKind::Shutter => Command::Shutter,
            CommandKind::Start => Command::Start(ProgramSpec::from_payload(payload)?),
            CommandKind::Pause => Command::Pause,
            CommandKind::Reset => Command::Reset,
        })
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Stop => CommandKind::Stop,
            Command::Forward => CommandKind::Forward,
            Command::Reverse => CommandKind::Reverse,
            Command::Shutter => CommandKind::Shutter,
            Command::Start(_) => CommandKind::Start,
            Command::Pause => CommandKind::Pause,
            Command::Reset => CommandKind::Reset,
        }
    }

    /// Encode as an inbound frame, the way the host sends it.
    pub fn to_frame(&self) -> Vec<u8, MAX_COMMAND_FRAME> {
        let mut frame = Vec::new();
        let program = match self {
            Command::Start(program) => Some(program.to_payload()),
            _ => None,
        };
        let payload = program.as_ref().map_or(&[][..], |p| &p[..]);

        // capacity covers the largest payload
        let _ = frame.push(START_BYTE);
        let _ = frame.push(self.kind().into());
        let _ = frame.push(payload.len() as u8);
        let _ = frame.extend_from_slice(payload);
        let _ = frame.push(END_BYTE);
        frame
    }
}

/// Outbound message identifiers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum MessageKind {
    /// Carriage position in micrometers.
    Position = 0,
    /// Motor current in milliamps.
    Current = 1,
    /// Program finished. Value is always 0.
    Done = 2,
}

/// One outbound telemetry message.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Message {
    pub kind: MessageKind,
    pub value: i32,
}

impl Message {
    #[inline]
    pub fn position(um: i32) -> Self {
        Self {
            kind: MessageKind::Position,
            value: um,
        }
    }

    #[inline]
    pub fn current(ma: i32) -> Self {
        Self {
            kind: MessageKind::Current,
            value: ma,
        }
    }

    #[inline]
    pub fn done() -> Self {
        Self {
            kind: MessageKind::Done,
            value: 0,
        }
    }

    pub fn encode(&self) -> [u8; MESSAGE_LEN] {
        let v = self.value.to_be_bytes();
        [START_BYTE, self.kind.into(), v[0], v[1], v[2], v[3], END_BYTE]
    }

    /// Parse exactly one 7-byte message.
    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        let [start, kind, a, b, c, d, end] = *bytes else {
            return Err(FrameError::BadLength(bytes.len()));
        };
        if start != START_BYTE {
            return Err(FrameError::BadMarker(start));
        }
        if end != END_BYTE {
            return Err(FrameError::BadMarker(end));
        }
        let kind = MessageKind::try_from(kind).map_err(|e| FrameError::UnknownMessage(e.number))?;

        Ok(Self {
            kind,
            value: i32::from_be_bytes([a, b, c, d]),
        })
    }
}
