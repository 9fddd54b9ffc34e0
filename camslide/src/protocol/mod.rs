// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Serial protocol between the slider and its host.

pub mod messages;
pub mod parser;

pub use messages::{Command, CommandKind, FrameError, Message, MessageKind, ProgramSpec};
pub use parser::Parser;
