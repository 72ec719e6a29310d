//! Clients for the hosted AI and telephony APIs

pub mod ai;
pub mod voice;

pub use ai::{AiError, GenerationRequest, Message, OpenAiGenerator, TextGenerator};
pub use voice::{CallRequest, MockDialer, RetellDialer, VoiceDialer, VoiceError};
