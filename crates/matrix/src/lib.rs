//! Client-side plumbing for posting messages into Matrix rooms: the `matrix.ini`
//! settings, the room mapping, and the message endpoint client.
mod client;
mod rooms;
mod settings;

pub use client::{Client, MessageSender, RoomMessage, SendError, Sender};
pub use rooms::RoomMapping;
pub use settings::{KeyPrecedence, Settings, SettingsError, DEFAULT_PATH};

/// Status code carried by `SendError::Status`.
pub use reqwest::StatusCode;
