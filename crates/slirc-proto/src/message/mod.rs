//! IRC message type, parsing and text form.

mod parse;
mod types;

pub use self::types::Message;
