mod chat;

pub use chat::ChatPayload;
