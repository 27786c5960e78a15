mod responder;

pub use responder::{MessageResponder, MessageTrace, Reply};
