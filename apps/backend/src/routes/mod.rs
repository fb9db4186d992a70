pub mod answers;
pub mod identity;
pub mod progress;
pub mod topics;
