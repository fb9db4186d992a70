pub mod catalog;
pub mod locks;
pub mod progress;
pub mod submission;
