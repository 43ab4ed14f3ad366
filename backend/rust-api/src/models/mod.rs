pub mod exercise;
pub mod progress;
pub mod student;
pub mod submission;
