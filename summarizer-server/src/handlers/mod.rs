pub mod health;
pub mod summarization;
