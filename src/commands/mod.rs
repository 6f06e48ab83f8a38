pub mod analyze;
pub mod lookup;
pub mod summarize;
