mod trainer;

pub use trainer::{ProductOutcome, ProductTrainer};
