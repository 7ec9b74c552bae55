mod evaluator;

pub use evaluator::evaluate;
