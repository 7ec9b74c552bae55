mod selector;

pub use selector::{rank_candidates, select};
