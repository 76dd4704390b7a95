// Domain layer - Core timeline logic

pub mod errors;
pub mod model;
pub mod rules;
