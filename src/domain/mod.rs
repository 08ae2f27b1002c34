// Domain layer - Core models
pub mod series;
pub mod summary;
pub mod variable;
