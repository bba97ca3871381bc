pub mod builder;
pub mod error;
pub mod node;
pub mod tree_model;
