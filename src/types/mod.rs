pub mod change;
pub mod collection;
pub mod config;
pub mod model;
pub mod model_methods;
