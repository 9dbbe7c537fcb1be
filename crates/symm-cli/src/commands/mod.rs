pub mod accuracy;
pub mod kernel;
