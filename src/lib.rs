pub mod catalog;
pub mod crop;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod matrix;
pub mod pipeline;
pub mod serve;
