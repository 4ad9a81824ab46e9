pub mod moderate;
pub mod posts;
pub mod stats;
