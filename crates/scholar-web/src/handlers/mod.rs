pub mod index;
pub mod report;
pub mod stream;
