pub mod email;
pub mod summary;
