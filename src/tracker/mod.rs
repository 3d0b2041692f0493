pub mod status;
pub mod store;
