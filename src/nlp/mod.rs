pub mod clean;
pub mod keywords;
