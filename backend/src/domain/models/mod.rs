pub mod principal;
pub mod warranty;
