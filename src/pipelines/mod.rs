pub mod sentiment;
pub mod utils;
