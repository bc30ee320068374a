pub mod http;
pub mod robots;
