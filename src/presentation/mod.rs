pub mod argv;
pub mod cli;
