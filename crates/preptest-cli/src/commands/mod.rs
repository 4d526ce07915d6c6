pub mod check_config;
pub mod generate;
pub mod init;
