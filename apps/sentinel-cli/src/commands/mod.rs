pub mod audit;
pub mod init;
pub mod query;
pub mod review;
pub mod status;
