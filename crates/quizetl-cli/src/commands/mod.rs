pub mod answer;
pub mod compact;
pub mod etl;
pub mod init;
pub mod results;
pub mod validate;
