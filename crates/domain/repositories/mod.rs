pub mod candidates;
pub mod storage;
