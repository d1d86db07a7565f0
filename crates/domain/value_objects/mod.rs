pub mod candidates;
pub mod enums;
pub mod recordings;
pub mod storage;
pub mod submission_contract;
pub mod validation;
