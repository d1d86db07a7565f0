pub mod lazy_bucket;
pub mod s3;
pub mod s3_bucket;
