pub mod candidate_ingestion;
pub mod candidates;

#[cfg(test)]
pub(crate) mod test_support;
