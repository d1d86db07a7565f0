pub mod candidates;
pub mod diagnostics;
