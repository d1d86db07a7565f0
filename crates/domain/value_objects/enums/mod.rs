pub mod file_slots;
pub mod scalar_fields;
