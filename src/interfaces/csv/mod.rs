pub mod application_reader;
pub mod schedule_writer;
