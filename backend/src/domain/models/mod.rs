pub mod rate;
pub mod session;
pub mod student;
pub mod weekly_record;
