pub mod csv;
pub mod traits;

pub use traits::{
    Connection, RateStorage, SessionStorage, StudentStorage, WeeklyRecordStorage,
};
