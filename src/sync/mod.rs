pub mod fair_mutex;

pub use fair_mutex::{FairMutex, FairMutexGuard};
