pub mod config_io;
pub mod lock;
pub mod task_store;
