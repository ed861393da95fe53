pub mod filter;
pub mod status;
pub mod task_ops;
