pub(crate) mod common;
mod concurrency;
