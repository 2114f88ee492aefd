pub(crate) mod gateway;
#[cfg(test)]
pub(crate) mod mock;
pub(crate) mod pg;
pub mod pool_config;
pub(crate) mod store;
