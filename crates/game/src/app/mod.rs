mod bootstrap;
mod scenes;

pub(crate) use bootstrap::{init_tracing, run};
