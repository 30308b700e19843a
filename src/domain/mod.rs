// Domain layer: content models and ports. Adapters live under crate::adapters and crate::config.

pub mod model;
pub mod ports;
