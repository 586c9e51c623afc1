// Domain layer: project tree model and the ports the patcher talks through.

pub mod model;
pub mod ports;
