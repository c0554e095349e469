// Domain layer: SGIS models and the ports the client and CLI are written against.

pub mod model;
pub mod ports;
