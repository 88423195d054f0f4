// Domain layer: portrait models and the storage/config ports the engine is generic over.

pub mod model;
pub mod ports;
