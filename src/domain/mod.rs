// Domain layer: flavours, tagger samples, cuts and the renderer port.

pub mod cuts;
pub mod flavours;
pub mod model;
pub mod ports;
