// Application layer: concrete renderers behind the plotting port.

pub mod plots;
