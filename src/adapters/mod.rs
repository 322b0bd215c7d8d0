// Adapters layer: concrete access to the filesystem (sample files, output layout).

pub mod sample;
pub mod storage;
