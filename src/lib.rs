mod dem;

pub use dem::*;
