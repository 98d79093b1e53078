//! Tree scanning - local and remote variants, same output contract

mod local;
mod remote;

pub use local::scan_local;
pub use remote::scan_remote;
