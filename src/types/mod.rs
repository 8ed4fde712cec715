mod cert;
mod record;
mod timestamp;

pub use cert::*;
pub use record::*;
pub use timestamp::*;
