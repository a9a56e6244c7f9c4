mod format;
mod report;
mod stream;
mod trim;

pub use format::signatures;
pub use format::{detect, RomFormat, ROM_EXTENSIONS};
pub use report::{ConsoleSink, StatusSink};
pub use stream::TrimStream;
pub use trim::{trim_header, TrimError, TrimOutcome, HEADER_PROBE_LEN};
