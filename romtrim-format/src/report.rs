use crate::trim::TrimOutcome;

/// Side channel for the per-file status lines. The trimmer reports the
/// filename before inspecting the stream and the outcome afterwards; tests
/// substitute a capturing sink to assert on the messages.
pub trait StatusSink {
    fn begin(&mut self, filename: &str);
    fn finish(&mut self, outcome: &TrimOutcome);
}

/// Prints status lines to stdout, one blank line between files.
pub struct ConsoleSink;

impl StatusSink for ConsoleSink {
    fn begin(&mut self, filename: &str) {
        println!("{}", filename);
    }

    fn finish(&mut self, outcome: &TrimOutcome) {
        match outcome {
            TrimOutcome::HeaderRemoved(_) => println!("Removed header\n"),
            TrimOutcome::NoHeaderFound => println!("No header found\n"),
        }
    }
}
