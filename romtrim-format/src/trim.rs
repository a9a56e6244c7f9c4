use std::io::{ErrorKind, Read, SeekFrom};

use crate::format;
use crate::report::StatusSink;
use crate::stream::TrimStream;

/// Bytes read from the front of the stream for signature inspection.
pub const HEADER_PROBE_LEN: usize = 16;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TrimOutcome {
    /// A header of the given length was removed from the stream.
    HeaderRemoved(u64),
    /// No rule matched; the stream was left untouched.
    NoHeaderFound,
}

#[derive(Debug, thiserror::Error)]
pub enum TrimError {
    #[error("Cannot read stream length")]
    Length(#[source] std::io::Error),

    #[error("Cannot read header probe")]
    ReadHeader(#[source] std::io::Error),

    #[error("Cannot read stream body")]
    ReadBody(#[source] std::io::Error),

    #[error("Cannot write stream body")]
    WriteBody(#[source] std::io::Error),

    #[error("Cannot truncate stream")]
    Truncate(#[source] std::io::Error),
}

/// Inspect the stream for a copier header and remove it in place.
///
/// Reads the first [`HEADER_PROBE_LEN`] bytes and the total length, selects
/// the detection rule by the filename's extension, and on a match rewrites
/// the stream to its own body, truncated to the shorter length. The stream
/// is not closed; a non-matching stream is left byte-for-byte untouched.
pub fn trim_header<S: TrimStream>(
    stream: &mut S,
    filename: &str,
    sink: &mut dyn StatusSink,
) -> Result<TrimOutcome, TrimError> {
    sink.begin(filename);

    let len = stream.byte_len().map_err(TrimError::Length)?;
    stream
        .seek(SeekFrom::Start(0))
        .map_err(TrimError::ReadHeader)?;
    let header = read_probe(stream).map_err(TrimError::ReadHeader)?;

    let format = match format::detect(filename, len, &header) {
        Some(v) => v,
        None => {
            tracing::debug!(filename, len, "no header rule matched");
            let outcome = TrimOutcome::NoHeaderFound;
            sink.finish(&outcome);
            return Ok(outcome);
        }
    };

    let header_len = format.header_len();
    tracing::debug!(filename, len, header_len, %format, "removing header");

    let mut body = Vec::with_capacity((len - header_len) as usize);
    stream
        .seek(SeekFrom::Start(header_len))
        .map_err(TrimError::ReadBody)?;
    stream.read_to_end(&mut body).map_err(TrimError::ReadBody)?;
    stream
        .seek(SeekFrom::Start(0))
        .map_err(TrimError::WriteBody)?;
    stream.write_all(&body).map_err(TrimError::WriteBody)?;
    stream
        .truncate(len - header_len)
        .map_err(TrimError::Truncate)?;

    let outcome = TrimOutcome::HeaderRemoved(header_len);
    sink.finish(&outcome);
    Ok(outcome)
}

/// Read up to [`HEADER_PROBE_LEN`] bytes from the current position. Streams
/// shorter than the probe yield a short buffer rather than an error.
fn read_probe<R: Read>(reader: &mut R) -> std::io::Result<Vec<u8>> {
    let mut buf = [0u8; HEADER_PROBE_LEN];
    let mut filled = 0;

    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(buf[..filled].to_vec())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::format::signatures;

    #[derive(Default)]
    struct CapturingSink {
        lines: Vec<String>,
    }

    impl StatusSink for CapturingSink {
        fn begin(&mut self, filename: &str) {
            self.lines.push(filename.to_string());
        }

        fn finish(&mut self, outcome: &TrimOutcome) {
            let line = match outcome {
                TrimOutcome::HeaderRemoved(_) => "Removed header",
                TrimOutcome::NoHeaderFound => "No header found",
            };
            self.lines.push(line.to_string());
        }
    }

    fn patterned(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    fn nes_rom(len: usize) -> Vec<u8> {
        let mut data = patterned(len);
        data[..4].copy_from_slice(signatures::NES);
        data
    }

    fn trim(data: Vec<u8>, filename: &str) -> (Vec<u8>, TrimOutcome, Vec<String>) {
        let mut cursor = Cursor::new(data);
        let mut sink = CapturingSink::default();
        let outcome = trim_header(&mut cursor, filename, &mut sink).unwrap();
        (cursor.into_inner(), outcome, sink.lines)
    }

    #[test]
    fn nes_header_is_removed() {
        let data = nes_rom(1040);
        let expected = data[16..].to_vec();

        let (out, outcome, lines) = trim(data, "game.nes");

        assert_eq!(outcome, TrimOutcome::HeaderRemoved(16));
        assert_eq!(out.len(), 1024);
        assert_eq!(out, expected);
        assert_eq!(lines, vec!["game.nes".to_string(), "Removed header".to_string()]);
    }

    #[test]
    fn fcn_uses_the_nes_rule() {
        let data = nes_rom(1040);
        let expected = data[16..].to_vec();

        let (out, outcome, _) = trim(data, "game.FCN");

        assert_eq!(outcome, TrimOutcome::HeaderRemoved(16));
        assert_eq!(out, expected);
    }

    #[test]
    fn fds_header_is_removed() {
        let mut data = patterned(65500 + 16);
        data[..4].copy_from_slice(signatures::FDS);
        let expected = data[16..].to_vec();

        let (out, outcome, _) = trim(data, "disk.fds");

        assert_eq!(outcome, TrimOutcome::HeaderRemoved(16));
        assert_eq!(out, expected);
    }

    #[test]
    fn lynx_header_is_removed() {
        let mut data = patterned(1024 + 64);
        data[..4].copy_from_slice(signatures::LYNX);
        let expected = data[64..].to_vec();

        let (out, outcome, _) = trim(data, "game.lnx");

        assert_eq!(outcome, TrimOutcome::HeaderRemoved(64));
        assert_eq!(out, expected);
    }

    #[test]
    fn a78_header_is_removed() {
        let mut data = patterned(1024 * 4 + 128);
        data[1..10].copy_from_slice(signatures::ATARI7800);
        let expected = data[128..].to_vec();

        let (out, outcome, _) = trim(data, "game.a78");

        assert_eq!(outcome, TrimOutcome::HeaderRemoved(128));
        assert_eq!(out, expected);
    }

    #[test]
    fn smc_trims_on_size_alone() {
        let data = patterned(1536);
        let expected = data[512..].to_vec();

        let (out, outcome, _) = trim(data, "game.smc");

        assert_eq!(outcome, TrimOutcome::HeaderRemoved(512));
        assert_eq!(out.len(), 1024);
        assert_eq!(out, expected);
    }

    #[test]
    fn j64_trims_8192_bytes_from_a_megabyte_multiple() {
        let data = patterned(1048576);
        let expected = data[8192..].to_vec();

        let (out, outcome, _) = trim(data, "game.j64");

        assert_eq!(outcome, TrimOutcome::HeaderRemoved(8192));
        assert_eq!(out.len(), 1048576 - 8192);
        assert_eq!(out, expected);
    }

    #[test]
    fn empty_j64_reports_no_header() {
        let (out, outcome, _) = trim(Vec::new(), "game.j64");

        assert_eq!(outcome, TrimOutcome::NoHeaderFound);
        assert!(out.is_empty());
    }

    #[test]
    fn a78_with_wrong_size_is_untouched() {
        let mut data = vec![0u8; 200];
        data[1..10].copy_from_slice(signatures::ATARI7800);

        let (out, outcome, lines) = trim(data.clone(), "game.a78");

        assert_eq!(outcome, TrimOutcome::NoHeaderFound);
        assert_eq!(out, data);
        assert_eq!(lines, vec!["game.a78".to_string(), "No header found".to_string()]);
    }

    #[test]
    fn wrong_signature_is_untouched() {
        let mut data = patterned(1040);
        data[..4].copy_from_slice(b"UNIF");

        let (out, outcome, _) = trim(data.clone(), "game.nes");

        assert_eq!(outcome, TrimOutcome::NoHeaderFound);
        assert_eq!(out, data);
    }

    #[test]
    fn unknown_extension_is_untouched() {
        let data = nes_rom(1040);

        let (out, outcome, _) = trim(data.clone(), "game.bin");

        assert_eq!(outcome, TrimOutcome::NoHeaderFound);
        assert_eq!(out, data);
    }

    #[test]
    fn trimming_is_idempotent() {
        let (once, outcome, _) = trim(nes_rom(1040), "game.nes");
        assert_eq!(outcome, TrimOutcome::HeaderRemoved(16));

        let (twice, outcome, _) = trim(once.clone(), "game.nes");
        assert_eq!(outcome, TrimOutcome::NoHeaderFound);
        assert_eq!(twice, once);
    }

    #[test]
    fn header_only_stream_trims_to_empty() {
        let mut data = vec![0u8; 16];
        data[..4].copy_from_slice(signatures::NES);

        let (out, outcome, _) = trim(data, "game.nes");

        assert_eq!(outcome, TrimOutcome::HeaderRemoved(16));
        assert!(out.is_empty());
    }

    #[test]
    fn stream_shorter_than_the_probe_reports_no_header() {
        let data = signatures::NES[..3].to_vec();

        let (out, outcome, _) = trim(data.clone(), "game.nes");

        assert_eq!(outcome, TrimOutcome::NoHeaderFound);
        assert_eq!(out, data);
    }
}
