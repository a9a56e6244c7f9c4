use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use structopt::StructOpt;

use romtrim_format::{trim_header, ConsoleSink, StatusSink, ROM_EXTENSIONS};

mod archive;
mod error;
mod util;

use error::{Error, Result};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "romtrim",
    about = "Remove redundant copier headers from ROM image files, in place.",
    usage = "romtrim <file | folder> ..."
)]
struct CliOpts {
    #[structopt(
        name = "paths",
        parse(from_os_str),
        help = "Files or directories to process"
    )]
    paths: Vec<PathBuf>,
}

fn print_usage() {
    let mut exts = vec![".zip".to_string()];
    exts.extend(ROM_EXTENSIONS.iter().map(|ext| format!(".{}", ext)));

    println!("Usage: romtrim <file | folder> ...\n");
    println!("Supported filetypes: {}", exts.join(", "));
}

fn process_path(path: &Path, sink: &mut dyn StatusSink) -> Result<()> {
    if path.is_dir() {
        process_directory(path, sink)
    } else if path.is_file() && util::is_candidate(path) {
        process_file(path, sink)
    } else {
        // Unknown extensions and missing paths are skipped silently.
        Ok(())
    }
}

fn process_directory(path: &Path, sink: &mut dyn StatusSink) -> Result<()> {
    tracing::debug!(path = %path.display(), "walking directory");

    for entry in jwalk::WalkDir::new(path).sort(true) {
        let entry = entry.map_err(|source| Error::ProcessDirEntry { source })?;
        let entry_path = entry.path();
        if entry_path.is_file() && util::is_candidate(&entry_path) {
            process_file(&entry_path, sink)?;
        }
    }

    Ok(())
}

fn process_file(path: &Path, sink: &mut dyn StatusSink) -> Result<()> {
    if util::is_zip(path) {
        archive::process_archive(path, sink)
    } else {
        trim_plain_file(path, sink)
    }
}

/// Trim a standalone ROM file in place, restoring its modification time so
/// the operation is never observed as a metadata-only change.
fn trim_plain_file(path: &Path, sink: &mut dyn StatusSink) -> Result<()> {
    let modified = util::modified_time(path)?;
    let filename = util::file_name(path);

    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(|source| Error::OpenFile {
            path: path.to_path_buf(),
            source,
        })?;

    trim_header(&mut file, &filename, sink).map_err(|source| Error::Trim { filename, source })?;

    file.set_modified(modified)
        .map_err(|source| Error::RestoreModified {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let opts = CliOpts::from_iter(wild::args_os());

    if opts.paths.is_empty() {
        print_usage();
        return;
    }

    let mut sink = ConsoleSink;
    let result = opts
        .paths
        .iter()
        .try_for_each(|path| process_path(path, &mut sink));

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        let mut source = std::error::Error::source(&e);
        while let Some(inner) = source {
            eprintln!("  caused by: {}", inner);
            source = inner.source();
        }
        std::process::exit(1);
    }
}
