use std::fs::{self, File};
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

use romtrim_format::{trim_header, StatusSink, TrimOutcome};

use crate::error::{Error, Result};
use crate::util;

struct TrimmedEntry {
    index: usize,
    name: String,
    data: Vec<u8>,
    options: FileOptions,
}

/// Trim every ROM entry inside a zip container, in place.
///
/// Entries are trimmed against an in-memory copy of their decompressed
/// bytes. If at least one entry had a header, the archive is rewritten to a
/// temporary sibling (trimmed entries re-added with their original
/// compression method, timestamp and permissions; everything else copied
/// raw) and renamed over the original. An archive whose entries all report
/// no header is left completely untouched. Nested zips are not descended
/// into.
pub fn process_archive(path: &Path, sink: &mut dyn StatusSink) -> Result<()> {
    let modified = util::modified_time(path)?;

    let file = File::open(path).map_err(|source| Error::OpenFile {
        path: path.to_path_buf(),
        source,
    })?;
    let mut zip = ZipArchive::new(file).map_err(|source| Error::OpenArchive {
        path: path.to_path_buf(),
        source,
    })?;

    let mut trimmed = Vec::new();
    let mut any_removed = false;

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).map_err(|source| Error::EntryAt {
            path: path.to_path_buf(),
            index,
            source,
        })?;

        if !entry.is_file() || !util::is_rom(Path::new(entry.name())) {
            continue;
        }

        let name = entry.name().to_string();
        let mut data = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut data)
            .map_err(|source| Error::ReadEntry {
                name: name.clone(),
                source,
            })?;

        let mut options = FileOptions::default()
            .compression_method(entry.compression())
            .last_modified_time(entry.last_modified());
        if let Some(mode) = entry.unix_mode() {
            options = options.unix_permissions(mode);
        }
        drop(entry);

        let display_name = entry_file_name(&name);
        let mut cursor = Cursor::new(data);
        let outcome =
            trim_header(&mut cursor, &display_name, sink).map_err(|source| Error::Trim {
                filename: display_name,
                source,
            })?;

        if let TrimOutcome::HeaderRemoved(_) = outcome {
            any_removed = true;
        }

        trimmed.push(TrimmedEntry {
            index,
            name,
            data: cursor.into_inner(),
            options,
        });
    }

    if !any_removed {
        return Ok(());
    }

    tracing::debug!(
        path = %path.display(),
        entries = zip.len(),
        trimmed = trimmed.len(),
        "rewriting archive"
    );

    let tmp_path = tmp_sibling(path);
    let tmp_file = File::create(&tmp_path).map_err(|source| Error::ReplaceArchive {
        path: tmp_path.clone(),
        source,
    })?;
    let mut writer = ZipWriter::new(tmp_file);

    let mut pending = trimmed.into_iter().peekable();
    for index in 0..zip.len() {
        if pending.peek().map(|t| t.index) == Some(index) {
            let entry = pending.next().unwrap();
            writer
                .start_file(entry.name.as_str(), entry.options)
                .map_err(|source| Error::RewriteArchive {
                    path: path.to_path_buf(),
                    source,
                })?;
            writer
                .write_all(&entry.data)
                .map_err(|source| Error::WriteEntry {
                    name: entry.name,
                    source,
                })?;
        } else {
            let entry = zip.by_index_raw(index).map_err(|source| Error::EntryAt {
                path: path.to_path_buf(),
                index,
                source,
            })?;
            writer
                .raw_copy_file(entry)
                .map_err(|source| Error::RewriteArchive {
                    path: path.to_path_buf(),
                    source,
                })?;
        }
    }

    let tmp_file = writer.finish().map_err(|source| Error::RewriteArchive {
        path: path.to_path_buf(),
        source,
    })?;
    tmp_file
        .set_modified(modified)
        .map_err(|source| Error::RestoreModified {
            path: path.to_path_buf(),
            source,
        })?;
    drop(tmp_file);
    drop(zip);

    fs::rename(&tmp_path, path).map_err(|source| Error::ReplaceArchive {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

/// Final component of an entry name; zip entry paths always use `/`.
fn entry_file_name(name: &str) -> String {
    name.rsplit('/').next().unwrap_or(name).to_string()
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".romtrim-tmp");
    path.with_file_name(name)
}
