use crate::config::SequencerOptions;
use crate::exif_reader::read_capture_timestamp;
use crate::metadata::ImageFile;
use crate::naming::SequenceNamer;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SequenceCandidate {
    pub sequence: u64,
    pub original_path: PathBuf,
    pub target_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SequenceStats {
    pub scanned_files: usize,
    pub jpg_files: usize,
    pub skipped_non_jpg: usize,
    pub walk_errors: usize,
    pub missing_timestamp: usize,
    pub planned: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequencePlan {
    pub input: PathBuf,
    pub output: PathBuf,
    pub prefix: String,
    pub candidates: Vec<SequenceCandidate>,
    pub stats: SequenceStats,
}

/// Discovers, dates, orders and names every JPG under `options.input`.
///
/// Nothing on disk is modified. Any file whose EXIF cannot be opened or
/// decoded fails the whole plan.
pub fn generate_plan(options: &SequencerOptions) -> Result<SequencePlan> {
    let mut stats = SequenceStats::default();
    let jpg_files = collect_jpg_files(&options.input, options.recursive, &mut stats);

    let mut files = Vec::with_capacity(jpg_files.len());
    for path in jpg_files {
        let timestamp = read_capture_timestamp(&path)?;
        if timestamp.is_zero() {
            stats.missing_timestamp += 1;
            debug!(path = %path.display(), "撮影日時なし");
        }
        files.push(ImageFile::new(path, timestamp));
    }

    sort_by_capture(&mut files);

    let mut namer = SequenceNamer::new(options.prefix.as_str());
    let candidates: Vec<SequenceCandidate> = files
        .iter()
        .map(|file| {
            let target_name = namer.next_file_name(&file.extension_with_dot());
            SequenceCandidate {
                sequence: namer.current(),
                original_path: file.path.clone(),
                target_path: options.output.join(target_name),
            }
        })
        .collect();

    stats.planned = candidates.len();
    info!(
        planned = stats.planned,
        missing_timestamp = stats.missing_timestamp,
        "連番計画を作成しました"
    );

    Ok(SequencePlan {
        input: options.input.clone(),
        output: options.output.clone(),
        prefix: options.prefix.clone(),
        candidates,
        stats,
    })
}

/// Stable ascending sort on the capture date. Files with the same date keep
/// their discovery order.
pub fn sort_by_capture(files: &mut [ImageFile]) {
    files.sort_by_key(|file| file.timestamp);
}

/// Lists JPG files below `root` in file-name order. Directories are never
/// returned and entries that cannot be read are counted and skipped.
pub fn collect_jpg_files(root: &Path, recursive: bool, stats: &mut SequenceStats) -> Vec<PathBuf> {
    let mut walker = WalkDir::new(root).min_depth(1).sort_by_file_name();
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut out = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(
                    root = %root.display(),
                    error = %err,
                    "フォルダ走査中のエントリを読めませんでした"
                );
                stats.walk_errors += 1;
                continue;
            }
        };
        let path = entry.path();
        if path.is_dir() {
            continue;
        }
        stats.scanned_files += 1;

        if is_jpg(path) {
            stats.jpg_files += 1;
            out.push(path.to_path_buf());
        } else {
            stats.skipped_non_jpg += 1;
        }
    }

    out
}

fn is_jpg(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("jpg"))
        .unwrap_or(false)
}
