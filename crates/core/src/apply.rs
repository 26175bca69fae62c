use crate::config::{ApplyOptions, FailurePolicy, Mode};
use crate::planner::{SequenceCandidate, SequencePlan};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MaterializeFailure {
    pub original_path: PathBuf,
    pub target_path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResult {
    pub mode: Mode,
    pub applied: usize,
    pub failures: Vec<MaterializeFailure>,
}

/// Copies or moves every planned file to its sequential name, in plan order.
///
/// Existing files at a target path are overwritten, except when a move would
/// land on another planned source: then every source is first renamed to a
/// temporary name in the output folder and only afterwards to its final name.
/// With [`FailurePolicy::Continue`] a failed file is logged and recorded in
/// [`ApplyResult::failures`]; with [`FailurePolicy::Abort`] it ends the run.
pub fn apply_plan(plan: &SequencePlan, options: &ApplyOptions) -> Result<ApplyResult> {
    let mut progress = Progress::default();

    if options.mode == Mode::Move && targets_overlap_sources(&plan.candidates) {
        debug!("移動先が未処理の元ファイルと重なるため一時名を経由します");
        move_staged(&plan.candidates, options.failure_policy, &mut progress)?;
    } else {
        for candidate in &plan.candidates {
            match materialize(candidate, options.mode) {
                Ok(()) => progress.record_applied(candidate, options.mode),
                Err(err) => progress.record_failure(candidate, err, options.failure_policy)?,
            }
        }
    }

    info!(
        applied = progress.applied,
        failed = progress.failures.len(),
        mode = %options.mode,
        "適用完了"
    );

    Ok(ApplyResult {
        mode: options.mode,
        applied: progress.applied,
        failures: progress.failures,
    })
}

#[derive(Debug, Default)]
struct Progress {
    applied: usize,
    failures: Vec<MaterializeFailure>,
}

impl Progress {
    fn record_applied(&mut self, candidate: &SequenceCandidate, mode: Mode) {
        debug!(
            from = %candidate.original_path.display(),
            to = %candidate.target_path.display(),
            mode = %mode,
            "適用しました"
        );
        self.applied += 1;
    }

    fn record_failure(
        &mut self,
        candidate: &SequenceCandidate,
        err: anyhow::Error,
        policy: FailurePolicy,
    ) -> Result<()> {
        match policy {
            FailurePolicy::Abort => Err(err),
            FailurePolicy::Continue => {
                let reason = format!("{err:#}");
                warn!(error = %reason, "スキップしました");
                self.failures.push(MaterializeFailure {
                    original_path: candidate.original_path.clone(),
                    target_path: candidate.target_path.clone(),
                    reason,
                });
                Ok(())
            }
        }
    }
}

#[derive(Debug)]
struct StagedMove<'a> {
    candidate: &'a SequenceCandidate,
    temp_path: PathBuf,
}

fn targets_overlap_sources(candidates: &[SequenceCandidate]) -> bool {
    let sources: HashSet<&Path> = candidates
        .iter()
        .map(|c| c.original_path.as_path())
        .collect();
    candidates.iter().any(|c| {
        c.target_path != c.original_path && sources.contains(c.target_path.as_path())
    })
}

fn move_staged(
    candidates: &[SequenceCandidate],
    policy: FailurePolicy,
    progress: &mut Progress,
) -> Result<()> {
    let mut staged = Vec::<StagedMove>::with_capacity(candidates.len());
    for (index, candidate) in candidates.iter().enumerate() {
        let temp_path = temp_path_for(candidate, index);
        if let Err(err) = fs::rename(&candidate.original_path, &temp_path) {
            let err = anyhow::Error::from(err).context(format!(
                "一時リネームに失敗しました: {} -> {}",
                candidate.original_path.display(),
                temp_path.display()
            ));
            if policy == FailurePolicy::Abort {
                return Err(with_rollback(err, rollback_staged(&staged)));
            }
            progress.record_failure(candidate, err, policy)?;
            continue;
        }
        staged.push(StagedMove {
            candidate,
            temp_path,
        });
    }

    for (finalized, entry) in staged.iter().enumerate() {
        let candidate = entry.candidate;
        if let Err(err) = fs::rename(&entry.temp_path, &candidate.target_path) {
            let err = anyhow::Error::from(err).context(format!(
                "最終リネームに失敗しました: {} -> {}",
                entry.temp_path.display(),
                candidate.target_path.display()
            ));
            if policy == FailurePolicy::Abort {
                return Err(with_rollback(
                    err,
                    rollback_after_final_rename_failure(&staged, finalized),
                ));
            }
            let err = match restore_original(entry) {
                Ok(()) => err,
                Err(restore_err) => err.context(restore_err),
            };
            progress.record_failure(candidate, err, policy)?;
            continue;
        }
        progress.record_applied(candidate, Mode::Move);
    }

    Ok(())
}

// The original name may already be taken by a finalized target.
fn restore_original(entry: &StagedMove) -> std::result::Result<(), String> {
    let original = &entry.candidate.original_path;
    if original.exists() {
        return Err(format!(
            "元の名前が使用済みのため一時ファイルを残しました: {}",
            entry.temp_path.display()
        ));
    }
    fs::rename(&entry.temp_path, original).map_err(|err| {
        format!(
            "元の名前に戻せませんでした ({err}): {}",
            entry.temp_path.display()
        )
    })
}

fn with_rollback(err: anyhow::Error, rollback: Result<()>) -> anyhow::Error {
    match rollback {
        Ok(()) => err,
        Err(rollback_err) => {
            err.context(format!("ロールバックにも失敗しました: {rollback_err:#}"))
        }
    }
}

fn rollback_staged(staged: &[StagedMove]) -> Result<()> {
    for entry in staged.iter().rev() {
        if !entry.temp_path.exists() {
            continue;
        }
        fs::rename(&entry.temp_path, &entry.candidate.original_path).with_context(|| {
            format!(
                "ロールバックに失敗しました: {} -> {}",
                entry.temp_path.display(),
                entry.candidate.original_path.display()
            )
        })?;
    }
    Ok(())
}

fn rollback_after_final_rename_failure(
    staged: &[StagedMove],
    finalized: usize,
) -> Result<()> {
    for entry in staged[..finalized].iter().rev() {
        let target = &entry.candidate.target_path;
        if !target.exists() {
            continue;
        }
        fs::rename(target, &entry.temp_path).with_context(|| {
            format!(
                "ロールバック(退避)に失敗しました: {} -> {}",
                target.display(),
                entry.temp_path.display()
            )
        })?;
    }
    rollback_staged(staged)
}

fn temp_path_for(candidate: &SequenceCandidate, index: usize) -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let parent = candidate
        .target_path
        .parent()
        .unwrap_or_else(|| Path::new("."));
    let file_name = candidate
        .original_path
        .file_name()
        .map(|v| v.to_string_lossy().to_string())
        .unwrap_or_else(|| "file".to_string());
    parent.join(format!(".photo_sequencer_tmp_{}_{}_{}", now, index, file_name))
}

fn materialize(candidate: &SequenceCandidate, mode: Mode) -> Result<()> {
    let from = &candidate.original_path;
    let to = &candidate.target_path;
    match mode {
        Mode::Move => fs::rename(from, to).with_context(|| {
            format!("移動に失敗しました: {} -> {}", from.display(), to.display())
        }),
        Mode::Copy => copy_file(from, to).map(|_| ()),
    }
}

/// Streams `from` into `to` and syncs it. A failed copy leaves no partial
/// target behind.
fn copy_file(from: &Path, to: &Path) -> Result<u64> {
    let mut input = File::open(from)
        .with_context(|| format!("コピー元を開けませんでした: {}", from.display()))?;
    let mut output = File::create(to)
        .with_context(|| format!("コピー先を作成できませんでした: {}", to.display()))?;

    let copied = io::copy(&mut input, &mut output)
        .with_context(|| {
            format!("コピーに失敗しました: {} -> {}", from.display(), to.display())
        })
        .and_then(|copied| {
            output
                .sync_all()
                .with_context(|| format!("コピー先を書き込めませんでした: {}", to.display()))?;
            Ok(copied)
        });

    if copied.is_err() {
        drop(output);
        if let Err(err) = fs::remove_file(to) {
            warn!(
                path = %to.display(),
                error = %err,
                "不完全なコピー先を削除できませんでした"
            );
        }
    }
    copied
}
