use crate::config::{FailurePolicy, Mode, SequencerOptions};
use crate::naming::DEFAULT_PREFIX;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Raw, unchecked run settings as they come off the command line.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub mode: String,
    pub prefix: String,
    pub recursive: bool,
    pub strict: bool,
}

impl Default for RunRequest {
    fn default() -> Self {
        Self {
            input: None,
            output: None,
            mode: Mode::Copy.to_string(),
            prefix: DEFAULT_PREFIX.to_string(),
            recursive: false,
            strict: false,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("モードが不正です: {0} (copy または move を指定してください)")]
    InvalidMode(String),
    #[error("入力フォルダの絶対パスを指定してください")]
    MissingInput,
    #[error("入力フォルダのパスが不正です: {}", .0.display())]
    InputNotDirectory(PathBuf),
    #[error("出力フォルダの絶対パスを指定してください")]
    MissingOutput,
    #[error("出力フォルダのパスが不正です: {}", .0.display())]
    OutputNotDirectory(PathBuf),
    #[error("入力フォルダ内でリネームするには --mode move を指定してください")]
    SameDirectoryCopy,
    #[error("接頭辞にパス区切り文字は使えません: {0}")]
    InvalidPrefix(String),
}

/// Checks a request and resolves both folders to absolute paths.
///
/// Checks run in a fixed order (mode, input, output, same-folder copy,
/// prefix) and the first failure is returned.
pub fn validate_request(request: &RunRequest) -> Result<SequencerOptions, ValidationError> {
    let mode = Mode::parse(&request.mode)
        .ok_or_else(|| ValidationError::InvalidMode(request.mode.clone()))?;

    let input = request
        .input
        .as_deref()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or(ValidationError::MissingInput)?;
    let input = resolve_directory(input)
        .ok_or_else(|| ValidationError::InputNotDirectory(input.to_path_buf()))?;

    let output = request
        .output
        .as_deref()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or(ValidationError::MissingOutput)?;
    let output = resolve_directory(output)
        .ok_or_else(|| ValidationError::OutputNotDirectory(output.to_path_buf()))?;

    if input == output && mode == Mode::Copy {
        return Err(ValidationError::SameDirectoryCopy);
    }

    if request.prefix.contains(['/', '\\']) {
        return Err(ValidationError::InvalidPrefix(request.prefix.clone()));
    }

    Ok(SequencerOptions {
        input,
        output,
        mode,
        prefix: request.prefix.clone(),
        recursive: request.recursive,
        failure_policy: if request.strict {
            FailurePolicy::Abort
        } else {
            FailurePolicy::Continue
        },
    })
}

fn resolve_directory(path: &Path) -> Option<PathBuf> {
    let canonical = fs::canonicalize(path).ok()?;
    canonical.is_dir().then_some(canonical)
}

#[cfg(test)]
mod tests {
    use super::{validate_request, RunRequest, ValidationError};
    use crate::config::{FailurePolicy, Mode};
    use std::fs;
    use tempfile::tempdir;

    fn request(input: &std::path::Path, output: &std::path::Path) -> RunRequest {
        RunRequest {
            input: Some(input.to_path_buf()),
            output: Some(output.to_path_buf()),
            ..RunRequest::default()
        }
    }

    #[test]
    fn accepts_existing_directories() {
        let temp = tempdir().expect("tempdir");
        let input = temp.path().join("in");
        let output = temp.path().join("out");
        fs::create_dir_all(&input).expect("create input");
        fs::create_dir_all(&output).expect("create output");

        let options = validate_request(&request(&input, &output)).expect("valid request");
        assert_eq!(options.mode, Mode::Copy);
        assert_eq!(options.prefix, "DSC");
        assert!(options.input.is_absolute());
        assert_eq!(options.input, fs::canonicalize(&input).expect("canonical"));
        assert_eq!(options.failure_policy, FailurePolicy::Continue);
    }

    #[test]
    fn rejects_unknown_mode_first() {
        let req = RunRequest {
            mode: "link".to_string(),
            ..RunRequest::default()
        };
        assert_eq!(
            validate_request(&req).expect_err("bad mode"),
            ValidationError::InvalidMode("link".to_string())
        );
    }

    #[test]
    fn rejects_missing_paths() {
        assert_eq!(
            validate_request(&RunRequest::default()).expect_err("no input"),
            ValidationError::MissingInput
        );

        let temp = tempdir().expect("tempdir");
        let req = RunRequest {
            input: Some(temp.path().to_path_buf()),
            ..RunRequest::default()
        };
        assert_eq!(
            validate_request(&req).expect_err("no output"),
            ValidationError::MissingOutput
        );
    }

    #[test]
    fn rejects_nonexistent_or_file_paths() {
        let temp = tempdir().expect("tempdir");
        let missing = temp.path().join("missing");
        let file = temp.path().join("file.jpg");
        fs::write(&file, b"x").expect("write file");

        assert_eq!(
            validate_request(&request(&missing, temp.path())).expect_err("missing input"),
            ValidationError::InputNotDirectory(missing.clone())
        );
        assert_eq!(
            validate_request(&request(temp.path(), &file)).expect_err("file output"),
            ValidationError::OutputNotDirectory(file)
        );
    }

    #[test]
    fn same_directory_requires_move() {
        let temp = tempdir().expect("tempdir");
        let dir = temp.path();

        assert_eq!(
            validate_request(&request(dir, dir)).expect_err("same dir copy"),
            ValidationError::SameDirectoryCopy
        );

        let req = RunRequest {
            mode: "move".to_string(),
            ..request(dir, dir)
        };
        let options = validate_request(&req).expect("same dir move");
        assert_eq!(options.mode, Mode::Move);
    }

    #[test]
    fn same_directory_is_detected_through_dot_segments() {
        let temp = tempdir().expect("tempdir");
        let dir = temp.path().join("photos");
        fs::create_dir_all(&dir).expect("create dir");
        let alias = dir.join(".").join("..").join("photos");

        assert_eq!(
            validate_request(&request(&dir, &alias)).expect_err("same dir copy"),
            ValidationError::SameDirectoryCopy
        );
    }

    #[test]
    fn strict_flag_selects_abort_policy() {
        let temp = tempdir().expect("tempdir");
        let input = temp.path().join("in");
        let output = temp.path().join("out");
        fs::create_dir_all(&input).expect("create input");
        fs::create_dir_all(&output).expect("create output");

        let req = RunRequest {
            strict: true,
            ..request(&input, &output)
        };
        let options = validate_request(&req).expect("valid request");
        assert_eq!(options.failure_policy, FailurePolicy::Abort);
    }

    #[test]
    fn rejects_prefix_with_separator() {
        let temp = tempdir().expect("tempdir");
        let input = temp.path().join("in");
        let output = temp.path().join("out");
        fs::create_dir_all(&input).expect("create input");
        fs::create_dir_all(&output).expect("create output");

        let req = RunRequest {
            prefix: "../escape".to_string(),
            ..request(&input, &output)
        };
        assert_eq!(
            validate_request(&req).expect_err("bad prefix"),
            ValidationError::InvalidPrefix("../escape".to_string())
        );
    }
}
