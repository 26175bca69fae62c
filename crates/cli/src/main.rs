use anyhow::Result;
use clap::{Parser, ValueEnum};
use photo_sequencer_core::{
    apply_plan, ask_for_confirmation, generate_plan, validate_request, ApplyResult, RunRequest,
    SequencePlan, DEFAULT_PREFIX,
};
use std::ffi::OsString;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// Flags that used to be spelled with a single dash (`-input /photos`).
const LEGACY_FLAGS: &[&str] = &["input", "output", "mode", "prefix"];

#[derive(Debug, Parser)]
#[command(name = "photo-sequencer")]
#[command(about = "JPG写真を撮影日時順に並べ、連番ファイル名でコピー/移動します")]
struct Cli {
    /// 写真のあるフォルダ (絶対パス)
    #[arg(long)]
    input: Option<PathBuf>,
    /// 連番ファイルの出力先フォルダ (絶対パス)
    #[arg(long)]
    output: Option<PathBuf>,
    /// copy または move
    #[arg(long, default_value = "copy")]
    mode: String,
    /// ファイル名の接頭辞
    #[arg(long, default_value = DEFAULT_PREFIX)]
    prefix: String,
    #[arg(long, default_value_t = false)]
    recursive: bool,
    /// 計画を表示するだけでファイルは変更しない
    #[arg(long, default_value_t = false)]
    dry_run: bool,
    /// 確認プロンプトを省略する
    #[arg(long, short = 'y', default_value_t = false)]
    yes: bool,
    /// 1件でもコピー/移動に失敗したら中断する
    #[arg(long, default_value_t = false)]
    strict: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
    #[arg(long, short = 'v', default_value_t = false)]
    verbose: bool,
    #[arg(long, short = 'q', default_value_t = false, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Completed,
    Previewed,
    Rejected,
    Declined,
}

impl Outcome {
    fn exit_code(self) -> ExitCode {
        match self {
            Outcome::Completed | Outcome::Previewed => ExitCode::SUCCESS,
            Outcome::Rejected | Outcome::Declined => ExitCode::from(1),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse_from(normalize_legacy_flags(std::env::args_os()));
    init_tracing(cli.verbose, cli.quiet);

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut writer = io::stdout().lock();

    match run(cli, &mut reader, &mut writer) {
        Ok(outcome) => outcome.exit_code(),
        Err(err) => {
            eprintln!("エラー: {err:#}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let filter = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Rewrites `-input x` / `-mode=move` into the `--input` form clap expects.
fn normalize_legacy_flags<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| {
            let Some(text) = arg.to_str() else {
                return arg;
            };
            let Some(rest) = text.strip_prefix('-') else {
                return arg;
            };
            let name = rest.split('=').next().unwrap_or(rest);
            if LEGACY_FLAGS.contains(&name) {
                OsString::from(format!("-{text}"))
            } else {
                arg
            }
        })
        .collect()
}

fn run<R, W>(cli: Cli, reader: &mut R, writer: &mut W) -> Result<Outcome>
where
    R: BufRead,
    W: Write,
{
    let request = RunRequest {
        input: cli.input,
        output: cli.output,
        mode: cli.mode,
        prefix: cli.prefix,
        recursive: cli.recursive,
        strict: cli.strict,
    };

    let options = match validate_request(&request) {
        Ok(options) => options,
        Err(err) => {
            writeln!(writer, "{err}")?;
            writeln!(writer, "使い方は --help を参照してください")?;
            return Ok(Outcome::Rejected);
        }
    };

    if cli.dry_run {
        let plan = generate_plan(&options)?;
        print_plan(writer, &plan, cli.format)?;
        eprintln!("dry-runモード: 実ファイルは変更していません。");
        return Ok(Outcome::Previewed);
    }

    if !cli.yes {
        let message = format!(
            "{} のすべてのJPGを {} へ {} します。よろしいですか?",
            options.input.display(),
            options.output.display(),
            options.mode
        );
        if !ask_for_confirmation(&message, reader, writer)? {
            writeln!(writer, "中止しました")?;
            return Ok(Outcome::Declined);
        }
    }

    let plan = generate_plan(&options)?;
    let result = apply_plan(&plan, &options.apply_options())?;
    print_result(writer, &plan, &result, cli.format)?;

    Ok(Outcome::Completed)
}

fn print_plan<W: Write>(writer: &mut W, plan: &SequencePlan, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            writeln!(writer, "{}", serde_json::to_string_pretty(plan)?)?;
        }
        OutputFormat::Table => {
            writeln!(writer, "元ファイル -> 新ファイル")?;
            for candidate in &plan.candidates {
                writeln!(
                    writer,
                    "{} -> {}",
                    candidate.original_path.display(),
                    candidate.target_path.display()
                )?;
            }
            writeln!(
                writer,
                "\n集計: scanned={} jpg={} non_jpg_skip={} walk_error={} no_date={} planned={}",
                plan.stats.scanned_files,
                plan.stats.jpg_files,
                plan.stats.skipped_non_jpg,
                plan.stats.walk_errors,
                plan.stats.missing_timestamp,
                plan.stats.planned
            )?;
        }
    }
    Ok(())
}

fn print_result<W: Write>(
    writer: &mut W,
    plan: &SequencePlan,
    result: &ApplyResult,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            writeln!(writer, "{}", serde_json::to_string_pretty(result)?)?;
        }
        OutputFormat::Table => {
            for failure in &result.failures {
                writeln!(
                    writer,
                    "失敗: {} -> {} ({})",
                    failure.original_path.display(),
                    failure.target_path.display(),
                    failure.reason
                )?;
            }
        }
    }
    eprintln!(
        "適用完了: {}件 / {}件 ({}) 失敗 {}件",
        result.applied,
        plan.candidates.len(),
        result.mode,
        result.failures.len()
    );
    Ok(())
}
