//! Command-line surface for the workflow.
// 中文: 工作流的命令行入口。

use std::fmt::Display;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::common::config::Settings;
use crate::error::{Error, Result};
use crate::scheme::SchemeSelector;
use crate::storage::KeyStore;
use crate::workflow::{ActionReport, VerifyOutcome, Workflow};

/// kem-kit — file-based post-quantum key encapsulation.
///
/// Generates ML-KEM / Kyber key pairs, encapsulates and decapsulates shared
/// secrets, and keeps every piece of key material as a flat binary file in the
/// artifact root.
#[derive(Parser, Debug)]
#[command(name = "kem-kit", author, version, about, long_about = None)]
pub struct Cli {
    /// KEM family: `ml-kem` (default) or `kyber`
    #[arg(long, global = true)]
    pub family: Option<String>,

    /// Security level: 512 (default), 768 or 1024
    #[arg(long, global = true)]
    pub level: Option<u32>,

    /// Directory holding the artifacts (default: current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub artifact_root: Option<PathBuf>,

    /// Configuration file (default: ./kem-kit.toml if present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Generate a key pair: writes public_key.bin and private_key.bin
    Keygen,

    /// Encapsulate a shared secret: reads public_key.bin, writes shared_secret.bin and ciphertext.bin
    #[command(visible_alias = "encaps")]
    Encapsulate,

    /// Decapsulate the ciphertext: reads private_key.bin and ciphertext.bin, writes decrypted_secret.bin
    #[command(visible_alias = "decaps")]
    Decapsulate {
        /// Compare the decrypted secret with shared_secret.bin afterwards
        #[arg(long)]
        verify: bool,

        /// Exit with status 2 when verification does not succeed
        #[arg(long, requires = "verify")]
        strict: bool,
    },

    /// Compare shared_secret.bin with decrypted_secret.bin
    Verify {
        /// Exit with status 2 when verification does not succeed
        #[arg(long)]
        strict: bool,
    },

    /// Show which artifacts are present
    Status,

    /// Show the selected scheme and its sizes
    Info,
}

/// 成功运行后的进程状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    /// 严格模式下校验未通过
    VerificationFailed,
}

impl From<RunStatus> for ExitCode {
    fn from(status: RunStatus) -> Self {
        match status {
            RunStatus::Success => ExitCode::SUCCESS,
            RunStatus::VerificationFailed => ExitCode::from(2),
        }
    }
}

/// 参数解析失败时的退出码：`--help` / `--version` 为 0，其余用法错误为 1。
///
/// 状态 2 只留给严格模式下的校验失败，因此不使用 clap 默认的用法错误码。
pub fn usage_exit_code(err: &clap::Error) -> u8 {
    if err.use_stderr() { 1 } else { 0 }
}

/// 初始化日志。`RUST_LOG` 优先，否则由 `-v` / `-q` 决定级别；日志写到 stderr。
pub fn init_tracing(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// 打印错误及其完整的原因链
pub fn report_error(err: &Error) {
    eprintln!("error: {err}");
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }
}

/// 合并配置文件、环境变量与命令行参数；命令行优先
pub fn resolve_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(family) = &cli.family {
        settings.scheme.family = family.clone();
    }
    if let Some(level) = cli.level {
        settings.scheme.level = level;
    }
    if let Some(root) = &cli.artifact_root {
        settings.storage.artifact_root = root.clone();
    }
    debug!(?settings, "settings resolved");
    Ok(settings)
}

/// 执行命令，结果写到标准输出
pub fn run(cli: &Cli) -> Result<RunStatus> {
    let stdout = io::stdout();
    run_with_output(cli, &mut stdout.lock())
}

/// 执行命令，结果写到 `out`
pub fn run_with_output<W: Write>(cli: &Cli, out: &mut W) -> Result<RunStatus> {
    let settings = resolve_settings(cli)?;
    // 任何子命令都先校验方案选择，非法的全局参数不会被静默忽略
    let selector = settings.selector()?;
    let store = KeyStore::from_config(&settings.storage);
    let workflow = Workflow::new(&store);

    match &cli.command {
        Command::Keygen => {
            let report = workflow.generate(selector)?;
            print_report(out, "Keys generated and saved", &report)?;
        }
        Command::Encapsulate => {
            let report = workflow.encapsulate(selector)?;
            print_report(out, "Shared secret and ciphertext saved", &report)?;
        }
        Command::Decapsulate { verify, strict } => {
            if *verify {
                let (report, outcome) = workflow.decapsulate_and_verify(selector)?;
                print_report(out, "Decrypted shared secret saved", &report)?;
                line(out, &outcome)?;
                return Ok(verify_status(&outcome, *strict || settings.verify.strict));
            }
            let report = workflow.decapsulate(selector)?;
            print_report(out, "Decrypted shared secret saved", &report)?;
        }
        Command::Verify { strict } => {
            let outcome = workflow.verify()?;
            line(out, &outcome)?;
            return Ok(verify_status(&outcome, *strict || settings.verify.strict));
        }
        Command::Status => {
            line(out, format!("artifact root: {}", store.root().display()))?;
            for (slot, info) in workflow.status()? {
                match info {
                    Some(info) => line(
                        out,
                        format!(
                            "{:<18}{:>6} bytes  sha256:{}",
                            slot.name(),
                            info.len,
                            info.fingerprint
                        ),
                    )?,
                    None => line(out, format!("{:<18}missing", slot.name()))?,
                }
            }
        }
        Command::Info => print_info(out, selector)?,
    }

    Ok(RunStatus::Success)
}

fn verify_status(outcome: &VerifyOutcome, strict: bool) -> RunStatus {
    if strict && !outcome.is_match() {
        RunStatus::VerificationFailed
    } else {
        RunStatus::Success
    }
}

fn print_report<W: Write>(out: &mut W, headline: &str, report: &ActionReport) -> Result<()> {
    let paths: Vec<String> = report
        .written
        .iter()
        .map(|w| w.path.display().to_string())
        .collect();
    line(out, format!("{} [{}]: {}", headline, report.scheme, paths.join(", ")))
}

fn print_info<W: Write>(out: &mut W, selector: SchemeSelector) -> Result<()> {
    let scheme = selector.scheme();
    let sizes = scheme.sizes();
    line(out, format!("scheme:        {}", scheme.name()))?;
    line(out, format!("family:        {}", selector.family()))?;
    line(out, format!("level:         {}", selector.level()))?;
    line(out, format!("public key:    {} bytes", sizes.public_key))?;
    line(out, format!("private key:   {} bytes", sizes.secret_key))?;
    line(out, format!("ciphertext:    {} bytes", sizes.ciphertext))?;
    line(out, format!("shared secret: {} bytes", sizes.shared_secret))
}

fn line<W: Write>(out: &mut W, text: impl Display) -> Result<()> {
    writeln!(out, "{text}").map_err(|e| Error::io("<stdout>", e))
}
