use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Clone, Debug)]
#[command(version, about, long_about = None,
    override_usage = "store-chroot [OPTIONS] <STORE_PATH> <COMMAND> [ARGS...]")]
pub struct Args {
    /// Set the log level to one of trace, debug, info, warn, or error.
    /// `-v` is shorthand for enabling verbose (trace) logging.
    #[arg(short = 'v',
        long,
        default_missing_value = "trace",
        num_args = 0..=1,
        require_equals = true,
        value_parser = parse_log_level
    )]
    pub log_level: Option<log::LevelFilter>,

    /// Read configuration from this file instead of the default location.
    #[arg(long, value_hint = clap::ValueHint::FilePath, conflicts_with = "no_config")]
    pub config: Option<PathBuf>,

    /// Do not load config files.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub no_config: bool,

    /// Name of the top-level directory that is replaced by STORE_PATH.
    /// Defaults to `nix`.
    #[arg(long, value_hint = clap::ValueHint::Other)]
    pub store_name: Option<String>,

    /// Value exported as NIX_CONF_DIR to the command. Defaults to
    /// `/<store-name>/etc/nix`.
    #[arg(long, value_hint = clap::ValueHint::DirPath)]
    pub conf_dir: Option<PathBuf>,

    /// Directory the sandbox root is created in. Defaults to $TMPDIR or /tmp.
    #[arg(long, value_hint = clap::ValueHint::DirPath)]
    pub tmp_dir: Option<PathBuf>,

    /// Directory that appears at /<store-name> inside the sandbox.
    #[arg(value_name = "STORE_PATH", value_hint = clap::ValueHint::DirPath)]
    pub store_path: PathBuf,

    /// The command to run in the sandbox, followed by its arguments. These
    /// are passed through as-is.
    #[arg(
        value_name = "COMMAND",
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        num_args = 1..,
        value_hint = clap::ValueHint::CommandWithArguments,
    )]
    pub command: Vec<String>,
}

fn parse_log_level(s: &str) -> Result<log::LevelFilter, String> {
    s.parse::<log::LevelFilter>().map_err(|e| e.to_string())
}
