mod commands;
mod utils;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "adjoin")]
#[command(
    about = "マネージドADと、そのドメインに参加するWindowsインスタンスのテンプレートを合成します",
    long_about = None
)]
struct Cli {
    /// 設定ファイル（省略時は adjoin.kdl を自動発見）
    #[arg(short, long, global = true, env = "ADJOIN_CONFIG_PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// テンプレートを合成して出力ディレクトリに書き出す
    Synth {
        /// スタック名（指定しない場合は全スタック）
        stack: Option<String>,
        /// 出力ディレクトリ
        #[arg(short, long, default_value = "cdk.out")]
        output: PathBuf,
        /// ドメイン名を上書き
        #[arg(long)]
        domain: Option<String>,
        /// YAMLではなくJSONで表示
        #[arg(long)]
        json: bool,
        /// テンプレートを標準出力に表示しない
        #[arg(short, long)]
        quiet: bool,
    },
    /// 前回の合成結果との差分を表示
    Diff {
        /// スタック名（指定しない場合は全スタック）
        stack: Option<String>,
        /// 前回の合成結果があるディレクトリ
        #[arg(short, long, default_value = "cdk.out")]
        output: PathBuf,
    },
    /// 設定されたスタックの一覧を表示
    List,
    /// 設定ファイルを検証（合成はメモリ上のみ）
    Validate,
    /// バージョン情報を表示
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 標準出力はテンプレート専用なので、ログは標準エラーへ
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    // Versionコマンドは設定ファイル不要
    if matches!(cli.command, Commands::Version) {
        println!("adjoin {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = cli.config.as_deref();

    match cli.command {
        Commands::Synth {
            stack,
            output,
            domain,
            json,
            quiet,
        } => {
            commands::synth::handle(
                config,
                commands::synth::SynthOptions {
                    stack,
                    output,
                    domain,
                    json,
                    quiet,
                },
            )?;
        }
        Commands::Diff { stack, output } => {
            commands::diff::handle(config, stack.as_deref(), &output)?;
        }
        Commands::List => {
            commands::list::handle(config)?;
        }
        Commands::Validate => {
            commands::validate::handle(config)?;
        }
        Commands::Version => {
            unreachable!("Version is handled before config loading");
        }
    }

    Ok(())
}
