use adjoin_core::LoadedConfig;
use colored::Colorize;
use std::path::Path;

/// 設定をロード
pub fn load(config: Option<&Path>) -> anyhow::Result<LoadedConfig> {
    Ok(adjoin_core::load_config(config)?)
}

/// 読み込んだ設定ファイル情報を表示（標準エラー）
pub fn print_config_source(loaded: &LoadedConfig) {
    match &loaded.source {
        Some(path) => eprintln!("📄 設定ファイル: {}", path.display().to_string().cyan()),
        None => eprintln!(
            "📄 {}",
            "設定ファイルなし（デフォルト構成を使用）".dimmed()
        ),
    }
}
