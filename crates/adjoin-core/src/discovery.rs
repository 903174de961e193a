//! 設定ファイルの自動発見
//!
//! 規約ベースの場所から `adjoin.kdl` を探します。

use crate::error::{CoreError, Result};
use std::path::PathBuf;
use tracing::debug;

/// 設定ファイルのパスを直接指定する環境変数
pub const CONFIG_PATH_ENV: &str = "ADJOIN_CONFIG_PATH";

/// カレントディレクトリで探すファイル名（優先順）
const CANDIDATES: [&str; 2] = ["adjoin.local.kdl", "adjoin.kdl"];

/// 設定ファイルを探す
///
/// 以下の優先順位で設定ファイルを検索:
/// 1. 環境変数 ADJOIN_CONFIG_PATH (直接パス指定、存在しなければエラー)
/// 2. カレントディレクトリ: adjoin.local.kdl, adjoin.kdl
/// 3. ./.adjoin/adjoin.kdl
/// 4. ~/.config/adjoin/adjoin.kdl (グローバル設定)
///
/// どこにもなければ `None` を返します。
pub fn find_config_file() -> Result<Option<PathBuf>> {
    // 1. 環境変数で直接指定
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.is_file() {
            debug!(path = %path.display(), "Using config from {}", CONFIG_PATH_ENV);
            return Ok(Some(path));
        }
        return Err(CoreError::ConfigNotFound(path));
    }

    let current_dir = std::env::current_dir()?;

    // 2. カレントディレクトリで検索
    for filename in CANDIDATES {
        let path = current_dir.join(filename);
        if path.is_file() {
            return Ok(Some(path));
        }
    }

    // 3. ./.adjoin/ ディレクトリで検索
    let local = current_dir.join(".adjoin").join("adjoin.kdl");
    if local.is_file() {
        return Ok(Some(local));
    }

    // 4. グローバル設定ファイル
    if let Some(config_dir) = dirs::config_dir() {
        let global = config_dir.join("adjoin").join("adjoin.kdl");
        if global.is_file() {
            return Ok(Some(global));
        }
    }

    debug!("No config file found");
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    /// カレントディレクトリとグローバル設定を一時ディレクトリに向けて実行
    fn in_temp_dir<F: FnOnce(&std::path::Path)>(f: F) {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let config_home = temp_dir.path().join("config-home");
        temp_env::with_vars(
            [
                (CONFIG_PATH_ENV, None),
                ("XDG_CONFIG_HOME", Some(config_home.as_os_str())),
            ],
            || f(temp_dir.path()),
        );

        std::env::set_current_dir(original_dir).unwrap();
    }

    #[test]
    #[serial]
    fn test_find_config_in_current_dir() {
        in_temp_dir(|dir| {
            fs::write(dir.join("adjoin.kdl"), "// test").unwrap();
            let found = find_config_file().unwrap().unwrap();
            assert!(found.ends_with("adjoin.kdl"));
        });
    }

    #[test]
    #[serial]
    fn test_local_file_has_priority() {
        in_temp_dir(|dir| {
            fs::write(dir.join("adjoin.kdl"), "// shared").unwrap();
            fs::write(dir.join("adjoin.local.kdl"), "// local").unwrap();
            let found = find_config_file().unwrap().unwrap();
            assert!(found.ends_with("adjoin.local.kdl"));
        });
    }

    #[test]
    #[serial]
    fn test_find_config_in_dot_dir() {
        in_temp_dir(|dir| {
            let dot_dir = dir.join(".adjoin");
            fs::create_dir(&dot_dir).unwrap();
            fs::write(dot_dir.join("adjoin.kdl"), "// dot dir").unwrap();
            let found = find_config_file().unwrap().unwrap();
            assert!(found.ends_with(".adjoin/adjoin.kdl"));
        });
    }

    #[test]
    #[serial]
    fn test_find_config_env_var() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("custom.kdl");
        fs::write(&config_path, "// custom").unwrap();

        temp_env::with_var(CONFIG_PATH_ENV, Some(config_path.as_os_str()), || {
            assert_eq!(find_config_file().unwrap(), Some(config_path.clone()));
        });
    }

    #[test]
    #[serial]
    fn test_env_var_pointing_nowhere_is_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("missing.kdl");

        temp_env::with_var(CONFIG_PATH_ENV, Some(missing.as_os_str()), || {
            assert!(matches!(
                find_config_file(),
                Err(CoreError::ConfigNotFound(path)) if path == missing
            ));
        });
    }

    #[test]
    #[serial]
    fn test_no_config_found() {
        in_temp_dir(|_| {
            assert_eq!(find_config_file().unwrap(), None);
        });
    }
}
