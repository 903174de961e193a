//! 統合ローダー
//!
//! ファイル発見とパースを統合

use crate::discovery::find_config_file;
use crate::error::{CoreError, Result};
use crate::model::Project;
use crate::parser::parse_kdl_file;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// 読み込まれた設定
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// プロジェクト設定
    pub project: Project,
    /// 読み込んだファイル（デフォルト構成なら `None`）
    pub source: Option<PathBuf>,
}

/// 設定をロード
///
/// `explicit` が指定されていればそのファイルを、なければ自動発見した
/// ファイルを読み込みます。ファイルがなければデフォルト構成を返します。
#[instrument]
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    let source = match explicit {
        Some(path) if path.is_file() => Some(path.to_path_buf()),
        Some(path) => return Err(CoreError::ConfigNotFound(path.to_path_buf())),
        None => find_config_file()?,
    };

    let project = match &source {
        Some(path) => {
            info!(path = %path.display(), "Loading config");
            parse_kdl_file(path)?
        }
        None => {
            info!("No config file, using the default stack");
            Project::default()
        }
    };

    Ok(LoadedConfig { project, source })
}
