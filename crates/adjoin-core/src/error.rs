use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("KDLパースエラー: {0}")]
    KdlParse(#[from] kdl::KdlError),

    #[error("ファイル読み込みエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("無効な設定: {0}")]
    InvalidConfig(String),

    #[error("テンプレート展開エラー: {0}")]
    TemplateRender(String),

    #[error(
        "設定ファイルが見つかりません: {0}\nヒント: ADJOIN_CONFIG_PATH には存在するファイルを指定してください"
    )]
    ConfigNotFound(PathBuf),

    #[error("スタックが見つかりません: {0}")]
    StackNotFound(String),

    #[error("リソース定義エラー: {0}")]
    Aws(#[from] adjoin_aws::AwsError),

    #[error("テンプレート合成エラー: {0}")]
    Cloud(#[from] adjoin_cloud::CloudError),

    #[error("JSONエラー: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
