//! モデル定義
//!
//! adjoin の設定ファイルから読み込まれるデータモデルを定義します。

mod project;
mod stack;

// Re-exports
pub use project::*;
pub use stack::*;
