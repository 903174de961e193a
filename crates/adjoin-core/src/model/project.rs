//! プロジェクト定義

use super::stack::StackConfig;

/// Project - 設定ファイル全体
///
/// 設定ファイルに書かれた全スタックを宣言順に保持します。
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    /// スタック設定（宣言順）
    pub stacks: Vec<StackConfig>,
}

impl Default for Project {
    /// 設定ファイルがない場合に使う、デフォルトのスタック1つだけの構成
    fn default() -> Self {
        Self {
            stacks: vec![StackConfig::default()],
        }
    }
}

impl Project {
    /// 名前でスタック設定を取得
    pub fn stack(&self, name: &str) -> Option<&StackConfig> {
        self.stacks.iter().find(|s| s.name == name)
    }

    /// スタック名一覧
    pub fn stack_names(&self) -> Vec<&str> {
        self.stacks.iter().map(|s| s.name.as_str()).collect()
    }
}
