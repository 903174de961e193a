//! KDLパーサー
//!
//! adjoin のKDL設定ファイルをパースします。
//! `stack` ノードのパース処理はモジュールに分離されています。

mod stack;

pub use stack::parse_stack;

use crate::error::{CoreError, Result};
use crate::model::Project;
use kdl::KdlDocument;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// KDLファイルをパースしてProjectを生成
pub fn parse_kdl_file<P: AsRef<Path>>(path: P) -> Result<Project> {
    let path = path.as_ref();
    debug!(path = %path.display(), "Parsing config file");
    let content = fs::read_to_string(path)?;
    parse_kdl_string(&content)
}

/// KDL文字列をパース
///
/// トップレベルの `stack` ノードを宣言順に読み込みます。
/// 未知のノードは警告を出して無視します。
pub fn parse_kdl_string(content: &str) -> Result<Project> {
    let doc: KdlDocument = content.parse()?;

    let mut stacks = Vec::new();
    let mut seen = HashSet::new();

    for node in doc.nodes() {
        match node.name().value() {
            "stack" => {
                let stack = parse_stack(node)?;
                if !seen.insert(stack.name.clone()) {
                    return Err(CoreError::InvalidConfig(format!(
                        "スタック名が重複しています: {}",
                        stack.name
                    )));
                }
                stacks.push(stack);
            }
            other => {
                warn!(node = other, "Ignoring unknown top-level node");
            }
        }
    }

    if stacks.is_empty() {
        return Err(CoreError::InvalidConfig(
            "stack ノードが1つもありません".to_string(),
        ));
    }

    Ok(Project { stacks })
}
