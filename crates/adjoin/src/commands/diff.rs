use crate::utils;
use adjoin_cloud::{ActionType, AssemblyWriter, Plan};
use colored::Colorize;
use std::path::Path;

pub fn handle(config: Option<&Path>, stack: Option<&str>, output: &Path) -> anyhow::Result<()> {
    let loaded = utils::load(config)?;
    utils::print_config_source(&loaded);

    let assembly = adjoin_core::synth_project(&loaded.project, stack)?;
    let writer = AssemblyWriter::new(output);

    for (name, template) in assembly.iter() {
        let previous = writer.load_template(name)?;
        let plan = Plan::between(previous.as_ref(), template);

        println!();
        println!("{}", format!("スタック: {}", name).bold());
        if previous.is_none() {
            println!("  {}", "(前回の合成結果なし)".dimmed());
        }

        if !plan.has_changes {
            println!("  {}", "変更はありません".green());
            continue;
        }

        for action in &plan.actions {
            let line = format!("{} ({})", action.logical_id, action.resource_type);
            match action.action_type {
                ActionType::Create => println!("  {} {}", "+".green().bold(), line.green()),
                ActionType::Update => {
                    println!("  {} {}", "~".yellow().bold(), line.yellow());
                    let mut keys: Vec<&String> = action.details.keys().collect();
                    keys.sort();
                    for key in keys {
                        println!("      {}", key.dimmed());
                    }
                }
                ActionType::Delete => println!("  {} {}", "-".red().bold(), line.red()),
                ActionType::NoOp => {}
            }
        }

        let summary = plan.summary();
        println!(
            "  作成: {}  更新: {}  削除: {}  変更なし: {}",
            summary.create, summary.update, summary.delete, summary.no_change
        );
    }

    Ok(())
}
