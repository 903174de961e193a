use crate::utils;
use colored::Colorize;
use std::path::Path;

pub fn handle(config: Option<&Path>) -> anyhow::Result<()> {
    let loaded = utils::load(config)?;
    utils::print_config_source(&loaded);

    for stack in &loaded.project.stacks {
        println!("{} ({})", stack.name.cyan(), stack.domain);
    }

    Ok(())
}
