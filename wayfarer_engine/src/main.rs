#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
//! ** Wayfarer **
//! Menu-driven adventure engine

use std::fs;
use std::io::Write;

use anyhow::{Context, Result};
use colored::Colorize;
use log::info;

use wayfarer_engine::config::{init_logging, load_config};
use wayfarer_engine::data_paths::{data_path, packages_root};
use wayfarer_engine::style::GameStyle;
use wayfarer_engine::{Shell, build_resources, load_packages};

fn main() -> Result<()> {
    let config = load_config();
    init_logging(&config);
    info!("Start: loading Wayfarer packages...");

    let packages = load_packages(&packages_root());
    let (resources, conflicts) = build_resources(&packages);
    info!(
        "{} packages loaded, {} resources in play, {} merge conflicts",
        packages.len(),
        resources.total(),
        conflicts.len()
    );

    // clear the screen
    print!("\x1B[2J\x1B[H");
    std::io::stdout().flush()?;

    println!("{:^84}", "WAYFARER".bright_yellow().underline());
    println!();

    let intro_path = data_path("intro.txt");
    let introduction = fs::read_to_string(&intro_path)
        .with_context(|| format!("reading introduction from '{}'", intro_path.display()))?;
    println!("{}", introduction.description_style());

    let mut shell = Shell::new(resources, packages, config);
    shell.run()
}
