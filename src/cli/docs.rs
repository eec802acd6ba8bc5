//! Markdown reference pages for the command tree
//!
//! One page per command, named after its path (`rds.md`, `rds_cache_clear.md`),
//! with links between parents and children.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use clap::{Arg, Command};

use crate::error::Result;

/// Default output directory for `rds gen-docs`
pub const DEFAULT_DIR: &str = "./docs/reference";

/// Write a page for every visible command under `root` into `dir`.
///
/// Returns the files written, parents before children.
pub fn generate(mut root: Command, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    root.build();

    let mut written = Vec::new();
    write_tree(&mut root, &[], dir, &mut written)?;
    Ok(written)
}

fn write_tree(
    cmd: &mut Command,
    parents: &[String],
    dir: &Path,
    written: &mut Vec<PathBuf>,
) -> Result<()> {
    let mut path = parents.to_vec();
    path.push(cmd.get_name().to_string());

    let file = dir.join(page_name(&path));
    std::fs::write(&file, render(cmd, &path))?;
    log::debug!("Wrote {}", file.display());
    written.push(file);

    for sub in cmd.get_subcommands_mut().filter(|s| is_documented(s)) {
        write_tree(sub, &path, dir, written)?;
    }
    Ok(())
}

fn is_documented(cmd: &Command) -> bool {
    !cmd.is_hide_set() && cmd.get_name() != "help"
}

fn page_name(path: &[String]) -> String {
    format!("{}.md", path.join("_"))
}

/// Markdown for one command; `path` runs from the root to `cmd`
pub fn render(cmd: &mut Command, path: &[String]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "## {}\n", path.join(" "));

    if let Some(about) = cmd.get_about() {
        let _ = writeln!(out, "{}\n", about);
    }

    let aliases: Vec<&str> = cmd.get_visible_aliases().collect();
    if !aliases.is_empty() {
        let _ = writeln!(out, "Aliases: `{}`\n", aliases.join("`, `"));
    }

    let usage = cmd.render_usage().to_string();
    let _ = writeln!(out, "```\n{}\n```\n", usage.trim_end());

    let (global, own): (Vec<&Arg>, Vec<&Arg>) = cmd
        .get_arguments()
        .filter(|a| !a.is_hide_set())
        .partition(|a| a.is_global_set());
    write_args(&mut out, "Options", &own);
    write_args(&mut out, "Global options", &global);

    let children: Vec<&Command> = cmd.get_subcommands().filter(|s| is_documented(s)).collect();
    if path.len() > 1 || !children.is_empty() {
        let _ = writeln!(out, "### See also\n");
        if path.len() > 1 {
            let parent = &path[..path.len() - 1];
            let _ = writeln!(out, "- [{}]({})", parent.join(" "), page_name(parent));
        }
        for child in children {
            let mut child_path = path.to_vec();
            child_path.push(child.get_name().to_string());
            let about = child.get_about().map(|a| a.to_string()).unwrap_or_default();
            let _ = writeln!(
                out,
                "- [{}]({}): {}",
                child_path.join(" "),
                page_name(&child_path),
                about
            );
        }
        out.push('\n');
    }

    out
}

fn write_args(out: &mut String, heading: &str, args: &[&Arg]) {
    if args.is_empty() {
        return;
    }
    let _ = writeln!(out, "### {}\n", heading);
    for arg in args {
        let help = arg.get_help().map(|h| h.to_string()).unwrap_or_default();
        let _ = writeln!(out, "- `{}`: {}", arg_label(arg), help);
    }
    out.push('\n');
}

fn arg_label(arg: &Arg) -> String {
    if arg.is_positional() {
        return format!("<{}>", arg.get_id().as_str().to_uppercase());
    }
    match (arg.get_short(), arg.get_long()) {
        (Some(short), Some(long)) => format!("-{}, --{}", short, long),
        (None, Some(long)) => format!("--{}", long),
        (Some(short), None) => format!("-{}", short),
        (None, None) => arg.get_id().to_string(),
    }
}
