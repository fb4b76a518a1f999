//! `atlas`: offline inspection of catalog dumps

use anyhow::{Context, Result};
use atlas_groups::GroupLayout;
use atlas_model::{Diagram, Environment, Graph, PathItem};
use atlas_nav::NavigatorConfig;
use atlas_tree::TreeNode;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("atlas")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inspect Atlas environment and diagram dumps")
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON on stderr"),
        )
        .subcommand(
            Command::new("tree")
                .about("Build the folder tree of an item list")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON array of diagrams or environments"),
                )
                .arg(
                    Arg::new("kind")
                        .long("kind")
                        .default_value("diagrams")
                        .value_parser(["diagrams", "environments"])
                        .help("Item type in the file"),
                )
                .arg(
                    Arg::new("filter")
                        .long("filter")
                        .help("Keep items whose name or description contains this text"),
                )
                .arg(
                    Arg::new("count")
                        .long("count")
                        .action(ArgAction::SetTrue)
                        .help("Print only the number of items"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output the tree as JSON"),
                ),
        )
        .subcommand(
            Command::new("groups")
                .about("Compute the container layout of a graph")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Graph or diagram JSON"),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Print the effective navigator configuration")
                .arg(
                    Arg::new("file")
                        .long("file")
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML file to layer over the defaults"),
                ),
        )
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("json-logs"));

    match matches.subcommand() {
        Some(("tree", args)) => run_tree(args),
        Some(("groups", args)) => run_groups(args),
        Some(("config", args)) => run_config(args),
        _ => {
            cli().print_help()?;
            Ok(())
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run_tree(args: &ArgMatches) -> Result<()> {
    let file = file_arg(args)?;
    let view = TreeView {
        filter: args.get_one::<String>("filter").map(String::as_str),
        count: args.get_flag("count"),
        json: args.get_flag("json"),
    };

    let output = match args.get_one::<String>("kind").map(String::as_str) {
        Some("environments") => view.render(&read_json::<Vec<Environment>>(file)?)?,
        _ => view.render(&read_json::<Vec<Diagram>>(file)?)?,
    };
    print!("{output}");
    Ok(())
}

fn run_groups(args: &ArgMatches) -> Result<()> {
    let file = file_arg(args)?;
    let graph: Graph = read_json(file)?;

    let layout = GroupLayout::compute(&graph.nodes);
    layout
        .validate()
        .context("graph has an inconsistent container layout")?;
    if !layout.orphans.is_empty() {
        tracing::warn!(orphans = ?layout.orphans, "children reference missing containers");
    }
    tracing::info!(
        groups = layout.groups.len(),
        grouped = layout.grouped_count(),
        "layout computed"
    );

    println!("{}", serde_json::to_string_pretty(&layout)?);
    Ok(())
}

fn run_config(args: &ArgMatches) -> Result<()> {
    let config = match args.get_one::<PathBuf>("file") {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            NavigatorConfig::from_toml_str(&raw)?
        }
        None => NavigatorConfig::default(),
    };
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

/// Output options of the `tree` subcommand
struct TreeView<'a> {
    filter: Option<&'a str>,
    count: bool,
    json: bool,
}

impl TreeView<'_> {
    fn render<T: PathItem + Serialize>(&self, items: &[T]) -> Result<String> {
        let tree = TreeNode::build(items);
        tracing::debug!(items = items.len(), "tree built");
        let tree = match self.filter {
            Some(query) => tree.filter(query).unwrap_or_else(TreeNode::root),
            None => tree,
        };

        if self.count {
            return Ok(format!("{}\n", tree.count_items()));
        }
        if self.json {
            return Ok(format!("{}\n", serde_json::to_string_pretty(&tree)?));
        }
        let mut out = String::new();
        render_node(&tree, 0, &mut out);
        Ok(out)
    }
}

/// Folders first, then items, indented by depth
fn render_node<T: PathItem>(node: &TreeNode<T>, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    for (segment, child) in &node.children {
        let _ = writeln!(out, "{indent}{segment}/");
        render_node(child, depth + 1, out);
    }
    for item in &node.items {
        let _ = writeln!(out, "{indent}{} ({})", item.name(), item.id());
    }
}

fn file_arg(args: &ArgMatches) -> Result<&Path> {
    args.get_one::<PathBuf>("file")
        .map(PathBuf::as_path)
        .context("missing input file")
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}
