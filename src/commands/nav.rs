//! # Nav Command Implementation
//!
//! Displays the navigation tree a render would build the site with: either
//! the tree discovered from the project's Markdown layout or the override
//! from the configuration.
//!
//! The project is staged into a temporary directory to compute the tree, so
//! the command never modifies the project. Reference documentation is
//! generated there when enabled.

use anyhow::Result;
use clap::Args;
use ptree::{print_tree, TreeItem};

use quire::navigation::NavigationNode;
use quire::output::{emoji, OutputConfig};
use quire::staging::Pipeline;

use super::{interrupt_token, ProjectArgs};

/// Print the navigation tree
#[derive(Args, Debug)]
pub struct NavArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Maximum depth to display; 0 shows only top-level entries
    #[arg(long, value_name = "NUM")]
    pub depth: Option<usize>,
}

/// Execute the `nav` command.
pub fn execute(args: NavArgs, output: &OutputConfig) -> Result<()> {
    let pipeline = Pipeline::default().with_cancellation(interrupt_token()?);
    let config = args.project.load()?;
    let navigation = pipeline.navigation(&config)?;

    println!(
        "{} Navigation for: {}",
        emoji(output, "🧭", "[NAV]"),
        config.directory.display()
    );

    let root = TreeNode {
        label: config
            .site
            .site_name
            .clone()
            .unwrap_or_else(|| config.directory.display().to_string()),
        children: build_tree_nodes(&navigation, args.depth.unwrap_or(usize::MAX), 0),
    };
    print_tree(&root).map_err(|e| anyhow::anyhow!("Failed to display tree: {}", e))?;

    Ok(())
}

fn build_tree_nodes(nodes: &[NavigationNode], max_depth: usize, depth: usize) -> Vec<TreeNode> {
    nodes
        .iter()
        .map(|node| match node {
            NavigationNode::Leaf { label, document } => TreeNode {
                label: format!("{} → {}", label, document),
                children: vec![],
            },
            NavigationNode::Branch { label, children } => TreeNode {
                label: format!("{}/", label),
                children: if depth >= max_depth {
                    vec![]
                } else {
                    build_tree_nodes(children, max_depth, depth + 1)
                },
            },
        })
        .collect()
}

/// Tree node structure for ptree visualization
#[derive(Clone)]
struct TreeNode {
    label: String,
    children: Vec<TreeNode>,
}

impl TreeItem for TreeNode {
    type Child = TreeNode;

    fn write_self<W: std::io::Write>(
        &self,
        f: &mut W,
        _style: &ptree::Style,
    ) -> std::io::Result<()> {
        write!(f, "{}", self.label)
    }

    fn children(&self) -> std::borrow::Cow<'_, [Self::Child]> {
        std::borrow::Cow::from(&self.children[..])
    }
}
