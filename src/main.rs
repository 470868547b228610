//! kubelens - relationship graphs for Kubernetes objects
//!
//! Starting from one object, follows owners, owned objects, selectors and
//! references, then prints the health-annotated graph.

use anyhow::Result;
use clap::Parser;
use kubelens::cli::{self, Args};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    cli::run(args).await
}
