//! Startup banner and batch summary display.

use std::net::SocketAddr;
use std::path::Path;

use crate::consts::{AUTHOR, HOMEPAGE, REPO, format_number};

/// Service configuration for display in the startup banner.
pub struct BannerInfo<'a> {
    pub model: &'a str,
    pub model_url: &'a str,
    pub store: &'a Path,
    pub items: usize,
    pub bind: SocketAddr,
}

/// Print the startup banner with service info.
pub fn print_banner(info: &BannerInfo) {
    println!(
        r#"
   ╔═══════════════════════════════════════╗
   ║       C O N T E X T   E N G I N E     ║
   ║   why a post landed, and what next    ║
   ╚═══════════════════════════════════════╝

   version   {}
   by        {}
   home      {}
   repo      {}
   model     {}
   endpoint  {}
   store     {} ({} items)
   listen    http://{}
"#,
        env!("CARGO_PKG_VERSION"),
        AUTHOR,
        HOMEPAGE,
        REPO,
        info.model,
        info.model_url,
        info.store.display(),
        format_number(info.items as u64),
        info.bind,
    );
}

/// Print how a batch went.
pub fn print_batch_summary(generated: usize, failed: usize, output: &Path) {
    println!(
        "Generated outputs for {} posts ({} failed) -> {}",
        format_number(generated as u64),
        format_number(failed as u64),
        output.display(),
    );
}
