use std::time::Duration;

use colored::*;
use discover_core::discovery::DiscoveryResult;
use tracing::info;

pub const TOTAL_WIDTH: usize = 64;
pub const PRINT_TARGET: &str = "discover::print";

pub fn print(msg: &str) {
    info!(target: PRINT_TARGET, "{}", msg);
}

pub fn banner() {
    let text: String = format!("⟦ DISCOVER v{} ⟧", env!("CARGO_PKG_VERSION"));
    let width: usize = text.chars().count();
    let sep: ColoredString = "═".repeat(TOTAL_WIDTH.saturating_sub(width) / 2).bright_black();
    print(&format!("{}{}{}", sep, text.bright_green().bold(), sep));
}

pub fn header(msg: &str) {
    let formatted: String = format!("⟦ {} ⟧", msg);
    let msg_len: usize = formatted.chars().count();

    let dash_count: usize = TOTAL_WIDTH.saturating_sub(msg_len);
    let left: usize = dash_count / 2;
    let right: usize = dash_count - left;

    let line: ColoredString = format!(
        "{}{}{}",
        "─".repeat(left),
        formatted.to_uppercase().bright_green(),
        "─".repeat(right)
    )
    .bright_black();

    print(&format!("{}", line));
}

pub fn fat_separator() {
    let sep: ColoredString = "═".repeat(TOTAL_WIDTH).bright_black();
    print(&format!("{}", sep));
}

pub fn endpoints(result: &DiscoveryResult) {
    for (idx, endpoint) in result.iter().enumerate() {
        let idx_str: String = format!("[{}]", idx.to_string().cyan());
        print(&format!("{} {}", idx_str.bright_black(), endpoint.to_string().bold()));
    }
}

pub fn summary(found: usize, total_time: Duration) {
    let active: ColoredString = format!("{found} active servers").bold().green();
    let took: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    fat_separator();
    print(&format!("Discovery Complete: {active} identified in {took}"));
}

pub fn no_results() {
    print(&format!("{}", "No active servers found.".red().bold()));
}
