//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `pictoshare_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("pictoshare_core version={}", pictoshare_core::core_version());
    println!(
        "pictoshare_core default_log_level={}",
        pictoshare_core::default_log_level()
    );
}
