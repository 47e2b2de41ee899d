//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `pulse_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("pulse_core version={}", pulse_core::core_version());
    println!(
        "pulse_core default_log_level={}",
        pulse_core::default_log_level()
    );
}
