/// Example program to print the loaded motion settings
///
/// Run with: cargo run -p rune-config --example print_config

fn main() {
    // Load configuration from motion.toml
    let settings = rune_config::MotionSettings::load();

    println!("=== Rune Motion Configuration ===\n");

    println!("Observer:");
    println!("  Threshold: {}", settings.observer.threshold);
    println!("  Once: {}", settings.observer.once);
    println!();

    println!("Stagger (ms):");
    println!(
        "  Fast / Normal / Slow: {} / {} / {}",
        settings.stagger.fast_ms, settings.stagger.normal_ms, settings.stagger.slow_ms
    );
    println!();

    println!("Preference:");
    println!("  Reduced Motion: {:?}", settings.preference.reduced_motion);
    println!("  Reduced Duration: {} ms", settings.preference.reduced_duration_ms);
    println!();

    println!("Demo:");
    println!("  Frame: {} ms", settings.demo.frame_ms);
    println!("  Scene: {:?}", settings.demo.scene);
    println!();

    match toml::to_string_pretty(&settings) {
        Ok(toml_str) => {
            println!("=== Serialized Configuration ===");
            println!("{}", toml_str);
        }
        Err(e) => {
            eprintln!("Failed to serialize config: {}", e);
        }
    }
}
