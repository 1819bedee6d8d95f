//! `ironlog onboard` — write the default configuration.

use super::runtime::{self, CliResult};
use ironlog_config::AppConfig;
use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> CliResult<()> {
    let path = runtime::config_file(config_path);

    println!("🏋️ IronLog — First-Time Setup");
    println!("=============================\n");

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if dir.exists() {
            println!("  Config directory exists: {}", dir.display());
        } else {
            std::fs::create_dir_all(dir)?;
            println!("✅ Created config directory: {}", dir.display());
        }
    }

    if path.exists() {
        println!("\n⚠️  Config already exists at: {}", path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
        return Ok(());
    }

    std::fs::write(&path, AppConfig::default_toml())?;
    println!("✅ Created config.toml at: {}", path.display());
    println!("\n📝 Next steps:");
    println!("   1. Fill in the discord and channels sections of {}", path.display());
    println!("      (or set DISCORD_* / CHANNEL_ID / DIARY_CHANNEL_ID / OPENAI_API_KEY)");
    println!("   2. Run: ironlog doctor");
    println!("   3. Run: ironlog register && ironlog serve\n");

    Ok(())
}
