//! CLI command implementations

use anyhow::{Context, Result};
use jetson_deploy::bundle::{export_bundle, MANIFEST_FILE_NAME};
use jetson_deploy::config::DeploymentConfig;
use jetson_deploy::env::{write_profile_env, EnvFile, EnvUpdate};
use jetson_deploy::hardware::{detect_profile, HardwareProfile};
use jetson_deploy::utils::confirmer;
use std::path::{Path, PathBuf};

use super::HardwareArgs;

/// Defaults, then the optional JSON file, then environment overrides
pub fn load_config(path: Option<&Path>) -> Result<DeploymentConfig> {
    let config = match path {
        Some(p) => DeploymentConfig::load(p)?,
        None => DeploymentConfig::default(),
    };
    config.apply_env(|key| std::env::var(key).ok())
}

/// The `--cuda-arch` flag wins over `CUDA_ARCH_BIN` from the environment
fn resolve_profile(config: &DeploymentConfig, hardware: &HardwareArgs) -> Result<HardwareProfile> {
    let config = config.clone().with_override(hardware.cuda_arch.as_deref())?;
    Ok(detect_profile(&config, hardware.model.as_deref()))
}

pub fn detect(config: &DeploymentConfig, hardware: &HardwareArgs, json: bool) -> Result<()> {
    let profile = resolve_profile(config, hardware)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }

    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║              Jetson Deployment - Hardware Detection           ║");
    println!("╚═══════════════════════════════════════════════════════════════╝");
    println!();
    profile.print_summary();

    if !profile.is_recognized() {
        println!();
        println!("Could not identify a Jetson module.");
        println!(
            "Pass --model \"<device-tree model>\" or --cuda-arch <X.Y> to choose explicitly."
        );
    }

    Ok(())
}

pub fn env(config: &DeploymentConfig, hardware: &HardwareArgs) -> Result<()> {
    let profile = resolve_profile(config, hardware)?;
    print!("{}", EnvFile::from_profile(&profile));
    Ok(())
}

pub fn setup(
    config: &DeploymentConfig,
    hardware: &HardwareArgs,
    output: Option<PathBuf>,
    yes: bool,
) -> Result<()> {
    let profile = resolve_profile(config, hardware)?;
    let path = output.unwrap_or_else(|| config.paths.env_file.clone());

    let confirm = confirmer(yes, config.confirm_timeout());

    profile.print_summary();
    println!();

    let outcome = write_profile_env(&path, &profile, confirm.as_ref())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    match outcome {
        EnvUpdate::Created => println!("Created {}", path.display()),
        EnvUpdate::Updated => println!("Updated hardware settings in {}", path.display()),
        EnvUpdate::Skipped => println!("{} left unchanged", path.display()),
    }

    Ok(())
}

pub fn bundle(
    config: &DeploymentConfig,
    hardware: &HardwareArgs,
    output: Option<PathBuf>,
    overwrite: bool,
) -> Result<()> {
    let profile = resolve_profile(config, hardware)?;
    let out_dir = output.unwrap_or_else(|| config.paths.bundle_dir.clone());

    let manifest = export_bundle(&profile, config, &out_dir, overwrite)
        .with_context(|| format!("Failed to export bundle to {}", out_dir.display()))?;

    println!("Client bundle written to {}", out_dir.display());
    for file in &manifest.files {
        println!("  {}", file);
    }
    println!("  {}", MANIFEST_FILE_NAME);

    Ok(())
}
