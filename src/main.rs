use anyhow::Context;
use android_build_patcher::config::{CliArgs, Command, LogFormat};
use android_build_patcher::domain::model::{FileAction, PatchReport, ProjectTree};
use android_build_patcher::domain::ports::Storage;
use android_build_patcher::utils::{logger, validation::Validate};
use android_build_patcher::{
    load_project_tree, BuildPatcher, DryRunStorage, LocalStorage, PatchError, PatcherConfig,
};
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    match args.log_format {
        LogFormat::Compact => logger::init_cli_logger(args.verbose),
        LogFormat::Json => logger::init_json_logger(args.verbose),
    }

    let config = match &args.config {
        Some(path) => {
            tracing::info!("loading configuration from {}", path.display());
            PatcherConfig::from_file(path)
                .with_context(|| format!("failed to load config file '{}'", path.display()))?
        }
        None => PatcherConfig::default(),
    };

    if let Err(e) = config.validate() {
        tracing::error!("configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    if let Err(e) = run(&args, config) {
        tracing::error!(
            "build-patcher failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        std::process::exit(e.severity().exit_code());
    }

    Ok(())
}

fn run(args: &CliArgs, config: PatcherConfig) -> Result<(), PatchError> {
    let project_dir = args.project_dir.as_deref();

    match &args.command {
        Command::Apply { dry_run, json } => {
            if *dry_run {
                let storage = DryRunStorage::new();
                let mut tree = load_project_tree(&config.project, project_dir, &storage)?;
                let patcher = BuildPatcher::new(storage, config).with_dry_run(true);
                let report = patcher.run(&mut tree)?;
                print_report(&report, *json)?;
            } else {
                let storage = LocalStorage::new();
                let mut tree = load_project_tree(&config.project, project_dir, &storage)?;
                let patcher = BuildPatcher::new(storage, config);
                let report = patcher.run(&mut tree)?;
                print_report(&report, *json)?;
            }
        }
        Command::Clean { dry_run } => {
            if *dry_run {
                clean_with(DryRunStorage::new(), config, project_dir, true)?;
            } else {
                clean_with(LocalStorage::new(), config, project_dir, false)?;
            }
        }
        Command::Show => {
            let storage = LocalStorage::new();
            let tree = load_project_tree(&config.project, project_dir, &storage)?;
            display_summary(&config, &tree);
        }
    }
    Ok(())
}

fn clean_with<S: Storage>(
    storage: S,
    config: PatcherConfig,
    project_dir: Option<&std::path::Path>,
    dry_run: bool,
) -> Result<(), PatchError> {
    let tree = load_project_tree(&config.project, project_dir, &storage)?;
    let patcher = BuildPatcher::new(storage, config);
    match patcher.clean(&tree)? {
        FileAction::Removed { path } if dry_run => {
            println!("🔍 Would remove {}", path.display())
        }
        FileAction::Removed { path } => println!("🧹 Removed {}", path.display()),
        other => println!("✅ Nothing to clean ({:?})", other),
    }
    Ok(())
}

fn print_report(report: &PatchReport, json: bool) -> Result<(), PatchError> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    if report.dry_run {
        println!("🔍 DRY RUN - nothing was written");
    }
    println!("📁 Build output: {}", report.root_build_dir.display());
    println!("🔗 Evaluation order: {}", report.evaluation_order.join(" -> "));
    for project in &report.projects {
        let namespace = project.namespace.as_deref().unwrap_or("-");
        let sdk = project
            .compile_sdk
            .map_or_else(|| "-".to_string(), |s| s.to_string());
        println!(
            "  {} {:<32} namespace={} compileSdk={}",
            if project.library { "📦" } else { "  " },
            project.name,
            namespace,
            sdk
        );
        for action in &project.actions {
            println!("      {}", describe(action));
        }
    }
    Ok(())
}

fn describe(action: &FileAction) -> String {
    match action {
        FileAction::Created { path } => format!("created {}", path.display()),
        FileAction::Patched { path, patch } => format!("patched {} ({})", path.display(), patch),
        FileAction::AlreadyPatched { path, patch } => {
            format!("already patched {} ({})", path.display(), patch)
        }
        FileAction::Unchanged { path } => format!("unchanged {}", path.display()),
        FileAction::Skipped { path, reason } => format!("skipped {}: {}", path.display(), reason),
        FileAction::Removed { path } => format!("removed {}", path.display()),
    }
}

fn display_summary(config: &PatcherConfig, tree: &ProjectTree) {
    println!("📋 Configuration Summary:");
    println!("  Gradle root: {}", tree.root_dir.display());
    println!("  Variant: {:?}", config.patcher.variant);
    println!("  Source patches: {}", config.patcher.source_patches);
    println!("  Library plugin: {}", config.patcher.library_plugin);
    println!(
        "  Evaluation anchor: {}",
        config.patcher.anchor().unwrap_or("(none)")
    );
    println!("  Relocated build dir: {}", config.patcher.relocated_build_dir);
    for forced in &config.overrides {
        println!(
            "  Override: {} ({} source patches)",
            forced.project,
            forced.source_patches.len()
        );
    }

    println!();
    println!("🧩 Subprojects:");
    for sub in &tree.subprojects {
        println!(
            "  {:<32} {} plugins=[{}] namespace={}",
            sub.name,
            sub.project_dir.display(),
            sub.plugins.join(", "),
            sub.declared.namespace.as_deref().unwrap_or("-")
        );
    }
}
