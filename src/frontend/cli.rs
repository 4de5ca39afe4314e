use std::env;
use std::process;

use clap::{Parser, Subcommand};
use deployer_files::{FileLocation, ProjectManifest, MANIFEST_FILE_NAME};
use deployer_resolver::{extract_imports, Contract, Deployment};
use tracing::{debug, info};

/// Deployer resolves the order in which a project's contracts must be
/// deployed, so that every contract comes after the contracts it imports.
#[derive(Parser, PartialEq, Clone, Debug)]
#[clap(version = env!("CARGO_PKG_VERSION"), name = "deployer", bin_name = "deployer")]
struct Opts {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, PartialEq, Clone, Debug)]
enum Command {
    /// Work with the deployment order of a project
    #[clap(subcommand, name = "deployments", aliases = &["deployment"])]
    Deployments(Deployments),
    /// Inspect individual contracts
    #[clap(subcommand, name = "contracts", aliases = &["contract"])]
    Contracts(Contracts),
}

#[derive(Subcommand, PartialEq, Clone, Debug)]
enum Deployments {
    /// Print the contracts of the project in deployment order
    #[clap(name = "order", bin_name = "order")]
    Order(OrderDeployment),
    /// Check that a deployment order exists for the project
    #[clap(name = "check", bin_name = "check")]
    Check(CheckDeployment),
}

#[derive(Subcommand, PartialEq, Clone, Debug)]
enum Contracts {
    /// List the imports declared by a contract
    #[clap(name = "imports", bin_name = "imports")]
    Imports(ContractImports),
}

#[derive(Parser, PartialEq, Clone, Debug)]
struct OrderDeployment {
    /// Path to Deployer.toml
    #[clap(long = "manifest-path", short = 'm')]
    pub manifest_path: Option<String>,
    /// Print the order as json
    #[clap(long = "json")]
    pub json: bool,
    /// Show resolved dependencies and debug logs
    #[clap(long = "verbose", short = 'v')]
    pub verbose: bool,
}

#[derive(Parser, PartialEq, Clone, Debug)]
struct CheckDeployment {
    /// Path to Deployer.toml
    #[clap(long = "manifest-path", short = 'm')]
    pub manifest_path: Option<String>,
    /// Display debug logs
    #[clap(long = "verbose", short = 'v')]
    pub verbose: bool,
}

#[derive(Parser, PartialEq, Clone, Debug)]
struct ContractImports {
    /// Contract source file
    pub file: String,
    /// Display debug logs
    #[clap(long = "verbose", short = 'v')]
    pub verbose: bool,
}

pub fn main() {
    let opts: Opts = match Opts::try_parse() {
        Ok(opts) => opts,
        Err(e) => e.exit(),
    };

    let verbose = match &opts.command {
        Command::Deployments(Deployments::Order(cmd)) => cmd.verbose,
        Command::Deployments(Deployments::Check(cmd)) => cmd.verbose,
        Command::Contracts(Contracts::Imports(cmd)) => cmd.verbose,
    };
    setup_logger(verbose);

    let result = match opts.command {
        Command::Deployments(Deployments::Order(cmd)) => order_deployment(&cmd),
        Command::Deployments(Deployments::Check(cmd)) => check_deployment(&cmd),
        Command::Contracts(Contracts::Imports(cmd)) => list_contract_imports(&cmd),
    };

    match result {
        Ok(output) => println!("{}", output),
        Err(message) => {
            eprintln!("{}", format_err!(message));
            process::exit(1);
        }
    }
}

fn setup_logger(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

/// Uses `--manifest-path` when given, otherwise the nearest Deployer.toml
/// from the current directory upwards.
fn get_manifest_location(manifest_path: &Option<String>) -> Result<FileLocation, String> {
    let current_dir =
        env::current_dir().map_err(|e| format!("unable to get current directory\n{}", e))?;
    let path = match manifest_path {
        Some(path) => current_dir.join(path),
        None => {
            return FileLocation::find_project_manifest(&current_dir).ok_or_else(|| {
                format!(
                    "unable to find {} in {} or its parents",
                    MANIFEST_FILE_NAME,
                    current_dir.display()
                )
            })
        }
    };
    if !path.is_file() {
        return Err(format!("unable to find manifest {}", path.display()));
    }
    Ok(FileLocation::from_path(path))
}

fn load_deployment(manifest_path: &Option<String>) -> Result<Deployment, String> {
    let manifest_location = get_manifest_location(manifest_path)?;
    let manifest = ProjectManifest::from_location(&manifest_location)?;
    info!(
        "resolving {} contract(s) from project {}",
        manifest.contracts.len(),
        manifest.project.name
    );
    if !manifest.project.description.is_empty() {
        debug!("{}", manifest.project.description);
    }
    if !manifest.project.authors.is_empty() {
        debug!("authors: {}", manifest.project.authors.join(", "));
    }
    let loader = manifest.source_loader()?;
    Deployment::new(manifest.contracts_for_deployment(), &loader).map_err(|e| e.to_string())
}

fn order_deployment(cmd: &OrderDeployment) -> Result<String, String> {
    let deployment = load_deployment(&cmd.manifest_path)?;
    let sorted = deployment.sort().map_err(|e| e.to_string())?;

    if cmd.json {
        return serde_json::to_string_pretty(&deployment_order_json(&sorted))
            .map_err(|e| format!("unable to serialize deployment order\n{}", e));
    }

    let mut lines = vec![format_deployment_order(&sorted)];
    if cmd.verbose {
        for contract in sorted.iter() {
            let dependencies = deployment
                .dependencies_of(&contract.location)
                .map_err(|e| e.to_string())?;
            if !dependencies.is_empty() {
                lines.push(format!(
                    "{} depends on {}",
                    contract.name,
                    dependencies.join(", ")
                ));
            }
        }
    }
    Ok(lines.join("\n"))
}

fn check_deployment(cmd: &CheckDeployment) -> Result<String, String> {
    let deployment = load_deployment(&cmd.manifest_path)?;
    for contract in deployment.contracts() {
        debug!("checking {} ({})", contract.name, contract.location);
    }
    let sorted = deployment.sort().map_err(|e| e.to_string())?;
    Ok(format!(
        "{} {} contract(s) can be deployed",
        green!("✔"),
        sorted.len()
    ))
}

fn list_contract_imports(cmd: &ContractImports) -> Result<String, String> {
    let code = FileLocation::from_path_string(&cmd.file)?.read_content()?;
    let imports = extract_imports(&code).map_err(|e| format!("{}: {}", cmd.file, e))?;
    if imports.is_empty() {
        return Ok(yellow!("no string imports found in {}", cmd.file));
    }
    Ok(imports.join("\n"))
}

fn format_deployment_order(sorted: &[&Contract]) -> String {
    if sorted.is_empty() {
        return "no contracts to deploy".to_string();
    }
    sorted
        .iter()
        .enumerate()
        .map(|(position, contract)| {
            let deployer = contract.deployer.as_deref().unwrap_or("default deployer");
            format!(
                "{}. {} ({}) -> {}",
                position + 1,
                contract.name,
                contract.location,
                deployer
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn deployment_order_json(sorted: &[&Contract]) -> serde_json::Value {
    let contracts: Vec<serde_json::Value> = sorted
        .iter()
        .map(|contract| {
            serde_json::json!({
                "name": contract.name,
                "location": contract.location,
                "deployer": contract.deployer,
            })
        })
        .collect();
    serde_json::json!({ "contracts": contracts })
}
