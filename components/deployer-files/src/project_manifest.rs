use deployer_resolver::Contract;
use indexmap::IndexMap;

use crate::{FileLocation, ManifestSourceLoader};

#[derive(Deserialize, Debug)]
pub struct ProjectManifestFile {
    project: ProjectConfigFile,
    contracts: Option<IndexMap<String, ContractConfigFile>>,
}

#[derive(Deserialize, Debug)]
pub struct ProjectConfigFile {
    name: String,
    authors: Option<Vec<String>>,
    description: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ContractConfigFile {
    path: String,
    deployer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectConfig {
    pub name: String,
    pub authors: Vec<String>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractConfig {
    pub path: String,
    pub deployer: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProjectManifest {
    pub project: ProjectConfig,
    /// Contracts in declaration order.
    pub contracts: IndexMap<String, ContractConfig>,
    pub location: FileLocation,
}

impl ProjectManifest {
    pub fn from_location(location: &FileLocation) -> Result<ProjectManifest, String> {
        let content = location.read_content_as_utf8()?;
        ProjectManifest::from_toml_str(&content, location.clone())
    }

    pub fn from_toml_str(content: &str, location: FileLocation) -> Result<ProjectManifest, String> {
        let project_manifest_file: ProjectManifestFile = toml::from_str(content)
            .map_err(|e| format!("{} syntax incorrect\n{}", location, e))?;
        ProjectManifest::from_project_manifest_file(project_manifest_file, location)
    }

    pub fn from_project_manifest_file(
        project_manifest_file: ProjectManifestFile,
        location: FileLocation,
    ) -> Result<ProjectManifest, String> {
        let project = ProjectConfig {
            name: project_manifest_file.project.name,
            authors: project_manifest_file.project.authors.unwrap_or_default(),
            description: project_manifest_file
                .project
                .description
                .unwrap_or_default(),
        };

        let mut contracts = IndexMap::new();
        for (contract_name, contract_settings) in
            project_manifest_file.contracts.unwrap_or_default()
        {
            if contract_settings.path.trim().is_empty() {
                return Err(format!(
                    "{}: contract {} has an empty path",
                    location, contract_name
                ));
            }
            contracts.insert(
                contract_name,
                ContractConfig {
                    path: contract_settings.path,
                    deployer: contract_settings.deployer,
                },
            );
        }

        Ok(ProjectManifest {
            project,
            contracts,
            location,
        })
    }

    /// Contracts to resolve, in declaration order. The manifest path doubles
    /// as the location other contracts import.
    pub fn contracts_for_deployment(&self) -> Vec<Contract> {
        self.contracts
            .iter()
            .map(|(name, config)| Contract {
                name: name.clone(),
                location: config.path.clone(),
                deployer: config.deployer.clone(),
            })
            .collect()
    }

    /// Directory containing the manifest.
    pub fn project_root_location(&self) -> Result<FileLocation, String> {
        self.location.get_parent_location()
    }

    pub fn source_loader(&self) -> Result<ManifestSourceLoader, String> {
        ManifestSourceLoader::new(self.project_root_location()?)
    }
}
