use tracing::debug;

use crate::errors::{CyclicImportError, DeploymentResult};
use crate::graph::build_dependency_graph;
use crate::loader::SourceLoader;
use crate::registry::ContractRegistry;
use crate::sorter::get_sorted_dependencies;
use crate::types::Contract;

/// Computes the order in which a set of contracts must be deployed.
///
/// Every contract is loaded and scanned for imports when the deployment is
/// created. Sorting then resolves each import against the registered
/// locations, so a contract is always deployed after everything it imports.
#[derive(Debug)]
pub struct Deployment {
    registry: ContractRegistry,
}

impl Deployment {
    pub fn new(contracts: Vec<Contract>, loader: &dyn SourceLoader) -> DeploymentResult<Deployment> {
        let registry = ContractRegistry::from_contracts(contracts, loader)?;
        Ok(Deployment { registry })
    }

    /// Contracts in deployment order.
    ///
    /// Contracts with no ordering constraint between them keep the order they
    /// were registered in, so repeated calls return the same sequence.
    pub fn sort(&self) -> DeploymentResult<Vec<&Contract>> {
        let graph = build_dependency_graph(&self.registry)?;

        let sorted_indexes = get_sorted_dependencies(&graph).map_err(|cycles| {
            let cycles = cycles
                .iter()
                .map(|cycle| {
                    cycle
                        .iter()
                        .map(|index| self.registry.contracts()[*index].name().to_string())
                        .collect()
                })
                .collect();
            CyclicImportError { cycles }
        })?;

        let contracts: Vec<&Contract> = sorted_indexes
            .into_iter()
            .map(|index| &self.registry.contracts()[index].contract)
            .collect();
        debug!(
            "deployment order: {}",
            contracts
                .iter()
                .map(|contract| contract.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(contracts)
    }

    /// Names of the contracts `location` imports, in import order.
    pub fn dependencies_of(&self, location: &str) -> DeploymentResult<Vec<&str>> {
        let contract = match self.registry.lookup(location) {
            Some(contract) => contract,
            None => return Ok(vec![]),
        };
        let graph = build_dependency_graph(&self.registry)?;
        let dependencies = &graph.node(contract.index).dependencies;

        let mut names = vec![];
        for import in contract.imports.iter() {
            if let Some(index) = dependencies.get(import) {
                let name = self.registry.contracts()[*index].name();
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        Ok(names)
    }

    /// Contracts in registration order.
    pub fn contracts(&self) -> impl Iterator<Item = &Contract> {
        self.registry.contracts().iter().map(|c| &c.contract)
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}
