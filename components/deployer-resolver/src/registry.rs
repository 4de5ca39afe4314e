use std::collections::HashMap;

use tracing::debug;

use crate::errors::{DeploymentError, DeploymentResult};
use crate::imports::extract_imports;
use crate::loader::SourceLoader;
use crate::types::{Contract, RegisteredContract};

/// Contracts known to a deployment, indexed by registration order and by
/// location.
#[derive(Debug, Default)]
pub struct ContractRegistry {
    contracts: Vec<RegisteredContract>,
    contracts_by_location: HashMap<String, usize>,
}

impl ContractRegistry {
    pub fn new() -> ContractRegistry {
        ContractRegistry::default()
    }

    /// Registers every contract in order, stopping at the first failure.
    pub fn from_contracts(
        contracts: Vec<Contract>,
        loader: &dyn SourceLoader,
    ) -> DeploymentResult<ContractRegistry> {
        let mut registry = ContractRegistry::new();
        for contract in contracts.into_iter() {
            registry.register(contract, loader)?;
        }
        Ok(registry)
    }

    /// Loads the contract source, extracts its imports and assigns it the
    /// next index.
    pub fn register(
        &mut self,
        contract: Contract,
        loader: &dyn SourceLoader,
    ) -> DeploymentResult<&RegisteredContract> {
        if self.contracts_by_location.contains_key(&contract.location) {
            return Err(DeploymentError::DuplicateLocation {
                contract_name: contract.name,
                location: contract.location,
            });
        }

        let code = loader.load(&contract.location)?;
        let imports = extract_imports(&code).map_err(|source| DeploymentError::Parse {
            contract_name: contract.name.clone(),
            location: contract.location.clone(),
            source,
        })?;

        let index = self.contracts.len();
        debug!(
            "registered contract {} ({}) at index {} with {} import(s)",
            contract.name,
            contract.location,
            index,
            imports.len()
        );
        self.contracts_by_location
            .insert(contract.location.clone(), index);
        self.contracts.push(RegisteredContract {
            index,
            contract,
            imports,
        });
        Ok(&self.contracts[index])
    }

    pub fn lookup(&self, location: &str) -> Option<&RegisteredContract> {
        self.contracts_by_location
            .get(location)
            .map(|index| &self.contracts[*index])
    }

    /// Registered contracts, in registration order.
    pub fn contracts(&self) -> &[RegisteredContract] {
        &self.contracts
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ParseErrors;
    use crate::loader::InMemorySourceLoader;

    fn loader() -> InMemorySourceLoader {
        InMemorySourceLoader::new()
            .with_source("./A.cdc", "pub contract A {}")
            .with_source("./B.cdc", "import A from \"./A.cdc\"\npub contract B {}")
            .with_source("./Broken.cdc", "pub contract Broken {")
    }

    #[test]
    fn indexes_follow_registration_order() {
        let registry = ContractRegistry::from_contracts(
            vec![Contract::new("B", "./B.cdc"), Contract::new("A", "./A.cdc")],
            &loader(),
        )
        .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup("./B.cdc").unwrap().index, 0);
        assert_eq!(registry.lookup("./A.cdc").unwrap().index, 1);
        assert_eq!(
            registry.lookup("./B.cdc").unwrap().imports,
            vec!["./A.cdc".to_string()]
        );
        assert!(registry.lookup("./C.cdc").is_none());
    }

    #[test]
    fn load_failure_aborts_registration() {
        let result = ContractRegistry::from_contracts(
            vec![Contract::new("A", "./A.cdc"), Contract::new("C", "./C.cdc")],
            &loader(),
        );
        match result {
            Err(DeploymentError::Load(err)) => assert_eq!(err.location, "./C.cdc"),
            other => panic!("expected load error, got {:?}", other),
        }
    }

    #[test]
    fn parse_failure_names_the_contract() {
        let result = ContractRegistry::from_contracts(
            vec![Contract::new("Broken", "./Broken.cdc")],
            &loader(),
        );
        match result {
            Err(DeploymentError::Parse {
                contract_name,
                source,
                ..
            }) => {
                assert_eq!(contract_name, "Broken");
                assert_eq!(source.kind, ParseErrors::UnclosedDelimiter('{'));
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn duplicate_locations_are_rejected() {
        let result = ContractRegistry::from_contracts(
            vec![Contract::new("A", "./A.cdc"), Contract::new("Again", "./A.cdc")],
            &loader(),
        );
        assert!(matches!(
            result,
            Err(DeploymentError::DuplicateLocation { ref contract_name, .. }) if contract_name == "Again"
        ));
    }
}
