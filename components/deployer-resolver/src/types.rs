/// A contract as described by the caller.
///
/// `location` identifies where the source comes from and is also the string
/// other contracts use to import it. `deployer` is carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contract {
    pub name: String,
    pub location: String,
    pub deployer: Option<String>,
}

impl Contract {
    pub fn new(name: &str, location: &str) -> Contract {
        Contract {
            name: name.to_string(),
            location: location.to_string(),
            deployer: None,
        }
    }

    pub fn with_deployer(mut self, deployer: &str) -> Contract {
        self.deployer = Some(deployer.to_string());
        self
    }
}

#[derive(Debug, Clone)]
pub struct RegisteredContract {
    pub index: usize,
    pub contract: Contract,
    pub imports: Vec<String>,
}

impl RegisteredContract {
    pub fn name(&self) -> &str {
        &self.contract.name
    }

    pub fn location(&self) -> &str {
        &self.contract.location
    }
}
