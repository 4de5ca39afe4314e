use std::fmt;

use thiserror::Error;

pub type DeploymentResult<T> = Result<T, DeploymentError>;

#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("unable to parse contract {contract_name} ({location}): {source}")]
    Parse {
        contract_name: String,
        location: String,
        #[source]
        source: ParseError,
    },
    #[error("contract {contract_name} uses location {location}, which is already registered")]
    DuplicateLocation {
        contract_name: String,
        location: String,
    },
    #[error(transparent)]
    UnresolvedImport(#[from] UnresolvedImportError),
    #[error(transparent)]
    CyclicImport(#[from] CyclicImportError),
}

/// Source for a location could not be retrieved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unable to load contract source from {location}: {message}")]
pub struct LoadError {
    pub location: String,
    pub message: String,
}

impl LoadError {
    pub fn new(location: &str, message: impl Into<String>) -> LoadError {
        LoadError {
            location: location.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrors {
    InvalidEncoding,
    UnexpectedCharacter(char),
    UnterminatedString,
    UnterminatedComment,
    InvalidEscape(char),
    UnbalancedDelimiter(char),
    UnclosedDelimiter(char),
    ExpectedImportIdentifier,
    ExpectedImportLocation,
    MissingImportFrom,
}

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrors::InvalidEncoding => write!(f, "source is not valid utf-8"),
            ParseErrors::UnexpectedCharacter(c) => write!(f, "unexpected character '{}'", c),
            ParseErrors::UnterminatedString => write!(f, "unterminated string literal"),
            ParseErrors::UnterminatedComment => write!(f, "unterminated block comment"),
            ParseErrors::InvalidEscape(c) => write!(f, "invalid escape sequence '\\{}'", c),
            ParseErrors::UnbalancedDelimiter(c) => write!(f, "unexpected closing '{}'", c),
            ParseErrors::UnclosedDelimiter(c) => write!(f, "unclosed '{}'", c),
            ParseErrors::ExpectedImportIdentifier => {
                write!(f, "expected identifier in import declaration")
            }
            ParseErrors::ExpectedImportLocation => {
                write!(f, "expected location in import declaration")
            }
            ParseErrors::MissingImportFrom => {
                write!(f, "expected 'from' and a location after imported identifiers")
            }
        }
    }
}

/// Source could not be parsed well enough to extract its imports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at line {line}, column {column}")]
pub struct ParseError {
    pub kind: ParseErrors,
    pub line: u32,
    pub column: u32,
}

impl ParseError {
    pub fn new(kind: ParseErrors, line: u32, column: u32) -> ParseError {
        ParseError { kind, line, column }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("import from {contract_name} could not be found: {import_path}, make sure the import path matches a contract location")]
pub struct UnresolvedImportError {
    pub contract_name: String,
    pub import_path: String,
}

/// Every cycle found in the dependency graph, each one listing contract names
/// in registration order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct CyclicImportError {
    pub cycles: Vec<Vec<String>>,
}

impl fmt::Display for CyclicImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cycles: Vec<String> = self
            .cycles
            .iter()
            .map(|cycle| format!("[{}]", cycle.join(", ")))
            .collect();
        write!(f, "import cycle(s) detected: {}", cycles.join(", "))
    }
}
