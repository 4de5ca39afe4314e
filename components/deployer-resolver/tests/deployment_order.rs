use deployer_resolver::{
    Contract, CyclicImportError, Deployment, DeploymentError, InMemorySourceLoader,
    UnresolvedImportError,
};
use indoc::indoc;
use pretty_assertions::assert_eq;

fn contract_source(name: &str, imports: &[&str]) -> String {
    let mut source = String::new();
    for import in imports {
        source.push_str(&format!("import {} from \"./{}.cdc\"\n", import, import));
    }
    source.push_str(&format!("\npub contract {} {{}}\n", name));
    source
}

fn build_deployment(specs: &[(&str, &[&str])]) -> Result<Deployment, DeploymentError> {
    let mut loader = InMemorySourceLoader::new();
    let mut contracts = vec![];
    for (name, imports) in specs {
        let location = format!("./{}.cdc", name);
        loader.insert(&location, &contract_source(name, imports));
        contracts.push(Contract::new(name, &location));
    }
    Deployment::new(contracts, &loader)
}

fn sorted_names(deployment: &Deployment) -> Vec<String> {
    deployment
        .sort()
        .unwrap()
        .into_iter()
        .map(|contract| contract.name.clone())
        .collect()
}

#[test]
fn test_empty_deployment() {
    let deployment = build_deployment(&[]).unwrap();
    assert!(deployment.is_empty());
    assert_eq!(deployment.sort().unwrap(), Vec::<&Contract>::new());
}

#[test]
fn test_single_contract() {
    let deployment = build_deployment(&[("A", &[])]).unwrap();
    assert_eq!(sorted_names(&deployment), vec!["A"]);
}

#[test]
fn test_linear_chain() {
    let deployment = build_deployment(&[("A", &[]), ("B", &["A"])]).unwrap();
    assert_eq!(sorted_names(&deployment), vec!["A", "B"]);
}

#[test]
fn test_chain_registered_backwards() {
    let deployment = build_deployment(&[("C", &["B"]), ("B", &["A"]), ("A", &[])]).unwrap();
    assert_eq!(sorted_names(&deployment), vec!["A", "B", "C"]);
}

#[test]
fn test_diamond() {
    let deployment = build_deployment(&[
        ("A", &[]),
        ("B", &["A"]),
        ("C", &["A"]),
        ("D", &["B", "C"]),
    ])
    .unwrap();
    assert_eq!(sorted_names(&deployment), vec!["A", "B", "C", "D"]);
}

#[test]
fn test_ties_follow_registration_order_not_names() {
    let deployment = build_deployment(&[("Zeta", &[]), ("Alpha", &[]), ("Mid", &["Zeta"])]).unwrap();
    assert_eq!(sorted_names(&deployment), vec!["Zeta", "Alpha", "Mid"]);
}

#[test]
fn test_sort_is_deterministic() {
    let deployment = build_deployment(&[
        ("E", &["D", "B"]),
        ("A", &[]),
        ("D", &["A"]),
        ("B", &[]),
        ("C", &["B", "A"]),
    ])
    .unwrap();
    let first = sorted_names(&deployment);
    let second = sorted_names(&deployment);
    assert_eq!(first, second);
    assert_eq!(first, vec!["A", "D", "B", "E", "C"]);
}

#[test]
fn test_output_respects_every_edge_and_is_a_permutation() {
    let specs: &[(&str, &[&str])] = &[
        ("Market", &["Items", "FungibleToken", "NonFungibleToken"]),
        ("Items", &["NonFungibleToken", "MetadataViews"]),
        ("MetadataViews", &["NonFungibleToken", "FungibleToken"]),
        ("FungibleToken", &[]),
        ("NonFungibleToken", &[]),
        ("Profile", &[]),
    ];
    let deployment = build_deployment(specs).unwrap();
    let sorted = sorted_names(&deployment);

    let mut expected_members: Vec<&str> = specs.iter().map(|(name, _)| *name).collect();
    let mut members: Vec<&str> = sorted.iter().map(|name| name.as_str()).collect();
    expected_members.sort();
    members.sort();
    assert_eq!(members, expected_members);

    let position = |name: &str| sorted.iter().position(|n| n == name).unwrap();
    for (name, imports) in specs {
        for import in imports.iter() {
            assert!(
                position(import) < position(name),
                "{} must be deployed before {}",
                import,
                name
            );
        }
    }
}

#[test]
fn test_contracts_are_returned_with_their_metadata() {
    let loader = InMemorySourceLoader::new()
        .with_source("./A.cdc", "pub contract A {}")
        .with_source("./B.cdc", "import A from \"./A.cdc\"\npub contract B {}");
    let contracts = vec![
        Contract::new("B", "./B.cdc").with_deployer("alice"),
        Contract::new("A", "./A.cdc").with_deployer("bob"),
    ];
    let deployment = Deployment::new(contracts, &loader).unwrap();
    let sorted = deployment.sort().unwrap();

    assert_eq!(
        sorted,
        vec![
            &Contract::new("A", "./A.cdc").with_deployer("bob"),
            &Contract::new("B", "./B.cdc").with_deployer("alice"),
        ]
    );

    let registered: Vec<&str> = deployment
        .contracts()
        .map(|contract| contract.name.as_str())
        .collect();
    assert_eq!(registered, vec!["B", "A"]);
}

#[test]
fn test_self_cycle() {
    let deployment = build_deployment(&[("A", &["A"])]).unwrap();
    match deployment.sort() {
        Err(DeploymentError::CyclicImport(CyclicImportError { cycles })) => {
            assert_eq!(cycles, vec![vec!["A".to_string()]]);
        }
        other => panic!("expected cyclic import error, got {:?}", other),
    }
}

#[test]
fn test_mutual_cycle() {
    let deployment = build_deployment(&[("A", &["B"]), ("B", &["A"])]).unwrap();
    match deployment.sort() {
        Err(DeploymentError::CyclicImport(CyclicImportError { cycles })) => {
            assert_eq!(cycles.len(), 1);
            assert!(cycles[0].contains(&"A".to_string()));
            assert!(cycles[0].contains(&"B".to_string()));
        }
        other => panic!("expected cyclic import error, got {:?}", other),
    }
}

#[test]
fn test_all_cycles_reported_together() {
    let deployment = build_deployment(&[
        ("Root", &[]),
        ("A", &["B", "Root"]),
        ("B", &["A"]),
        ("Solo", &["Solo"]),
        ("C", &["E"]),
        ("D", &["C"]),
        ("E", &["D"]),
        ("Leaf", &["A"]),
    ])
    .unwrap();
    let err = deployment.sort().unwrap_err();
    match err {
        DeploymentError::CyclicImport(CyclicImportError { cycles }) => {
            assert_eq!(
                cycles,
                vec![
                    vec!["A".to_string(), "B".to_string()],
                    vec!["Solo".to_string()],
                    vec!["C".to_string(), "D".to_string(), "E".to_string()],
                ]
            );
        }
        other => panic!("expected cyclic import error, got {:?}", other),
    }
}

#[test]
fn test_missing_import() {
    let loader = InMemorySourceLoader::new().with_source(
        "./A.cdc",
        indoc! {r#"
            import X from "X"

            pub contract A {}
        "#},
    );
    let deployment = Deployment::new(vec![Contract::new("A", "./A.cdc")], &loader).unwrap();
    match deployment.sort() {
        Err(DeploymentError::UnresolvedImport(err)) => assert_eq!(
            err,
            UnresolvedImportError {
                contract_name: "A".to_string(),
                import_path: "X".to_string(),
            }
        ),
        other => panic!("expected unresolved import error, got {:?}", other),
    }
}

#[test]
fn test_non_string_imports_do_not_create_edges() {
    let loader = InMemorySourceLoader::new()
        .with_source(
            "./A.cdc",
            indoc! {r#"
                import FungibleToken from 0xee82856bf20e2aa6
                import Crypto

                pub contract A {}
            "#},
        )
        .with_source("./B.cdc", "import A from \"./A.cdc\"\npub contract B {}");
    let deployment = Deployment::new(
        vec![Contract::new("B", "./B.cdc"), Contract::new("A", "./A.cdc")],
        &loader,
    )
    .unwrap();
    let sorted: Vec<&str> = deployment
        .sort()
        .unwrap()
        .into_iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(sorted, vec!["A", "B"]);
}

#[test]
fn test_dependencies_of() {
    let deployment = build_deployment(&[
        ("A", &[]),
        ("B", &["A"]),
        ("C", &["B", "A", "B"]),
    ])
    .unwrap();
    assert_eq!(deployment.dependencies_of("./C.cdc").unwrap(), vec!["B", "A"]);
    assert_eq!(deployment.dependencies_of("./A.cdc").unwrap(), Vec::<&str>::new());
    assert_eq!(deployment.dependencies_of("./Z.cdc").unwrap(), Vec::<&str>::new());
}

#[test]
fn test_load_failure_stops_construction() {
    let loader = InMemorySourceLoader::new().with_source("./A.cdc", "pub contract A {}");
    let result = Deployment::new(
        vec![Contract::new("A", "./A.cdc"), Contract::new("B", "./B.cdc")],
        &loader,
    );
    assert!(matches!(result, Err(DeploymentError::Load(ref err)) if err.location == "./B.cdc"));
}
