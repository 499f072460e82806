//! Tests for writing manifests to disk

use std::fs;

use solbind_compiler::{compile, ResolverConfig};
use solbind_exporter::{ExportConfig, ManifestExporter, INDEX_FILE};
use tempfile::TempDir;

const SCHEMA: &str = r#"{
  "contracts": {
    "src/Vault.sol:Vault": {
      "abi": [
        {"type": "constructor", "inputs": [{"name": "owner", "type": "address"}]},
        {"type": "function", "name": "deposit", "stateMutability": "payable",
         "inputs": [{"name": "users", "type": "tuple[]", "internalType": "struct Vault.User[]",
                     "components": [{"name": "id", "type": "uint256"},
                                    {"name": "name", "type": "string"},
                                    {"name": "wallet", "type": "address"}]}],
         "outputs": []},
        {"type": "event", "name": "Deposited", "anonymous": false,
         "inputs": [{"name": "who", "type": "address", "indexed": true},
                    {"name": "amount", "type": "uint256", "indexed": false},
                    {"name": "memo", "type": "string", "indexed": false}]}
      ],
      "bin": "6080604052",
      "hashes": {"deposit((uint256,string,address)[])": "e1f5bd8c"}
    },
    "src/Token.sol:Token": {
      "abi": [{"type": "function", "name": "transfer",
               "inputs": [{"name": "to", "type": "address"}, {"name": "amount", "type": "uint256"}],
               "outputs": [{"name": "", "type": "bool"}]}],
      "hashes": {"transfer(address,uint256)": "a9059cbb"}
    }
  },
  "version": "0.8.24"
}"#;

fn exporter(dir: &TempDir, pretty: bool) -> ManifestExporter {
    ManifestExporter::new(ExportConfig {
        out_dir: dir.path().to_path_buf(),
        pretty,
        include_bytecode: true,
    })
}

// ============================================================================
// LAYOUT TESTS
// ============================================================================

#[test]
fn test_export_all_writes_package_directories() {
    let models = compile(SCHEMA, &ResolverConfig::default()).unwrap();
    let dir = TempDir::new().unwrap();

    let written = exporter(&dir, true).export_all(&models, Some("0.8.24")).unwrap();

    assert_eq!(written.len(), 3);
    assert!(dir.path().join("token/manifest.json").is_file());
    assert!(dir.path().join("vault/manifest.json").is_file());
    assert!(dir.path().join(INDEX_FILE).is_file());
}

#[test]
fn test_index_lists_contracts_in_order() {
    let models = compile(SCHEMA, &ResolverConfig::default()).unwrap();
    let dir = TempDir::new().unwrap();
    exporter(&dir, true).export_all(&models, None).unwrap();

    let index: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join(INDEX_FILE)).unwrap()).unwrap();
    let contracts: Vec<&str> =
        index.as_array().unwrap().iter().map(|e| e["contract"].as_str().unwrap()).collect();
    assert_eq!(contracts, vec!["src/Token.sol:Token", "src/Vault.sol:Vault"]);
    assert_eq!(index[1]["manifest"], "vault/manifest.json");
}

// ============================================================================
// CONTENT TESTS
// ============================================================================

#[test]
fn test_manifest_content() {
    let models = compile(SCHEMA, &ResolverConfig::default()).unwrap();
    let dir = TempDir::new().unwrap();
    exporter(&dir, true).export_all(&models, Some("0.8.24")).unwrap();

    let text = fs::read_to_string(dir.path().join("vault/manifest.json")).unwrap();
    let manifest: serde_json::Value = serde_json::from_str(&text).unwrap();

    assert_eq!(manifest["contract"], "Vault");
    assert_eq!(manifest["compilerVersion"], "0.8.24");
    assert_eq!(manifest["bytecode"], "0x6080604052");
    assert_eq!(manifest["constructor"]["signature"], "constructor(address)");

    let input = &manifest["functions"][0]["inputs"][0];
    assert_eq!(input["type"], "(uint256,string,address)[]");
    assert_eq!(input["displayType"], "User[]");

    let record = &manifest["records"][0];
    assert_eq!(record["name"], "User");
    assert_eq!(record["fields"][2]["name"], "Wallet");

    let event = &manifest["events"][0];
    assert_eq!(event["inputs"][0]["indexed"], true);
    assert!(event["inputs"][1].get("indexed").is_none());
}

#[test]
fn test_export_is_byte_identical_across_runs() {
    let first_dir = TempDir::new().unwrap();
    let second_dir = TempDir::new().unwrap();

    for dir in [&first_dir, &second_dir] {
        let models = compile(SCHEMA, &ResolverConfig::default()).unwrap();
        exporter(dir, false).export_all(&models, Some("0.8.24")).unwrap();
    }

    for file in ["token/manifest.json", "vault/manifest.json", INDEX_FILE] {
        let a = fs::read(first_dir.path().join(file)).unwrap();
        let b = fs::read(second_dir.path().join(file)).unwrap();
        assert_eq!(a, b, "{} differs between runs", file);
    }
}
