//! solbind Compiler Demo
//!
//! Walks one contract through the pipeline:
//! 1. Parse combined JSON
//! 2. Resolve types, records, overload names and selectors
//! 3. Encode a call and decode it back through the resolved model

use solbind_compiler::{compile, AbiValue, ResolverConfig};
use solbind_runtime::Address;

const COMBINED_JSON: &str = r#"{
  "contracts": {
    "src/Token.sol:Token": {
      "abi": [
        {"type": "function", "name": "transfer", "stateMutability": "nonpayable",
         "inputs": [{"name": "to", "type": "address"}, {"name": "amount", "type": "uint256"}],
         "outputs": [{"name": "", "type": "bool"}]},
        {"type": "function", "name": "foo", "inputs": [], "outputs": []},
        {"type": "function", "name": "foo", "inputs": [{"name": "x", "type": "uint256"}], "outputs": []}
      ],
      "hashes": {
        "transfer(address,uint256)": "a9059cbb",
        "foo()": "c2985578",
        "foo(uint256)": "2fbebd38"
      }
    }
  }
}"#;

fn main() {
    println!("\n=== solbind Compiler Demo ===\n");

    println!("STEP 1: Resolve combined JSON");
    println!("─────────────────────────────");
    let models =
        compile(COMBINED_JSON, &ResolverConfig::default()).expect("Failed to resolve schema");
    for model in &models {
        println!("  Contract: {} (package '{}')", model.key(), model.package_name);
        for function in &model.functions {
            println!(
                "    - {:<14} 0x{}  {}",
                function.name,
                hex::encode(function.selector),
                function.signature
            );
        }
    }
    println!();

    println!("STEP 2: Encode a transfer call");
    println!("──────────────────────────────");
    let token = &models[0];
    let transfer = token.function("transfer").expect("transfer is declared");
    let values = vec![
        AbiValue::Address(Address::repeat_byte(0x74)),
        AbiValue::from(1_000_000_000_000_000_000u64),
    ];
    let calldata = transfer.encode_call(&values).expect("Failed to encode call");
    println!("  Calldata ({} bytes): 0x{}", calldata.len(), hex::encode(&calldata));
    println!();

    println!("STEP 3: Decode it back");
    println!("──────────────────────");
    let decoded = transfer.decode_call(&calldata).expect("Failed to decode call");
    for (param, value) in transfer.inputs.iter().zip(&decoded) {
        println!("  {} = {}", param.name, value);
    }
    assert_eq!(decoded, values);

    println!("\n=== Demo complete ===\n");
}
