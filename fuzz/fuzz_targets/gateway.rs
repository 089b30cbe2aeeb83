#![no_main]

use common::codec::{MAX_FIELD_LEN, MAX_INT};
use gateway::{Gateway, GatewayClient};
use libfuzzer_sys::fuzz_target;
use soroban_sdk::{testutils::Address as _, Address, Env, String};

// Arbitrary call fields against the gateway's separator encoding. An
// accepted record starts with both chain ids and ends with its nonce.
fuzz_target!(|input: (u64, std::string::String, std::string::String)| {
    let (chain, contract, calldata) = input;
    let env = Env::default();
    env.mock_all_auths();

    let contract_id = env.register(Gateway, ());
    let client = GatewayClient::new(&env, &contract_id);
    client.init(&contract_id, &1);
    let caller = Address::generate(&env);
    client.allow(&contract_id, &caller);

    let result = client.try_call(
        &caller,
        &chain,
        &String::from_str(&env, &contract),
        &String::from_str(&env, &calldata),
    );

    let field_ok = |f: &str| !f.is_empty() && f.len() <= MAX_FIELD_LEN as usize && !f.contains("__");
    let valid = chain <= MAX_INT && field_ok(&contract) && field_ok(&calldata);
    assert_eq!(result.is_ok(), valid, "validation disagreed for {:?}", (chain, &contract, &calldata));
    if !valid {
        assert_eq!(client.get_event_size(), 0);
        return;
    }

    let encoded: Vec<u8> = client.get_event_encoded(&0).unwrap().iter().collect();
    let text = std::string::String::from_utf8(encoded).unwrap();
    // Fields may end in a single underscore, which fuses with the separator.
    let nonce = text.rsplit("__").next().unwrap();
    assert_eq!(nonce, "0");
    assert!(text.starts_with(&std::format!("1__{}__", chain)));
});
