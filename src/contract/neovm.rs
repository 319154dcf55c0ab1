//! NeoVM contract deployment and invocation

use super::ContractError;
use crate::config::SdkConfig;
use crate::core::{Address, DeployCode, Payload, Transaction};
use crate::script::{AbiFunction, OpCode};

/// Append `APPCALL <contract address>` to an argument script
pub fn build_neovm_invoke(contract: &Address, params: &[u8]) -> Vec<u8> {
    let mut code = Vec::with_capacity(params.len() + 21);
    code.extend_from_slice(params);
    code.push(OpCode::AppCall as u8);
    code.extend_from_slice(contract.as_bytes());
    code
}

/// Address a contract is deployed at: hash160 of its code
pub fn contract_address(code: &[u8]) -> Address {
    Address::from_vm_code(code)
}

/// Unsigned transaction invoking `function` on the contract at `contract`
///
/// With no function the contract's entry point is called without arguments.
pub fn invoke_transaction(
    config: &SdkConfig,
    contract: &Address,
    function: Option<&AbiFunction>,
    payer: Option<Address>,
) -> Result<Transaction, ContractError> {
    let params = match function {
        Some(function) => function.to_script()?,
        None => Vec::new(),
    };
    let code = build_neovm_invoke(contract, &params);
    let mut builder = config.transaction_builder(Payload::InvokeCode { code });
    if let Some(payer) = payer.map_or_else(|| config.payer(), |p| Ok(Some(p)))? {
        builder = builder.payer(payer);
    }
    Ok(builder.build())
}

/// Unsigned transaction deploying `deploy.code`
pub fn deploy_transaction(
    config: &SdkConfig,
    deploy: DeployCode,
    payer: Option<Address>,
) -> Result<Transaction, ContractError> {
    if deploy.code.is_empty() {
        return Err(ContractError::InvalidCode("contract code is empty".to_string()));
    }
    log::info!(
        "Deploying contract '{}' at {}",
        deploy.name,
        contract_address(&deploy.code).to_hex_string()
    );
    let mut builder = config.transaction_builder(Payload::DeployCode(deploy));
    if let Some(payer) = payer.map_or_else(|| config.payer(), |p| Ok(Some(p)))? {
        builder = builder.payer(payer);
    }
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TransactionType;
    use crate::io::Serializable;
    use crate::script::AbiParameter;
    use serde_json::json;

    #[test]
    fn test_invoke_appends_appcall() {
        let contract = Address([0x5A; 20]);
        let function = AbiFunction::new(
            "put",
            vec![
                AbiParameter::new("key", "String", json!("k")),
                AbiParameter::new("value", "Integer", json!(2)),
            ],
        );
        let tx = invoke_transaction(&SdkConfig::default(), &contract, Some(&function), None).unwrap();

        let code = match &tx.payload {
            Payload::InvokeCode { code } => code.clone(),
            other => panic!("unexpected payload {:?}", other),
        };
        let params = function.to_script().unwrap();
        assert_eq!(&code[..params.len()], params.as_slice());
        assert_eq!(code[params.len()], 0x67);
        assert_eq!(&code[params.len() + 1..], &[0x5A; 20]);
    }

    #[test]
    fn test_invoke_without_function() {
        let tx = invoke_transaction(&SdkConfig::default(), &Address([1; 20]), None, Some(Address([2; 20]))).unwrap();
        assert_eq!(tx.payer, Address([2; 20]));
        assert_eq!(
            tx.payload,
            Payload::InvokeCode {
                code: build_neovm_invoke(&Address([1; 20]), &[])
            }
        );
    }

    #[test]
    fn test_deploy_transaction() {
        let deploy = DeployCode {
            code: vec![0x51, 0x66],
            need_storage: true,
            name: "counter".to_string(),
            version: "1.0".to_string(),
            author: "dev".to_string(),
            email: "dev@example.com".to_string(),
            description: "counts".to_string(),
        };
        let tx = deploy_transaction(&SdkConfig::default(), deploy.clone(), None).unwrap();
        assert_eq!(tx.tx_type(), TransactionType::DeployCode);

        let decoded = Transaction::from_bytes(&tx.to_bytes()).unwrap();
        assert_eq!(decoded.payload, Payload::DeployCode(deploy));

        let empty = DeployCode {
            code: vec![],
            ..DeployCode::default()
        };
        assert!(matches!(
            deploy_transaction(&SdkConfig::default(), empty, None),
            Err(ContractError::InvalidCode(_))
        ));
    }

    #[test]
    fn test_contract_address_is_code_hash() {
        let code = [0x00, 0xC1, 0x66];
        assert_eq!(contract_address(&code), Address::from_vm_code(&code));
        assert_ne!(contract_address(&code), contract_address(&code[..2]));
    }
}
