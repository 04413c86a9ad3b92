//! Interpretation of relay response bodies
//!
//! Relays answer `eth_sendBundle` and `eth_callBundle` with one of several
//! JSON shapes. Each extractor decodes the body into a [`RelayResponse`]
//! and branches on the variant instead of probing untyped maps.

use serde_json::Value;
use types::{
    relay::value_to_message, utils::body_to_string, BundleResult, ExecutionError, RelayResponse,
    ResponseError,
};

/// Decode and classify a raw relay response
pub fn parse_response(body: &[u8]) -> Result<RelayResponse, ResponseError> {
    serde_json::from_slice(body).map_err(|source| ResponseError::InvalidJson {
        raw: body_to_string(body),
        source,
    })
}

/// Total gas used by the bundle, from `result.totalGasUsed`
pub fn extract_gas_used(body: &[u8]) -> Result<u64, ResponseError> {
    success_result(body)?
        .total_gas_used
        .as_ref()
        .and_then(value_as_gas)
        .ok_or_else(|| ResponseError::MissingField {
            field: "result.totalGasUsed",
            raw: body_to_string(body),
        })
}

/// Bundle hash assigned by the relay, from `result.bundleHash`
pub fn extract_bundle_hash(body: &[u8]) -> Result<String, ResponseError> {
    success_result(body)?
        .bundle_hash
        .as_ref()
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ResponseError::MissingField {
            field: "result.bundleHash",
            raw: body_to_string(body),
        })
}

/// Execution failures reported in a response.
///
/// A top-level `error` yields a single [`ExecutionError::Rpc`]. Otherwise
/// every entry of `result.results` carrying an `error` or a `revert`
/// yields one [`ExecutionError::Transaction`], in order. An empty list
/// means the relay reported no problem.
pub fn extract_execution_errors(body: &[u8]) -> Result<Vec<ExecutionError>, ResponseError> {
    match parse_response(body)? {
        RelayResponse::Success { result } => Ok(transaction_errors(&result)),
        RelayResponse::Failure { error } => Ok(vec![ExecutionError::Rpc(value_to_message(&error))]),
        RelayResponse::Malformed(_) => Err(ResponseError::Malformed {
            raw: body_to_string(body),
        }),
    }
}

fn success_result(body: &[u8]) -> Result<BundleResult, ResponseError> {
    match parse_response(body)? {
        RelayResponse::Success { result } => Ok(result),
        RelayResponse::Failure { error } => Err(ResponseError::Rejected {
            error: value_to_message(&error),
            raw: body_to_string(body),
        }),
        RelayResponse::Malformed(_) => Err(ResponseError::Malformed {
            raw: body_to_string(body),
        }),
    }
}

fn transaction_errors(result: &BundleResult) -> Vec<ExecutionError> {
    result
        .results
        .iter()
        .enumerate()
        .filter(|(_, tx)| tx.has_failure())
        .map(|(index, tx)| ExecutionError::Transaction {
            index,
            tx_hash: tx.tx_hash.as_ref().and_then(Value::as_str).map(str::to_string),
            error: tx.error.as_ref().map(value_to_message).unwrap_or_default(),
            revert: tx.revert.as_ref().map(value_to_message).unwrap_or_default(),
        })
        .collect()
}

/// Relays encode gas as a JSON number, sometimes in float notation
fn value_as_gas(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|gas| gas.fract() == 0.0 && *gas >= 0.0 && *gas <= u64::MAX as f64)
            .map(|gas| gas as u64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUCCESS: &str = r#"{"id":1,"jsonrpc":2.0,"result":{"bundleHash":"0x0d1b53154e2910960564190ad0c5ef34c49befb865e3d56374adbf2b1160aa65","results":[{"txHash":"0x0a9e21a9c0dd6b868b1d26d9bc6b11a549fac1fb70bc2c10ebf925c43def862c"}],"totalGasUsed":243051}}"#;

    const REVERTED: &str = r#"{"id":1,"jsonrpc":2.0,"result":{"bundleGasPrice":0,"bundleHash":"0x0ccf11afd8f1aaeb05d5057d79395a612e35d589ead6bb63e5caef2d5e7b670f","coinbaseDiff":0,"ethSentToCoinbase":0,"gasFees":0,"results":[{"coinbaseDiff":0,"error":"execution reverted","ethSentToCoinbase":0,"fromAddress":"0x3cA43755058a2294Fb280DfF9127db6F9c2216EA","gasFees":0,"gasPrice":0,"gasUsed":240600,"revert":"y","toAddress":"0x162Ab7D33ab2f61A5c380a37F7b516EDaFd77913","txHash":"0xabc8eb8ca3f66072aba73063332edc8d86904febd5f85923cc44d289ecaf2623"}],"stateBlockNumber":1.3051998e+07,"totalGasUsed":240600}}"#;

    const RPC_ERROR: &str = r#"{"error":{"code":-32000, "message":"err: nonce too low: address 0x3cA43755058a2294Fb280DfF9127db6F9c2216EA, tx: 31 state: 32"},"id":1,"jsonrpc":2.0}"#;

    #[test]
    fn test_extract_gas_used() {
        assert_eq!(extract_gas_used(SUCCESS.as_bytes()).unwrap(), 243051);
        assert_eq!(extract_gas_used(REVERTED.as_bytes()).unwrap(), 240600);
        assert_eq!(
            extract_gas_used(br#"{"result":{"totalGasUsed":4.2e+04}}"#).unwrap(),
            42000
        );
    }

    #[test]
    fn test_extract_gas_used_failures() {
        assert!(matches!(
            extract_gas_used(br#"{"result":{"totalGasUsed":"lots"}}"#),
            Err(ResponseError::MissingField { field: "result.totalGasUsed", .. })
        ));
        assert!(matches!(
            extract_gas_used(RPC_ERROR.as_bytes()),
            Err(ResponseError::Rejected { .. })
        ));
        assert!(matches!(
            extract_gas_used(br#"{"id":1}"#),
            Err(ResponseError::Malformed { .. })
        ));
    }

    #[test]
    fn test_extract_bundle_hash() {
        assert_eq!(
            extract_bundle_hash(SUCCESS.as_bytes()).unwrap(),
            "0x0d1b53154e2910960564190ad0c5ef34c49befb865e3d56374adbf2b1160aa65"
        );
        assert!(matches!(
            extract_bundle_hash(br#"{"result":{"totalGasUsed":1}}"#),
            Err(ResponseError::MissingField { field: "result.bundleHash", .. })
        ));
    }

    #[test]
    fn test_no_execution_errors() {
        assert!(extract_execution_errors(SUCCESS.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_reverted_transaction() {
        let errors = extract_execution_errors(REVERTED.as_bytes()).unwrap();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "err: execution reverted, revertString: y");
        match &errors[0] {
            ExecutionError::Transaction { index, tx_hash, .. } => {
                assert_eq!(*index, 0);
                assert_eq!(
                    tx_hash.as_deref(),
                    Some("0xabc8eb8ca3f66072aba73063332edc8d86904febd5f85923cc44d289ecaf2623")
                );
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_partial_fields_and_order() {
        let body = br#"{"result":{"results":[
            {"txHash":"0x01","revert":"only revert"},
            {"txHash":"0x02"},
            "garbage",
            {"txHash":"0x04","error":"only error"}
        ]}}"#;
        let errors = extract_execution_errors(body).unwrap();

        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        assert_eq!(
            messages,
            vec!["err: , revertString: only revert", "err: only error, revertString: "]
        );
        assert!(matches!(errors[1], ExecutionError::Transaction { index: 3, .. }));
    }

    #[test]
    fn test_top_level_rpc_error() {
        let errors = extract_execution_errors(RPC_ERROR.as_bytes()).unwrap();

        assert_eq!(errors.len(), 1);
        let ExecutionError::Rpc(message) = &errors[0] else {
            panic!("unexpected {:?}", errors[0]);
        };
        let value: Value = serde_json::from_str(message).unwrap();
        assert_eq!(value["code"], -32000);
        assert!(value["message"].as_str().unwrap().contains("nonce too low"));

        let errors = extract_execution_errors(br#"{"error":"bundle rejected"}"#).unwrap();
        assert_eq!(errors, vec![ExecutionError::Rpc("bundle rejected".to_string())]);
    }

    #[test]
    fn test_missing_or_invalid_results() {
        assert!(extract_execution_errors(br#"{"result":{}}"#).unwrap().is_empty());
        assert!(extract_execution_errors(br#"{"result":{"results":{"a":1}}}"#)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_malformed_response() {
        let err = extract_execution_errors(br#"{"id":1,"jsonrpc":"2.0"}"#).unwrap_err();
        assert!(matches!(err, ResponseError::Malformed { .. }));
        assert_eq!(err.raw(), r#"{"id":1,"jsonrpc":"2.0"}"#);

        assert!(matches!(
            extract_execution_errors(br#"{"result":"0x1234"}"#),
            Err(ResponseError::Malformed { .. })
        ));
    }

    #[test]
    fn test_array_result_is_not_success() {
        assert!(matches!(
            extract_bundle_hash(br#"{"result":["0xfeed"]}"#),
            Err(ResponseError::Malformed { .. })
        ));
        assert!(matches!(
            extract_execution_errors(br#"{"result":[]}"#),
            Err(ResponseError::Malformed { .. })
        ));

        let errors = extract_execution_errors(
            br#"{"result":[],"error":{"code":-32000,"message":"bundle rejected"}}"#,
        )
        .unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("bundle rejected"));
    }

    #[test]
    fn test_array_tx_entry_is_not_an_error() {
        let body = br#"{"result":{"results":[["0x1",1,"boom"],{"txHash":"0x2","revert":"nope"}]}}"#;
        let errors = extract_execution_errors(body).unwrap();

        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ExecutionError::Transaction { index: 1, .. }));
        assert_eq!(errors[0].to_string(), "err: , revertString: nope");
    }

    #[test]
    fn test_invalid_json_is_hard_error() {
        let extractors: [fn(&[u8]) -> Result<(), ResponseError>; 3] = [
            |b| extract_execution_errors(b).map(|_| ()),
            |b| extract_gas_used(b).map(|_| ()),
            |b| extract_bundle_hash(b).map(|_| ()),
        ];
        for extract in extractors {
            let err = extract(b"<html>bad gateway</html>").unwrap_err();
            assert!(matches!(err, ResponseError::InvalidJson { .. }));
            assert_eq!(err.raw(), "<html>bad gateway</html>");
        }
    }
}
