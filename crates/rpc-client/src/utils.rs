use std::time::Duration;

use async_jsonrpc_client::Output;
use serde::de::DeserializeOwned;
use serde_json::from_value;

use crate::error::RpcError;

pub(crate) const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// Turn a JSON-RPC output into the expected value, keeping the method name
/// and the node's error code when the endpoint reports a failure.
pub(crate) fn to_result<T: DeserializeOwned>(method: &str, output: Output) -> Result<T, RpcError> {
    match output {
        Output::Success(success) => {
            from_value(success.result).map_err(|err| RpcError::UnexpectedResponse {
                method: method.to_string(),
                source: err,
            })
        }
        Output::Failure(failure) => Err(RpcError::Node {
            method: method.to_string(),
            code: failure.error.code.code(),
            message: failure.error.message,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_errors_keep_code_and_message() {
        let output: Output = serde_json::from_str(
            r#"{"jsonrpc":"2.0","error":{"code":-32000,"message":"nonce too low"},"id":1}"#,
        )
        .unwrap();
        match to_result::<u64>("eth_sendRawTransaction", output) {
            Err(RpcError::Node {
                method,
                code,
                message,
            }) => {
                assert_eq!(method, "eth_sendRawTransaction");
                assert_eq!(code, -32000);
                assert_eq!(message, "nonce too low");
            }
            other => panic!("unexpected result: {:?}", other.err()),
        }
    }

    #[test]
    fn undecodable_results_are_reported() {
        let output: Output =
            serde_json::from_str(r#"{"jsonrpc":"2.0","result":"not-a-number","id":1}"#).unwrap();
        assert!(matches!(
            to_result::<u64>("eth_blockNumber", output),
            Err(RpcError::UnexpectedResponse { .. })
        ));
    }
}
