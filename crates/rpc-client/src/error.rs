use thiserror::Error;

/// Failure of a root chain JSON-RPC call.
///
/// `Transport` wraps errors raised before a response arrived; `Node` is an
/// error object the endpoint itself returned, with its JSON-RPC code;
/// `UnexpectedResponse` means the call succeeded but the result did not
/// decode into the expected shape.
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("rootchain rpc {method} transport error: {source}")]
    Transport {
        method: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("rootchain rpc {method} node error {code}: {message}")]
    Node {
        method: String,
        code: i64,
        message: String,
    },
    #[error("rootchain rpc {method} unexpected response: {source}")]
    UnexpectedResponse {
        method: String,
        #[source]
        source: serde_json::Error,
    },
}

impl RpcError {
    pub fn transport<E: Into<anyhow::Error>>(method: &str, source: E) -> Self {
        RpcError::Transport {
            method: method.to_string(),
            source: source.into(),
        }
    }
}
