use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::config::RpcConfig;
use crate::error::{Error, Result};

const REQUEST_ID: &str = "bitcoin-tx-summary";

/// `getrawtransaction <txid> 1` result, reduced to the fields we use
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VerboseTransaction {
    pub hex: String,
    #[serde(default)]
    pub confirmations: Option<u64>,
    #[serde(default)]
    pub vin: Vec<VerboseInput>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VerboseInput {
    #[serde(default)]
    pub coinbase: Option<String>,
}

/// Anything that can hand out raw transactions by id
#[async_trait]
pub trait TransactionSource: Send + Sync {
    /// Raw transaction hex
    async fn raw_transaction(&self, txid: &str) -> Result<String>;

    /// Raw transaction hex plus confirmation count and input metadata
    async fn verbose_transaction(&self, txid: &str) -> Result<VerboseTransaction>;
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Clone)]
pub struct RpcClient {
    client: Client,
    url: String,
    user: String,
    password: String,
}

impl RpcClient {
    pub fn new(config: &RpcConfig) -> Self {
        Self {
            client: Client::new(),
            url: config.url(),
            user: config.user.clone(),
            password: config.password.clone(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<T>(&self, method: &str, params: Vec<Value>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        debug!("rpc {} {:?} -> {}", method, params, self.url);
        let response = self
            .client
            .post(&self.url)
            .basic_auth(&self.user, Some(&self.password))
            .json(&request_body(method, params))
            .send()
            .await?;

        // bitcoind reports RPC errors with HTTP 500 and a JSON body
        let status = response.status().as_u16();
        let body = response.text().await?;
        parse_response(status, &body)
    }
}

#[async_trait]
impl TransactionSource for RpcClient {
    async fn raw_transaction(&self, txid: &str) -> Result<String> {
        self.call("getrawtransaction", vec![json!(txid)]).await
    }

    async fn verbose_transaction(&self, txid: &str) -> Result<VerboseTransaction> {
        self.call("getrawtransaction", vec![json!(txid), json!(1)]).await
    }
}

fn request_body(method: &str, params: Vec<Value>) -> Value {
    json!({
        "jsonrpc": "1.0",
        "id": REQUEST_ID,
        "method": method,
        "params": params,
    })
}

fn parse_response<T: DeserializeOwned>(status: u16, body: &str) -> Result<T> {
    let unexpected = || Error::UnexpectedResponse {
        status,
        body: body.to_string(),
    };

    let response: RpcResponse<T> = serde_json::from_str(body).map_err(|_| unexpected())?;
    if let Some(error) = response.error {
        return Err(Error::Rpc {
            code: error.code,
            message: error.message,
        });
    }
    response.result.ok_or_else(unexpected)
}
