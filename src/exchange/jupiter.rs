//! Live execution through the Jupiter v6 swap API: fetch a quote, let
//! Jupiter build the swap transaction, sign it locally and submit it over
//! Solana RPC.

use crate::error::ExchangeError;
use crate::models::{Fill, TradeSide};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Utc;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use solana_sdk::transaction::VersionedTransaction;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

const WSOL_MINT: &str = "So11111111111111111111111111111111111111112";
const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

const SOL_DECIMALS: u32 = 9;
const USDC_DECIMALS: u32 = 6;

const QUOTE_URL: &str = "https://quote-api.jup.ag/v6/quote";
const SWAP_URL: &str = "https://quote-api.jup.ag/v6/swap";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub struct JupiterExchange {
    http: reqwest::Client,
    rpc: RpcClient,
    keypair: Keypair,
    slippage_bps: u32,
}

impl JupiterExchange {
    pub fn new(rpc_url: &str, private_key_b58: &str, slippage_bps: u32) -> anyhow::Result<Self> {
        let raw = bs58::decode(private_key_b58)
            .into_vec()
            .map_err(|e| anyhow::anyhow!("PRIVATE_KEY_B58 is not valid base58: {e}"))?;
        let keypair = Keypair::from_bytes(&raw)
            .map_err(|e| anyhow::anyhow!("PRIVATE_KEY_B58 is not a valid keypair: {e}"))?;

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            rpc: RpcClient::new(rpc_url.to_string()),
            keypair,
            slippage_bps,
        })
    }

    /// Quote, build, sign and submit one swap. Returns the received output
    /// amount in its smallest units together with the transaction signature.
    async fn swap(
        &self,
        input_mint: &str,
        output_mint: &str,
        amount_in: u64,
    ) -> Result<(u64, String), ExchangeError> {
        let quote: serde_json::Value = self
            .http
            .get(QUOTE_URL)
            .query(&[
                ("inputMint", input_mint),
                ("outputMint", output_mint),
                ("amount", &amount_in.to_string()),
                ("slippageBps", &self.slippage_bps.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let out_amount: u64 = quote["outAmount"]
            .as_str()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| {
                ExchangeError::Rejected(format!("quote has no outAmount: {quote}"))
            })?;

        let swap_request = serde_json::json!({
            "quoteResponse": quote,
            "userPublicKey": self.keypair.pubkey().to_string(),
            "wrapAndUnwrapSol": true,
        });

        let swap_response: serde_json::Value = self
            .http
            .post(SWAP_URL)
            .json(&swap_request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let tx_b64 = swap_response["swapTransaction"].as_str().ok_or_else(|| {
            ExchangeError::Rejected("swap response has no transaction payload".to_string())
        })?;

        let tx_bytes = BASE64
            .decode(tx_b64)
            .map_err(|e| ExchangeError::Signing(format!("bad transaction encoding: {e}")))?;
        let unsigned: VersionedTransaction = bincode::deserialize(&tx_bytes)
            .map_err(|e| ExchangeError::Signing(format!("bad transaction payload: {e}")))?;

        let signed = VersionedTransaction::try_new(unsigned.message, &[&self.keypair])
            .map_err(|e| ExchangeError::Signing(e.to_string()))?;

        let signature = self
            .rpc
            .send_and_confirm_transaction(&signed)
            .await
            .map_err(|e| ExchangeError::Network(e.to_string()))?;

        info!("Swap confirmed: {signature}");
        Ok((out_amount, signature.to_string()))
    }
}

#[async_trait]
impl super::ExchangeClient for JupiterExchange {
    async fn buy(&self, quote_amount: f64, _mark_price: f64) -> Result<Fill, ExchangeError> {
        if quote_amount <= 0.0 {
            return Err(ExchangeError::Rejected(format!(
                "invalid buy amount: {quote_amount} USDC"
            )));
        }

        let amount_in = (quote_amount * 10f64.powi(USDC_DECIMALS as i32)).round() as u64;
        let (out_amount, signature) = self.swap(USDC_MINT, WSOL_MINT, amount_in).await?;

        let quantity = out_amount as f64 / 10f64.powi(SOL_DECIMALS as i32);
        if quantity <= 0.0 {
            return Err(ExchangeError::Rejected("swap returned zero SOL".to_string()));
        }

        Ok(Fill {
            order_id: Uuid::new_v4(),
            side: TradeSide::Buy,
            quantity,
            price: quote_amount / quantity,
            quote_amount,
            timestamp: Utc::now(),
            simulated: false,
            signature: Some(signature),
        })
    }

    async fn sell(&self, base_quantity: f64, _mark_price: f64) -> Result<Fill, ExchangeError> {
        if base_quantity <= 0.0 {
            return Err(ExchangeError::Rejected(format!(
                "invalid sell quantity: {base_quantity} SOL"
            )));
        }

        let amount_in = (base_quantity * 10f64.powi(SOL_DECIMALS as i32)).round() as u64;
        let (out_amount, signature) = self.swap(WSOL_MINT, USDC_MINT, amount_in).await?;

        let quote_amount = out_amount as f64 / 10f64.powi(USDC_DECIMALS as i32);

        Ok(Fill {
            order_id: Uuid::new_v4(),
            side: TradeSide::Sell,
            quantity: base_quantity,
            price: quote_amount / base_quantity,
            quote_amount,
            timestamp: Utc::now(),
            simulated: false,
            signature: Some(signature),
        })
    }
}
