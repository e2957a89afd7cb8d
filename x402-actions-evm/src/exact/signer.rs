use std::future::Future;
use std::sync::Arc;

use alloy_primitives::{Address, B256, FixedBytes, Signature, U256};
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::{SolStruct, eip712_domain};
use rand::RngExt;
use rand::rng;
#[cfg(feature = "telemetry")]
use tracing::instrument;
use x402_actions::encoding::Base64Bytes;
use x402_actions::proto::{PaymentOption, PaymentRequired};
use x402_actions::scheme::{BoxFuture, PaymentSigner, SignedPayment, SignerError};

use super::EXACT_SCHEME;
use super::types::{
    Eip3009Authorization, Eip3009Payload, PaymentPayloadV1, PaymentPayloadV2,
    PaymentRequirementsExtra, TokenAmount, TransferWithAuthorization, UnixTimestamp,
};
use crate::chain::chain_id_for;
use crate::networks::usdc_domain;

/// Validity window used when an option carries no `maxTimeoutSeconds`.
pub const DEFAULT_MAX_TIMEOUT_SECONDS: u64 = 300;

/// Backdating of `validAfter`, tolerating clock skew between payer and chain.
const VALID_AFTER_SKEW_SECONDS: u64 = 10 * 60;

/// Anything that can sign a 32-byte hash for an address.
pub trait SignerLike: Send + Sync {
    /// The signing address.
    fn address(&self) -> Address;

    /// Signs a prehashed message.
    fn sign_hash(
        &self,
        hash: &FixedBytes<32>,
    ) -> impl Future<Output = Result<Signature, alloy_signer::Error>> + Send;
}

impl SignerLike for PrivateKeySigner {
    fn address(&self) -> Address {
        Self::address(self)
    }

    async fn sign_hash(&self, hash: &FixedBytes<32>) -> Result<Signature, alloy_signer::Error> {
        alloy_signer::Signer::sign_hash(self, hash).await
    }
}

impl<T: SignerLike> SignerLike for Arc<T> {
    fn address(&self) -> Address {
        (**self).address()
    }

    async fn sign_hash(&self, hash: &FixedBytes<32>) -> Result<Signature, alloy_signer::Error> {
        (**self).sign_hash(hash).await
    }
}

/// Inputs to an ERC-3009 authorization.
#[derive(Debug, Clone)]
pub struct Eip3009SigningParams {
    /// EIP-155 chain id.
    pub chain_id: u64,
    /// Token contract, the EIP-712 verifying contract.
    pub asset_address: Address,
    /// Recipient.
    pub pay_to: Address,
    /// Amount in atomic units.
    pub amount: U256,
    /// Seconds the authorization stays valid.
    pub max_timeout_seconds: u64,
    /// EIP-712 domain name and version.
    pub extra: PaymentRequirementsExtra,
}

/// The EIP-712 hash a facilitator reconstructs to verify `authorization`.
#[must_use]
pub fn authorization_hash(
    authorization: &Eip3009Authorization,
    params: &Eip3009SigningParams,
) -> B256 {
    let domain = eip712_domain! {
        name: params.extra.name.clone(),
        version: params.extra.version.clone(),
        chain_id: params.chain_id,
        verifying_contract: params.asset_address,
    };
    TransferWithAuthorization {
        from: authorization.from,
        to: authorization.to,
        value: authorization.value.0,
        validAfter: U256::from(authorization.valid_after.as_secs()),
        validBefore: U256::from(authorization.valid_before.as_secs()),
        nonce: authorization.nonce,
    }
    .eip712_signing_hash(&domain)
}

/// Signs an ERC-3009 `transferWithAuthorization` from the signer's address.
///
/// # Errors
///
/// Returns [`SignerError::Signing`] if the signer fails.
pub async fn sign_erc3009_authorization<S: SignerLike>(
    signer: &S,
    params: &Eip3009SigningParams,
) -> Result<Eip3009Payload, SignerError> {
    let now = UnixTimestamp::now();
    let nonce: [u8; 32] = rng().random();
    let authorization = Eip3009Authorization {
        from: signer.address(),
        to: params.pay_to,
        value: TokenAmount(params.amount),
        valid_after: now.minus(VALID_AFTER_SKEW_SECONDS),
        valid_before: now.plus(params.max_timeout_seconds),
        nonce: FixedBytes(nonce),
    };

    let hash = authorization_hash(&authorization, params);
    let signature = signer
        .sign_hash(&hash)
        .await
        .map_err(|e| SignerError::Signing(e.to_string()))?;

    Ok(Eip3009Payload {
        signature: signature.as_bytes().into(),
        authorization,
    })
}

/// "exact" scheme signer for EVM chains.
#[derive(Debug, Clone)]
pub struct ExactEvmSigner<S> {
    signer: S,
}

impl<S: SignerLike> ExactEvmSigner<S> {
    /// Wraps a signer.
    pub const fn new(signer: S) -> Self {
        Self { signer }
    }

    /// Reads the signing inputs from an offered option.
    fn signing_params(option: &PaymentOption) -> Result<Eip3009SigningParams, SignerError> {
        let chain_id = chain_id_for(&option.network).ok_or_else(|| {
            SignerError::Unsupported(format!("network {} is not an EVM chain", option.network))
        })?;
        let asset_address: Address = option
            .asset
            .parse()
            .map_err(|e| SignerError::InvalidOption(format!("asset {}: {e}", option.asset)))?;
        let recipient = option
            .recipient()
            .ok_or_else(|| SignerError::InvalidOption("missing payTo".to_owned()))?;
        let pay_to: Address = recipient
            .parse()
            .map_err(|e| SignerError::InvalidOption(format!("payTo {recipient}: {e}")))?;
        let raw_amount = option
            .amount()
            .ok_or_else(|| SignerError::InvalidOption("missing amount".to_owned()))?;
        let amount = U256::from_str_radix(raw_amount.trim(), 10)
            .map_err(|e| SignerError::InvalidOption(format!("amount {raw_amount}: {e}")))?;
        let extra = option
            .extra()
            .and_then(|v| serde_json::from_value::<PaymentRequirementsExtra>(v.clone()).ok())
            .unwrap_or_else(|| {
                let (name, version) = usdc_domain(chain_id);
                PaymentRequirementsExtra {
                    name: name.to_owned(),
                    version: version.to_owned(),
                }
            });

        Ok(Eip3009SigningParams {
            chain_id,
            asset_address,
            pay_to,
            amount,
            max_timeout_seconds: option
                .max_timeout_seconds()
                .unwrap_or(DEFAULT_MAX_TIMEOUT_SECONDS),
            extra,
        })
    }

    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "x402.evm.sign", skip_all, fields(network = %selected.network), err)
    )]
    async fn sign(
        &self,
        required: &PaymentRequired,
        selected: &PaymentOption,
    ) -> Result<SignedPayment, SignerError> {
        if selected.scheme != EXACT_SCHEME {
            return Err(SignerError::Unsupported(format!(
                "scheme {} is not supported",
                selected.scheme
            )));
        }
        let params = Self::signing_params(selected)?;
        let payload = sign_erc3009_authorization(&self.signer, &params).await?;

        let (header, encoded) = if required.x402_version >= 2 {
            let body = PaymentPayloadV2 {
                x402_version: 2,
                accepted: selected.clone(),
                resource: required.resource.clone(),
                payload,
            };
            ("payment-signature", Base64Bytes::encode_json(&body))
        } else {
            let body = PaymentPayloadV1 {
                x402_version: 1,
                scheme: selected.scheme.clone(),
                network: selected.network.clone(),
                payload,
            };
            ("x-payment", Base64Bytes::encode_json(&body))
        };
        let value = encoded.map_err(|e| SignerError::Encoding(e.to_string()))?;

        #[cfg(feature = "telemetry")]
        tracing::debug!(header, "signed x402 payment");

        Ok(SignedPayment {
            header,
            value: value.to_string(),
        })
    }
}

impl<S: SignerLike + 'static> PaymentSigner for ExactEvmSigner<S> {
    fn scheme(&self) -> &str {
        EXACT_SCHEME
    }

    fn address(&self) -> String {
        self.signer.address().to_checksum(None)
    }

    fn sign_payment<'a>(
        &'a self,
        required: &'a PaymentRequired,
        selected: &'a PaymentOption,
    ) -> BoxFuture<'a, Result<SignedPayment, SignerError>> {
        Box::pin(self.sign(required, selected))
    }
}
