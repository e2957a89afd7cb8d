use std::sync::Mutex;

use x402_actions::chain::ProtocolFamily;
use x402_actions::networks::NetworkInfo;
use x402_actions::proto::{PaymentOption, PaymentRequired};
use x402_actions::scheme::{BoxFuture, PaymentSigner, SignedPayment, SignerError};

pub const BASE_USDC: &str = "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913";

pub const NETWORKS: &[NetworkInfo] = &[NetworkInfo {
    network_id: "base-mainnet",
    name: "base",
    namespace: "eip155",
    reference: "8453",
    family: ProtocolFamily::Evm,
    usdc: BASE_USDC,
}];

/// Base64 of `"signed"`.
pub const SIGNED: &str = "c2lnbmVk";

/// Signs nothing, records what it was asked to sign.
#[derive(Default)]
pub struct RecordingSigner {
    pub signed: Mutex<Vec<PaymentOption>>,
}

impl PaymentSigner for RecordingSigner {
    fn scheme(&self) -> &str {
        "exact"
    }

    fn address(&self) -> String {
        "0x0000000000000000000000000000000000000009".to_owned()
    }

    fn sign_payment<'a>(
        &'a self,
        required: &'a PaymentRequired,
        selected: &'a PaymentOption,
    ) -> BoxFuture<'a, Result<SignedPayment, SignerError>> {
        Box::pin(async move {
            self.signed.lock().unwrap().push(selected.clone());
            let header = if required.x402_version >= 2 {
                "payment-signature"
            } else {
                "x-payment"
            };
            Ok(SignedPayment {
                header,
                value: SIGNED.to_owned(),
            })
        })
    }
}
