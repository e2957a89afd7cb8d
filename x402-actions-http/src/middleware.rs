//! `reqwest-middleware` layer that pays 402 challenges.

use std::sync::Arc;

use http::{Extensions, HeaderName, HeaderValue, StatusCode};
use reqwest::{Request, Response};
use reqwest_middleware as rqm;
#[cfg(feature = "telemetry")]
use tracing::{debug, info, instrument, trace};
use x402_actions::scheme::{PaymentSelector, PaymentSigner};

use crate::error::PaymentError;
use crate::headers::payment_required_from_parts;

/// Middleware that answers a 402 by signing one offered option and
/// retrying the request once with the payment header.
///
/// Which option is paid is up to the selector. A second 402 is returned to
/// the caller unchanged.
pub struct X402Payments<S> {
    signer: Arc<dyn PaymentSigner>,
    selector: S,
}

impl<S> std::fmt::Debug for X402Payments<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("X402Payments")
            .field("payer", &self.signer.address())
            .finish_non_exhaustive()
    }
}

impl<S: PaymentSelector> X402Payments<S> {
    /// Pays with `signer` for the option chosen by `selector`.
    pub fn new(signer: Arc<dyn PaymentSigner>, selector: S) -> Self {
        Self { signer, selector }
    }

    /// Builds the payment header for a 402 response.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError`] if the body cannot be read, the challenge is
    /// unreadable, nothing is selectable or signing fails.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "x402.http.payment_header", skip_all, err)
    )]
    pub async fn payment_header(
        &self,
        res: Response,
    ) -> Result<(HeaderName, HeaderValue), PaymentError> {
        let headers = res.headers().clone();
        let body = res.bytes().await.map_err(PaymentError::ReadChallenge)?;
        let required =
            payment_required_from_parts(&headers, &body).ok_or(PaymentError::InvalidChallenge)?;

        let selected = self
            .selector
            .select(&required.accepts)
            .ok_or(PaymentError::NoMatchingOption)?;

        #[cfg(feature = "telemetry")]
        debug!(
            scheme = %selected.scheme,
            network = %selected.network,
            "Selected payment option"
        );

        let signed = self.signer.sign_payment(&required, selected).await?;
        let name =
            HeaderName::from_bytes(signed.header.as_bytes()).map_err(|_| PaymentError::InvalidHeader)?;
        let value = HeaderValue::from_str(&signed.value).map_err(|_| PaymentError::InvalidHeader)?;
        Ok((name, value))
    }
}

#[cfg_attr(
    feature = "telemetry",
    instrument(name = "x402.http.next", skip_all)
)]
async fn run_next(
    next: rqm::Next<'_>,
    req: Request,
    extensions: &mut Extensions,
) -> rqm::Result<Response> {
    next.run(req, extensions).await
}

#[async_trait::async_trait]
impl<S> rqm::Middleware for X402Payments<S>
where
    S: PaymentSelector + 'static,
{
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "x402.http.handle", skip_all, err)
    )]
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: rqm::Next<'_>,
    ) -> rqm::Result<Response> {
        let retry_req = req.try_clone();
        let res = run_next(next.clone(), req, extensions).await?;

        if res.status() != StatusCode::PAYMENT_REQUIRED {
            #[cfg(feature = "telemetry")]
            trace!(status = ?res.status(), "No payment required");
            return Ok(res);
        }

        #[cfg(feature = "telemetry")]
        info!(url = %res.url(), "Received 402 Payment Required, paying");

        let (name, value) = self
            .payment_header(res)
            .await
            .map_err(|e| rqm::Error::Middleware(e.into()))?;

        let mut retry =
            retry_req.ok_or_else(|| rqm::Error::Middleware(PaymentError::RequestNotCloneable.into()))?;
        retry.headers_mut().insert(name, value);

        run_next(next, retry, extensions).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use x402_actions::proto::PaymentOption;
    use x402_actions::scheme::PinnedOption;

    use super::*;
    use crate::test_support::{BASE_USDC, RecordingSigner, SIGNED};

    fn option(amount: &str) -> PaymentOption {
        serde_json::from_value(json!({
            "scheme": "exact",
            "network": "base",
            "asset": BASE_USDC,
            "maxAmountRequired": amount,
            "payTo": "0x0000000000000000000000000000000000000001",
        }))
        .unwrap()
    }

    fn client(signer: Arc<RecordingSigner>, pinned: PaymentOption) -> rqm::ClientWithMiddleware {
        rqm::ClientBuilder::new(reqwest::Client::new())
            .with(X402Payments::new(signer, PinnedOption(pinned)))
            .build()
    }

    #[tokio::test]
    async fn test_pays_and_retries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/paid"))
            .and(header("x-payment", SIGNED))
            .respond_with(ResponseTemplate::new(200).set_body_string("content"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/paid"))
            .respond_with(
                ResponseTemplate::new(402)
                    .set_body_json(json!({"x402Version": 1, "accepts": [option("20000"), option("10000")]})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let signer = Arc::new(RecordingSigner::default());
        let res = client(Arc::clone(&signer), option("10000"))
            .get(format!("{}/paid", server.uri()))
            .send()
            .await
            .unwrap();

        assert_eq!(res.status(), 200);
        let signed = signer.signed.lock().unwrap();
        assert_eq!(signed.len(), 1);
        assert_eq!(signed[0].amount(), Some("10000"));
    }

    #[tokio::test]
    async fn test_refuses_terms_no_longer_offered() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(402).set_body_json(json!({"accepts": [option("20000")]})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let signer = Arc::new(RecordingSigner::default());
        let err = client(Arc::clone(&signer), option("10000"))
            .get(server.uri())
            .send()
            .await
            .unwrap_err();

        let rqm::Error::Middleware(err) = err else {
            panic!("expected a middleware error");
        };
        assert!(matches!(
            err.downcast_ref::<PaymentError>(),
            Some(PaymentError::NoMatchingOption)
        ));
        assert!(signer.signed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_truncated_challenge_body_is_a_read_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            socket
                .write_all(b"HTTP/1.1 402 Payment Required\r\ncontent-length: 100\r\n\r\n{\"acc")
                .await
                .unwrap();
        });

        let res = reqwest::Client::new()
            .get(format!("http://{addr}/paid"))
            .send()
            .await
            .unwrap();
        let payments = X402Payments::new(
            Arc::new(RecordingSigner::default()),
            PinnedOption(option("1")),
        );
        let err = payments.payment_header(res).await.unwrap_err();
        assert!(matches!(err, PaymentError::ReadChallenge(_)), "unexpected error: {err:?}");
    }

    #[tokio::test]
    async fn test_passes_through_non_402() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(header_exists("x-payment"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let res = client(Arc::new(RecordingSigner::default()), option("1"))
            .get(server.uri())
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 404);
    }
}
