use async_trait::async_trait;

/// Checks that a payment reference covers the buy-in for `address`
#[async_trait]
pub trait PaymentVerifier: Send + Sync {
    async fn verify(&self, reference: &str, address: &str, amount: f64) -> bool;
}

/// Accepts any reference with a plausible shape. No chain lookup happens.
#[derive(Debug, Clone, Copy)]
pub struct StubVerifier {
    pub min_len: usize,
}

impl Default for StubVerifier {
    fn default() -> Self {
        Self { min_len: 10 }
    }
}

#[async_trait]
impl PaymentVerifier for StubVerifier {
    async fn verify(&self, reference: &str, address: &str, amount: f64) -> bool {
        if reference.len() < self.min_len {
            return false;
        }

        tracing::debug!(
            "Verifying payment {} from {} for {}",
            reference,
            address,
            amount
        );
        true
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RejectAllVerifier;

#[async_trait]
impl PaymentVerifier for RejectAllVerifier {
    async fn verify(&self, _reference: &str, _address: &str, _amount: f64) -> bool {
        false
    }
}
