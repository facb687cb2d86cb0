use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::PaymentError;

type HmacSha256 = Hmac<Sha256>;

fn payload(order_id: &str, payment_id: &str) -> String {
    format!("{order_id}|{payment_id}")
}

/// Hex HMAC-SHA256 of `order_id|payment_id`, the value the gateway hands the browser.
pub fn sign(secret: &str, order_id: &str, payment_id: &str) -> Result<String, PaymentError> {
    let mut mac = mac_for(secret)?;
    mac.update(payload(order_id, payment_id).as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time check of a checkout signature.
pub fn verify(
    secret: &str,
    order_id: &str,
    payment_id: &str,
    signature: &str,
) -> Result<(), PaymentError> {
    let expected = hex::decode(signature.trim()).map_err(|_| PaymentError::InvalidSignature)?;
    let mut mac = mac_for(secret)?;
    mac.update(payload(order_id, payment_id).as_bytes());
    mac.verify_slice(&expected)
        .map_err(|_| PaymentError::InvalidSignature)
}

fn mac_for(secret: &str) -> Result<HmacSha256, PaymentError> {
    <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
        .map_err(|e| PaymentError::Decode(format!("invalid signing key: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_rfc4231_vector() {
        let mut mac = mac_for("Jefe").unwrap();
        mac.update(b"what do ya want for nothing?");
        assert_eq!(
            hex::encode(mac.finalize().into_bytes()),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn accepts_gateway_signature() {
        let sig = sign("secret", "order_Abc", "pay_Xyz").unwrap();
        assert!(verify("secret", "order_Abc", "pay_Xyz", &sig).is_ok());
    }

    #[test]
    fn rejects_tampered_inputs() {
        let sig = sign("secret", "order_Abc", "pay_Xyz").unwrap();
        assert!(verify("secret", "order_Abc", "pay_Other", &sig).is_err());
        assert!(verify("other-secret", "order_Abc", "pay_Xyz", &sig).is_err());
        assert!(verify("secret", "order_Abc", "pay_Xyz", "not-hex").is_err());
        assert!(verify("secret", "order_Abc", "pay_Xyz", "").is_err());
    }
}
