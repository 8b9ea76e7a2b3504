//! Bit length of a key.
//!
//! Fixed-size algorithms map to a constant. RSA and DSA use the bit length
//! of the modulus or prime `p`, computed on the big integer so that a
//! leading byte with few significant bits is counted exactly.

use crate::algorithm::KeyAlgorithm;
use crate::public_key::PublicKey;

pub const ED25519_BITS: u32 = 256;

/// Returns `None` when the size depends on numbers that are not available.
pub fn resolve(algorithm: KeyAlgorithm, public_key: Option<&PublicKey>) -> Option<u32> {
    match (algorithm, public_key) {
        (KeyAlgorithm::Ed25519, _) => Some(ED25519_BITS),
        (KeyAlgorithm::Ecdsa(curve), _) => curve.map(|c| c.bits()),
        (KeyAlgorithm::Rsa, Some(PublicKey::Rsa { n, .. })) => u32::try_from(n.bits()).ok(),
        (KeyAlgorithm::Dsa, Some(PublicKey::Dsa { p, .. })) => u32::try_from(p.bits()).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigUint;
    use rstest::rstest;

    use super::resolve;
    use crate::algorithm::{EcdsaCurve, KeyAlgorithm};
    use crate::public_key::PublicKey;

    fn rsa(modulus: &[u8]) -> PublicKey {
        PublicKey::Rsa {
            e: BigUint::from(65537u32),
            n: BigUint::from_bytes_be(modulus),
        }
    }

    #[rstest]
    #[case::ed25519(KeyAlgorithm::Ed25519, None, Some(256))]
    #[case::p256(KeyAlgorithm::Ecdsa(Some(EcdsaCurve::NistP256)), None, Some(256))]
    #[case::p384(KeyAlgorithm::Ecdsa(Some(EcdsaCurve::NistP384)), None, Some(384))]
    #[case::p521(KeyAlgorithm::Ecdsa(Some(EcdsaCurve::NistP521)), None, Some(521))]
    #[case::unknown_curve(KeyAlgorithm::Ecdsa(None), None, None)]
    #[case::rsa_without_key(KeyAlgorithm::Rsa, None, None)]
    #[case::dsa_without_key(KeyAlgorithm::Dsa, None, None)]
    fn test_resolve_fixed(
        #[case] algorithm: KeyAlgorithm,
        #[case] key: Option<PublicKey>,
        #[case] expected: Option<u32>,
    ) {
        assert_eq!(resolve(algorithm, key.as_ref()), expected);
    }

    #[rstest]
    #[case::full_byte(vec![0xff; 256], 2048)]
    #[case::high_bit_only(vec![0x80, 0x00], 16)]
    #[case::leading_byte_0x5e(vec![0x5e, 0x01], 15)]
    #[case::leading_byte_0x01(vec![0x01, 0x00, 0x00], 17)]
    #[case::leading_zero_ignored(vec![0x00, 0x7f], 7)]
    fn test_resolve_rsa_exact(#[case] modulus: Vec<u8>, #[case] expected: u32) {
        assert_eq!(resolve(KeyAlgorithm::Rsa, Some(&rsa(&modulus))), Some(expected));
    }

    #[test]
    fn test_resolve_dsa_uses_p() {
        let key = PublicKey::Dsa {
            p: BigUint::from(1u32) << 1023u32,
            q: BigUint::from(1u32) << 159u32,
            g: BigUint::from(2u32),
            y: BigUint::from(3u32),
        };
        assert_eq!(resolve(KeyAlgorithm::Dsa, Some(&key)), Some(1024));
    }
}
