//! Kyber 第三轮 (v3.02) 参数集，由 `pqcrypto-kyber` 0.7 系列提供。
//!
//! 与 ML-KEM 的字节长度相同，但共享秘密经过 KDF(K̄ ‖ H(c)) 派生，
//! 而 ML-KEM 直接取 G(m ‖ H(pk)) 的前半部分，两个方案族的工件不能混用。

use pqcrypto_traits::kem::{Ciphertext as _, PublicKey as _, SecretKey as _, SharedSecret as _};

use crate::scheme::pqcrypto_kem;

pqcrypto_kem!(
    /// Kyber512
    Kyber512, pqcrypto_kyber::kyber512, "Kyber512", Kyber, L512
);
pqcrypto_kem!(
    /// Kyber768
    Kyber768, pqcrypto_kyber::kyber768, "Kyber768", Kyber, L768
);
pqcrypto_kem!(
    /// Kyber1024
    Kyber1024, pqcrypto_kyber::kyber1024, "Kyber1024", Kyber, L1024
);
