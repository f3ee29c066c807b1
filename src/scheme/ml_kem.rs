//! FIPS 203 ML-KEM 参数集，由 `pqcrypto-mlkem` 提供。

use pqcrypto_traits::kem::{Ciphertext as _, PublicKey as _, SecretKey as _, SharedSecret as _};

use crate::scheme::pqcrypto_kem;

pqcrypto_kem!(
    /// ML-KEM-512，NIST 安全类别 1
    MlKem512, pqcrypto_mlkem::mlkem512, "ML-KEM-512", MlKem, L512
);
pqcrypto_kem!(
    /// ML-KEM-768，NIST 安全类别 3
    MlKem768, pqcrypto_mlkem::mlkem768, "ML-KEM-768", MlKem, L768
);
pqcrypto_kem!(
    /// ML-KEM-1024，NIST 安全类别 5
    MlKem1024, pqcrypto_mlkem::mlkem1024, "ML-KEM-1024", MlKem, L1024
);
