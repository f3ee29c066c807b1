//! # kem-kit: file-based post-quantum key encapsulation
//!
//! `kem-kit` drives the three KEM phases (key generation, encapsulation,
//! decapsulation) over a small set of on-disk artifacts, so that each phase can
//! run in a separate process invocation.
//!
//! ## Core Concepts
//!
//! - **`SchemeSelector`**: an immutable (family, level) choice resolving to one
//!   registered KEM, ML-KEM or Kyber at 512/768/1024.
//! - **`KeyStore`**: five fixed artifact slots under an artifact root, written
//!   atomically and guarded by an advisory lock.
//! - **`Workflow`**: sequences store reads and writes around the KEM operations
//!   and checks that both sides agree on the shared secret.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kem_kit::prelude::*;
//!
//! fn main() -> kem_kit::Result<()> {
//!     let store = KeyStore::new("./artifacts");
//!     let workflow = Workflow::new(&store);
//!     let selector = SchemeSelector::parse("ml-kem", 768)?;
//!
//!     workflow.generate(selector)?;
//!     workflow.encapsulate(selector)?;
//!     let (_, outcome) = workflow.decapsulate_and_verify(selector)?;
//!     assert!(outcome.is_match());
//!     Ok(())
//! }
//! ```

pub mod common;
pub mod error;
pub mod scheme;
pub mod storage;
pub mod workflow;

#[cfg(feature = "cli")]
pub mod cli;

pub use error::{Error, Result};

// --- Prelude ---
// 最常用的类型集合
pub mod prelude {
    pub use crate::common::config::Settings;
    pub use crate::error::{Error, Result};
    pub use crate::scheme::{KemScheme, SchemeFamily, SchemeSelector, SecurityLevel};
    pub use crate::storage::{ArtifactSlot, KeyMaterial, KeyStore};
    pub use crate::workflow::{ActionReport, VerifyOutcome, Workflow};
}

/// The version of the `kem-kit` crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
