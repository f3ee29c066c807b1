//!
//! 工作流集成测试
//!
//! 验证跨多次（独立）调用的完整密钥封装流程：每一步都使用新的 `Workflow`，
//! 彼此之间只通过存储中的工件传递状态。
//!

mod common;

use common::{flip_byte, run_full_cycle, setup_store};
use kem_kit::prelude::*;

// === 往返测试 ===

#[test]
fn test_roundtrip_for_every_selection() {
    for selector in SchemeSelector::ALL {
        let (_dir, store) = setup_store();
        let workflow = Workflow::new(&store);

        run_full_cycle(&workflow, selector);

        assert_eq!(
            workflow.verify().unwrap(),
            VerifyOutcome::Match,
            "round trip failed for {selector}"
        );
        let shared = store.get(ArtifactSlot::SharedSecret).unwrap();
        let decrypted = store.get(ArtifactSlot::DecryptedSecret).unwrap();
        assert_eq!(shared.as_bytes(), decrypted.as_bytes());
        assert_eq!(shared.len(), selector.scheme().sizes().shared_secret);
    }
}

#[test]
fn test_each_phase_uses_a_fresh_workflow() {
    let (_dir, store) = setup_store();
    let selector = SchemeSelector::parse("kyber", 1024).unwrap();

    // 模拟三次独立的进程调用
    Workflow::new(&store).generate(selector).unwrap();
    Workflow::new(&store).encapsulate(selector).unwrap();
    let (_, outcome) = Workflow::new(&store).decapsulate_and_verify(selector).unwrap();

    assert!(outcome.is_match());
}

// === 覆盖写测试 ===

#[test]
fn test_second_keygen_overwrites_key_slots() {
    let (_dir, store) = setup_store();
    let workflow = Workflow::new(&store);
    let selector = SchemeSelector::default();

    workflow.generate(selector).unwrap();
    let first_public = store.get(ArtifactSlot::PublicKey).unwrap();
    let first_private = store.get(ArtifactSlot::PrivateKey).unwrap();

    workflow.generate(selector).unwrap();
    let second_public = store.get(ArtifactSlot::PublicKey).unwrap();
    let second_private = store.get(ArtifactSlot::PrivateKey).unwrap();
    assert_ne!(first_public.as_bytes(), second_public.as_bytes());
    assert_ne!(first_private.as_bytes(), second_private.as_bytes());

    // 封装只使用最新的公钥：新私钥能解出相同的秘密，旧私钥不能
    workflow.encapsulate(selector).unwrap();
    workflow.decapsulate(selector).unwrap();
    assert_eq!(workflow.verify().unwrap(), VerifyOutcome::Match);

    store.put(&first_private).unwrap();
    workflow.decapsulate(selector).unwrap();
    assert_eq!(workflow.verify().unwrap(), VerifyOutcome::Mismatch);
}

// === 前置条件测试 ===

#[test]
fn test_encapsulate_without_keygen_fails_and_writes_nothing() {
    let (_dir, store) = setup_store();
    let workflow = Workflow::new(&store);

    match workflow.encapsulate(SchemeSelector::default()) {
        Err(Error::NotFound { slot, .. }) => assert_eq!(slot, ArtifactSlot::PublicKey),
        other => panic!("unexpected result: {other:?}"),
    }
    for slot in ArtifactSlot::ALL {
        assert!(!store.exists(slot), "{slot} should not exist");
    }
}

#[test]
fn test_decapsulate_without_private_key_fails() {
    let (_dir, store) = setup_store();
    let workflow = Workflow::new(&store);

    let err = workflow.decapsulate(SchemeSelector::default()).unwrap_err();
    assert!(matches!(
        err,
        Error::NotFound {
            slot: ArtifactSlot::PrivateKey,
            ..
        }
    ));
}

#[test]
fn test_mismatched_level_between_invocations_is_malformed() {
    let (_dir, store) = setup_store();
    let workflow = Workflow::new(&store);

    workflow
        .generate(SchemeSelector::parse("ml-kem", 768).unwrap())
        .unwrap();
    let err = workflow
        .encapsulate(SchemeSelector::parse("ml-kem", 512).unwrap())
        .unwrap_err();

    match err {
        Error::MalformedMaterial {
            slot,
            scheme,
            expected,
            actual,
        } => {
            assert_eq!(slot, ArtifactSlot::PublicKey);
            assert_eq!(scheme, "ML-KEM-512");
            assert_eq!(expected, 800);
            assert_eq!(actual, 1184);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!store.exists(ArtifactSlot::Ciphertext));
}

// === 校验测试 ===

#[test]
fn test_verify_without_artifacts_reports_missing() {
    let (_dir, store) = setup_store();
    let workflow = Workflow::new(&store);

    let outcome = workflow.verify().unwrap();
    assert!(matches!(
        outcome,
        VerifyOutcome::Missing {
            slot: ArtifactSlot::SharedSecret,
            ..
        }
    ));
    assert!(outcome.to_string().starts_with("File missing"));
}

#[test]
fn test_tampered_ciphertext_is_detected() {
    for selector in SchemeSelector::ALL {
        let (_dir, store) = setup_store();
        let workflow = Workflow::new(&store);

        workflow.generate(selector).unwrap();
        workflow.encapsulate(selector).unwrap();
        flip_byte(&store, ArtifactSlot::Ciphertext, 0);

        let (_, outcome) = workflow.decapsulate_and_verify(selector).unwrap();
        assert_eq!(outcome, VerifyOutcome::Mismatch, "tampering undetected for {selector}");
    }
}

#[test]
fn test_cross_family_decapsulation_does_not_verify() {
    let (_dir, store) = setup_store();
    let workflow = Workflow::new(&store);
    let kyber = SchemeSelector::new(SchemeFamily::Kyber, SecurityLevel::L512);
    let ml_kem = SchemeSelector::new(SchemeFamily::MlKem, SecurityLevel::L512);

    workflow.generate(kyber).unwrap();
    workflow.encapsulate(kyber).unwrap();
    // 字节长度相同，解封装本身不会失败，但得到的秘密不同
    workflow.decapsulate(ml_kem).unwrap();

    assert_eq!(workflow.verify().unwrap(), VerifyOutcome::Mismatch);
}

// === 存储锁测试 ===

#[test]
fn test_concurrent_action_is_rejected() {
    let (_dir, store) = setup_store();
    let workflow = Workflow::new(&store);
    workflow.generate(SchemeSelector::default()).unwrap();

    let guard = store.lock().unwrap();
    assert!(matches!(
        workflow.encapsulate(SchemeSelector::default()),
        Err(Error::StoreLocked { .. })
    ));
    assert!(!store.exists(ArtifactSlot::Ciphertext));
    drop(guard);

    workflow.encapsulate(SchemeSelector::default()).unwrap();
    assert!(store.exists(ArtifactSlot::Ciphertext));
}
