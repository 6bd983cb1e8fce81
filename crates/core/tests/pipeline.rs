mod common;

use std::fs;

use apkforge_core::pipeline::{build_apk, BuildStage};
use apkforge_core::ToolError;
use common::{FakeTools, Harness};

#[test]
fn build_runs_rebuild_align_sign_in_order() {
    let h = Harness::new(FakeTools::new());
    let work = h.work();
    let src = work.join("app");
    fs::create_dir_all(&src).unwrap();
    let out = work.join("app_mod.apk");

    let outcome = build_apk(&h.toolchain, &src, &out).unwrap();

    assert_eq!(h.steps(), ["apktool b", "zipalign", "signer"]);
    assert_eq!(outcome.output, out);
    assert_eq!(fs::read(&out).unwrap(), b"signed");
    assert_eq!(outcome.aligned, work.join("app_mod_aligned.apk"));
    assert!(outcome.intermediate_removed);
    assert!(!outcome.aligned.exists());
    assert!(!work.join("app_mod_aligned-aligned-debugSigned.apk").exists());
}

#[test]
fn build_stops_when_rebuild_fails() {
    let h = Harness::new(FakeTools::new().failing("apktool b"));
    let work = h.work();
    let err = build_apk(&h.toolchain, &work.join("app"), &work.join("app_mod.apk")).unwrap_err();

    assert_eq!(err.stage, BuildStage::Rebuild);
    assert!(err.leftovers.is_empty());
    assert!(matches!(err.source, ToolError::Failed { .. }));
    assert_eq!(h.steps(), ["apktool b"]);
}

#[test]
fn build_stops_when_align_fails() {
    let h = Harness::new(FakeTools::new().failing("zipalign"));
    let work = h.work();
    let out = work.join("app_mod.apk");
    let err = build_apk(&h.toolchain, &work.join("app"), &out).unwrap_err();

    assert_eq!(err.stage, BuildStage::Align);
    assert_eq!(err.leftovers, [out.clone()]);
    assert_eq!(h.steps(), ["apktool b", "zipalign"]);
    assert!(err.to_string().contains("build stopped at align stage"));
}

#[test]
fn build_leaves_aligned_intermediate_when_signing_fails() {
    let h = Harness::new(FakeTools::new().failing("signer"));
    let work = h.work();
    let out = work.join("app_mod.apk");
    let err = build_apk(&h.toolchain, &work.join("app"), &out).unwrap_err();

    let aligned = work.join("app_mod_aligned.apk");
    assert_eq!(err.stage, BuildStage::Sign);
    assert_eq!(err.leftovers, [out.clone(), aligned.clone()]);
    assert!(aligned.exists(), "no rollback of earlier stages");
    assert_eq!(h.steps(), ["apktool b", "zipalign", "signer"]);
}
