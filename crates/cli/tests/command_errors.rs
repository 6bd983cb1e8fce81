use apkforge::commands::{align_command, build_command, decode_command, sign_command};
use tempfile::tempdir;

#[test]
fn decode_errors_when_apk_missing() {
    let temp = tempdir().unwrap();
    let apk = temp.path().join("missing.apk").to_string_lossy().to_string();
    let err = decode_command(&apk, None, true).unwrap_err();
    assert!(err.to_string().contains("file not found"), "unexpected error: {err}");
}

#[test]
fn build_errors_when_source_dir_missing() {
    let temp = tempdir().unwrap();
    let src = temp.path().join("app").to_string_lossy().to_string();
    let err = build_command(&src, None).unwrap_err();
    assert!(err.to_string().contains("directory not found"), "unexpected error: {err}");
}

#[test]
fn build_errors_when_source_is_a_file() {
    let temp = tempdir().unwrap();
    let file = temp.path().join("app.apk");
    std::fs::write(&file, b"apk").unwrap();
    let err = build_command(&file.to_string_lossy(), None).unwrap_err();
    assert!(err.to_string().contains("directory not found"), "unexpected error: {err}");
}

#[test]
fn sign_errors_when_apk_missing() {
    let temp = tempdir().unwrap();
    let apk = temp.path().join("missing.apk").to_string_lossy().to_string();
    let err = sign_command(&apk).unwrap_err();
    assert!(err.to_string().contains("file not found"), "unexpected error: {err}");
}

#[test]
fn align_errors_when_apk_missing() {
    let temp = tempdir().unwrap();
    let apk = temp.path().join("missing.apk").to_string_lossy().to_string();
    let err = align_command(&apk, Some("out.apk".into())).unwrap_err();
    assert!(err.to_string().contains("file not found"), "unexpected error: {err}");
}
