use pdf_insert::*;
use std::path::PathBuf;

#[test]
fn test_default_options() {
    let options = InsertOptions::default();
    assert_eq!(options.policy, InsertionPolicy::Replace);
    assert!(options.select_all_on_empty);
    assert!(options.pages.is_empty());
    assert!(options.positions.is_empty());
}

#[test]
fn test_validation_requires_both_files() {
    let mut options = InsertOptions::default();
    match options.validate() {
        Err(InsertError::Config(msg)) => assert!(msg.contains("base file")),
        _ => panic!("Expected Config error"),
    }

    options.base_file = Some(PathBuf::from("base.pdf"));
    match options.validate() {
        Err(InsertError::Config(msg)) => assert!(msg.contains("source file")),
        _ => panic!("Expected Config error"),
    }

    options.source_file = Some(PathBuf::from("source.pdf"));
    assert!(options.validate().is_ok());
}

#[test]
fn test_quick_actions() {
    let options = InsertOptions::default().with_quick_action(QuickAction::ReplaceFirstPage);
    assert_eq!(options.pages, "1");
    assert_eq!(options.positions, "1");
    assert_eq!(options.policy, InsertionPolicy::Replace);

    let options = InsertOptions::default().with_quick_action(QuickAction::InsertAtMiddle);
    assert_eq!(options.pages, "1-3");
    assert_eq!(options.positions, "mid");
    assert_eq!(options.policy, InsertionPolicy::InsertBefore);

    let options = InsertOptions::default().with_quick_action(QuickAction::AppendAll);
    assert_eq!(options.pages, "all");
    assert!(options.positions.is_empty());
    assert_eq!(options.policy, InsertionPolicy::Append);
}

#[test]
fn test_quick_action_keeps_files() {
    let mut options = InsertOptions {
        base_file: Some(PathBuf::from("a.pdf")),
        source_file: Some(PathBuf::from("b.pdf")),
        ..Default::default()
    };
    QuickAction::AppendAll.apply(&mut options);

    assert_eq!(options.base_file, Some(PathBuf::from("a.pdf")));
    assert_eq!(options.source_file, Some(PathBuf::from("b.pdf")));
    assert_eq!(QuickAction::AppendAll.label(), "Append All");
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_save_and_load_options() {
    use tempfile::NamedTempFile;

    let options = InsertOptions {
        base_file: Some(PathBuf::from("base.pdf")),
        source_file: Some(PathBuf::from("source.pdf")),
        pages: "1-3,7".to_string(),
        positions: "2,end".to_string(),
        policy: InsertionPolicy::InsertAfter,
        select_all_on_empty: false,
    };

    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path();

    options.save(path).await.unwrap();
    let loaded = InsertOptions::load(path).await.unwrap();

    assert_eq!(options, loaded);

    let json = std::fs::read_to_string(path).unwrap();
    assert!(json.contains("\"InsertAfter\""));
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_load_partial_options_fills_defaults() {
    use tempfile::NamedTempFile;

    let temp_file = NamedTempFile::new().unwrap();
    std::fs::write(temp_file.path(), r#"{ "pages": "2", "policy": "Append" }"#).unwrap();

    let loaded = InsertOptions::load(temp_file.path()).await.unwrap();
    assert_eq!(loaded.pages, "2");
    assert_eq!(loaded.policy, InsertionPolicy::Append);
    assert!(loaded.select_all_on_empty);
    assert!(loaded.base_file.is_none());
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_load_invalid_json() {
    use tempfile::NamedTempFile;

    let temp_file = NamedTempFile::new().unwrap();
    std::fs::write(temp_file.path(), "{ not json").unwrap();

    let result = InsertOptions::load(temp_file.path()).await;
    match result {
        Err(InsertError::Config(msg)) => assert!(msg.contains("Failed to parse config")),
        _ => panic!("Expected Config error"),
    }
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_load_unknown_policy() {
    use tempfile::NamedTempFile;

    let temp_file = NamedTempFile::new().unwrap();
    std::fs::write(temp_file.path(), r#"{ "policy": "Shuffle" }"#).unwrap();

    assert!(matches!(
        InsertOptions::load(temp_file.path()).await,
        Err(InsertError::Config(_))
    ));
}
