use autosage_sessions::{SessionManifold, SessionStatus};

#[tokio::test]
async fn create_from_upload_seeds_manifest_and_asset() {
    let dir = tempfile::tempdir().unwrap();
    let manifold = SessionManifold::new(dir.path()).unwrap();

    let manifest = manifold.create_from_upload("cube.obj", b"v 0 0 0\n").unwrap();
    assert_eq!(manifest.status, SessionStatus::Idle);
    assert_eq!(manifest.stage, "created");
    assert_eq!(manifest.assets, vec!["input/cube.obj".to_string()]);

    for sub in ["input", "geometry", "mesh", "solve", "render", "logs"] {
        assert!(dir.path().join(&manifest.session_id).join(sub).is_dir());
    }
    assert!(dir.path().join(&manifest.session_id).join("input/cube.obj").exists());
}

#[tokio::test]
async fn get_returns_byte_identical_snapshot_with_no_intervening_writes() {
    let dir = tempfile::tempdir().unwrap();
    let manifold = SessionManifold::new(dir.path()).unwrap();
    let created = manifold.create_from_upload("cube.obj", b"data").unwrap();

    let first = manifold.get(&created.session_id).unwrap();
    let second = manifold.get(&created.session_id).unwrap();
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[tokio::test]
async fn apply_transition_dedups_assets_preserving_order() {
    let dir = tempfile::tempdir().unwrap();
    let manifold = SessionManifold::new(dir.path()).unwrap();
    let created = manifold.create_from_upload("cube.obj", b"data").unwrap();

    let updated = manifold
        .apply_transition(
            &created.session_id,
            SessionStatus::Processing,
            "geometry_fit",
            Some("geometry.dsl_fit_open3d".into()),
            Some("Executed geometry.dsl_fit_open3d.".into()),
            &["geometry/primitives.json".to_string(), "input/cube.obj".to_string()],
            &[],
        )
        .await
        .unwrap();

    assert_eq!(
        updated.assets,
        vec!["input/cube.obj".to_string(), "geometry/primitives.json".to_string()]
    );
    assert_eq!(updated.stage, "geometry_fit");
    assert_eq!(updated.messages.len(), 1);
}

#[tokio::test]
async fn asset_traversal_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let manifold = SessionManifold::new(dir.path()).unwrap();
    let created = manifold.create_from_upload("cube.obj", b"data").unwrap();

    let escape = manifold.asset_reader(&created.session_id, "../manifest.json");
    assert!(escape.is_err());

    let ok = manifold.asset_reader(&created.session_id, "input/cube.obj").unwrap();
    assert_eq!(ok, b"data");
}

#[tokio::test]
async fn append_user_prompt_appends_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let manifold = SessionManifold::new(dir.path()).unwrap();
    let created = manifold.create_from_upload("cube.obj", b"data").unwrap();

    let updated = manifold.append_user_prompt(&created.session_id, "Analyze this part").await.unwrap();
    assert_eq!(updated.messages.len(), 1);
    assert_eq!(updated.messages[0].content, "Analyze this part");

    let reloaded = manifold.get(&created.session_id).unwrap();
    assert_eq!(reloaded.messages.len(), 1);
}

#[tokio::test]
async fn new_sessions_continue_numbering_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let manifold = SessionManifold::new(dir.path()).unwrap();
        manifold.create_from_upload("a.obj", b"1").unwrap();
        manifold.create_from_upload("b.obj", b"2").unwrap();
    }
    let reopened = SessionManifold::new(dir.path()).unwrap();
    let third = reopened.create_from_upload("c.obj", b"3").unwrap();
    assert_eq!(third.session_id, "session_0003");
}
