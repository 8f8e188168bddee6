//! Integration tests for listing, upload, download, and search.

mod helpers;

use bytes::Bytes;

use drive_core::ErrorKind;
use drive_entity::item::ItemType;
use drive_service::FileUpload;

#[tokio::test]
async fn test_list_root_orders_folders_first_then_name() {
    let app = helpers::TestApp::new();
    let u = app.user("u1").await;
    let b_file = app.file(&u, None, "b.txt").await;
    let z_folder = app.folder(&u, None, "z").await;
    let a_file = app.file(&u, None, "a.txt").await;
    let m_folder = app.folder(&u, None, "m").await;

    let other = app.user("u2").await;
    app.folder(&other, None, "not mine").await;

    let roots = app.drive.items.list_root(&u).await.unwrap();
    assert_eq!(
        helpers::ids(&roots),
        vec![m_folder.id, z_folder.id, a_file.id, b_file.id]
    );
}

#[tokio::test]
async fn test_list_children_errors() {
    let app = helpers::TestApp::new();
    let u = app.user("u1").await;
    let stranger = app.user("u2").await;
    let folder = app.folder(&u, None, "folder").await;
    let file = app.file(&u, None, "file.txt").await;

    let err = app
        .drive
        .items
        .list_children(&u, uuid::Uuid::new_v4())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);

    let err = app.drive.items.list_children(&u, file.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = app
        .drive
        .items
        .list_children(&stranger, folder.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);
}

#[tokio::test]
async fn test_get_item() {
    let app = helpers::TestApp::new();
    let u = app.user("u1").await;
    let stranger = app.user("u2").await;
    let folder = app.folder(&u, None, "folder").await;

    let fetched = app.drive.items.get_item(&u, folder.id).await.unwrap();
    assert_eq!(fetched, folder);

    let err = app.drive.items.get_item(&stranger, folder.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);

    let err = app
        .drive
        .items
        .get_item(&u, uuid::Uuid::new_v4())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_create_folder_validation() {
    let app = helpers::TestApp::new();
    let u = app.user("u1").await;
    let file = app.file(&u, None, "file.txt").await;

    let err = app.drive.items.create_folder(&u, None, "").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::BadRequest);

    let err = app
        .drive
        .items
        .create_folder(&u, Some(uuid::Uuid::new_v4()), "x")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = app
        .drive
        .items
        .create_folder(&u, Some(file.id), "x")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::BadRequest);

    let root = app.folder(&u, None, "root").await;
    assert_eq!(root.item_type, ItemType::Folder);
    assert!(root.parent_id.is_none());
    assert_eq!(root.created_at, root.updated_at);
}

#[tokio::test]
async fn test_upload_and_download_round_trip() {
    let app = helpers::TestApp::new();
    let u = app.user("u1").await;
    let folder = app.folder(&u, None, "docs").await;

    let upload = FileUpload::new(
        "notes.md",
        Some("text/markdown".to_string()),
        Bytes::from_static(b"# Notes"),
    );
    let file = app
        .drive
        .items
        .upload_file(&u, Some(folder.id), upload)
        .await
        .unwrap();
    assert_eq!(file.item_type, ItemType::File);
    assert_eq!(file.size_bytes, Some(7));
    assert_eq!(file.mime_type.as_deref(), Some("text/markdown"));
    assert!(app.blobs.contains(&format!("items/{}", file.id)));

    let download = app.drive.items.download_file(&u, file.id).await.unwrap();
    assert_eq!(download.mime_type, "text/markdown");
    assert_eq!(download.filename, "notes.md");
    assert_eq!(download.size_bytes, Some(7));
    assert_eq!(helpers::read_all(download).await, b"# Notes");
}

#[tokio::test]
async fn test_upload_defaults() {
    let app = helpers::TestApp::new();
    let u = app.user("u1").await;

    let upload = FileUpload::new("  ", None, Bytes::from_static(b"raw"));
    let file = app.drive.items.upload_file(&u, None, upload).await.unwrap();
    assert_eq!(file.name, "file");
    assert!(file.mime_type.is_none());

    let download = app.drive.items.download_file(&u, file.id).await.unwrap();
    assert_eq!(download.mime_type, "application/octet-stream");
    assert_eq!(download.filename, "file");
}

#[tokio::test]
async fn test_upload_parent_validation() {
    let app = helpers::TestApp::new();
    let u = app.user("u1").await;
    let stranger = app.user("u2").await;
    let folder = app.folder(&u, None, "docs").await;
    let file = app.file(&u, None, "f.txt").await;
    let content = || FileUpload::new("x.bin", None, Bytes::from_static(b"x"));

    let err = app
        .drive
        .items
        .upload_file(&u, Some(file.id), content())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::BadRequest);

    let err = app
        .drive
        .items
        .upload_file(&u, Some(uuid::Uuid::new_v4()), content())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = app
        .drive
        .items
        .upload_file(&stranger, Some(folder.id), content())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);

    assert!(app.drive.items.list_children(&u, folder.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_blob_failure_leaves_metadata() {
    let app = helpers::TestApp::new();
    let u = app.user("u1").await;
    app.blobs.fail_puts();

    let upload = FileUpload::new("lost.txt", None, Bytes::from_static(b"lost"));
    let err = app.drive.items.upload_file(&u, None, upload).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Storage);

    let roots = app.drive.items.list_root(&u).await.unwrap();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].name, "lost.txt");
}

#[tokio::test]
async fn test_download_errors() {
    let app = helpers::TestApp::new();
    let u = app.user("u1").await;
    let stranger = app.user("u2").await;
    let folder = app.folder(&u, None, "docs").await;
    let file = app.file(&u, Some(folder.id), "f.txt").await;

    let err = app.drive.items.download_file(&u, folder.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = app
        .drive
        .items
        .download_file(&u, uuid::Uuid::new_v4())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = app
        .drive
        .items
        .download_file(&stranger, file.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);
}

#[tokio::test]
async fn test_blank_search_is_empty() {
    let app = helpers::TestApp::new();
    let u = app.user("u1").await;
    app.folder(&u, None, "anything").await;

    for limit in [0, 1, 10, 500] {
        assert!(app.drive.items.search_by_name(&u, "", limit).await.unwrap().is_empty());
        assert!(app.drive.items.search_by_name(&u, "   ", limit).await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_search_limit_is_clamped() {
    let app = helpers::TestApp::new();
    let u = app.user("u1").await;
    for i in 0..60 {
        app.folder(&u, None, &format!("doc-{i}")).await;
    }

    let hits = app.drive.items.search_by_name(&u, "DOC", 0).await.unwrap();
    assert_eq!(hits.len(), 1);

    let hits = app.drive.items.search_by_name(&u, "doc", 500).await.unwrap();
    assert_eq!(hits.len(), 50);
}

#[tokio::test]
async fn test_search_only_returns_readable_items() {
    let app = helpers::TestApp::new();
    let u = app.user("u1").await;
    let stranger = app.user("u2").await;
    let mine = [
        app.folder(&u, None, "Report 2024").await,
        app.file(&u, None, "report.pdf").await,
    ];
    app.folder(&stranger, None, "secret report").await;
    app.file(&stranger, None, "REPORT.txt").await;

    let hits = app.drive.items.search_by_name(&u, "report", 10).await.unwrap();
    let mut found = helpers::ids(&hits);
    found.sort();
    let mut expected: Vec<_> = mine.iter().map(|item| item.id).collect();
    expected.sort();
    assert_eq!(found, expected);
}

#[tokio::test]
async fn test_search_matches_wildcards_literally() {
    let app = helpers::TestApp::new();
    let u = app.user("u1").await;
    let discount = app.folder(&u, None, "50%_off").await;
    app.folder(&u, None, "500 off").await;

    let hits = app.drive.items.search_by_name(&u, "%_", 10).await.unwrap();
    assert_eq!(helpers::ids(&hits), vec![discount.id]);
}
