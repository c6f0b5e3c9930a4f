use std::io::Cursor;
use std::path::Path;

use axum_test::TestServer;
use axum_test::multipart::{MultipartForm, Part};
use batch_core::{PipelineConfig, SizeLimits};
use batch_processor::{AppConfig, app};
use image::{DynamicImage, ImageFormat};
use tempfile::TempDir;

fn test_server(root: &Path, limits: SizeLimits) -> TestServer {
    let config = AppConfig {
        pipeline: PipelineConfig {
            upload_root: root.join("uploads"),
            processed_dir: root.join("processed"),
            download_dir: root.join("downloads"),
            limits,
        },
        bind_addr: "127.0.0.1:0".to_string(),
    };
    TestServer::new(app(config)).unwrap()
}

fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = DynamicImage::new_rgb8(w, h);
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

fn png_part(name: &str, w: u32, h: u32) -> Part {
    Part::bytes(png_bytes(w, h))
        .file_name(name)
        .mime_type("image/png")
}

fn dir_is_empty_or_missing(path: &Path) -> bool {
    match std::fs::read_dir(path) {
        Ok(mut entries) => entries.next().is_none(),
        Err(_) => true,
    }
}

#[tokio::test]
async fn test_health() {
    let root = TempDir::new().unwrap();
    let server = test_server(root.path(), SizeLimits::default());

    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_text("ok");
}

#[tokio::test]
async fn test_resize_batch_end_to_end() {
    let root = TempDir::new().unwrap();
    let server = test_server(root.path(), SizeLimits::default());

    let form = MultipartForm::new()
        .add_part("files[]", png_part("a.png", 1600, 1200))
        .add_part("files[]", png_part("b.png", 1600, 1200))
        .add_part("files[]", png_part("c.png", 1600, 1200))
        .add_text("process_type", "resize")
        .add_text("max_size", "800");

    let response = server.post("/process").multipart(form).await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], serde_json::json!(true));
    assert_eq!(
        body["uploaded_filenames"],
        serde_json::json!(["a.png", "b.png", "c.png"])
    );

    let download_url = body["download_url"].as_str().unwrap();
    assert!(download_url.starts_with("/download/processed_"));

    let download = server.get(download_url).await;
    download.assert_status_ok();
    assert_eq!(download.header("content-type"), "application/zip");

    let mut archive = zip::ZipArchive::new(Cursor::new(download.as_bytes().to_vec())).unwrap();
    assert_eq!(archive.len(), 3);
    for (i, expected) in ["a.png", "b.png", "c.png"].iter().enumerate() {
        let mut entry = archive.by_index(i).unwrap();
        assert_eq!(entry.name(), *expected);
        let mut bytes = Vec::new();
        std::io::Read::read_to_end(&mut entry, &mut bytes).unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (800, 600));
    }

    // ステージング領域はアーカイブ後に空へ戻る
    assert!(dir_is_empty_or_missing(&root.path().join("processed")));
}

#[tokio::test]
async fn test_convert_defaults_to_jpeg() {
    let root = TempDir::new().unwrap();
    let server = test_server(root.path(), SizeLimits::default());

    let form = MultipartForm::new()
        .add_part("files[]", png_part("photo.png", 64, 48))
        .add_text("process_type", "convert");

    let response = server.post("/process").multipart(form).await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["uploaded_filenames"], serde_json::json!(["photo.png"]));

    let download = server.get(body["download_url"].as_str().unwrap()).await;
    download.assert_status_ok();

    let mut archive = zip::ZipArchive::new(Cursor::new(download.as_bytes().to_vec())).unwrap();
    let mut entry = archive.by_index(0).unwrap();
    assert_eq!(entry.name(), "photo.jpg");
    let mut bytes = Vec::new();
    std::io::Read::read_to_end(&mut entry, &mut bytes).unwrap();
    assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
}

#[tokio::test]
async fn test_empty_batch_is_rejected_without_side_effects() {
    let root = TempDir::new().unwrap();
    let server = test_server(root.path(), SizeLimits::default());

    let form = MultipartForm::new().add_text("process_type", "resize");

    let response = server.post("/process").multipart(form).await;
    response.assert_status_bad_request();

    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));

    // アップロードディレクトリは一切作られない
    assert!(!root.path().join("uploads").exists());
}

#[tokio::test]
async fn test_missing_process_type_is_rejected() {
    let root = TempDir::new().unwrap();
    let server = test_server(root.path(), SizeLimits::default());

    let form = MultipartForm::new().add_part("files[]", png_part("a.png", 16, 16));

    let response = server.post("/process").multipart(form).await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_disallowed_extension_rejects_whole_batch() {
    let root = TempDir::new().unwrap();
    let server = test_server(root.path(), SizeLimits::default());

    let form = MultipartForm::new()
        .add_part("files[]", png_part("good.png", 32, 32))
        .add_part("files[]", png_part("evil.exe", 32, 32))
        .add_text("process_type", "resize");

    let response = server.post("/process").multipart(form).await;
    response.assert_status_bad_request();

    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("evil.exe"));

    // 1ファイルも保存・変換されない
    assert!(!root.path().join("uploads").exists());
    assert!(dir_is_empty_or_missing(&root.path().join("processed")));
    assert!(dir_is_empty_or_missing(&root.path().join("downloads")));
}

#[tokio::test]
async fn test_oversized_file_is_rejected() {
    let root = TempDir::new().unwrap();
    let server = test_server(root.path(), SizeLimits::from_mib(1, 500));

    let form = MultipartForm::new()
        .add_part(
            "files[]",
            Part::bytes(vec![0u8; 2 * 1024 * 1024])
                .file_name("big.png")
                .mime_type("image/png"),
        )
        .add_text("process_type", "resize");

    let response = server.post("/process").multipart(form).await;
    response.assert_status_bad_request();

    // アーカイブもステージング成果物も残らない
    assert!(dir_is_empty_or_missing(&root.path().join("downloads")));
    assert!(dir_is_empty_or_missing(&root.path().join("processed")));
}

#[tokio::test]
async fn test_corrupt_image_is_a_server_error() {
    let root = TempDir::new().unwrap();
    let server = test_server(root.path(), SizeLimits::default());

    let form = MultipartForm::new()
        .add_part(
            "files[]",
            Part::bytes(b"not an image at all".to_vec())
                .file_name("broken.png")
                .mime_type("image/png"),
        )
        .add_text("process_type", "resize");

    let response = server.post("/process").multipart(form).await;
    response.assert_status_internal_server_error();

    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("image processing failed"));
}

#[tokio::test]
async fn test_download_missing_archive_is_not_found() {
    let root = TempDir::new().unwrap();
    let server = test_server(root.path(), SizeLimits::default());

    let response = server.get("/download/missing.zip").await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn test_download_rejects_path_traversal() {
    let root = TempDir::new().unwrap();
    let server = test_server(root.path(), SizeLimits::default());

    // エンコードされた区切り文字はデコード後に単一要素検査で弾く
    let response = server.get("/download/..%2Fsecret.zip").await;
    assert!(response.status_code().is_client_error());
}
