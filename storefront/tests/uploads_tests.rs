// storefront/tests/uploads_tests.rs

use serial_test::serial;
use std::path::PathBuf;
use storefront::uploads::{self, PendingUpload, UploadKind};

fn shared_dir() -> PathBuf {
  std::env::temp_dir().join("storefront-uploads-it")
}

#[actix_web::test]
#[serial]
async fn stored_image_is_reachable_through_its_public_path_and_removable() {
  let dir = shared_dir();
  let public = uploads::store(
    &dir,
    UploadKind::Brands,
    PendingUpload {
      original_name: "ACME logo (final).html".to_string(),
      extension: "png",
      bytes: vec![0x89, b'P', b'N', b'G'],
    },
  )
  .await
  .unwrap();

  assert!(public.starts_with("/uploads/brands/"));
  assert!(public.ends_with("-ACME-logo-final.png"));

  let on_disk = uploads::disk_path(&dir, &public).unwrap();
  assert_eq!(tokio::fs::read(&on_disk).await.unwrap(), vec![0x89, b'P', b'N', b'G']);

  uploads::remove(&dir, &public).await;
  assert!(!on_disk.exists());
}

#[actix_web::test]
#[serial]
async fn removal_outside_the_uploads_tree_is_refused() {
  let dir = shared_dir();
  tokio::fs::create_dir_all(&dir).await.unwrap();
  let outside = dir.parent().unwrap().join("storefront-keep-me.txt");
  tokio::fs::write(&outside, b"keep").await.unwrap();

  uploads::remove(&dir, "/uploads/../storefront-keep-me.txt").await;
  uploads::remove(&dir, "/etc/passwd").await;
  assert!(outside.exists());

  tokio::fs::remove_file(&outside).await.unwrap();
}
