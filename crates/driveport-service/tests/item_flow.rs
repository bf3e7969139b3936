//! End-to-end item flows over the in-memory stores and Drive fake.

mod common;

use bytes::Bytes;
use driveport_auth::store::LedgerStore;
use driveport_core::traits::drive::{FOLDER_MIME_TYPE, PermissionRole};
use driveport_entity::account::AccountRole;
use driveport_service::item::service::{ListItemsRequest, ShareRequest};

use common::{account, ctx, test_env};

#[tokio::test]
async fn test_client_upload_autoshares_direct_manager_as_writer() {
    let env = test_env();
    let manager = account(AccountRole::Manager, "m@x.com", None);
    let client = account(AccountRole::Client, "c@x.com", Some(manager.id));
    env.directory.insert(manager.clone()).await;
    env.directory.insert(client.clone()).await;

    let created = env
        .service
        .upload(
            &ctx(&client),
            "notes.txt",
            "text/plain",
            None,
            Bytes::from_static(b"hello"),
        )
        .await
        .unwrap();

    // Ledger records the uploader.
    let record = env.ledger.get(&created.item.id).await.unwrap().unwrap();
    assert_eq!(record.uploader_account_id, Some(client.id));
    assert!(record.is_auto_shared());

    // Exactly one grant: the direct manager, escalated to writer.
    let permissions = env.drive.permissions_of(&created.item.id).await;
    assert_eq!(permissions.len(), 1);
    assert_eq!(permissions[0].email.as_deref(), Some("m@x.com"));
    assert_eq!(permissions[0].role, PermissionRole::Writer);

    // The manager can access the client's upload.
    env.service
        .get(&ctx(&manager), &created.item.id)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_manager_folder_creation_grants_writer_to_recipients() {
    let env = test_env();
    let admin = account(AccountRole::Admin, "a@x.com", None);
    let manager = account(AccountRole::Manager, "m@x.com", Some(admin.id));
    let client = account(AccountRole::Client, "c@x.com", Some(manager.id));
    for acct in [&admin, &manager, &client] {
        env.directory.insert(acct.clone()).await;
    }

    let created = env
        .service
        .create_folder(&ctx(&manager), "Reports", None)
        .await
        .unwrap();

    let permissions = env.drive.permissions_of(&created.item.id).await;
    let mut granted: Vec<(Option<&str>, PermissionRole)> = permissions
        .iter()
        .map(|p| (p.email.as_deref(), p.role))
        .collect();
    granted.sort_by(|a, b| a.0.cmp(&b.0));

    assert_eq!(
        granted,
        vec![
            (Some("a@x.com"), PermissionRole::Writer),
            (Some("c@x.com"), PermissionRole::Writer),
        ]
    );
}

#[tokio::test]
async fn test_manager_file_upload_grants_reader() {
    let env = test_env();
    let admin = account(AccountRole::Admin, "a@x.com", None);
    let manager = account(AccountRole::Manager, "m@x.com", Some(admin.id));
    env.directory.insert(admin.clone()).await;
    env.directory.insert(manager.clone()).await;

    let created = env
        .service
        .upload(
            &ctx(&manager),
            "summary.pdf",
            "application/pdf",
            None,
            Bytes::from_static(b"pdf"),
        )
        .await
        .unwrap();

    let permissions = env.drive.permissions_of(&created.item.id).await;
    assert_eq!(permissions.len(), 1);
    assert_eq!(permissions[0].role, PermissionRole::Reader);
}

#[tokio::test]
async fn test_failed_grant_does_not_fail_upload() {
    let env = test_env();
    let manager = account(AccountRole::Manager, "m@x.com", None);
    let client = account(AccountRole::Client, "c@x.com", Some(manager.id));
    env.directory.insert(manager.clone()).await;
    env.directory.insert(client.clone()).await;
    env.drive.fail_grants_to("m@x.com").await;

    let created = env
        .service
        .upload(
            &ctx(&client),
            "notes.txt",
            "text/plain",
            None,
            Bytes::from_static(b"hello"),
        )
        .await
        .expect("upload must succeed even when a grant fails");

    let outcome = created.auto_share.expect("auto-share ran");
    assert!(outcome.granted.is_empty());
    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].email, "m@x.com");
}

#[tokio::test]
async fn test_explicit_share_grants_access_outside_hierarchy() {
    let env = test_env();
    let a = account(AccountRole::Client, "a@x.com", None);
    let b = account(AccountRole::Client, "b@x.com", None);
    env.directory.insert(a.clone()).await;
    env.directory.insert(b.clone()).await;

    let created = env
        .service
        .upload(
            &ctx(&a),
            "doc.txt",
            "text/plain",
            None,
            Bytes::from_static(b"x"),
        )
        .await
        .unwrap();

    // B is unrelated and denied.
    let err = env
        .service
        .get(&ctx(&b), &created.item.id)
        .await
        .unwrap_err();
    assert!(err.is_forbidden());

    // A explicitly shares with B; access follows.
    env.service
        .share(
            &ctx(&a),
            &created.item.id,
            ShareRequest {
                account_id: Some(b.id),
                email: None,
                role: PermissionRole::Reader,
            },
        )
        .await
        .unwrap();

    env.service.get(&ctx(&b), &created.item.id).await.unwrap();
}

#[tokio::test]
async fn test_listing_filters_other_hierarchies() {
    let env = test_env();
    let m1 = account(AccountRole::Manager, "m1@x.com", None);
    let c1 = account(AccountRole::Client, "c1@x.com", Some(m1.id));
    let m2 = account(AccountRole::Manager, "m2@x.com", None);
    let c2 = account(AccountRole::Client, "c2@x.com", Some(m2.id));
    for acct in [&m1, &c1, &m2, &c2] {
        env.directory.insert(acct.clone()).await;
    }

    let mine = env
        .service
        .upload(&ctx(&c1), "mine.txt", "text/plain", None, Bytes::new())
        .await
        .unwrap();
    let theirs = env
        .service
        .upload(&ctx(&c2), "theirs.txt", "text/plain", None, Bytes::new())
        .await
        .unwrap();

    let page = env
        .service
        .list(&ctx(&m1), ListItemsRequest::default())
        .await
        .unwrap();

    let ids: Vec<&str> = page.items.iter().map(|i| i.item.id.as_str()).collect();
    assert!(ids.contains(&mine.item.id.as_str()));
    assert!(!ids.contains(&theirs.item.id.as_str()));
}

#[tokio::test]
async fn test_superadmin_lists_everything() {
    let env = test_env();
    let root = account(AccountRole::Superadmin, "root@x.com", None);
    let stranger = account(AccountRole::Client, "s@x.com", None);
    env.directory.insert(root.clone()).await;
    env.directory.insert(stranger.clone()).await;

    let created = env
        .service
        .upload(&ctx(&stranger), "s.txt", "text/plain", None, Bytes::new())
        .await
        .unwrap();

    let page = env
        .service
        .list(&ctx(&root), ListItemsRequest::default())
        .await
        .unwrap();
    assert!(page.items.iter().any(|i| i.item.id == created.item.id));
}

#[tokio::test]
async fn test_listing_backfills_unledgered_item_from_owner_email() {
    let env = test_env();
    let manager = account(AccountRole::Manager, "m@x.com", None);
    let client = account(AccountRole::Client, "c@x.com", Some(manager.id));
    env.directory.insert(manager.clone()).await;
    env.directory.insert(client.clone()).await;

    // Item created directly in Drive, owned by the client's address.
    let item_id = env
        .drive
        .seed_item("legacy.txt", "text/plain", common::ROOT, "c@x.com")
        .await;
    assert!(env.ledger.get(&item_id).await.unwrap().is_none());

    let page = env
        .service
        .list(&ctx(&manager), ListItemsRequest::default())
        .await
        .unwrap();

    let listed = page
        .items
        .iter()
        .find(|i| i.item.id == item_id)
        .expect("inferred item is visible");
    assert_eq!(listed.uploader_account_id, Some(client.id));

    // Self-healing: the ledger now knows the uploader.
    let record = env.ledger.get(&item_id).await.unwrap().unwrap();
    assert_eq!(record.uploader_account_id, Some(client.id));
}

#[tokio::test]
async fn test_listing_auto_shares_legacy_items_once() {
    let env = test_env();
    let manager = account(AccountRole::Manager, "m@x.com", None);
    let client = account(AccountRole::Client, "c@x.com", Some(manager.id));
    env.directory.insert(manager.clone()).await;
    env.directory.insert(client.clone()).await;

    let item_id = env
        .drive
        .seed_item("old.txt", "text/plain", common::ROOT, "c@x.com")
        .await;

    env.service
        .list(&ctx(&client), ListItemsRequest::default())
        .await
        .unwrap();

    let record = env.ledger.get(&item_id).await.unwrap().unwrap();
    assert!(record.is_auto_shared());

    let permissions = env.drive.permissions_of(&item_id).await;
    assert_eq!(permissions.len(), 1);
    assert_eq!(permissions[0].email.as_deref(), Some("m@x.com"));
}

#[tokio::test]
async fn test_create_folder_conflict_reports_existing() {
    let env = test_env();
    let manager = account(AccountRole::Manager, "m@x.com", None);
    env.directory.insert(manager.clone()).await;

    let first = env
        .service
        .create_folder(&ctx(&manager), "Reports", None)
        .await
        .unwrap();

    let err = env
        .service
        .create_folder(&ctx(&manager), "Reports", None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, driveport_core::error::ErrorKind::Conflict);
    assert!(err.message.contains(&first.item.id));
}

#[tokio::test]
async fn test_delete_removes_ledger_record() {
    let env = test_env();
    let client = account(AccountRole::Client, "c@x.com", None);
    env.directory.insert(client.clone()).await;

    let created = env
        .service
        .upload(&ctx(&client), "gone.txt", "text/plain", None, Bytes::new())
        .await
        .unwrap();

    env.service
        .delete(&ctx(&client), &created.item.id)
        .await
        .unwrap();
    assert!(env.ledger.get(&created.item.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_rename_requires_access() {
    let env = test_env();
    let uploader = account(AccountRole::Client, "a@x.com", None);
    let outsider = account(AccountRole::Client, "b@x.com", None);
    env.directory.insert(uploader.clone()).await;
    env.directory.insert(outsider.clone()).await;

    let created = env
        .service
        .upload(&ctx(&uploader), "f.txt", "text/plain", None, Bytes::new())
        .await
        .unwrap();

    let err = env
        .service
        .rename(&ctx(&outsider), &created.item.id, "renamed.txt")
        .await
        .unwrap_err();
    assert!(err.is_forbidden());

    let renamed = env
        .service
        .rename(&ctx(&uploader), &created.item.id, "renamed.txt")
        .await
        .unwrap();
    assert_eq!(renamed.name, "renamed.txt");
}

#[tokio::test]
async fn test_folder_conflict_ignores_same_name_files() {
    let env = test_env();
    let manager = account(AccountRole::Manager, "m@x.com", None);
    env.directory.insert(manager.clone()).await;

    env.service
        .upload(
            &ctx(&manager),
            "Reports",
            "text/plain",
            None,
            Bytes::new(),
        )
        .await
        .unwrap();

    // A file named like the folder must not trigger the conflict.
    let folder = env
        .service
        .create_folder(&ctx(&manager), "Reports", None)
        .await
        .unwrap();
    assert_eq!(folder.item.mime_type, FOLDER_MIME_TYPE);
}
