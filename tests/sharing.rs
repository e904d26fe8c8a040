mod common;

use blomplib::api::SharePermission;
use blomplib::BlompError;

use common::{open, FakeRemote};

#[tokio::test]
async fn test_share_fetches_info_once() {
    let remote = FakeRemote::new().with_file("docs/plan.pdf", b"plan").shared();
    let mut drive = open(&remote).await;
    let root = drive.root();
    let docs = drive.folder_by_name(root, "docs").await.unwrap().unwrap();
    let plan = drive.file_by_name(docs, "plan.pdf").unwrap().unwrap();

    let emails = vec!["alice@example.com".to_string(), "bob@example.org".to_string()];
    let link = drive.share(plan, &emails, true).await.unwrap();
    assert_eq!(link, "https://sharedby.blomp.com/slug1");

    let again = drive.share(plan, &[], false).await.unwrap();
    assert_eq!(again, link);
    assert_eq!(remote.calls("fetch_share_link"), 1);

    let invites = remote.invites();
    assert_eq!(invites.len(), 2);
    assert_eq!(invites[0].emails, emails);
    assert_eq!(invites[0].link, link);
    assert_eq!(invites[0].permission, SharePermission::Anyone);
    assert!(invites[1].emails.is_empty());
    assert_eq!(invites[1].permission, SharePermission::Invited);

    let descriptor = drive.file(plan).unwrap().share_descriptor().unwrap().clone();
    assert_eq!(descriptor.id, 1);
    assert!(!descriptor.enabled);
    assert_eq!(descriptor.link, link);
}

#[tokio::test]
async fn test_share_rejects_malformed_emails() {
    let remote = FakeRemote::new().with_file("plan.pdf", b"plan").shared();
    let mut drive = open(&remote).await;
    let plan = drive.file_by_name(drive.root(), "plan.pdf").unwrap().unwrap();

    for bad in ["", "no-at-sign", "a b@example.com", "x'@example.com", "a,b@example.com"] {
        let err = drive.share(plan, &[bad.to_string()], true).await.unwrap_err();
        assert!(matches!(err, BlompError::Validation(_)), "{:?}", bad);
    }
    assert_eq!(remote.calls("fetch_share_link"), 0);
    assert_eq!(remote.calls("send_share_invite"), 0);
}

#[tokio::test]
async fn test_rename_invalidates_share_info() {
    let remote = FakeRemote::new().with_file("plan.pdf", b"plan").shared();
    let mut drive = open(&remote).await;
    let plan = drive.file_by_name(drive.root(), "plan.pdf").unwrap().unwrap();

    let first = drive.share(plan, &[], true).await.unwrap();
    assert!(drive.rename_file(plan, "final.pdf").await.unwrap());
    assert!(drive.file(plan).unwrap().share_descriptor().is_none());

    let second = drive.share(plan, &[], true).await.unwrap();
    assert_eq!(remote.calls("fetch_share_link"), 2);
    assert_ne!(first, second);
}

#[tokio::test]
async fn test_enable_and_disable_sharing() {
    let remote = FakeRemote::new().with_file("plan.pdf", b"plan").shared();
    let mut drive = open(&remote).await;
    let plan = drive.file_by_name(drive.root(), "plan.pdf").unwrap().unwrap();

    let err = drive.disable_sharing(plan).await.unwrap_err();
    assert!(matches!(err, BlompError::InvalidState(_)));

    assert!(drive.enable_sharing(plan).await.unwrap());
    assert!(drive.file(plan).unwrap().share_descriptor().unwrap().enabled);
    assert_eq!(remote.share_status("plan.pdf"), Some(1));

    let err = drive.enable_sharing(plan).await.unwrap_err();
    assert!(matches!(err, BlompError::InvalidState(_)));
    assert_eq!(remote.calls("set_share_status"), 1);

    assert!(drive.disable_sharing(plan).await.unwrap());
    assert!(!drive.file(plan).unwrap().share_descriptor().unwrap().enabled);
    assert_eq!(remote.share_status("plan.pdf"), Some(0));
    assert_eq!(remote.calls("fetch_share_link"), 1);
}

#[tokio::test]
async fn test_refused_switch_keeps_local_flag() {
    let remote = FakeRemote::new().with_file("plan.pdf", b"plan").shared();
    remote.fail_share_switch();
    let mut drive = open(&remote).await;
    let plan = drive.file_by_name(drive.root(), "plan.pdf").unwrap().unwrap();

    assert!(!drive.enable_sharing(plan).await.unwrap());
    assert!(!drive.file(plan).unwrap().share_descriptor().unwrap().enabled);
}
