mod common;

use anyhow::Result;

use orgboard_api::database::models::{Org, UserOrg, UserOrgRole, UserStatus};
use orgboard_api::database::{FetchParams, RepositoryError};
use orgboard_api::repositories::{
    OrgRepository, PgOrgRepository, PgUserOrgRepository, UserOrgFetchParams, UserOrgRepository, UserRepository,
};

async fn seed_org(t: &common::TestDb, code: &str) -> Result<Org> {
    let org = Org { name: format!("Org {}", code), code: code.to_string(), ..Org::default() };
    Ok(PgOrgRepository::new(&t.db).create(org).await?)
}

fn member(user_id: i64, org_id: i64, role: UserOrgRole) -> UserOrg {
    UserOrg { user_id, org_id, role, status: UserStatus::Active, ..UserOrg::default() }
}

#[tokio::test]
async fn fetch_filters_by_member_email() -> Result<()> {
    let Some(t) = common::TestDb::connect().await? else { return Ok(()) };
    let org = seed_org(&t, "org-m1").await?;
    let alice = t.seed_user("alice").await?;
    let bob = t.seed_user("bob").await?;
    let repo = PgUserOrgRepository::new(&t.db);

    repo.create(member(alice.id, org.id, UserOrgRole::Editor)).await?;
    repo.create(member(bob.id, org.id, UserOrgRole::Viewer)).await?;

    let params = UserOrgFetchParams { emails: vec![alice.email.clone()], ..Default::default() };
    let (rows, total) = repo.fetch(&params).await?;
    assert_eq!(total, 1);
    assert_eq!(rows[0].user_id, alice.id);
    assert_eq!(rows[0].role, UserOrgRole::Editor);

    let params = UserOrgFetchParams { user_ids: vec![alice.id, bob.id], org_id: org.id, ..Default::default() };
    let (_, total) = repo.fetch(&params).await?;
    assert_eq!(total, 2);

    let params = UserOrgFetchParams { emails: vec!["nobody@example.com".into()], ..Default::default() };
    let (rows, total) = repo.fetch(&params).await?;
    assert!(rows.is_empty());
    assert_eq!(total, 0);

    t.cleanup().await
}

#[tokio::test]
async fn duplicate_membership_is_rejected() -> Result<()> {
    let Some(t) = common::TestDb::connect().await? else { return Ok(()) };
    let org = seed_org(&t, "org-m2").await?;
    let user = t.seed_user("dup").await?;
    let repo = PgUserOrgRepository::new(&t.db);

    repo.create(member(user.id, org.id, UserOrgRole::Guest)).await?;
    let again = repo.create(member(user.id, org.id, UserOrgRole::Manager)).await;
    assert!(matches!(again, Err(RepositoryError::Duplicated)), "got {:?}", again);

    t.cleanup().await
}

#[tokio::test]
async fn update_and_delete_by_user_and_org() -> Result<()> {
    let Some(t) = common::TestDb::connect().await? else { return Ok(()) };
    let org = seed_org(&t, "org-m3").await?;
    let user = t.seed_user("promoted").await?;
    let repo = PgUserOrgRepository::new(&t.db);

    let created = repo.create(member(user.id, org.id, UserOrgRole::Viewer)).await?;

    let promoted = member(user.id, org.id, UserOrgRole::Manager);
    assert_eq!(repo.update_by_user_and_org(&promoted, &["role"]).await?, 1);
    assert_eq!(repo.get_by_id(created.id).await?.role, UserOrgRole::Manager);

    // The key columns themselves cannot be rewritten.
    assert!(matches!(
        repo.update_by_user_and_org(&promoted, &["org_id"]).await,
        Err(RepositoryError::Validation(_))
    ));
    assert!(matches!(
        repo.update_by_user_and_org(&member(0, org.id, UserOrgRole::Owner), &["role"]).await,
        Err(RepositoryError::Validation(_))
    ));

    repo.delete_by_user_and_org(user.id, org.id).await?;
    assert!(matches!(repo.get_by_id(created.id).await, Err(RepositoryError::NotFound)));

    t.cleanup().await
}

#[tokio::test]
async fn deleting_the_org_cascades_to_memberships() -> Result<()> {
    let Some(t) = common::TestDb::connect().await? else { return Ok(()) };
    let org = seed_org(&t, "org-m4").await?;
    let user = t.seed_user("member").await?;
    let repo = PgUserOrgRepository::new(&t.db);

    let membership = repo.create(member(user.id, org.id, UserOrgRole::Owner)).await?;
    PgOrgRepository::new(&t.db).delete_by_id(org.id).await?;

    assert!(matches!(repo.get_by_id(membership.id).await, Err(RepositoryError::NotFound)));
    // The user outlives the org.
    assert_eq!(t.users().get_by_id(user.id).await?.id, user.id);

    t.cleanup().await
}

#[tokio::test]
async fn unbounded_fetch_returns_every_membership() -> Result<()> {
    let Some(t) = common::TestDb::connect().await? else { return Ok(()) };
    let user = t.seed_user("busy").await?;
    let repo = PgUserOrgRepository::new(&t.db);

    for i in 0..3 {
        let org = seed_org(&t, &format!("org-u{}", i)).await?;
        repo.create(member(user.id, org.id, UserOrgRole::Editor)).await?;
    }

    let params = UserOrgFetchParams { page: FetchParams::unbounded(), user_ids: vec![user.id], ..Default::default() };
    let (rows, total) = repo.fetch(&params).await?;
    assert_eq!(rows.len(), 3);
    assert_eq!(total, 3);

    // A tiny page still reports the full total.
    let params = UserOrgFetchParams { page: FetchParams::new(1, 1), user_ids: vec![user.id], ..Default::default() };
    let (rows, total) = repo.fetch(&params).await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(total, 3);

    t.cleanup().await
}
