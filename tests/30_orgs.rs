mod common;

use anyhow::Result;

use orgboard_api::database::models::Org;
use orgboard_api::database::{FetchParams, RepositoryError};
use orgboard_api::repositories::{OrgFetchParams, OrgRepository, PgOrgRepository};
use orgboard_api::services::requests::{InviteUsersReq, UpdateOrgReq};

fn org(name: &str, code: &str) -> Org {
    Org {
        name: name.to_string(),
        code: code.to_string(),
        description: "first description".to_string(),
        domain: "acme.test".to_string(),
        ..Org::default()
    }
}

#[tokio::test]
async fn duplicate_code_is_reported_as_duplicated() -> Result<()> {
    let Some(t) = common::TestDb::connect().await? else { return Ok(()) };
    let repo = PgOrgRepository::new(&t.db);

    let first = repo.create(org("First", "shared-code")).await?;
    assert!(first.id > 0);

    let second = repo.create(org("Second", "shared-code")).await;
    assert!(matches!(second, Err(RepositoryError::Duplicated)), "got {:?}", second);

    t.cleanup().await
}

#[tokio::test]
async fn update_changes_only_named_fields() -> Result<()> {
    let Some(t) = common::TestDb::connect().await? else { return Ok(()) };
    let repo = PgOrgRepository::new(&t.db);

    let stored = repo.create(org("Before", "code-d")).await?;
    let stored = repo.get_by_id(stored.id).await?;

    let mut payload = stored.clone();
    payload.name = "After".to_string();
    payload.description = "changed description".to_string();
    let affected = repo.update(&payload, &["name"]).await?;
    assert_eq!(affected, 1);

    let reloaded = repo.get_by_id(stored.id).await?;
    assert_eq!(reloaded.name, "After");
    assert_eq!(reloaded.description, "first description");
    assert_eq!(reloaded.code, stored.code);
    assert_eq!(reloaded.created_at, stored.created_at);
    assert!(reloaded.updated_at > stored.updated_at);

    t.cleanup().await
}

#[tokio::test]
async fn update_validates_before_touching_the_store() -> Result<()> {
    let Some(t) = common::TestDb::connect().await? else { return Ok(()) };
    let repo = PgOrgRepository::new(&t.db);

    let missing_id = org("NoId", "code-x");
    assert!(matches!(repo.update(&missing_id, &["name"]).await, Err(RepositoryError::Validation(_))));

    let stored = repo.create(org("Immutable", "code-y")).await?;
    let mut renamed = stored.clone();
    renamed.code = "rewritten".to_string();
    assert!(matches!(repo.update(&renamed, &["code"]).await, Err(RepositoryError::Validation(_))));
    assert_eq!(repo.get_by_id(stored.id).await?.code, "code-y");

    // A vanished row is not an error from update itself.
    let ghost = Org { id: stored.id + 1000, ..stored.clone() };
    assert_eq!(repo.update(&ghost, &["name"]).await?, 0);

    t.cleanup().await
}

#[tokio::test]
async fn fetch_filters_by_ids() -> Result<()> {
    let Some(t) = common::TestDb::connect().await? else { return Ok(()) };
    let repo = PgOrgRepository::new(&t.db);

    let a = repo.create(org("A", "code-a")).await?;
    let _b = repo.create(org("B", "code-b")).await?;
    let c = repo.create(org("C", "code-c")).await?;

    let params = OrgFetchParams { ids: vec![a.id, c.id], ..Default::default() };
    let (rows, total) = repo.fetch(&params).await?;
    assert_eq!(total, 2);
    let mut names: Vec<_> = rows.into_iter().map(|o| o.name).collect();
    names.sort();
    assert_eq!(names, vec!["A", "C"]);

    let params = OrgFetchParams { page: FetchParams::new(1, 1), ids: vec![] };
    let (rows, total) = repo.fetch(&params).await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(total, 3);

    t.cleanup().await
}

#[tokio::test]
async fn service_update_and_delete_require_an_existing_org() -> Result<()> {
    let Some(t) = common::TestDb::connect().await? else { return Ok(()) };
    let orgs = t.services().orgs;

    let missing = orgs
        .update(UpdateOrgReq { org_id: 4242, name: "Ghost".into(), ..Default::default() })
        .await;
    assert!(matches!(missing, Err(RepositoryError::NotFound)));
    assert!(matches!(orgs.delete(4242).await, Err(RepositoryError::NotFound)));

    let repo = PgOrgRepository::new(&t.db);
    let stored = repo.create(org("Keep", "code-k")).await?;
    orgs.update(UpdateOrgReq {
        org_id: stored.id,
        name: "Kept".into(),
        description: "new".into(),
        domain: "kept.test".into(),
        logo: "logo.png".into(),
    })
    .await?;
    let reloaded = orgs.get(stored.id).await?;
    assert_eq!((reloaded.name.as_str(), reloaded.logo.as_str()), ("Kept", "logo.png"));

    orgs.delete(stored.id).await?;
    assert!(matches!(orgs.get(stored.id).await, Err(RepositoryError::NotFound)));

    t.cleanup().await
}

#[tokio::test]
async fn invite_requires_an_existing_org() -> Result<()> {
    let Some(t) = common::TestDb::connect().await? else { return Ok(()) };
    let orgs = t.services().orgs;
    let req = InviteUsersReq { emails: vec!["guest@example.com".into(), "friend@example.com".into()] };

    assert!(matches!(orgs.invite(999, &req).await, Err(RepositoryError::NotFound)));

    let stored = PgOrgRepository::new(&t.db).create(org("Host", "code-inv")).await?;
    orgs.invite(stored.id, &req).await?;

    let empty = InviteUsersReq::default();
    assert!(matches!(orgs.invite(stored.id, &empty).await, Err(RepositoryError::Validation(_))));

    t.cleanup().await
}
