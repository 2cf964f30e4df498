//! Tenancy guard, role gate, switch, and membership properties, end to end
//! against an in-memory database.

use std::time::Duration;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

use tenet_auth::membership::{add_member, remove_member, update_member_role};
use tenet_auth::{AuthError, require_auth, require_role, switch_organization};
use tenet_core::entities::{Organization, User};
use tenet_core::enums::Role;
use tenet_core::errors::{AccessError, ErrorCode};
use tenet_core::identity::RequestContext;
use tenet_db::service::TenetService;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

async fn service() -> TenetService {
    TenetService::new_local(":memory:").await.unwrap()
}

async fn user(svc: &TenetService, name: &str) -> User {
    svc.create_user(&format!("{name}@example.com"), Some(name), None)
        .await
        .unwrap()
}

/// An organization whose owner membership is already seeded.
async fn org_owned_by(svc: &TenetService, slug: &str, owner: &User) -> Organization {
    let org = svc.create_organization(slug, slug, None, None).await.unwrap();
    svc.create_membership(&owner.id, &org.id, Role::Owner)
        .await
        .unwrap();
    org
}

/// Sign the user in and point the new session at `org_id`.
async fn active_in(svc: &TenetService, user: &User, org_id: Option<&str>) {
    let session = svc.create_session(&user.id).await.unwrap();
    svc.set_active_organization(&session.id, org_id)
        .await
        .unwrap();
}

/// The caller's active organization, resolved inside a read transaction the
/// way read operations do.
async fn active_org_id(svc: &TenetService, request: &RequestContext) -> Result<String, AuthError> {
    let txn = svc.db().begin_read().await?;
    let result = require_auth(svc, request)
        .await
        .map(|ctx| ctx.organization_id().to_string());
    txn.finish(result).await
}

fn req(user: &User) -> RequestContext {
    RequestContext::for_user(&user.id)
}

fn code<T: std::fmt::Debug>(result: Result<T, AuthError>) -> Option<ErrorCode> {
    result.unwrap_err().code()
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

fn role_strategy() -> impl Strategy<Value = Role> {
    prop::sample::select(Role::ALL.to_vec())
}

fn non_owner_role() -> impl Strategy<Value = Role> {
    prop::sample::select(vec![Role::Admin, Role::Member])
}

// ---------------------------------------------------------------------------
// Guard
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// A session pointing at an organization the user has no membership in
    /// resolves to NOT_MEMBER; memberships elsewhere do not help.
    #[test]
    fn active_org_without_membership_is_not_member(
        memberships in prop::collection::vec(prop::option::of(non_owner_role()), 1..5),
        active in any::<prop::sample::Index>(),
    ) {
        let active = active.index(memberships.len());
        let outcome = block_on(async {
            let svc = service().await;
            let founder = user(&svc, "founder").await;
            let subject = user(&svc, "subject").await;
            let mut orgs = Vec::new();
            for (i, role) in memberships.iter().enumerate() {
                let org = org_owned_by(&svc, &format!("org{i}"), &founder).await;
                if let Some(role) = role {
                    svc.create_membership(&subject.id, &org.id, *role).await.unwrap();
                }
                orgs.push(org);
            }
            active_in(&svc, &subject, Some(&orgs[active].id)).await;
            require_auth(&svc, &req(&subject)).await
        });

        match memberships[active] {
            None => {
                prop_assert_eq!(code(outcome), Some(ErrorCode::NotMember));
            }
            Some(role) => {
                prop_assert_eq!(outcome.unwrap().role(), role);
            }
        }
    }

    /// A null active organization is NO_ORGANIZATION whatever memberships exist.
    #[test]
    fn null_active_org_is_no_organization(
        memberships in prop::collection::vec(prop::option::of(role_strategy()), 0..4),
    ) {
        let outcome = block_on(async {
            let svc = service().await;
            let founder = user(&svc, "founder").await;
            let subject = user(&svc, "subject").await;
            for (i, role) in memberships.iter().enumerate() {
                let org = svc
                    .create_organization("o", &format!("org{i}"), None, None)
                    .await
                    .unwrap();
                match role {
                    Some(Role::Owner) => {
                        svc.create_membership(&subject.id, &org.id, Role::Owner).await.unwrap();
                    }
                    Some(role) => {
                        svc.create_membership(&founder.id, &org.id, Role::Owner).await.unwrap();
                        svc.create_membership(&subject.id, &org.id, *role).await.unwrap();
                    }
                    None => {}
                }
            }
            active_in(&svc, &subject, None).await;
            require_auth(&svc, &req(&subject)).await
        });
        prop_assert_eq!(code(outcome), Some(ErrorCode::NoOrganization));
    }

    /// The gate admits exactly the roles in its allow-list.
    #[test]
    fn role_gate_is_membership_in_allow_list(
        role in role_strategy(),
        allowed in prop::sample::subsequence(Role::ALL.to_vec(), 0..=3),
    ) {
        let ctx = block_on(async {
            let svc = service().await;
            let founder = user(&svc, "founder").await;
            let subject = user(&svc, "subject").await;
            let org = if role.is_owner() {
                org_owned_by(&svc, "acme", &subject).await
            } else {
                let org = org_owned_by(&svc, "acme", &founder).await;
                svc.create_membership(&subject.id, &org.id, role).await.unwrap();
                org
            };
            active_in(&svc, &subject, Some(&org.id)).await;
            require_auth(&svc, &req(&subject)).await.unwrap()
        });

        let outcome = require_role(&ctx, &allowed);
        if allowed.contains(&role) {
            prop_assert!(outcome.is_ok());
        } else {
            let err = outcome.unwrap_err();
            prop_assert_eq!(err.code(), ErrorCode::Forbidden);
            let body = err.to_body();
            prop_assert_eq!(body.current_role, Some(role));
        }
    }
}

#[tokio::test]
async fn resolve_is_idempotent() {
    let svc = service().await;
    let ada = user(&svc, "ada").await;
    let org = org_owned_by(&svc, "acme", &ada).await;
    active_in(&svc, &ada, Some(&org.id)).await;

    let first = require_auth(&svc, &req(&ada)).await.unwrap();
    let second = require_auth(&svc, &req(&ada)).await.unwrap();
    assert_eq!(first, second);
}

// ---------------------------------------------------------------------------
// Switch
// ---------------------------------------------------------------------------

#[rstest]
#[case(Role::Admin)]
#[case(Role::Member)]
#[tokio::test]
async fn switch_requires_membership_not_role(#[case] role: Role) {
    let svc = service().await;
    let founder = user(&svc, "founder").await;
    let subject = user(&svc, "subject").await;
    let mine = org_owned_by(&svc, "mine", &founder).await;
    let theirs = org_owned_by(&svc, "theirs", &founder).await;
    svc.create_membership(&subject.id, &mine.id, role).await.unwrap();
    active_in(&svc, &subject, None).await;

    assert_eq!(
        code(switch_organization(&svc, &req(&subject), &theirs.id).await),
        Some(ErrorCode::NotMember)
    );

    let response = switch_organization(&svc, &req(&subject), &mine.id)
        .await
        .unwrap();
    assert_eq!(response.membership.role, role);
    let session = svc.find_latest_session(&subject.id).await.unwrap().unwrap();
    assert_eq!(
        session.active_organization_id.as_deref(),
        Some(mine.id.as_str())
    );
}

#[tokio::test]
async fn owner_can_switch_into_own_org() {
    let svc = service().await;
    let ada = user(&svc, "ada").await;
    let org = org_owned_by(&svc, "acme", &ada).await;
    active_in(&svc, &ada, None).await;

    let response = switch_organization(&svc, &req(&ada), &org.id).await.unwrap();
    assert_eq!(response.membership.role, Role::Owner);
}

// ---------------------------------------------------------------------------
// Membership mutations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn owner_membership_is_immutable_even_for_owner() {
    let svc = service().await;
    let ada = user(&svc, "ada").await;
    let bo = user(&svc, "bo").await;
    let org = org_owned_by(&svc, "acme", &ada).await;
    svc.create_membership(&bo.id, &org.id, Role::Admin).await.unwrap();
    active_in(&svc, &ada, Some(&org.id)).await;
    active_in(&svc, &bo, Some(&org.id)).await;
    let owner_membership = svc.find_membership(&ada.id, &org.id).await.unwrap().unwrap();

    for caller in [&ada, &bo] {
        let err = update_member_role(&svc, &req(caller), &owner_membership.id, Role::Admin)
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::Forbidden));
    }
    for caller in [&ada, &bo] {
        let err = remove_member(&svc, &req(caller), &ada.id).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::Forbidden));
    }

    let still = svc.find_membership(&ada.id, &org.id).await.unwrap().unwrap();
    assert_eq!(still.role, Role::Owner);
    assert_eq!(svc.count_audit(&org.id).await.unwrap(), 0);
}

#[rstest]
#[case(Role::Admin)]
#[case(Role::Member)]
#[tokio::test]
async fn self_removal_is_forbidden_for_any_role(#[case] role: Role) {
    let svc = service().await;
    let founder = user(&svc, "founder").await;
    let subject = user(&svc, "subject").await;
    let org = org_owned_by(&svc, "acme", &founder).await;
    svc.create_membership(&subject.id, &org.id, role).await.unwrap();
    active_in(&svc, &subject, Some(&org.id)).await;

    let err = remove_member(&svc, &req(&subject), &subject.id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::Forbidden));
    assert!(svc.find_membership(&subject.id, &org.id).await.unwrap().is_some());
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn scenario_owner_resolves_into_seeded_org() {
    let svc = service().await;
    let u1 = user(&svc, "u1").await;
    let o1 = org_owned_by(&svc, "o1", &u1).await;
    active_in(&svc, &u1, Some(&o1.id)).await;

    let ctx = require_auth(&svc, &req(&u1)).await.unwrap();
    assert_eq!(ctx.user_id(), u1.id);
    assert_eq!(ctx.organization_id(), o1.id);
    assert_eq!(ctx.role(), Role::Owner);
}

#[tokio::test]
async fn scenario_invited_member_must_switch_first() {
    let svc = service().await;
    let u1 = user(&svc, "u1").await;
    let u2 = user(&svc, "u2").await;
    let o1 = org_owned_by(&svc, "o1", &u1).await;
    active_in(&svc, &u1, Some(&o1.id)).await;
    active_in(&svc, &u2, None).await;

    add_member(&svc, &req(&u1), &u2.id, Role::Member).await.unwrap();
    assert_eq!(
        code(require_auth(&svc, &req(&u2)).await),
        Some(ErrorCode::NoOrganization)
    );

    switch_organization(&svc, &req(&u2), &o1.id).await.unwrap();
    let ctx = require_auth(&svc, &req(&u2)).await.unwrap();
    assert_eq!(ctx.role(), Role::Member);
}

#[tokio::test]
async fn scenario_member_hits_manager_gate() {
    let svc = service().await;
    let u1 = user(&svc, "u1").await;
    let u2 = user(&svc, "u2").await;
    let u3 = user(&svc, "u3").await;
    let o1 = org_owned_by(&svc, "o1", &u1).await;
    svc.create_membership(&u2.id, &o1.id, Role::Member).await.unwrap();
    active_in(&svc, &u2, Some(&o1.id)).await;

    let err = add_member(&svc, &req(&u2), &u3.id, Role::Member)
        .await
        .unwrap_err();
    let Some(access) = err.access() else {
        panic!("expected an access error, got {err:?}");
    };
    assert_eq!(
        access,
        &AccessError::Forbidden {
            message: "Insufficient permissions. Required roles: owner, admin".into(),
            required_roles: vec![Role::Owner, Role::Admin],
            current_role: Some(Role::Member),
        }
    );
}

#[tokio::test]
async fn scenario_owner_cannot_remove_self() {
    let svc = service().await;
    let u1 = user(&svc, "u1").await;
    let o1 = org_owned_by(&svc, "o1", &u1).await;
    active_in(&svc, &u1, Some(&o1.id)).await;

    let err = remove_member(&svc, &req(&u1), &u1.id).await.unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::Forbidden));
    assert_eq!(err.to_string(), "Cannot remove yourself from the organization");
}

#[tokio::test]
async fn scenario_switch_waits_for_an_open_switch() {
    let svc = service().await;
    let u1 = user(&svc, "u1").await;
    let o1 = org_owned_by(&svc, "o1", &u1).await;
    let o2 = org_owned_by(&svc, "o2", &u1).await;
    active_in(&svc, &u1, None).await;
    let request = req(&u1);
    let session = svc.find_latest_session(&u1.id).await.unwrap().unwrap();

    // A first switch to o1 has patched the session but not committed yet.
    let first = svc.db().begin_write().await.unwrap();
    svc.set_active_organization(&session.id, Some(&o1.id))
        .await
        .unwrap();

    let second = switch_organization(&svc, &request, &o2.id);
    tokio::pin!(second);
    let early = tokio::time::timeout(Duration::from_millis(50), &mut second).await;
    assert!(early.is_err(), "second switch finished inside the first one's transaction");

    first.commit().await.unwrap();
    let response = second.await.unwrap();
    assert_eq!(
        response.organization.map(|o| o.id).as_deref(),
        Some(o2.id.as_str())
    );

    let ctx = require_auth(&svc, &request).await.unwrap();
    assert_eq!(ctx.organization_id(), o2.id);
}

#[tokio::test]
async fn scenario_guard_ignores_rolled_back_switch() {
    let svc = service().await;
    let u1 = user(&svc, "u1").await;
    let o1 = org_owned_by(&svc, "o1", &u1).await;
    let o2 = org_owned_by(&svc, "o2", &u1).await;
    active_in(&svc, &u1, Some(&o1.id)).await;
    let request = req(&u1);
    let session = svc.find_latest_session(&u1.id).await.unwrap().unwrap();

    let aborted = svc.db().begin_write().await.unwrap();
    svc.set_active_organization(&session.id, Some(&o2.id))
        .await
        .unwrap();

    let guard = active_org_id(&svc, &request);
    tokio::pin!(guard);
    let early = tokio::time::timeout(Duration::from_millis(50), &mut guard).await;
    assert!(early.is_err(), "guard resolved against an uncommitted switch");

    aborted.rollback().await.unwrap();
    assert_eq!(guard.await.unwrap(), o1.id);
}
