//! Lifecycle hooks
//!
//! Side effects of entity writes. Hooks run synchronously inside the atomic
//! unit of the write that triggers them; nothing here is deferred or
//! best-effort.
//!
//! - Organization creation produces the single `OWNER` membership
//!   ([`on_organization_created`]), called by every store implementation
//!   from within `insert_organization`.
//! - A missing slug is derived from the name and disambiguated with numeric
//!   suffixes inside its uniqueness domain ([`allocate_slug`]).
//! - Soft delete and restore flip exactly one row ([`soft_delete_organization`]
//!   and friends). Descendants keep their own flags; their reachability is
//!   computed by [`crate::visibility`].

use std::future::Future;

use tenancy_org::slug::{candidate, is_valid_slug, slugify};
use tenancy_org::{Business, Integration, Membership, Organization};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::config::TenancyConfig;
use crate::error::{Constraint, StoreError, StoreResult, TenancyError, TenancyResult};
use crate::store::TenantStore;

/// The owner membership every new organization gets.
///
/// `invited_by` is `None`: the owner created the organization.
pub fn on_organization_created(organization: &Organization) -> Membership {
    Membership::owner(organization.id, organization.owner_id)
}

/// Uniqueness domain of a slug.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlugScope {
    /// Global, case-insensitive
    Organization,
    /// Per organization
    Business(Uuid),
}

impl SlugScope {
    /// The store constraint guarding this domain.
    pub fn constraint(&self) -> Constraint {
        match self {
            SlugScope::Organization => Constraint::OrganizationSlug,
            SlugScope::Business(_) => Constraint::BusinessSlug,
        }
    }

    /// Base used when the name yields no slug characters.
    pub fn fallback(&self) -> &'static str {
        match self {
            SlugScope::Organization => "organization",
            SlugScope::Business(_) => "business",
        }
    }
}

/// How the slug of a new entity is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlugRequest {
    /// Caller supplied the slug; a collision is a conflict
    Explicit(String),
    /// Derived from the name; collisions are disambiguated
    Derived(String),
}

/// Decide the slug request for a new entity.
///
/// An explicit slug must be well formed. A derived base falls back to the
/// scope's default when the name contains no usable characters.
pub fn slug_request(
    name: &str,
    explicit: Option<&str>,
    scope: SlugScope,
    config: &TenancyConfig,
) -> TenancyResult<SlugRequest> {
    match explicit.map(str::trim).filter(|s| !s.is_empty()) {
        Some(slug) => {
            validate_slug(slug, config)?;
            Ok(SlugRequest::Explicit(slug.to_string()))
        }
        None => {
            let base = slugify(name, config.slug_max_length);
            if base.is_empty() {
                Ok(SlugRequest::Derived(scope.fallback().to_string()))
            } else {
                Ok(SlugRequest::Derived(base))
            }
        }
    }
}

/// Reject malformed caller-supplied slugs.
pub fn validate_slug(slug: &str, config: &TenancyConfig) -> TenancyResult<()> {
    if is_valid_slug(slug, config.slug_max_length) {
        Ok(())
    } else {
        Err(TenancyError::Validation(format!(
            "slug must be 1-{} characters of letters, digits, '-' or '_'",
            config.slug_max_length
        )))
    }
}

/// Insert a row under the first free slug derived from `base`.
///
/// Candidates `base`, `base-2`, `base-3`, ... are probed with `is_taken`
/// and the first free one is handed to `insert`. The store's unique
/// constraint is the authority: if `insert` loses a race and reports a
/// violation of the scope's constraint, probing resumes at the next
/// candidate. After `slug_retry_limit` lost races, or when no candidate
/// within `slug_candidate_limit` is free, the allocation fails with
/// `Conflict`.
pub async fn allocate_slug<T, P, PF, I, IF>(
    base: &str,
    scope: SlugScope,
    config: &TenancyConfig,
    mut is_taken: P,
    mut insert: I,
) -> TenancyResult<T>
where
    P: FnMut(String) -> PF,
    PF: Future<Output = StoreResult<bool>>,
    I: FnMut(String) -> IF,
    IF: Future<Output = StoreResult<T>>,
{
    let constraint = scope.constraint();
    let mut next: u32 = 1;
    let mut attempts: u32 = 0;

    loop {
        let slug = loop {
            if next > config.slug_candidate_limit {
                error!(base, candidates = config.slug_candidate_limit, "No free slug candidate");
                return Err(TenancyError::Conflict(constraint.description().to_string()));
            }
            let slug = candidate(base, next, config.slug_max_length);
            if !is_taken(slug.clone()).await? {
                break slug;
            }
            next += 1;
        };

        match insert(slug.clone()).await {
            Ok(row) => {
                debug!(slug = %slug, attempts = attempts + 1, "Slug allocated");
                return Ok(row);
            }
            Err(StoreError::UniqueViolation(violated)) if violated == constraint => {
                attempts += 1;
                if attempts >= config.slug_retry_limit {
                    error!(
                        base,
                        attempts,
                        "Slug allocation retries exhausted"
                    );
                    return Err(TenancyError::Conflict(constraint.description().to_string()));
                }
                warn!(
                    slug = %slug,
                    attempt = attempts,
                    max_attempts = config.slug_retry_limit,
                    "Slug taken concurrently, retrying with next candidate"
                );
                next += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Soft delete an organization. Businesses and integrations are untouched.
pub async fn soft_delete_organization(
    store: &dyn TenantStore,
    organization_id: Uuid,
) -> StoreResult<Organization> {
    store.set_organization_active(organization_id, false).await
}

/// Restore a soft-deleted organization.
pub async fn restore_organization(
    store: &dyn TenantStore,
    organization_id: Uuid,
) -> StoreResult<Organization> {
    store.set_organization_active(organization_id, true).await
}

/// Soft delete a business. Integrations are untouched.
pub async fn soft_delete_business(
    store: &dyn TenantStore,
    business_id: Uuid,
) -> StoreResult<Business> {
    store.set_business_active(business_id, false).await
}

/// Restore a soft-deleted business.
pub async fn restore_business(store: &dyn TenantStore, business_id: Uuid) -> StoreResult<Business> {
    store.set_business_active(business_id, true).await
}

/// Soft delete an integration. Its detail record is kept.
pub async fn soft_delete_integration(
    store: &dyn TenantStore,
    integration_id: Uuid,
) -> StoreResult<Integration> {
    store.set_integration_active(integration_id, false).await
}

/// Restore a soft-deleted integration.
pub async fn restore_integration(
    store: &dyn TenantStore,
    integration_id: Uuid,
) -> StoreResult<Integration> {
    store.set_integration_active(integration_id, true).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct FakeDomain {
        taken: HashSet<String>,
        /// inserts that fail as if another request won the race
        races_to_lose: u32,
        inserts: u32,
    }

    async fn allocate(
        domain: Arc<Mutex<FakeDomain>>,
        base: &str,
        config: &TenancyConfig,
    ) -> TenancyResult<String> {
        let probe = domain.clone();
        let target = domain.clone();
        allocate_slug(
            base,
            SlugScope::Organization,
            config,
            move |slug| {
                let probe = probe.clone();
                async move { Ok(probe.lock().unwrap().taken.contains(&slug)) }
            },
            move |slug| {
                let target = target.clone();
                async move {
                    let mut d = target.lock().unwrap();
                    d.inserts += 1;
                    if d.races_to_lose > 0 {
                        d.races_to_lose -= 1;
                        d.taken.insert(slug);
                        return Err(StoreError::UniqueViolation(Constraint::OrganizationSlug));
                    }
                    d.taken.insert(slug.clone());
                    Ok(slug)
                }
            },
        )
        .await
    }

    #[test]
    fn test_owner_membership_hook() {
        let owner = Uuid::now_v7();
        let org = Organization::new("Acme", "acme", owner);
        let membership = on_organization_created(&org);

        assert_eq!(membership.organization_id, org.id);
        assert_eq!(membership.user_id, owner);
        assert!(membership.is_owner());
        assert!(membership.invited_by.is_none());
    }

    #[test]
    fn test_slug_request() {
        let config = TenancyConfig::default();
        assert_eq!(
            slug_request("Acme Corp", None, SlugScope::Organization, &config).unwrap(),
            SlugRequest::Derived("acme-corp".to_string())
        );
        assert_eq!(
            slug_request("Acme", Some("my-acme"), SlugScope::Organization, &config).unwrap(),
            SlugRequest::Explicit("my-acme".to_string())
        );
        assert_eq!(
            slug_request("!!!", Some("  "), SlugScope::Business(Uuid::now_v7()), &config).unwrap(),
            SlugRequest::Derived("business".to_string())
        );
        assert!(matches!(
            slug_request("Acme", Some("bad slug"), SlugScope::Organization, &config),
            Err(TenancyError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_allocate_first_free_candidate() {
        let domain = Arc::new(Mutex::new(FakeDomain::default()));
        let config = TenancyConfig::default();

        assert_eq!(allocate(domain.clone(), "acme", &config).await.unwrap(), "acme");
        assert_eq!(allocate(domain.clone(), "acme", &config).await.unwrap(), "acme-2");
        assert_eq!(allocate(domain.clone(), "acme", &config).await.unwrap(), "acme-3");
    }

    #[tokio::test]
    async fn test_allocate_retries_after_lost_race() {
        let domain = Arc::new(Mutex::new(FakeDomain {
            races_to_lose: 2,
            ..FakeDomain::default()
        }));
        let config = TenancyConfig::default();

        let slug = allocate(domain.clone(), "acme", &config).await.unwrap();
        assert_eq!(slug, "acme-3");
        assert_eq!(domain.lock().unwrap().inserts, 3);
    }

    #[tokio::test]
    async fn test_allocate_gives_up_after_retry_limit() {
        let domain = Arc::new(Mutex::new(FakeDomain {
            races_to_lose: 10,
            ..FakeDomain::default()
        }));
        let config = TenancyConfig::default();

        let result = allocate(domain.clone(), "acme", &config).await;
        assert!(matches!(result, Err(TenancyError::Conflict(_))));
        assert_eq!(domain.lock().unwrap().inserts, config.slug_retry_limit);
    }

    #[tokio::test]
    async fn test_allocate_gives_up_when_candidates_exhausted() {
        let mut fake = FakeDomain::default();
        fake.taken.insert("acme".to_string());
        fake.taken.insert("acme-2".to_string());
        let domain = Arc::new(Mutex::new(fake));
        let config = TenancyConfig {
            slug_candidate_limit: 2,
            ..TenancyConfig::default()
        };

        let result = allocate(domain.clone(), "acme", &config).await;
        assert!(matches!(result, Err(TenancyError::Conflict(_))));
        assert_eq!(domain.lock().unwrap().inserts, 0);
    }
}
