//! Access control decisions.
//!
//! The rules below form a priority table: they are checked top to bottom and
//! the first one that applies decides. Several predicates overlap (a bare
//! `/admin` is also admin tier, an admin visiting `/login` is also
//! authenticated), so the position of a rule is part of its meaning.
//!
//! | rule                      | applies when                                | redirects to                 |
//! |---------------------------|---------------------------------------------|------------------------------|
//! | `canonical_dashboard`     | bare `/admin` or `/super-admin`             | `{area}/dashboard`           |
//! | `referral_signup`         | signed in, `/register?ref=…`                | `/referral`                  |
//! | `signed_in_auth_page`     | signed in, `/login` or `/register`          | role home                    |
//! | `member_requires_login`   | member tier, signed out                     | login, `redirect=path`       |
//! | `member_bars_admin`       | member tier, role admin                     | admin home                   |
//! | `admin_requires_login`    | admin tier, signed out                      | login, `redirect=path`       |
//! | `admin_requires_role`     | admin tier, role below admin                | member home                  |
//! | `super_admin_requires_login` | super-admin tier, signed out             | login, `redirect=path`       |
//! | `super_admin_requires_role`  | super-admin tier, role below super admin | admin or member home         |
//!
//! No rule means [`AccessDecision::Allow`]. Redirects keep the locale prefix
//! of the request path.

use serde::Serialize;

use crate::http::request::IncomingRequest;
use crate::routing::{RouteClass, RouteTier, SpecialRoute};
use crate::security::identity::{Identity, Role};

/// Query parameter on the login page naming where to return afterwards.
pub const REDIRECT_PARAM: &str = "redirect";

/// Query parameter carrying a referral code on the register page.
pub const REFERRAL_PARAM: &str = "ref";

/// Outcome of the gate for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum AccessDecision {
    Allow,
    RewriteTo {
        target: String,
    },
    RedirectTo {
        path: String,
        query: Option<(String, String)>,
    },
}

impl AccessDecision {
    pub fn redirect(path: impl Into<String>) -> Self {
        AccessDecision::RedirectTo {
            path: path.into(),
            query: None,
        }
    }

    pub fn redirect_with(path: impl Into<String>, name: &str, value: &str) -> Self {
        AccessDecision::RedirectTo {
            path: path.into(),
            query: Some((name.to_string(), value.to_string())),
        }
    }

    /// `Location` value for a redirect, with the query parameter encoded.
    pub fn location(&self) -> Option<String> {
        match self {
            AccessDecision::RedirectTo { path, query } => {
                Some(redirect_location(path, query.as_ref()))
            }
            _ => None,
        }
    }
}

/// Join a redirect path with its single, form-encoded query parameter.
pub fn redirect_location(path: &str, query: Option<&(String, String)>) -> String {
    match query {
        None => path.to_string(),
        Some((name, value)) => {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .append_pair(name, value)
                .finish();
            format!("{path}?{query}")
        }
    }
}

/// Everything a rule may look at.
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    pub class: &'a RouteClass,
    pub identity: &'a Identity,
    pub request: &'a IncomingRequest,
}

impl<'a> RuleInput<'a> {
    fn special(&self) -> Option<(SpecialRoute, &'a [String])> {
        match self.class {
            RouteClass::SpecialRoute { route, rest, .. } => Some((*route, rest.as_slice())),
            _ => None,
        }
    }

    fn tier(&self) -> Option<RouteTier> {
        self.special().map(|(route, _)| route.tier())
    }

    fn is_tier(&self, tier: RouteTier) -> bool {
        self.tier() == Some(tier)
    }

    fn signed_in(&self) -> bool {
        self.identity.is_authenticated
    }

    fn role(&self) -> Role {
        self.identity.effective_role()
    }

    /// Prefix `path` with the request's locale, if it had one.
    fn localized(&self, path: &str) -> String {
        match self.class.locale() {
            Some(locale) => format!("/{locale}{path}"),
            None => path.to_string(),
        }
    }

    fn to_login(&self) -> AccessDecision {
        AccessDecision::redirect_with(
            self.localized("/login"),
            REDIRECT_PARAM,
            self.request.path(),
        )
    }

    fn to_home(&self, role: Role) -> AccessDecision {
        AccessDecision::redirect(self.localized(role.home_path()))
    }
}

/// One row of the priority table.
pub struct Rule {
    pub name: &'static str,
    applies: fn(&RuleInput<'_>) -> bool,
    action: fn(&RuleInput<'_>) -> AccessDecision,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

/// The priority table, highest priority first.
pub static RULES: &[Rule] = &[
    Rule {
        name: "canonical_dashboard",
        applies: is_bare_area_root,
        action: to_area_dashboard,
    },
    Rule {
        name: "referral_signup",
        applies: is_signed_in_referral_signup,
        action: to_referral,
    },
    Rule {
        name: "signed_in_auth_page",
        applies: is_signed_in_auth_page,
        action: to_own_home,
    },
    Rule {
        name: "member_requires_login",
        applies: |i| i.is_tier(RouteTier::Member) && !i.signed_in(),
        action: |i| i.to_login(),
    },
    Rule {
        name: "member_bars_admin",
        applies: |i| i.is_tier(RouteTier::Member) && i.role() == Role::Admin,
        action: |i| i.to_home(Role::Admin),
    },
    Rule {
        name: "admin_requires_login",
        applies: |i| i.is_tier(RouteTier::Admin) && !i.signed_in(),
        action: |i| i.to_login(),
    },
    Rule {
        name: "admin_requires_role",
        applies: |i| i.is_tier(RouteTier::Admin) && i.role() < Role::Admin,
        action: |i| i.to_home(Role::Member),
    },
    Rule {
        name: "super_admin_requires_login",
        applies: |i| i.is_tier(RouteTier::SuperAdmin) && !i.signed_in(),
        action: |i| i.to_login(),
    },
    Rule {
        name: "super_admin_requires_role",
        applies: |i| i.is_tier(RouteTier::SuperAdmin) && i.role() != Role::SuperAdmin,
        action: to_fallback_home,
    },
];

fn is_bare_area_root(input: &RuleInput<'_>) -> bool {
    matches!(
        input.special(),
        Some((SpecialRoute::Admin | SpecialRoute::SuperAdmin, rest)) if rest.is_empty()
    )
}

fn to_area_dashboard(input: &RuleInput<'_>) -> AccessDecision {
    let area = input.special().map(|(route, _)| route.as_str()).unwrap_or("admin");
    AccessDecision::redirect(input.localized(&format!("/{area}/dashboard")))
}

fn is_signed_in_referral_signup(input: &RuleInput<'_>) -> bool {
    matches!(input.special(), Some((SpecialRoute::Register, _)))
        && input.signed_in()
        && input
            .request
            .query_param(REFERRAL_PARAM)
            .is_some_and(|code| !code.is_empty())
}

fn to_referral(input: &RuleInput<'_>) -> AccessDecision {
    AccessDecision::redirect(input.localized("/referral"))
}

fn is_signed_in_auth_page(input: &RuleInput<'_>) -> bool {
    input.special().is_some_and(|(route, _)| route.is_auth_page()) && input.signed_in()
}

fn to_own_home(input: &RuleInput<'_>) -> AccessDecision {
    input.to_home(input.role())
}

fn to_fallback_home(input: &RuleInput<'_>) -> AccessDecision {
    match input.role() {
        Role::Admin => input.to_home(Role::Admin),
        _ => input.to_home(Role::Member),
    }
}

/// A decision plus the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub rule: Option<&'static str>,
    pub decision: AccessDecision,
}

/// Run the priority table. The first applicable rule wins.
pub fn decide(class: &RouteClass, identity: &Identity, request: &IncomingRequest) -> Verdict {
    let input = RuleInput {
        class,
        identity,
        request,
    };

    for rule in RULES {
        if (rule.applies)(&input) {
            return Verdict {
                rule: Some(rule.name),
                decision: (rule.action)(&input),
            };
        }
    }

    Verdict {
        rule: None,
        decision: AccessDecision::Allow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LocaleConfig, RoutingConfig};
    use crate::routing::PathClassifier;

    fn run(path_and_query: &str, identity: Identity) -> Verdict {
        let (path, query) = path_and_query
            .split_once('?')
            .unwrap_or((path_and_query, ""));
        let request = IncomingRequest::new(path).with_query(query);
        let classifier =
            PathClassifier::from_config(&RoutingConfig::default(), &LocaleConfig::default());
        decide(&classifier.classify(path), &identity, &request)
    }

    fn as_role(role: Role) -> Identity {
        Identity::authenticated(Some(role))
    }

    fn redirect(path: &str) -> AccessDecision {
        AccessDecision::redirect(path)
    }

    const MEMBER_PATHS: &[&str] = &["/en/dashboard", "/en/links/abc", "/settings", "/en/referral"];
    const ADMIN_PATHS: &[&str] = &["/en/admin/users", "/admin/dashboard"];
    const SUPER_ADMIN_PATHS: &[&str] = &["/en/super-admin/tenants", "/super-admin/dashboard"];

    #[test]
    fn test_bare_area_is_canonicalized_before_auth() {
        let identities = [
            Identity::anonymous(),
            as_role(Role::Member),
            as_role(Role::Admin),
            Identity::authenticated(None),
        ];
        for identity in identities {
            let verdict = run("/en/admin", identity);
            assert_eq!(verdict.rule, Some("canonical_dashboard"));
            assert_eq!(verdict.decision, redirect("/en/admin/dashboard"));
            assert_eq!(
                run("/super-admin", identity).decision,
                redirect("/super-admin/dashboard")
            );
        }
    }

    #[test]
    fn test_signed_in_register_with_referral() {
        let verdict = run("/en/register?ref=ABC123", as_role(Role::Member));
        assert_eq!(verdict.rule, Some("referral_signup"));
        assert_eq!(verdict.decision, redirect("/en/referral"));

        let verdict = run("/en/register?ref=ABC123", Identity::authenticated(None));
        assert_eq!(verdict.decision, redirect("/en/referral"));
    }

    #[test]
    fn test_referral_needs_register_and_a_code() {
        assert_eq!(
            run("/en/login?ref=ABC123", as_role(Role::Member)).decision,
            redirect("/en/dashboard")
        );
        assert_eq!(
            run("/en/register?ref=", as_role(Role::Member)).decision,
            redirect("/en/dashboard")
        );
    }

    #[test]
    fn test_signed_out_visitor_keeps_auth_pages() {
        assert_eq!(
            run("/en/register?ref=ABC123", Identity::anonymous()).decision,
            AccessDecision::Allow
        );
        assert_eq!(run("/en/login", Identity::anonymous()).decision, AccessDecision::Allow);
    }

    #[test]
    fn test_signed_in_auth_page_goes_home() {
        assert_eq!(run("/en/login", as_role(Role::Member)).decision, redirect("/en/dashboard"));
        assert_eq!(
            run("/en/login", as_role(Role::Admin)).decision,
            redirect("/en/admin/dashboard")
        );
        assert_eq!(
            run("/register", as_role(Role::SuperAdmin)).decision,
            redirect("/super-admin/dashboard")
        );
        assert_eq!(
            run("/en/login", Identity::authenticated(None)).decision,
            redirect("/en/dashboard")
        );
    }

    #[test]
    fn test_protected_tiers_require_login() {
        for path in MEMBER_PATHS.iter().chain(ADMIN_PATHS).chain(SUPER_ADMIN_PATHS) {
            let verdict = run(path, Identity::anonymous());
            let locale_login = if path.starts_with("/en/") { "/en/login" } else { "/login" };
            assert_eq!(
                verdict.decision,
                AccessDecision::redirect_with(locale_login, "redirect", path),
                "path {path}"
            );
        }
    }

    #[test]
    fn test_admin_is_barred_from_member_area() {
        for path in MEMBER_PATHS {
            let verdict = run(path, as_role(Role::Admin));
            assert_eq!(verdict.rule, Some("member_bars_admin"), "path {path}");
            let expected = if path.starts_with("/en/") {
                "/en/admin/dashboard"
            } else {
                "/admin/dashboard"
            };
            assert_eq!(verdict.decision, redirect(expected));
        }
    }

    #[test]
    fn test_member_cannot_enter_admin_area() {
        assert_eq!(
            run("/en/admin/users", as_role(Role::Member)).decision,
            redirect("/en/dashboard")
        );
        assert_eq!(
            run("/admin/dashboard", Identity::authenticated(None)).decision,
            redirect("/dashboard")
        );
    }

    #[test]
    fn test_super_admin_area_fallbacks() {
        assert_eq!(
            run("/en/super-admin/tenants", as_role(Role::Admin)).decision,
            redirect("/en/admin/dashboard")
        );
        assert_eq!(
            run("/en/super-admin/tenants", as_role(Role::Member)).decision,
            redirect("/en/dashboard")
        );
        assert_eq!(
            run("/super-admin/dashboard", Identity::authenticated(None)).decision,
            redirect("/dashboard")
        );
    }

    #[test]
    fn test_super_admin_reaches_every_tier() {
        for path in MEMBER_PATHS.iter().chain(ADMIN_PATHS).chain(SUPER_ADMIN_PATHS) {
            assert_eq!(
                run(path, as_role(Role::SuperAdmin)),
                Verdict {
                    rule: None,
                    decision: AccessDecision::Allow
                },
                "path {path}"
            );
        }
    }

    #[test]
    fn test_members_and_admins_reach_their_own_areas() {
        for path in MEMBER_PATHS {
            assert_eq!(run(path, as_role(Role::Member)).decision, AccessDecision::Allow);
            assert_eq!(
                run(path, Identity::authenticated(None)).decision,
                AccessDecision::Allow
            );
        }
        for path in ADMIN_PATHS {
            assert_eq!(run(path, as_role(Role::Admin)).decision, AccessDecision::Allow);
        }
    }

    #[test]
    fn test_public_and_unclassified_routes_allow() {
        for path in ["/", "/en", "/en/pricing", "/en/go/abc", "/expired", "/en/continue"] {
            assert_eq!(run(path, Identity::anonymous()).decision, AccessDecision::Allow);
        }
    }

    #[test]
    fn test_location_encodes_redirect_param() {
        let decision = AccessDecision::redirect_with("/en/login", "redirect", "/en/admin/users");
        assert_eq!(
            decision.location().as_deref(),
            Some("/en/login?redirect=%2Fen%2Fadmin%2Fusers")
        );
        assert_eq!(AccessDecision::Allow.location(), None);
        assert_eq!(redirect("/x").location().as_deref(), Some("/x"));
    }

    #[test]
    fn test_rule_names_are_unique() {
        let mut names: Vec<_> = RULES.iter().map(|r| r.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), RULES.len());
    }
}
