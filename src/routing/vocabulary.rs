//! Reserved route names and the tier each one belongs to.
//!
//! The classifier consults this table twice: once to keep reserved names out
//! of the shortlink namespace, and once to tag special routes. Both reads go
//! through [`SpecialRoute::from_segment`], so adding a page here is enough to
//! stop its path being proxied as a short code.

use serde::Serialize;

/// A first path segment owned by the application rather than a short code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpecialRoute {
    Admin,
    SuperAdmin,
    Dashboard,
    Login,
    Register,
    Continue,
    Go,
    Expired,
    Referral,
    Links,
    Analytics,
    Settings,
    Profile,
    Billing,
    Payouts,
}

/// Access tier of a route, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteTier {
    Public,
    Member,
    Admin,
    SuperAdmin,
}

/// Member-area pages.
pub const MEMBER_ROUTES: &[SpecialRoute] = &[
    SpecialRoute::Dashboard,
    SpecialRoute::Referral,
    SpecialRoute::Links,
    SpecialRoute::Analytics,
    SpecialRoute::Settings,
    SpecialRoute::Profile,
    SpecialRoute::Billing,
    SpecialRoute::Payouts,
];

/// Admin-area pages.
pub const ADMIN_ROUTES: &[SpecialRoute] = &[SpecialRoute::Admin];

/// Super-admin-area pages.
pub const SUPER_ADMIN_ROUTES: &[SpecialRoute] = &[SpecialRoute::SuperAdmin];

impl SpecialRoute {
    /// Every reserved name.
    pub const ALL: [SpecialRoute; 15] = [
        SpecialRoute::Admin,
        SpecialRoute::SuperAdmin,
        SpecialRoute::Dashboard,
        SpecialRoute::Login,
        SpecialRoute::Register,
        SpecialRoute::Continue,
        SpecialRoute::Go,
        SpecialRoute::Expired,
        SpecialRoute::Referral,
        SpecialRoute::Links,
        SpecialRoute::Analytics,
        SpecialRoute::Settings,
        SpecialRoute::Profile,
        SpecialRoute::Billing,
        SpecialRoute::Payouts,
    ];

    /// The path segment this route is served under.
    pub fn as_str(self) -> &'static str {
        match self {
            SpecialRoute::Admin => "admin",
            SpecialRoute::SuperAdmin => "super-admin",
            SpecialRoute::Dashboard => "dashboard",
            SpecialRoute::Login => "login",
            SpecialRoute::Register => "register",
            SpecialRoute::Continue => "continue",
            SpecialRoute::Go => "go",
            SpecialRoute::Expired => "expired",
            SpecialRoute::Referral => "referral",
            SpecialRoute::Links => "links",
            SpecialRoute::Analytics => "analytics",
            SpecialRoute::Settings => "settings",
            SpecialRoute::Profile => "profile",
            SpecialRoute::Billing => "billing",
            SpecialRoute::Payouts => "payouts",
        }
    }

    /// Look up a path segment. Matching is exact and case-sensitive.
    pub fn from_segment(segment: &str) -> Option<SpecialRoute> {
        Self::ALL.into_iter().find(|r| r.as_str() == segment)
    }

    pub fn tier(self) -> RouteTier {
        if SUPER_ADMIN_ROUTES.contains(&self) {
            RouteTier::SuperAdmin
        } else if ADMIN_ROUTES.contains(&self) {
            RouteTier::Admin
        } else if MEMBER_ROUTES.contains(&self) {
            RouteTier::Member
        } else {
            RouteTier::Public
        }
    }

    /// Login and register pages, which bounce visitors who are already signed in.
    pub fn is_auth_page(self) -> bool {
        matches!(self, SpecialRoute::Login | SpecialRoute::Register)
    }
}

impl std::fmt::Display for SpecialRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
