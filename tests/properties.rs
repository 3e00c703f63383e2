//! Property tests for classification and access decisions.

use proptest::prelude::*;

use edge_gate::config::EdgeConfig;
use edge_gate::http::IncomingRequest;
use edge_gate::routing::{RouteClass, SpecialRoute};
use edge_gate::security::{decide, AccessDecision, Identity, Role};
use edge_gate::{EdgeAction, EdgeGate};

fn gate() -> EdgeGate {
    EdgeGate::from_config(&EdgeConfig::default())
}

fn is_reserved_or_locale(segment: &str) -> bool {
    SpecialRoute::from_segment(segment).is_some()
        || EdgeConfig::default().locale.locales.iter().any(|l| l == segment)
}

/// Short codes: no dots so they never look like assets.
fn code() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_-]{1,16}".prop_filter("reserved or locale", |s| {
        !is_reserved_or_locale(s) && s != "api" && !s.starts_with('_')
    })
}

fn tier_path() -> impl Strategy<Value = String> {
    let roots = prop_oneof![
        Just("admin"),
        Just("super-admin"),
        Just("dashboard"),
        Just("links"),
        Just("settings"),
    ];
    let locale = prop_oneof![Just(""), Just("/en"), Just("/fr")];
    (locale, roots, "[a-z0-9]{1,8}").prop_map(|(l, r, tail)| format!("{l}/{r}/{tail}"))
}

proptest! {
    #[test]
    fn single_segment_is_shortlink(code in code()) {
        let class = gate().classifier().classify(&format!("/{code}"));
        prop_assert_eq!(class, RouteClass::ShortlinkCandidate { code: code.clone() });
    }

    #[test]
    fn shortlink_target_ends_with_code(code in code()) {
        let g = gate();
        let class = g.classifier().classify(&format!("/{code}"));
        let rewrite = g.shortlinks().try_rewrite(&class).unwrap();
        let suffix = format!("/links/{}", code);
        prop_assert!(rewrite.target.ends_with(&suffix));
    }

    #[test]
    fn classify_is_idempotent(path in "(/[a-z0-9.-]{0,6}){0,4}") {
        let g = gate();
        prop_assert_eq!(g.classifier().classify(&path), g.classifier().classify(&path));
    }

    #[test]
    fn signed_out_visitor_always_sent_to_login(path in tier_path()) {
        let request = IncomingRequest::new(path.clone());
        let class = gate().classifier().classify(&path);
        let verdict = decide(&class, &Identity::anonymous(), &request);
        let login = if path.starts_with("/en/") {
            "/en/login"
        } else if path.starts_with("/fr/") {
            "/fr/login"
        } else {
            "/login"
        };
        prop_assert_eq!(
            verdict.decision,
            AccessDecision::redirect_with(login, "redirect", &path)
        );
    }

    #[test]
    fn admin_is_sent_out_of_member_area(
        root in prop_oneof![Just("dashboard"), Just("links"), Just("billing")],
        tail in "(/[a-z0-9]{1,8}){0,2}",
    ) {
        let path = format!("/{root}{tail}");
        let request = IncomingRequest::new(path.clone());
        let class = gate().classifier().classify(&path);
        let verdict = decide(&class, &Identity::authenticated(Some(Role::Admin)), &request);
        prop_assert_eq!(verdict.decision, AccessDecision::redirect("/admin/dashboard"));
    }

    #[test]
    fn super_admin_is_allowed_everywhere(path in tier_path()) {
        let data = urlencoding::encode(r#"{"role":"super_admin"}"#).into_owned();
        let request = IncomingRequest::new(path.clone())
            .with_cookie("auth_token", "jwt")
            .with_cookie("user_data", data);
        let evaluation = gate().evaluate(&request);
        prop_assert_eq!(evaluation.identity, Some(Identity::authenticated(Some(Role::SuperAdmin))));
        prop_assert!(
            matches!(evaluation.action, EdgeAction::Locale { .. }),
            "unexpected {:?}",
            evaluation.action
        );
    }
}
