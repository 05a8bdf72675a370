//! Offline route gate evaluation.
//!
//! Answers "what would the app do on this page?" for a given session
//! state and viewport width, without contacting any service.

use serde::Serialize;

use labinv_core::{
    AuthUser, DEFAULT_BREAKPOINT, DeviceClass, DeviceClassifier, RouteDecision, RouteGate,
    SessionState,
};

use crate::cli::{GlobalOpts, RouteArgs, SessionArg};
use crate::config;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct RouteReport {
    path: String,
    session: &'static str,
    device: &'static str,
    decision: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect: Option<String>,
}

fn session_state(arg: SessionArg) -> SessionState {
    match arg {
        SessionArg::Loading => SessionState::loading(),
        SessionArg::Unauthenticated => SessionState::unauthenticated(),
        SessionArg::Authenticated => SessionState::authenticated(
            AuthUser {
                uid: "preview".into(),
                email: None,
            },
            None,
        ),
    }
}

fn evaluate(gate: &RouteGate, breakpoint: u32, args: &RouteArgs) -> RouteReport {
    let classifier = DeviceClassifier::new(breakpoint);
    let device = args
        .width
        .map_or(DeviceClass::Unknown, |w| classifier.measure(w));
    let decision = gate.decide(&session_state(args.session), device, &args.path);

    let (decision, redirect) = match decision {
        RouteDecision::ShowLoader => ("loader", None),
        RouteDecision::RedirectTo(target) => ("redirect", Some(target)),
        RouteDecision::RenderChildren => ("render", None),
    };
    RouteReport {
        path: args.path.clone(),
        session: match args.session {
            SessionArg::Loading => "loading",
            SessionArg::Authenticated => "authenticated",
            SessionArg::Unauthenticated => "unauthenticated",
        },
        device: device.label().unwrap_or("unknown"),
        decision,
        redirect,
    }
}

fn detail(r: &RouteReport) -> String {
    let outcome = match &r.redirect {
        Some(target) => format!("redirect to {target}"),
        None => r.decision.to_owned(),
    };
    output::detail_lines(&[
        ("Path", Some(r.path.clone())),
        ("Session", Some(r.session.to_owned())),
        ("Device", Some(r.device.to_owned())),
        ("Decision", Some(outcome)),
    ])
}

pub fn handle(args: RouteArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load_config_or_default();
    let name = config::active_profile_name(global, &cfg);
    let breakpoint = cfg
        .profiles
        .get(&name)
        .and_then(|p| p.breakpoint)
        .unwrap_or(DEFAULT_BREAKPOINT);

    let report = evaluate(&RouteGate::default(), breakpoint, &args);
    let out = output::render_single(&global.output, &report, detail, |r| {
        r.redirect.clone().unwrap_or_else(|| r.decision.to_owned())
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
