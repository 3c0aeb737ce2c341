use lendmon_common::types::Severity;

/// Lifecycle transition an outbound message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    NewIncident,
    Escalation,
    Deescalation,
    Reminder,
    Update,
}

/// Channels an outbound message goes to. The developer channel is
/// always on: it is the primary target for developer-only messages and
/// the informational mirror for business ones. Slack only ever
/// accompanies a business send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub business: bool,
    pub developer: bool,
    pub slack: bool,
}

/// One row of the channel matrix: whether a business-flagged
/// observation of this kind may reach the business channel, and whether
/// that additionally requires Critical severity.
struct RoutingRow {
    kind: AlertKind,
    business_eligible: bool,
    critical_only: bool,
}

/// The channel matrix, indexed by `AlertKind` discriminant.
///
/// De-escalations never reach customers: "things are partially better"
/// notices complicate an open incident narrative. Reminders are a
/// developer-channel heartbeat. Warning-level updates stay off the
/// business channel to keep it quiet.
const ROUTING: [RoutingRow; 5] = [
    RoutingRow {
        kind: AlertKind::NewIncident,
        business_eligible: true,
        critical_only: false,
    },
    RoutingRow {
        kind: AlertKind::Escalation,
        business_eligible: true,
        critical_only: false,
    },
    RoutingRow {
        kind: AlertKind::Deescalation,
        business_eligible: false,
        critical_only: false,
    },
    RoutingRow {
        kind: AlertKind::Reminder,
        business_eligible: false,
        critical_only: false,
    },
    RoutingRow {
        kind: AlertKind::Update,
        business_eligible: true,
        critical_only: true,
    },
];

pub fn route(kind: AlertKind, business_alert: bool, severity: Severity) -> Route {
    let row = &ROUTING[kind as usize];
    debug_assert!(row.kind == kind);

    let business = business_alert
        && row.business_eligible
        && (!row.critical_only || severity == Severity::Critical);

    Route {
        business,
        developer: true,
        slack: business,
    }
}
