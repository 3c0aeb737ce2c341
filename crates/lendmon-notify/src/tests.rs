use crate::slack::html_to_mrkdwn;
use crate::telegram::TelegramTarget;
use crate::{truncate_body, AlertSink, Notifier};

#[test]
fn html_conversion_covers_all_tags() {
    let html = "<b>STABLECOIN DEPEG</b>\n<i>USDC on Base</i>\n<code>0.97</code>";
    assert_eq!(
        html_to_mrkdwn(html),
        "*STABLECOIN DEPEG*\n_USDC on Base_\n`0.97`"
    );
}

#[test]
fn html_conversion_leaves_plain_text_alone() {
    let plain = "Deviation: 2.30%\nOnchain: $0.976800";
    assert_eq!(html_to_mrkdwn(plain), plain);
}

#[test]
fn truncate_keeps_short_bodies() {
    assert_eq!(truncate_body("ok", 4096), "ok");
}

#[test]
fn truncate_cuts_long_bodies() {
    let long = "x".repeat(5000);
    let cut = truncate_body(&long, 4096);
    assert!(cut.len() < long.len());
    assert!(cut.ends_with("[truncated]"));
}

#[test]
fn telegram_target_requires_both_parts() {
    assert!(TelegramTarget::from_parts(Some("t".into()), Some("c".into())).is_some());
    assert!(TelegramTarget::from_parts(Some("t".into()), None).is_none());
    assert!(TelegramTarget::from_parts(None, Some("c".into())).is_none());
    assert!(TelegramTarget::from_parts(Some(String::new()), Some("c".into())).is_none());
}

#[tokio::test]
async fn unconfigured_targets_succeed_silently() {
    let notifier = Notifier::new(None, None, None);
    assert!(!notifier.business_configured());
    assert!(!notifier.developer_configured());
    assert!(!notifier.slack_configured());

    notifier.send_business("hello").await.unwrap();
    notifier.send_developer("hello").await.unwrap();
    notifier.send_slack("hello").await.unwrap();
}
