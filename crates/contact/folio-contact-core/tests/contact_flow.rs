use anyhow::Result;
use folio_contact_core::{
    ContactClient, ContactError, ContactRelay, ContactRequest, MemoryMailer, RelayConfig,
    SubmitError, TransportError,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Case {
    label: String,
    request: ContactRequest,
    expect: Option<ContactError>,
}

fn cases() -> Result<Vec<Case>> {
    folio_test_fixtures::contact::load("submissions")
}

fn client(mailer: MemoryMailer) -> ContactClient<ContactRelay<MemoryMailer>> {
    let cfg = RelayConfig::from_lookup(|key| match key {
        "EMAIL_USER" => Some("owner@folio.dev".to_string()),
        "EMAIL_PASS" => Some("app-password".to_string()),
        _ => None,
    })
    .expect("relay config");
    ContactClient::new(ContactRelay::new(cfg, mailer))
}

#[test]
fn fixture_submissions_validate_as_expected() -> Result<()> {
    for case in cases()? {
        let got = case.request.validate().err();
        assert_eq!(got, case.expect, "{}", case.label);
    }
    Ok(())
}

#[test]
fn only_valid_submissions_reach_the_mailbox() -> Result<()> {
    let cases = cases()?;
    let mut client = client(MemoryMailer::new());
    let mut sent = 0;
    for case in &cases {
        let before = client.transport().mailer().verify_calls();
        match (client.submit(&case.request), case.expect) {
            (Ok(receipt), None) => {
                sent += 1;
                assert!(receipt.message_id.is_some(), "{}", case.label);
                assert!(receipt.submission_id.is_some(), "{}", case.label);
                assert_eq!(client.transport().mailer().verify_calls(), before + 1);
            }
            (Err(SubmitError::Invalid(kind)), Some(expected)) => {
                assert_eq!(kind, expected, "{}", case.label);
                assert_eq!(client.transport().mailer().verify_calls(), before);
            }
            (other, expected) => panic!("{}: got {other:?}, expected {expected:?}", case.label),
        }
    }
    let outbox = client.transport().mailer().outbox();
    assert_eq!(outbox.len(), sent);
    assert!(outbox.iter().all(|m| m.to == "owner@folio.dev"));
    // Trimmed before sending.
    assert!(outbox.iter().any(|m| {
        m.subject == "New Contact Form Submission from Grace" && m.reply_to == "grace@navy.mil"
    }));
    Ok(())
}

#[test]
fn documented_examples() {
    let mut client = client(MemoryMailer::new());

    let err = client
        .submit(&ContactRequest::new("", "a@b.com", "hi"))
        .unwrap_err();
    assert_eq!(err.kind(), Some(ContactError::MissingFields));

    let err = client
        .submit(&ContactRequest::new("A", "not-an-email", "hi"))
        .unwrap_err();
    assert_eq!(err.kind(), Some(ContactError::InvalidEmail));
    assert_eq!(client.transport().mailer().verify_calls(), 0);

    client
        .submit(&ContactRequest::new("A", "a@b.com", "hi"))
        .unwrap();
    assert_eq!(client.transport().mailer().verify_calls(), 1);
    assert_eq!(client.transport().mailer().outbox().len(), 1);
}

#[test]
fn relay_failures_surface_as_server_errors_without_retry() {
    let mut client = client(MemoryMailer::failing_verify(TransportError::Connection(
        "connect ECONNREFUSED".into(),
    )));
    let err = client
        .submit(&ContactRequest::new("A", "a@b.com", "hi"))
        .unwrap_err();
    assert!(matches!(
        err,
        SubmitError::Server {
            kind: ContactError::ConnectionFailure,
            ..
        }
    ));
    assert_eq!(
        err.user_message(),
        "Failed to connect to email server. Please try again later."
    );
    assert_eq!(client.transport().mailer().verify_calls(), 1);
    assert!(client.transport().mailer().outbox().is_empty());
}
