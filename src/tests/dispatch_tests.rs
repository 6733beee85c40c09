//! tests/dispatch_tests.rs
//! Pruebas del orquestador con un transporte falso.

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use actix_rt::test;

    use crate::logger::init_test_logger;
    use crate::models::campaign_model::CampaignStatus;
    use crate::models::contact_model::Contact;
    use crate::models::email_model::{EmailAttachment, SenderSettings};
    use crate::models::template_model::EmailTemplate;
    use crate::services::campaign_tracker::CampaignTracker;
    use crate::services::dispatch_service::{Campaign, DispatchError, DispatchService};
    use crate::services::transport_service::SendOutcome;
    use crate::tests::support::{contacts, sender_settings, FakeConnector};

    fn service(connector: &FakeConnector, pacing: Duration) -> DispatchService {
        init_test_logger();
        DispatchService::new(CampaignTracker::new(), Arc::new(connector.clone()), pacing)
    }

    fn campaign(id: &str, contacts: Vec<Contact>) -> Campaign {
        Campaign {
            campaign_id: id.to_string(),
            owner: None,
            contacts,
            template: EmailTemplate::new("Hello", "Hi {name}"),
            sender: sender_settings(),
            attachments: Vec::new(),
        }
    }

    fn rejected() -> SendOutcome {
        SendOutcome::Rejected("550 mailbox unavailable".to_string())
    }

    #[test]
    async fn empty_contact_list_completes_without_transport() {
        let connector = FakeConnector::new();
        let dispatch = service(&connector, Duration::ZERO);

        let p = dispatch.start(campaign("empty", vec![])).await.unwrap();

        assert_eq!(p.status, CampaignStatus::Completed);
        assert_eq!((p.total, p.sent, p.failed), (0, 0, 0));
        assert_eq!(p.progress, 100.0);
        assert_eq!(connector.opened(), 0);
    }

    #[test]
    async fn all_delivered_in_input_order() {
        let connector = FakeConnector::new();
        let dispatch = service(&connector, Duration::ZERO);
        let batch = contacts(3);
        let expected: Vec<String> = batch.iter().map(|c| c.email.clone()).collect();

        let p = dispatch.start(campaign("ok", batch)).await.unwrap();

        assert_eq!(p.status, CampaignStatus::Completed);
        assert_eq!((p.total, p.sent, p.failed), (3, 3, 0));
        assert_eq!(p.progress, 100.0);
        assert_eq!(connector.recipients(), expected);
        assert_eq!(connector.opened(), 1);
        assert_eq!(connector.closed(), 1);
    }

    #[test]
    async fn all_failing_batch_completes_with_errors() {
        let connector = FakeConnector::new().always(rejected());
        let dispatch = service(&connector, Duration::ZERO);

        let p = dispatch.start(campaign("all-fail", contacts(3))).await.unwrap();

        assert_eq!(p.status, CampaignStatus::CompletedWithErrors);
        assert_eq!((p.sent, p.failed), (0, 3));
        assert_eq!(p.progress, 100.0);
    }

    #[test]
    async fn recoverable_error_counts_one_failure_and_continues() {
        let connector = FakeConnector::new().on_attempt(1, rejected());
        let dispatch = service(&connector, Duration::ZERO);

        let p = dispatch.start(campaign("mixed", contacts(4))).await.unwrap();

        assert_eq!(p.status, CampaignStatus::CompletedWithErrors);
        assert_eq!((p.sent, p.failed), (3, 1));
        assert_eq!(p.progress, 100.0);
        assert_eq!(connector.recipients().len(), 4);
    }

    #[test]
    async fn connection_drop_mid_batch_fails_the_campaign() {
        let connector = FakeConnector::new()
            .on_attempt(2, SendOutcome::ConnectionLost("connection reset".to_string()));
        let dispatch = service(&connector, Duration::ZERO);

        let p = dispatch.start(campaign("drop", contacts(5))).await.unwrap();

        assert_eq!(p.status, CampaignStatus::Failed);
        assert_eq!(p.total, 5);
        assert!(p.sent <= 2);
        assert!(p.failed <= 2);
        assert_eq!((p.sent, p.failed), (2, 1));
        // el progreso queda donde estaba
        assert_eq!(p.progress, 60.0);
        // los dos últimos nunca se intentan
        assert_eq!(connector.recipients().len(), 3);
        assert_eq!(connector.closed(), 1);
    }

    #[test]
    async fn unreachable_relay_fails_before_any_send() {
        let connector = FakeConnector::failing_open();
        let dispatch = service(&connector, Duration::ZERO);

        let p = dispatch.start(campaign("no-relay", contacts(3))).await.unwrap();

        assert_eq!(p.status, CampaignStatus::Failed);
        assert_eq!((p.sent, p.failed), (0, 0));
        assert_eq!(p.progress, 0.0);
        assert!(connector.recipients().is_empty());
    }

    #[test]
    async fn incomplete_settings_never_touch_the_tracker() {
        let connector = FakeConnector::new();
        let dispatch = service(&connector, Duration::ZERO);
        let mut c = campaign("no-settings", contacts(2));
        c.sender = SenderSettings {
            password: String::new(),
            ..sender_settings()
        };

        let err = dispatch.start(c).await.unwrap_err();

        assert!(matches!(err, DispatchError::IncompleteSettings("email_password")));
        assert!(dispatch.tracker().get("no-settings").is_none());
        assert_eq!(connector.opened(), 0);
    }

    #[test]
    async fn starting_the_same_campaign_twice_is_rejected() {
        let connector = FakeConnector::new();
        let dispatch = service(&connector, Duration::ZERO);

        dispatch.start(campaign("twice", contacts(1))).await.unwrap();
        let err = dispatch.start(campaign("twice", contacts(3))).await.unwrap_err();

        assert!(matches!(err, DispatchError::DuplicateCampaign(_)));
        let p = dispatch.tracker().get("twice").unwrap();
        assert_eq!((p.total, p.sent), (1, 1));
        assert_eq!(connector.recipients().len(), 1);
    }

    #[test]
    async fn invalid_recipient_counts_as_failed_without_sending() {
        let connector = FakeConnector::new();
        let dispatch = service(&connector, Duration::ZERO);
        let mut batch = contacts(2);
        batch.insert(1, Contact::new("Broken", "not-an-address"));

        let p = dispatch.start(campaign("bad-address", batch)).await.unwrap();

        assert_eq!(p.status, CampaignStatus::CompletedWithErrors);
        assert_eq!((p.sent, p.failed), (2, 1));
        assert_eq!(connector.recipients().len(), 2);
    }

    #[test]
    async fn broken_attachment_does_not_abort_campaign() {
        let connector = FakeConnector::new();
        let dispatch = service(&connector, Duration::ZERO);
        let mut c = campaign("attachments", contacts(2));
        c.attachments = vec![
            EmailAttachment {
                filename: "ok.txt".to_string(),
                content: "aGVsbG8=".to_string(),
                content_type: "text/plain".to_string(),
            },
            EmailAttachment {
                filename: "broken.bin".to_string(),
                content: "***".to_string(),
                content_type: "application/octet-stream".to_string(),
            },
        ];

        let p = dispatch.start(c).await.unwrap();

        assert_eq!(p.status, CampaignStatus::Completed);
        assert_eq!((p.sent, p.failed), (2, 0));
    }

    #[test]
    async fn spawned_campaign_is_observable_while_running() {
        let connector = FakeConnector::new().on_attempt(3, rejected());
        let dispatch = service(&connector, Duration::from_millis(5));

        let handle = dispatch.spawn(campaign("polled", contacts(8))).unwrap();

        // La entrada existe en cuanto `spawn` devuelve
        let first = dispatch.tracker().get("polled").unwrap();
        assert_eq!(first.total, 8);

        let mut last_progress = 0.0;
        loop {
            let p = dispatch.tracker().get("polled").unwrap();
            assert!(p.sent + p.failed <= p.total);
            assert!((0.0..=100.0).contains(&p.progress));
            assert!(p.progress >= last_progress);
            last_progress = p.progress;
            if p.status.is_terminal() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        let final_state = handle.await.unwrap().unwrap();
        assert_eq!(final_state.status, CampaignStatus::CompletedWithErrors);
        assert_eq!((final_state.sent, final_state.failed), (7, 1));
    }

    #[test]
    async fn panic_inside_dispatch_task_still_marks_failed() {
        let connector = FakeConnector::new().panic_on_attempt(1);
        let dispatch = service(&connector, Duration::ZERO);

        let handle = dispatch.spawn(campaign("panics", contacts(3))).unwrap();
        let final_state = handle.await.unwrap().unwrap();

        assert_eq!(final_state.status, CampaignStatus::Failed);
        assert_eq!((final_state.sent, final_state.failed), (1, 0));
        // la sesión se suelta igual
        assert_eq!(connector.closed(), 1);
    }

    #[test]
    async fn campaigns_run_concurrently_with_their_own_sessions() {
        let connector = FakeConnector::new();
        let dispatch = service(&connector, Duration::from_millis(2));

        let a = dispatch.spawn(campaign("a", contacts(3))).unwrap();
        let b = dispatch.spawn(campaign("b", contacts(4))).unwrap();

        let a = a.await.unwrap().unwrap();
        let b = b.await.unwrap().unwrap();

        assert_eq!((a.status, a.sent), (CampaignStatus::Completed, 3));
        assert_eq!((b.status, b.sent), (CampaignStatus::Completed, 4));
        assert_eq!(connector.opened(), 2);
        assert_eq!(connector.closed(), 2);
    }
}
