// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! EventService with the default handler set

use crate::prelude::*;
use pulse_adapters::FakeNotifyAdapter;
use pulse_bus::EventBus;
use pulse_core::EventData;
use pulse_service::{register_default_handlers, EventService};
use std::sync::Arc;

fn service() -> (EventService, FakeNotifyAdapter, pulse_service::DefaultHandlers) {
    let bus: Arc<dyn EventBus> = Arc::new(memory_bus());
    let notify = FakeNotifyAdapter::new();
    let handlers = register_default_handlers(bus.as_ref(), Arc::new(notify.clone()));
    (EventService::new(bus), notify, handlers)
}

#[tokio::test]
async fn new_user_gets_welcomed_and_audited_once() {
    let (service, notify, handlers) = service();
    let mut sub = service.bus().subscribe("users").unwrap();

    service
        .user_created(42, "ada@example.com", "Ada", EventData::new())
        .await
        .unwrap();

    let event = next(&mut sub).await.unwrap();
    assert_eq!(event.get_str("email"), Some("ada@example.com"));
    assert_eq!(event.user_id, Some(42));

    assert!(eventually(|| notify.calls().len() == 1).await);
    assert!(eventually(|| handlers.metrics.count("user.created") == 1).await);
    // users are not an audited domain
    assert!(handlers.audit.recent().is_empty());
}

#[tokio::test]
async fn repeated_auth_failures_raise_one_security_alert() {
    let (service, notify, handlers) = service();

    for _ in 0..6 {
        service
            .auth_failure("mallory@example.com", Some("10.0.0.1"), "bad password", EventData::new())
            .await
            .unwrap();
    }

    assert!(eventually(|| handlers.auth.failures("mallory@example.com") == 6).await);
    assert!(eventually(|| notify.messages_on("security").len() == 1).await);
    assert_eq!(handlers.metrics.count("auth.failure"), 6);
}

#[tokio::test]
async fn role_changes_are_audited() {
    let (service, _notify, handlers) = service();

    service
        .role_assigned(7, 2, "editor", Some(1), EventData::new())
        .await
        .unwrap();

    assert!(eventually(|| handlers.audit.recent().len() == 1).await);
    assert_eq!(handlers.audit.recent()[0].event_type, "role.assigned");
}

#[tokio::test]
async fn stats_show_the_registered_handlers() {
    let (service, _notify, _handlers) = service();

    let stats = service.stats();
    assert_eq!(stats.total_handlers, 49);
    assert_eq!(stats.event_handlers.get("auth.failure"), Some(&2));
}
