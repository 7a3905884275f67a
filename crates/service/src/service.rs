// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed publish methods, one per domain action

use crate::payload::Payload;
use pulse_bus::{BusError, BusStats, EventBus};
use pulse_core::{event_type, key, topic, EventData};
use serde_json::Value;
use std::sync::Arc;

/// Publishes well-formed events for each domain action.
///
/// Every method takes `extra`, caller-defined fields merged into the payload.
/// Canonical keys win on conflict. Methods whose action is performed by
/// someone take `actor`, which becomes the event's `user_id`.
#[derive(Clone)]
pub struct EventService {
    bus: Arc<dyn EventBus>,
}

impl EventService {
    pub fn new(bus: Arc<dyn EventBus>) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &Arc<dyn EventBus> {
        &self.bus
    }

    pub fn stats(&self) -> BusStats {
        self.bus.stats()
    }

    async fn emit(
        &self,
        topic: &str,
        event_type: &str,
        payload: Payload,
        extra: EventData,
        user_id: Option<i64>,
    ) -> Result<(), BusError> {
        self.bus
            .publish(topic, event_type, payload.extend(extra).build(), user_id)
            .await
    }

    // --- users ---

    pub async fn user_created(
        &self,
        user_id: i64,
        email: &str,
        name: &str,
        extra: EventData,
    ) -> Result<(), BusError> {
        let payload = Payload::new()
            .with(key::USER_ID, user_id)
            .with(key::EMAIL, email)
            .with(key::NAME, name);
        self.emit(topic::USERS, event_type::USER_CREATED, payload, extra, Some(user_id))
            .await
    }

    pub async fn user_login(
        &self,
        user_id: i64,
        email: &str,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
        extra: EventData,
    ) -> Result<(), BusError> {
        let payload = Payload::new()
            .with(key::USER_ID, user_id)
            .with(key::EMAIL, email)
            .maybe(key::IP_ADDRESS, ip_address)
            .maybe(key::USER_AGENT, user_agent);
        self.emit(topic::USERS, event_type::USER_LOGIN, payload, extra, Some(user_id))
            .await
    }

    pub async fn user_logout(&self, user_id: i64, extra: EventData) -> Result<(), BusError> {
        let payload = Payload::new().with(key::USER_ID, user_id);
        self.emit(topic::USERS, event_type::USER_LOGOUT, payload, extra, Some(user_id))
            .await
    }

    /// `details` describes what changed, e.g. `{"name": {"from": .., "to": ..}}`
    pub async fn user_updated(
        &self,
        user_id: i64,
        details: Value,
        extra: EventData,
    ) -> Result<(), BusError> {
        let payload = Payload::new()
            .with(key::USER_ID, user_id)
            .with(key::DETAILS, details);
        self.emit(topic::USERS, event_type::USER_UPDATED, payload, extra, Some(user_id))
            .await
    }

    pub async fn user_deleted(
        &self,
        user_id: i64,
        email: &str,
        actor: Option<i64>,
        extra: EventData,
    ) -> Result<(), BusError> {
        let payload = Payload::new()
            .with(key::USER_ID, user_id)
            .with(key::EMAIL, email);
        self.emit(
            topic::USERS,
            event_type::USER_DELETED,
            payload,
            extra,
            actor.or(Some(user_id)),
        )
        .await
    }

    pub async fn user_password_changed(
        &self,
        user_id: i64,
        email: &str,
        extra: EventData,
    ) -> Result<(), BusError> {
        let payload = Payload::new()
            .with(key::USER_ID, user_id)
            .with(key::EMAIL, email);
        self.emit(
            topic::USERS,
            event_type::USER_PASSWORD_CHANGED,
            payload,
            extra,
            Some(user_id),
        )
        .await
    }

    // --- auth ---

    pub async fn auth_success(
        &self,
        user_id: i64,
        email: &str,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
        extra: EventData,
    ) -> Result<(), BusError> {
        let payload = Payload::new()
            .with(key::USER_ID, user_id)
            .with(key::EMAIL, email)
            .maybe(key::IP_ADDRESS, ip_address)
            .maybe(key::USER_AGENT, user_agent)
            .with(key::SUCCESS, true);
        self.emit(topic::AUTH, event_type::AUTH_SUCCESS, payload, extra, Some(user_id))
            .await
    }

    /// A failed login is not attributed to a user
    pub async fn auth_failure(
        &self,
        email: &str,
        ip_address: Option<&str>,
        error: &str,
        extra: EventData,
    ) -> Result<(), BusError> {
        let payload = Payload::new()
            .with(key::EMAIL, email)
            .maybe(key::IP_ADDRESS, ip_address)
            .with(key::ERROR, error)
            .with(key::SUCCESS, false);
        self.emit(topic::AUTH, event_type::AUTH_FAILURE, payload, extra, None)
            .await
    }

    pub async fn auth_token_refresh(&self, user_id: i64, extra: EventData) -> Result<(), BusError> {
        let payload = Payload::new().with(key::USER_ID, user_id);
        self.emit(
            topic::AUTH,
            event_type::AUTH_TOKEN_REFRESH,
            payload,
            extra,
            Some(user_id),
        )
        .await
    }

    pub async fn auth_token_expired(&self, user_id: i64, extra: EventData) -> Result<(), BusError> {
        let payload = Payload::new().with(key::USER_ID, user_id);
        self.emit(
            topic::AUTH,
            event_type::AUTH_TOKEN_EXPIRED,
            payload,
            extra,
            Some(user_id),
        )
        .await
    }

    // --- roles ---

    pub async fn role_assigned(
        &self,
        user_id: i64,
        role_id: i64,
        role_name: &str,
        actor: Option<i64>,
        extra: EventData,
    ) -> Result<(), BusError> {
        let payload = Payload::new()
            .with(key::USER_ID, user_id)
            .with(key::ROLE_ID, role_id)
            .with(key::ROLE_NAME, role_name);
        self.emit(topic::ROLES, event_type::ROLE_ASSIGNED, payload, extra, actor)
            .await
    }

    pub async fn role_removed(
        &self,
        user_id: i64,
        role_id: i64,
        role_name: &str,
        actor: Option<i64>,
        extra: EventData,
    ) -> Result<(), BusError> {
        let payload = Payload::new()
            .with(key::USER_ID, user_id)
            .with(key::ROLE_ID, role_id)
            .with(key::ROLE_NAME, role_name);
        self.emit(topic::ROLES, event_type::ROLE_REMOVED, payload, extra, actor)
            .await
    }

    pub async fn role_created(
        &self,
        role_id: i64,
        role_name: &str,
        actor: Option<i64>,
        extra: EventData,
    ) -> Result<(), BusError> {
        let payload = Payload::new()
            .with(key::ROLE_ID, role_id)
            .with(key::ROLE_NAME, role_name);
        self.emit(topic::ROLES, event_type::ROLE_CREATED, payload, extra, actor)
            .await
    }

    pub async fn role_updated(
        &self,
        role_id: i64,
        role_name: &str,
        details: Value,
        actor: Option<i64>,
        extra: EventData,
    ) -> Result<(), BusError> {
        let payload = Payload::new()
            .with(key::ROLE_ID, role_id)
            .with(key::ROLE_NAME, role_name)
            .with(key::DETAILS, details);
        self.emit(topic::ROLES, event_type::ROLE_UPDATED, payload, extra, actor)
            .await
    }

    pub async fn role_deleted(
        &self,
        role_id: i64,
        role_name: &str,
        actor: Option<i64>,
        extra: EventData,
    ) -> Result<(), BusError> {
        let payload = Payload::new()
            .with(key::ROLE_ID, role_id)
            .with(key::ROLE_NAME, role_name);
        self.emit(topic::ROLES, event_type::ROLE_DELETED, payload, extra, actor)
            .await
    }

    // --- organizations ---

    pub async fn organization_created(
        &self,
        organization_id: i64,
        organization_name: &str,
        actor: Option<i64>,
        extra: EventData,
    ) -> Result<(), BusError> {
        let payload = Payload::new()
            .with(key::ORGANIZATION_ID, organization_id)
            .with(key::ORGANIZATION_NAME, organization_name);
        self.emit(
            topic::ORGANIZATIONS,
            event_type::ORGANIZATION_CREATED,
            payload,
            extra,
            actor,
        )
        .await
    }

    pub async fn organization_updated(
        &self,
        organization_id: i64,
        organization_name: &str,
        details: Value,
        actor: Option<i64>,
        extra: EventData,
    ) -> Result<(), BusError> {
        let payload = Payload::new()
            .with(key::ORGANIZATION_ID, organization_id)
            .with(key::ORGANIZATION_NAME, organization_name)
            .with(key::DETAILS, details);
        self.emit(
            topic::ORGANIZATIONS,
            event_type::ORGANIZATION_UPDATED,
            payload,
            extra,
            actor,
        )
        .await
    }

    pub async fn organization_deleted(
        &self,
        organization_id: i64,
        organization_name: &str,
        actor: Option<i64>,
        extra: EventData,
    ) -> Result<(), BusError> {
        let payload = Payload::new()
            .with(key::ORGANIZATION_ID, organization_id)
            .with(key::ORGANIZATION_NAME, organization_name);
        self.emit(
            topic::ORGANIZATIONS,
            event_type::ORGANIZATION_DELETED,
            payload,
            extra,
            actor,
        )
        .await
    }

    pub async fn organization_user_added(
        &self,
        organization_id: i64,
        organization_name: &str,
        user_id: i64,
        actor: Option<i64>,
        extra: EventData,
    ) -> Result<(), BusError> {
        let payload = Payload::new()
            .with(key::ORGANIZATION_ID, organization_id)
            .with(key::ORGANIZATION_NAME, organization_name)
            .with(key::USER_ID, user_id);
        self.emit(
            topic::ORGANIZATIONS,
            event_type::ORGANIZATION_USER_ADDED,
            payload,
            extra,
            actor,
        )
        .await
    }

    pub async fn organization_user_removed(
        &self,
        organization_id: i64,
        organization_name: &str,
        user_id: i64,
        actor: Option<i64>,
        extra: EventData,
    ) -> Result<(), BusError> {
        let payload = Payload::new()
            .with(key::ORGANIZATION_ID, organization_id)
            .with(key::ORGANIZATION_NAME, organization_name)
            .with(key::USER_ID, user_id);
        self.emit(
            topic::ORGANIZATIONS,
            event_type::ORGANIZATION_USER_REMOVED,
            payload,
            extra,
            actor,
        )
        .await
    }

    // --- admin ---

    pub async fn admin_action(
        &self,
        admin_id: i64,
        action: &str,
        details: Value,
        extra: EventData,
    ) -> Result<(), BusError> {
        let payload = Payload::new()
            .with(key::USER_ID, admin_id)
            .with(key::ACTION, action)
            .with(key::DETAILS, details);
        self.emit(topic::ADMIN, event_type::ADMIN_ACTION, payload, extra, Some(admin_id))
            .await
    }

    pub async fn admin_login(
        &self,
        admin_id: i64,
        email: &str,
        ip_address: Option<&str>,
        extra: EventData,
    ) -> Result<(), BusError> {
        let payload = Payload::new()
            .with(key::USER_ID, admin_id)
            .with(key::EMAIL, email)
            .maybe(key::IP_ADDRESS, ip_address);
        self.emit(topic::ADMIN, event_type::ADMIN_LOGIN, payload, extra, Some(admin_id))
            .await
    }

    pub async fn admin_logout(&self, admin_id: i64, extra: EventData) -> Result<(), BusError> {
        let payload = Payload::new().with(key::USER_ID, admin_id);
        self.emit(topic::ADMIN, event_type::ADMIN_LOGOUT, payload, extra, Some(admin_id))
            .await
    }

    // --- system ---

    pub async fn system_startup(&self, details: Value, extra: EventData) -> Result<(), BusError> {
        let payload = Payload::new().with(key::DETAILS, details);
        self.emit(topic::SYSTEM, event_type::SYSTEM_STARTUP, payload, extra, None)
            .await
    }

    pub async fn system_shutdown(&self, details: Value, extra: EventData) -> Result<(), BusError> {
        let payload = Payload::new().with(key::DETAILS, details);
        self.emit(topic::SYSTEM, event_type::SYSTEM_SHUTDOWN, payload, extra, None)
            .await
    }

    pub async fn system_error(
        &self,
        error: &str,
        details: Value,
        extra: EventData,
    ) -> Result<(), BusError> {
        let payload = Payload::new()
            .with(key::ERROR, error)
            .with(key::DETAILS, details);
        self.emit(topic::SYSTEM, event_type::SYSTEM_ERROR, payload, extra, None)
            .await
    }

    pub async fn system_warning(&self, message: &str, extra: EventData) -> Result<(), BusError> {
        let payload = Payload::new().with(key::DETAILS, message);
        self.emit(topic::SYSTEM, event_type::SYSTEM_WARNING, payload, extra, None)
            .await
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
