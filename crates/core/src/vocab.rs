// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixed topic, event-type and data-key vocabulary
//!
//! Event types follow `<domain>.<action>`. A type name is never reused for
//! an incompatible payload shape; new actions get new names.

/// Routing namespaces for subscriptions
pub mod topic {
    pub const AUTH: &str = "auth";
    pub const USERS: &str = "users";
    pub const ROLES: &str = "roles";
    pub const ORGANIZATIONS: &str = "organizations";
    pub const ADMIN: &str = "admin";
    pub const SYSTEM: &str = "system";

    pub const ALL: [&str; 6] = [AUTH, USERS, ROLES, ORGANIZATIONS, ADMIN, SYSTEM];
}

/// Semantic event kinds
pub mod event_type {
    // User lifecycle
    pub const USER_CREATED: &str = "user.created";
    pub const USER_LOGIN: &str = "user.login";
    pub const USER_LOGOUT: &str = "user.logout";
    pub const USER_UPDATED: &str = "user.updated";
    pub const USER_DELETED: &str = "user.deleted";
    pub const USER_PASSWORD_CHANGED: &str = "user.password_changed";

    // Authentication
    pub const AUTH_SUCCESS: &str = "auth.success";
    pub const AUTH_FAILURE: &str = "auth.failure";
    pub const AUTH_TOKEN_REFRESH: &str = "auth.token_refresh";
    pub const AUTH_TOKEN_EXPIRED: &str = "auth.token_expired";

    // Roles
    pub const ROLE_ASSIGNED: &str = "role.assigned";
    pub const ROLE_REMOVED: &str = "role.removed";
    pub const ROLE_CREATED: &str = "role.created";
    pub const ROLE_UPDATED: &str = "role.updated";
    pub const ROLE_DELETED: &str = "role.deleted";

    // Organizations
    pub const ORGANIZATION_CREATED: &str = "organization.created";
    pub const ORGANIZATION_UPDATED: &str = "organization.updated";
    pub const ORGANIZATION_DELETED: &str = "organization.deleted";
    pub const ORGANIZATION_USER_ADDED: &str = "organization.user_added";
    pub const ORGANIZATION_USER_REMOVED: &str = "organization.user_removed";

    // Administration
    pub const ADMIN_ACTION: &str = "admin.action";
    pub const ADMIN_LOGIN: &str = "admin.login";
    pub const ADMIN_LOGOUT: &str = "admin.logout";

    // System lifecycle
    pub const SYSTEM_STARTUP: &str = "system.startup";
    pub const SYSTEM_SHUTDOWN: &str = "system.shutdown";
    pub const SYSTEM_ERROR: &str = "system.error";
    pub const SYSTEM_WARNING: &str = "system.warning";

    pub const ALL: [&str; 27] = [
        USER_CREATED,
        USER_LOGIN,
        USER_LOGOUT,
        USER_UPDATED,
        USER_DELETED,
        USER_PASSWORD_CHANGED,
        AUTH_SUCCESS,
        AUTH_FAILURE,
        AUTH_TOKEN_REFRESH,
        AUTH_TOKEN_EXPIRED,
        ROLE_ASSIGNED,
        ROLE_REMOVED,
        ROLE_CREATED,
        ROLE_UPDATED,
        ROLE_DELETED,
        ORGANIZATION_CREATED,
        ORGANIZATION_UPDATED,
        ORGANIZATION_DELETED,
        ORGANIZATION_USER_ADDED,
        ORGANIZATION_USER_REMOVED,
        ADMIN_ACTION,
        ADMIN_LOGIN,
        ADMIN_LOGOUT,
        SYSTEM_STARTUP,
        SYSTEM_SHUTDOWN,
        SYSTEM_ERROR,
        SYSTEM_WARNING,
    ];
}

/// Canonical payload keys
pub mod key {
    pub const USER_ID: &str = "user_id";
    pub const EMAIL: &str = "email";
    pub const NAME: &str = "name";
    pub const ROLE_ID: &str = "role_id";
    pub const ROLE_NAME: &str = "role_name";
    pub const ORGANIZATION_ID: &str = "organization_id";
    pub const ORGANIZATION_NAME: &str = "organization_name";
    pub const ACTION: &str = "action";
    pub const DETAILS: &str = "details";
    pub const IP_ADDRESS: &str = "ip_address";
    pub const USER_AGENT: &str = "user_agent";
    pub const TIMESTAMP: &str = "timestamp";
    pub const ERROR: &str = "error";
    pub const SUCCESS: &str = "success";
}

/// The topic that carries a given event type, by its domain prefix
pub fn topic_for(event_type: &str) -> Option<&'static str> {
    let domain = event_type.split_once('.').map(|(d, _)| d)?;
    match domain {
        "user" => Some(topic::USERS),
        "auth" => Some(topic::AUTH),
        "role" => Some(topic::ROLES),
        "organization" => Some(topic::ORGANIZATIONS),
        "admin" => Some(topic::ADMIN),
        "system" => Some(topic::SYSTEM),
        _ => None,
    }
}

#[cfg(test)]
#[path = "vocab_tests.rs"]
mod tests;
