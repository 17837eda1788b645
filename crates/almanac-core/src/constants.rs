/// Route component constants shared across crates
pub const API_ROUTE_COMPONENT: &str = "api";
pub const API_ROUTE_PREFIX: &str = const_str::concat!("/", API_ROUTE_COMPONENT);

pub const EVENTS_ROUTE_COMPONENT: &str = "events";
pub const EVENTS_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", EVENTS_ROUTE_COMPONENT);

/// Upper bound on occurrences generated from one template in one expansion.
pub const DEFAULT_SAFETY_CAP: u32 = 1000;

/// Header read by the proxy identity method when none is configured.
pub const DEFAULT_PROXY_USER_HEADER: &str = "x-remote-user";
