//! API method names and request parameter types.

#![allow(dead_code)]

use serde::Serialize;

// ============================================================================
// Method Names
// ============================================================================

/// user.login
pub const USER_LOGIN: &str = "user.login";

/// apiinfo.version
pub const APIINFO_VERSION: &str = "apiinfo.version";

/// hostgroup.get
pub const HOSTGROUP_GET: &str = "hostgroup.get";

/// host.get
pub const HOST_GET: &str = "host.get";

/// application.get
pub const APPLICATION_GET: &str = "application.get";

/// item.get
pub const ITEM_GET: &str = "item.get";

/// history.get
pub const HISTORY_GET: &str = "history.get";

/// trend.get
pub const TREND_GET: &str = "trend.get";

/// service.get
pub const SERVICE_GET: &str = "service.get";

/// service.getsla
pub const SERVICE_GETSLA: &str = "service.getsla";

/// trigger.get
pub const TRIGGER_GET: &str = "trigger.get";

/// event.get
pub const EVENT_GET: &str = "event.get";

// ============================================================================
// Request Parameter Types
// ============================================================================

/// Parameters for hostgroup.get.
#[derive(Debug, Serialize)]
pub struct GetGroupsParams {
    pub output: &'static [&'static str],
    pub sortfield: &'static str,
    pub real_hosts: bool,
}

impl GetGroupsParams {
    pub fn new() -> Self {
        Self {
            output: &["name"],
            sortfield: "name",
            real_hosts: true,
        }
    }
}

/// Parameters for host.get.
#[derive(Debug, Serialize)]
pub struct GetHostsParams<'a> {
    pub output: &'static [&'static str],
    pub sortfield: &'static str,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    pub groupids: &'a [String],
}

impl<'a> GetHostsParams<'a> {
    pub fn new(groupids: &'a [String]) -> Self {
        Self {
            output: &["name", "host"],
            sortfield: "name",
            groupids,
        }
    }
}

/// Parameters for application.get.
#[derive(Debug, Serialize)]
pub struct GetApplicationsParams<'a> {
    pub output: &'static str,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    pub hostids: &'a [String],
}

impl<'a> GetApplicationsParams<'a> {
    pub fn new(hostids: &'a [String]) -> Self {
        Self {
            output: "extend",
            hostids,
        }
    }
}

/// Parameters for item.get.
#[derive(Debug, Serialize)]
pub struct GetItemsParams<'a> {
    pub output: &'static [&'static str],
    pub sortfield: &'static str,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    pub applicationids: &'a [String],
}

impl<'a> GetItemsParams<'a> {
    pub fn new(applicationids: &'a [String]) -> Self {
        Self {
            output: &["itemid", "name", "key_", "value_type", "hostid", "status", "state"],
            sortfield: "name",
            applicationids,
        }
    }
}

/// Parameters for history.get, one call per value type group.
#[derive(Debug, Serialize)]
pub struct GetHistoryParams<'a> {
    pub output: &'static str,
    /// History table selector; the item value type's numeric code.
    pub history: u8,
    pub itemids: Vec<&'a str>,
    pub sortfield: &'static str,
    pub sortorder: &'static str,
    pub time_from: i64,
    /// Omitted for open-ended queries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_till: Option<i64>,
}

impl<'a> GetHistoryParams<'a> {
    pub fn new(history: u8, itemids: Vec<&'a str>, time_from: i64, time_till: Option<i64>) -> Self {
        Self {
            output: "extend",
            history,
            itemids,
            sortfield: "clock",
            sortorder: "ASC",
            time_from,
            time_till,
        }
    }
}

/// Parameters for trend.get, one call per value type group.
#[derive(Debug, Serialize)]
pub struct GetTrendsParams<'a> {
    pub output: &'static str,
    pub itemids: Vec<&'a str>,
    pub sortfield: &'static str,
    pub sortorder: &'static str,
    pub time_from: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_till: Option<i64>,
}

impl<'a> GetTrendsParams<'a> {
    pub fn new(itemids: Vec<&'a str>, time_from: i64, time_till: Option<i64>) -> Self {
        Self {
            output: "extend",
            itemids,
            sortfield: "clock",
            sortorder: "ASC",
            time_from,
            time_till,
        }
    }
}

/// Parameters for service.get.
#[derive(Debug, Serialize)]
pub struct GetServicesParams<'a> {
    pub output: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serviceids: Option<&'a [String]>,
}

impl<'a> GetServicesParams<'a> {
    pub fn new(serviceids: Option<&'a [String]>) -> Self {
        Self {
            output: "extend",
            serviceids,
        }
    }
}

/// Parameters for service.getsla.
#[derive(Debug, Serialize)]
pub struct GetSlaParams<'a> {
    pub serviceids: &'a [String],
    pub intervals: [SlaIntervalParam; 1],
}

/// One `[from, to]` interval for service.getsla.
#[derive(Debug, Serialize)]
pub struct SlaIntervalParam {
    pub from: i64,
    pub to: i64,
}

impl<'a> GetSlaParams<'a> {
    pub fn new(serviceids: &'a [String], from: i64, to: i64) -> Self {
        Self {
            serviceids,
            intervals: [SlaIntervalParam { from, to }],
        }
    }
}

/// Parameters for trigger.get; restricted to active problems on
/// monitored hosts.
#[derive(Debug, Serialize)]
pub struct GetTriggersParams<'a> {
    pub output: &'static str,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    pub groupids: &'a [String],
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    pub hostids: &'a [String],
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    pub applicationids: &'a [String],
    pub monitored: bool,
    pub filter: TriggerValueFilter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<DescriptionSearch<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    pub sortfield: &'a str,
    #[serde(rename = "expandDescription")]
    pub expand_description: bool,
}

/// Restricts trigger.get to triggers currently in problem state.
#[derive(Debug, Serialize)]
pub struct TriggerValueFilter {
    pub value: u8,
}

/// Substring search over trigger descriptions.
#[derive(Debug, Serialize)]
pub struct DescriptionSearch<'a> {
    pub description: &'a str,
}

/// Parameters for event.get when collecting acknowledges.
#[derive(Debug, Serialize)]
pub struct GetEventsParams<'a> {
    pub output: &'static str,
    pub objectids: &'a [String],
    pub time_from: i64,
    pub select_acknowledges: &'static str,
    pub sortfield: &'static str,
    pub sortorder: &'static str,
}

impl<'a> GetEventsParams<'a> {
    pub fn new(objectids: &'a [String], time_from: i64) -> Self {
        Self {
            output: "extend",
            objectids,
            time_from,
            select_acknowledges: "extend",
            sortfield: "clock",
            sortorder: "ASC",
        }
    }
}
