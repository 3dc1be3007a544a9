//! Entity types for API responses.
//!
//! The Zabbix API returns most numeric fields as JSON strings
//! (`"clock": "1690000000"`); timestamps are decoded through a
//! string-or-number helper, everything else is kept as the string the
//! server sent. Identifiers stay `String` throughout.

use serde::{Deserialize, Deserializer};

use crate::types::ValueType;

/// Deserialize an integer that may arrive as a JSON number or string.
fn num_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrStr {
        Num(i64),
        Str(String),
    }

    match NumOrStr::deserialize(deserializer)? {
        NumOrStr::Num(n) => Ok(n),
        NumOrStr::Str(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

fn opt_num_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    num_i64(deserializer).map(Some)
}

/// A host group (`hostgroup.get`).
#[derive(Debug, Clone, Deserialize)]
pub struct HostGroup {
    pub groupid: String,
    pub name: String,
}

/// A monitored host (`host.get`).
#[derive(Debug, Clone, Deserialize)]
pub struct Host {
    pub hostid: String,
    /// Technical host name.
    pub host: String,
    /// Visible name; falls back to empty when the server omits it.
    #[serde(default)]
    pub name: String,
}

/// An application, Zabbix's grouping of items on a host (`application.get`).
#[derive(Debug, Clone, Deserialize)]
pub struct Application {
    pub applicationid: String,
    pub name: String,
    #[serde(default)]
    pub hostid: Option<String>,
}

/// A monitored item (`item.get`).
#[derive(Debug, Clone, Deserialize)]
pub struct Item {
    pub itemid: String,
    #[serde(default)]
    pub name: String,
    /// The item key, e.g. `system.cpu.util[,user]`.
    #[serde(default)]
    pub key_: String,
    #[serde(default)]
    pub hostid: Option<String>,
    pub value_type: ValueType,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

impl Item {
    /// Construct a minimal item, enough to drive history/trend queries.
    pub fn new(itemid: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            itemid: itemid.into(),
            name: String::new(),
            key_: String::new(),
            hostid: None,
            value_type,
            status: None,
            state: None,
        }
    }
}

/// One raw history value (`history.get`).
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryPoint {
    pub itemid: String,
    #[serde(deserialize_with = "num_i64")]
    pub clock: i64,
    /// Value as the server sent it; interpretation depends on the item's
    /// value type.
    pub value: String,
    #[serde(default)]
    pub ns: Option<String>,
}

/// One aggregated trend value (`trend.get`).
#[derive(Debug, Clone, Deserialize)]
pub struct TrendPoint {
    pub itemid: String,
    #[serde(deserialize_with = "num_i64")]
    pub clock: i64,
    /// Number of raw values in the aggregation interval.
    #[serde(default)]
    pub num: Option<String>,
    pub value_min: String,
    pub value_avg: String,
    pub value_max: String,
}

/// An IT service (`service.get`).
#[derive(Debug, Clone, Deserialize)]
pub struct ItService {
    pub serviceid: String,
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    /// Acceptable SLA, percent, as the server sent it.
    #[serde(default)]
    pub goodsla: Option<String>,
}

/// Per-service SLA block from `service.getsla`, keyed by service id in
/// the response map.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceSla {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub sla: Vec<SlaInterval>,
}

/// SLA figures for one interval.
#[derive(Debug, Clone, Deserialize)]
pub struct SlaInterval {
    #[serde(deserialize_with = "num_i64")]
    pub from: i64,
    #[serde(deserialize_with = "num_i64")]
    pub to: i64,
    /// Achieved SLA, percent.
    pub sla: f64,
    #[serde(rename = "okTime", default, deserialize_with = "opt_num_i64")]
    pub ok_time: Option<i64>,
    #[serde(rename = "problemTime", default, deserialize_with = "opt_num_i64")]
    pub problem_time: Option<i64>,
    #[serde(rename = "downtimeTime", default, deserialize_with = "opt_num_i64")]
    pub downtime_time: Option<i64>,
}

/// A trigger in problem state (`trigger.get`).
#[derive(Debug, Clone, Deserialize)]
pub struct Trigger {
    pub triggerid: String,
    pub description: String,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "opt_num_i64")]
    pub lastchange: Option<i64>,
    /// "1" while the problem is active.
    #[serde(default)]
    pub value: Option<String>,
}

/// A single acknowledgement attached to an event.
#[derive(Debug, Clone, Deserialize)]
pub struct Acknowledge {
    #[serde(default)]
    pub acknowledgeid: Option<String>,
    #[serde(default)]
    pub userid: Option<String>,
    #[serde(default)]
    pub eventid: Option<String>,
    #[serde(deserialize_with = "num_i64")]
    pub clock: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub surname: Option<String>,
}

/// An event with its acknowledgements (`event.get`).
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    pub eventid: String,
    #[serde(deserialize_with = "num_i64")]
    pub clock: i64,
    #[serde(default)]
    pub acknowledges: Vec<Acknowledge>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn item_with_string_typed_fields() {
        let item: Item = serde_json::from_value(json!({
            "itemid": "23296",
            "name": "CPU user time",
            "key_": "system.cpu.util[,user]",
            "hostid": "10084",
            "value_type": "0",
            "status": "0",
            "state": "0"
        }))
        .unwrap();

        assert_eq!(item.itemid, "23296");
        assert_eq!(item.value_type, ValueType::Float);
    }

    #[test]
    fn history_point_with_string_clock() {
        let point: HistoryPoint = serde_json::from_value(json!({
            "itemid": "23296",
            "clock": "1690000000",
            "value": "12.34",
            "ns": "123456789"
        }))
        .unwrap();

        assert_eq!(point.clock, 1_690_000_000);
        assert_eq!(point.value, "12.34");
    }

    #[test]
    fn trigger_lastchange_as_string() {
        let trigger: Trigger = serde_json::from_value(json!({
            "triggerid": "13491",
            "description": "High CPU on {HOST.NAME}",
            "priority": "4",
            "lastchange": "1690000123",
            "value": "1"
        }))
        .unwrap();

        assert_eq!(trigger.lastchange, Some(1_690_000_123));
    }

    #[test]
    fn sla_response_block() {
        let sla: ServiceSla = serde_json::from_value(json!({
            "status": "0",
            "sla": [{
                "from": 100,
                "to": 200,
                "sla": 99.95,
                "okTime": 86000,
                "problemTime": 400,
                "downtimeTime": 0
            }]
        }))
        .unwrap();

        assert_eq!(sla.sla.len(), 1);
        assert_eq!(sla.sla[0].sla, 99.95);
        assert_eq!(sla.sla[0].ok_time, Some(86_000));
    }

    #[test]
    fn event_without_acknowledges_field() {
        let event: Event = serde_json::from_value(json!({
            "eventid": "9001",
            "clock": "1690000000"
        }))
        .unwrap();

        assert!(event.acknowledges.is_empty());
    }
}
