//! Entities returned by the Zabbix API.

mod types;

pub use types::{
    Acknowledge, Application, Event, HistoryPoint, Host, HostGroup, ItService, Item, ServiceSla,
    SlaInterval, TrendPoint, Trigger,
};
