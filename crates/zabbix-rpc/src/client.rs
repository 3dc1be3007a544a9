//! High-level Zabbix API client used by dashboard rendering code.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

use zabbix_core::{
    Acknowledge, ApiTransport, ApiUrl, Application, AuthError, ConnectionOptions, Credentials,
    Error, Event, HistoryPoint, Host, HostGroup, ItService, Item, Result, ServiceSla, TrendPoint,
    Trigger, ValueType,
};

use crate::params::*;
use crate::session::Session;
use crate::transport::HttpTransport;

/// One re-login and retry per dispatched request. A second expired-session
/// failure after a successful login is terminal.
const MAX_AUTH_RETRIES: u32 = 1;

/// Sort field applied to trigger queries when the caller does not pick one.
const DEFAULT_TRIGGER_SORT: &str = "lastchange";

/// Client for the Zabbix JSON-RPC API.
///
/// Query methods build parameters, dispatch through [`ZabbixClient::request`],
/// and decode typed results. The dispatcher transparently recovers from
/// session expiry: it logs in (coalescing concurrent attempts through the
/// shared [`Session`]) and retries the original call once.
pub struct ZabbixClient<T = HttpTransport> {
    transport: Arc<T>,
    session: Session<T>,
}

impl ZabbixClient<HttpTransport> {
    /// Create a client for the given server with the HTTP transport.
    pub fn new(url: &ApiUrl, credentials: Credentials, options: ConnectionOptions) -> Self {
        let mut transport = HttpTransport::new(url, options);
        if options.basic_auth {
            transport =
                transport.with_basic_auth(credentials.username(), credentials.password());
        }
        Self::with_transport(Arc::new(transport), credentials)
    }
}

impl<T: ApiTransport + 'static> ZabbixClient<T> {
    /// Create a client over a custom transport.
    pub fn with_transport(transport: Arc<T>, credentials: Credentials) -> Self {
        let session = Session::new(Arc::clone(&transport), credentials);
        Self { transport, session }
    }

    /// The session shared by this client's dispatch path.
    pub fn session(&self) -> &Session<T> {
        &self.session
    }

    /// Dispatch one API call, recovering from session expiry.
    ///
    /// The call is first sent with the current token (or anonymously). If
    /// the server answers with an expired-session error, the dispatcher
    /// logs in once and re-issues the original call; a second
    /// expired-session answer surfaces as [`AuthError::SessionExpired`].
    /// Every other failure propagates unchanged.
    pub async fn request(&self, method: &str, params: Value) -> Result<Value> {
        let mut retries_left = MAX_AUTH_RETRIES;
        loop {
            let token = self.session.token();
            match self.transport.request(method, &params, token.as_deref()).await {
                Ok(result) => return Ok(result),
                Err(Error::Rpc(err)) if err.is_session_expired() => {
                    if retries_left == 0 {
                        debug!(method, "re-login did not restore access");
                        return Err(AuthError::SessionExpired.into());
                    }
                    retries_left -= 1;
                    debug!(method, "session expired, re-authenticating");
                    self.session.login_once().await?;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Dispatch one API call and decode the result.
    pub async fn request_as<P, R>(&self, method: &str, params: P) -> Result<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let params = serde_json::to_value(params)?;
        let result = self.request(method, params).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Fetch the server version; anonymous by design.
    pub async fn api_version(&self) -> Result<String> {
        self.transport.api_version().await
    }

    /// Fetch host groups that contain real hosts, sorted by name.
    #[instrument(skip(self))]
    pub async fn get_groups(&self) -> Result<Vec<HostGroup>> {
        self.request_as(HOSTGROUP_GET, GetGroupsParams::new()).await
    }

    /// Fetch hosts, optionally restricted to the given groups.
    #[instrument(skip(self))]
    pub async fn get_hosts(&self, group_ids: &[String]) -> Result<Vec<Host>> {
        self.request_as(HOST_GET, GetHostsParams::new(group_ids)).await
    }

    /// Fetch applications, optionally restricted to the given hosts.
    #[instrument(skip(self))]
    pub async fn get_applications(&self, host_ids: &[String]) -> Result<Vec<Application>> {
        self.request_as(APPLICATION_GET, GetApplicationsParams::new(host_ids))
            .await
    }

    /// Fetch items, optionally restricted to the given applications.
    #[instrument(skip(self))]
    pub async fn get_items(&self, application_ids: &[String]) -> Result<Vec<Item>> {
        self.request_as(ITEM_GET, GetItemsParams::new(application_ids))
            .await
    }

    /// Fetch raw history for the given items.
    ///
    /// History is stored in one table per value type, so items are grouped
    /// by value type, one `history.get` is issued per group, and the
    /// results are flattened in group order. A `till` of `None` or `0`
    /// leaves the range open-ended.
    #[instrument(skip(self, items), fields(items = items.len()))]
    pub async fn get_history(
        &self,
        items: &[Item],
        from: i64,
        till: Option<i64>,
    ) -> Result<Vec<HistoryPoint>> {
        let till = till.filter(|&t| t != 0);
        let mut points = Vec::new();
        for (value_type, itemids) in group_by_value_type(items) {
            let params = GetHistoryParams::new(value_type.as_u8(), itemids, from, till);
            let batch: Vec<HistoryPoint> = self.request_as(HISTORY_GET, params).await?;
            points.extend(batch);
        }
        Ok(points)
    }

    /// Fetch trend aggregates for the given items.
    ///
    /// Follows the same per-value-type grouping and flattening as
    /// [`ZabbixClient::get_history`].
    #[instrument(skip(self, items), fields(items = items.len()))]
    pub async fn get_trends(
        &self,
        items: &[Item],
        from: i64,
        till: Option<i64>,
    ) -> Result<Vec<TrendPoint>> {
        let till = till.filter(|&t| t != 0);
        let mut points = Vec::new();
        for (_, itemids) in group_by_value_type(items) {
            let params = GetTrendsParams::new(itemids, from, till);
            let batch: Vec<TrendPoint> = self.request_as(TREND_GET, params).await?;
            points.extend(batch);
        }
        Ok(points)
    }

    /// Fetch IT services, all of them or a selection by id.
    #[instrument(skip(self))]
    pub async fn get_it_service(&self, service_ids: Option<&[String]>) -> Result<Vec<ItService>> {
        self.request_as(SERVICE_GET, GetServicesParams::new(service_ids))
            .await
    }

    /// Fetch SLA figures for the given services over one `[from, to]`
    /// interval. The result is keyed by service id.
    #[instrument(skip(self))]
    pub async fn get_sla(
        &self,
        service_ids: &[String],
        from: i64,
        to: i64,
    ) -> Result<HashMap<String, ServiceSla>> {
        self.request_as(SERVICE_GETSLA, GetSlaParams::new(service_ids, from, to))
            .await
    }

    /// Fetch triggers currently in problem state on monitored hosts.
    ///
    /// `sortfield` defaults to `lastchange`; `name` searches trigger
    /// descriptions.
    #[instrument(skip(self))]
    pub async fn get_triggers(
        &self,
        limit: Option<u32>,
        sortfield: Option<&str>,
        group_ids: &[String],
        host_ids: &[String],
        application_ids: &[String],
        name: Option<&str>,
    ) -> Result<Vec<Trigger>> {
        let params = GetTriggersParams {
            output: "extend",
            groupids: group_ids,
            hostids: host_ids,
            applicationids: application_ids,
            monitored: true,
            filter: TriggerValueFilter { value: 1 },
            search: name.map(|description| DescriptionSearch { description }),
            limit,
            sortfield: sortfield.unwrap_or(DEFAULT_TRIGGER_SORT),
            expand_description: true,
        };
        self.request_as(TRIGGER_GET, params).await
    }

    /// Fetch acknowledgements for events on the given triggers since
    /// `from`, flattened across events with per-event order preserved.
    #[instrument(skip(self))]
    pub async fn get_acknowledges(
        &self,
        trigger_ids: &[String],
        from: i64,
    ) -> Result<Vec<Acknowledge>> {
        let events: Vec<Event> = self
            .request_as(EVENT_GET, GetEventsParams::new(trigger_ids, from))
            .await?;
        Ok(events
            .into_iter()
            .flat_map(|event| event.acknowledges)
            .collect())
    }
}

/// Group item ids by value type, in ascending value type order.
fn group_by_value_type(items: &[Item]) -> BTreeMap<ValueType, Vec<&str>> {
    let mut groups: BTreeMap<ValueType, Vec<&str>> = BTreeMap::new();
    for item in items {
        groups
            .entry(item.value_type)
            .or_default()
            .push(item.itemid.as_str());
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::json;
    use zabbix_core::RpcError;

    /// Transport that replays scripted responses and records every request.
    #[derive(Default)]
    struct ScriptedTransport {
        responses: Mutex<VecDeque<Result<Value>>>,
        requests: Mutex<Vec<RecordedRequest>>,
        login_calls: AtomicUsize,
    }

    struct RecordedRequest {
        method: String,
        params: Value,
        token: Option<String>,
    }

    impl ScriptedTransport {
        fn respond_with(responses: Vec<Result<Value>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                ..Self::default()
            })
        }

        fn recorded(&self) -> Vec<(String, Value, Option<String>)> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .map(|r| (r.method.clone(), r.params.clone(), r.token.clone()))
                .collect()
        }
    }

    #[async_trait]
    impl ApiTransport for ScriptedTransport {
        async fn request(&self, method: &str, params: &Value, token: Option<&str>) -> Result<Value> {
            self.requests.lock().unwrap().push(RecordedRequest {
                method: method.to_string(),
                params: params.clone(),
                token: token.map(String::from),
            });
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("unscripted request")
        }

        async fn login(&self, _: &str, _: &str) -> Result<String> {
            let call = self.login_calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(format!("token-{call}"))
        }

        async fn api_version(&self) -> Result<String> {
            Ok("7.0.0".to_string())
        }
    }

    fn client(transport: &Arc<ScriptedTransport>) -> ZabbixClient<ScriptedTransport> {
        ZabbixClient::with_transport(Arc::clone(transport), Credentials::new("grafana", "secret"))
    }

    fn not_authorised() -> Error {
        Error::Rpc(RpcError::new(-32602, "Not authorised.", None))
    }

    #[tokio::test]
    async fn retries_once_after_relogin() {
        let transport = ScriptedTransport::respond_with(vec![
            Err(not_authorised()),
            Ok(json!([{"groupid": "1", "name": "Linux servers"}])),
        ]);
        let client = client(&transport);

        let groups = client.get_groups().await.unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "Linux servers");

        let recorded = transport.recorded();
        assert_eq!(recorded.len(), 2);
        // First attempt anonymous, retry with the fresh token.
        assert_eq!(recorded[0].2, None);
        assert_eq!(recorded[1].2.as_deref(), Some("token-1"));
        assert_eq!(transport.login_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn persistent_auth_failure_is_terminal() {
        let transport =
            ScriptedTransport::respond_with(vec![Err(not_authorised()), Err(not_authorised())]);
        let client = client(&transport);

        let err = client.get_groups().await.unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::SessionExpired)));
        // Exactly one re-login, then the loop terminates.
        assert_eq!(transport.login_calls.load(Ordering::SeqCst), 1);
        assert_eq!(transport.recorded().len(), 2);
    }

    #[tokio::test]
    async fn non_auth_rpc_error_propagates() {
        let transport = ScriptedTransport::respond_with(vec![Err(Error::Rpc(RpcError::new(
            -32602,
            "Invalid params.",
            Some("No permissions to referred object".to_string()),
        )))]);
        let client = client(&transport);

        let err = client.get_groups().await.unwrap_err();
        match err {
            Error::Rpc(rpc) => assert_eq!(rpc.message, "Invalid params."),
            other => panic!("expected rpc error, got {other:?}"),
        }
        assert_eq!(transport.login_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn history_is_grouped_by_value_type_and_flattened() {
        let transport = ScriptedTransport::respond_with(vec![
            Ok(json!([{"itemid": "1", "clock": "100", "value": "1.5"}])),
            Ok(json!([{"itemid": "2", "clock": "150", "value": "42"}])),
        ]);
        let client = client(&transport);

        let items = vec![
            Item::new("1", ValueType::Float),
            Item::new("2", ValueType::Unsigned),
        ];
        let points = client.get_history(&items, 100, Some(200)).await.unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].itemid, "1");
        assert_eq!(points[1].itemid, "2");

        let recorded = transport.recorded();
        assert_eq!(recorded.len(), 2);
        // Float group first, then unsigned.
        assert_eq!(recorded[0].1["history"], json!(0));
        assert_eq!(recorded[0].1["itemids"], json!(["1"]));
        assert_eq!(recorded[1].1["history"], json!(3));
        assert_eq!(recorded[1].1["itemids"], json!(["2"]));
        assert_eq!(recorded[0].1["time_till"], json!(200));
    }

    #[tokio::test]
    async fn history_till_zero_is_open_ended() {
        let transport = ScriptedTransport::respond_with(vec![Ok(json!([]))]);
        let client = client(&transport);

        let items = vec![Item::new("1", ValueType::Float)];
        client.get_history(&items, 100, Some(0)).await.unwrap();

        let recorded = transport.recorded();
        assert_eq!(recorded[0].1["time_from"], json!(100));
        assert!(recorded[0].1.get("time_till").is_none());
    }

    #[tokio::test]
    async fn items_of_one_value_type_issue_one_call() {
        let transport = ScriptedTransport::respond_with(vec![Ok(json!([]))]);
        let client = client(&transport);

        let items = vec![
            Item::new("1", ValueType::Float),
            Item::new("2", ValueType::Float),
        ];
        client.get_history(&items, 100, None).await.unwrap();

        let recorded = transport.recorded();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].1["itemids"], json!(["1", "2"]));
    }

    #[tokio::test]
    async fn trigger_sortfield_defaults_to_lastchange() {
        let transport = ScriptedTransport::respond_with(vec![Ok(json!([]))]);
        let client = client(&transport);

        client
            .get_triggers(
                Some(10),
                None,
                &["1".to_string()],
                &["2".to_string()],
                &["3".to_string()],
                Some("cpu"),
            )
            .await
            .unwrap();

        let recorded = transport.recorded();
        let params = &recorded[0].1;
        assert_eq!(params["sortfield"], json!("lastchange"));
        assert_eq!(params["search"]["description"], json!("cpu"));
        assert_eq!(params["filter"]["value"], json!(1));
        assert_eq!(params["monitored"], json!(true));
        assert_eq!(params["limit"], json!(10));
    }

    #[tokio::test]
    async fn trigger_sortfield_override_is_kept() {
        let transport = ScriptedTransport::respond_with(vec![Ok(json!([]))]);
        let client = client(&transport);

        client
            .get_triggers(None, Some("priority"), &[], &[], &[], None)
            .await
            .unwrap();

        let recorded = transport.recorded();
        let params = &recorded[0].1;
        assert_eq!(params["sortfield"], json!("priority"));
        assert!(params.get("search").is_none());
        assert!(params.get("groupids").is_none());
    }

    #[tokio::test]
    async fn acknowledges_are_flattened_in_event_order() {
        let transport = ScriptedTransport::respond_with(vec![Ok(json!([
            {
                "eventid": "10",
                "clock": "1000",
                "acknowledges": [
                    {"acknowledgeid": "1", "clock": "1001", "message": "looking"},
                    {"acknowledgeid": "2", "clock": "1002", "message": "fixed"}
                ]
            },
            {
                "eventid": "11",
                "clock": "1100",
                "acknowledges": [
                    {"acknowledgeid": "3", "clock": "1101", "message": "known issue"}
                ]
            }
        ]))]);
        let client = client(&transport);

        let acks = client
            .get_acknowledges(&["5".to_string(), "6".to_string()], 1000)
            .await
            .unwrap();

        let messages: Vec<_> = acks.iter().map(|a| a.message.as_str()).collect();
        assert_eq!(messages, ["looking", "fixed", "known issue"]);

        let recorded = transport.recorded();
        assert_eq!(recorded[0].0, "event.get");
        assert_eq!(recorded[0].1["objectids"], json!(["5", "6"]));
        assert_eq!(recorded[0].1["time_from"], json!(1000));
        assert_eq!(recorded[0].1["select_acknowledges"], json!("extend"));
    }

    #[tokio::test]
    async fn sla_request_carries_single_interval() {
        let transport = ScriptedTransport::respond_with(vec![Ok(json!({
            "1": {"status": "0", "sla": [{"from": 100, "to": 200, "sla": 99.9}]}
        }))]);
        let client = client(&transport);

        let sla = client
            .get_sla(&["1".to_string()], 100, 200)
            .await
            .unwrap();
        assert_eq!(sla["1"].sla[0].sla, 99.9);

        let recorded = transport.recorded();
        assert_eq!(recorded[0].0, "service.getsla");
        assert_eq!(
            recorded[0].1["intervals"],
            json!([{"from": 100, "to": 200}])
        );
    }

    #[tokio::test]
    async fn it_service_ids_are_optional() {
        let transport = ScriptedTransport::respond_with(vec![Ok(json!([]))]);
        let client = client(&transport);

        client.get_it_service(None).await.unwrap();

        let recorded = transport.recorded();
        assert_eq!(recorded[0].0, "service.get");
        assert!(recorded[0].1.get("serviceids").is_none());
    }
}
