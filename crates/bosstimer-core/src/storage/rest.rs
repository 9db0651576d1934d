//! RestStore: a PostgREST-style hosted record store.
//!
//! Talks to `<url>/rest/v1/<table>` with the `apikey` header and a bearer
//! token. Writes are one blocking request each. Listings are paged with
//! `limit`/`offset` so a server-side max-rows cap cannot truncate them.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use super::config::RestConfig;
use super::traits::RecordStore;
use crate::boss::{Boss, CutRecord, NewCutRecord};
use crate::error::{ConfigError, Result, StoreError};
use crate::respawn::EventMode;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
struct SettingsRow {
    is_double_event: bool,
}

/// Client for the hosted tables.
pub struct RestStore {
    config: RestConfig,
    base: Url,
    http_client: Client,
}

impl RestStore {
    /// Create a new RestStore.
    ///
    /// # Errors
    /// Returns an error if the url is missing or unparsable, or the HTTP
    /// client cannot be built.
    pub fn new(config: RestConfig) -> Result<Self> {
        let raw = config.url.trim();
        if raw.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "store.rest.url".into(),
                message: format!("not set (use the config file or {})", super::REST_URL_ENV),
            }
            .into());
        }
        let mut base = Url::parse(raw).map_err(|e| ConfigError::InvalidValue {
            key: "store.rest.url".into(),
            message: e.to_string(),
        })?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http_client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(StoreError::from)?;

        Ok(Self {
            config,
            base,
            http_client,
        })
    }

    fn endpoint(&self, table: &str, query: &[(&str, &str)]) -> Result<Url, StoreError> {
        let mut url = self
            .base
            .join(&format!("rest/v1/{table}"))
            .map_err(|e| StoreError::Http(format!("bad table url '{table}': {e}")))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let req = self
            .http_client
            .request(method, url)
            .header("apikey", &self.config.api_key);
        if self.config.api_key.is_empty() {
            req
        } else {
            req.bearer_auth(&self.config.api_key)
        }
    }

    fn send_checked(req: RequestBuilder) -> Result<reqwest::blocking::Response, StoreError> {
        let resp = req.send()?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp)
    }

    fn send_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, StoreError> {
        Self::send_checked(req)?
            .json::<T>()
            .map_err(|e| StoreError::Malformed(e.to_string()))
    }

    /// Read every row of `table`, one page at a time, until a short page
    /// comes back.
    fn fetch_all<T: DeserializeOwned>(
        &self,
        table: &str,
        order: &str,
    ) -> Result<Vec<T>, StoreError> {
        let limit = self.config.page_size.max(1);
        let limit_param = limit.to_string();
        let mut rows: Vec<T> = Vec::new();
        loop {
            let offset = rows.len().to_string();
            let url = self.endpoint(
                table,
                &[
                    ("select", "*"),
                    ("order", order),
                    ("limit", limit_param.as_str()),
                    ("offset", offset.as_str()),
                ],
            )?;
            let page: Vec<T> = Self::send_json(self.request(Method::GET, url))?;
            let last_page = page.len() < limit;
            rows.extend(page);
            if last_page {
                return Ok(rows);
            }
        }
    }

    fn settings_filter(&self) -> String {
        format!("eq.{}", self.config.settings_row)
    }
}

impl RecordStore for RestStore {
    fn name(&self) -> &str {
        "rest"
    }

    fn list_bosses(&self) -> Result<Vec<Boss>, StoreError> {
        self.fetch_all(&self.config.boss_table, "id.asc")
    }

    // Newest first, so the latest cuts arrive on the first page.
    fn list_cut_records(&self) -> Result<Vec<CutRecord>, StoreError> {
        self.fetch_all(&self.config.cut_table, "id.desc")
    }

    fn insert_cut_record(&self, record: &NewCutRecord) -> Result<CutRecord, StoreError> {
        self.insert_cut_records(std::slice::from_ref(record))?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Malformed("insert returned no rows".into()))
    }

    fn insert_cut_records(&self, records: &[NewCutRecord]) -> Result<Vec<CutRecord>, StoreError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        let url = self.endpoint(&self.config.cut_table, &[("select", "*")])?;
        let rows: Vec<CutRecord> = Self::send_json(
            self.request(Method::POST, url)
                .header("Prefer", "return=representation")
                .json(records),
        )?;
        if rows.len() != records.len() {
            return Err(StoreError::Malformed(format!(
                "inserted {} rows but the store returned {}",
                records.len(),
                rows.len()
            )));
        }
        Ok(rows)
    }

    fn delete_all_cut_records(&self) -> Result<usize, StoreError> {
        let url = self.endpoint(&self.config.cut_table, &[("id", "gt.0")])?;
        let deleted: Vec<serde_json::Value> = Self::send_json(
            self.request(Method::DELETE, url)
                .header("Prefer", "return=representation"),
        )?;
        Ok(deleted.len())
    }

    fn get_event_mode(&self) -> Result<EventMode, StoreError> {
        let filter = self.settings_filter();
        let url = self.endpoint(
            &self.config.settings_table,
            &[("select", "is_double_event"), ("id", filter.as_str())],
        )?;
        let rows: Vec<SettingsRow> = Self::send_json(self.request(Method::GET, url))?;
        rows.first()
            .map(|row| EventMode::from_double(row.is_double_event))
            .ok_or_else(|| {
                StoreError::Malformed(format!(
                    "settings row {} is missing",
                    self.config.settings_row
                ))
            })
    }

    fn set_event_mode(&self, mode: EventMode) -> Result<(), StoreError> {
        let filter = self.settings_filter();
        let url = self.endpoint(&self.config.settings_table, &[("id", filter.as_str())])?;
        Self::send_checked(
            self.request(Method::PATCH, url)
                .header("Prefer", "return=minimal")
                .json(&json!({ "is_double_event": mode.is_double_event() })),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mockito::Matcher;

    fn store(server: &mockito::ServerGuard) -> RestStore {
        RestStore::new(RestConfig {
            url: server.url(),
            api_key: "test-key".into(),
            ..RestConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn missing_url_is_a_config_error() {
        let err = RestStore::new(RestConfig::default()).err().unwrap();
        assert!(matches!(
            err,
            crate::error::CoreError::Config(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn lists_bosses_with_auth_headers() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/rest/v1/boss_list")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("select".into(), "*".into()),
                Matcher::UrlEncoded("order".into(), "id.asc".into()),
            ]))
            .match_header("apikey", "test-key")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id":1,"name":"Kzarka","respawn_minutes":120,"first_respawn_mins":30}]"#)
            .create();

        let bosses = store(&server).list_bosses().unwrap();
        mock.assert();
        assert_eq!(bosses.len(), 1);
        assert_eq!(bosses[0].first_respawn_minutes, 30);
    }

    fn cut_row(id: i64, boss_id: i64, hour: u32) -> serde_json::Value {
        json!({
            "id": id,
            "boss_id": boss_id,
            "boss_name": format!("Boss {boss_id}"),
            "cut_time": format!("2024-06-15T{hour:02}:00:00+00:00"),
            "next_gen_time": format!("2024-06-15T{:02}:00:00+00:00", hour + 2),
        })
    }

    #[test]
    fn lists_cut_records_newest_first_across_pages() {
        let mut server = mockito::Server::new();
        let page = |offset: &str| {
            Matcher::AllOf(vec![
                Matcher::UrlEncoded("select".into(), "*".into()),
                Matcher::UrlEncoded("order".into(), "id.desc".into()),
                Matcher::UrlEncoded("limit".into(), "2".into()),
                Matcher::UrlEncoded("offset".into(), offset.into()),
            ])
        };
        let first = server
            .mock("GET", "/rest/v1/boss_cut_list")
            .match_query(page("0"))
            .match_header("apikey", "test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!([cut_row(3, 1, 14), cut_row(2, 2, 12)]).to_string())
            .expect(1)
            .create();
        let second = server
            .mock("GET", "/rest/v1/boss_cut_list")
            .match_query(page("2"))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!([cut_row(1, 1, 10)]).to_string())
            .expect(1)
            .create();

        let store = RestStore::new(RestConfig {
            url: server.url(),
            api_key: "test-key".into(),
            page_size: 2,
            ..RestConfig::default()
        })
        .unwrap();
        let records = store.list_cut_records().unwrap();
        first.assert();
        second.assert();

        let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        let latest = crate::board::latest_per_boss(&records);
        assert_eq!(latest[&1].id, 3);
    }

    #[test]
    fn full_last_page_triggers_one_empty_read() {
        let mut server = mockito::Server::new();
        let body = json!([cut_row(2, 1, 12), cut_row(1, 1, 10)]).to_string();
        server
            .mock("GET", "/rest/v1/boss_cut_list")
            .match_query(Matcher::UrlEncoded("offset".into(), "0".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create();
        let tail = server
            .mock("GET", "/rest/v1/boss_cut_list")
            .match_query(Matcher::UrlEncoded("offset".into(), "2".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .expect(1)
            .create();

        let store = RestStore::new(RestConfig {
            url: server.url(),
            page_size: 2,
            ..RestConfig::default()
        })
        .unwrap();
        assert_eq!(store.list_cut_records().unwrap().len(), 2);
        tail.assert();
    }

    #[test]
    fn batch_insert_posts_every_row_in_one_request() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/rest/v1/boss_cut_list")
            .match_query(Matcher::UrlEncoded("select".into(), "*".into()))
            .match_header("prefer", "return=representation")
            .match_body(Matcher::Json(json!([
                {
                    "boss_id": 1,
                    "boss_name": "Boss 1",
                    "cut_time": "2024-06-15T10:00:00Z",
                    "next_gen_time": "2024-06-15T12:00:00Z"
                },
                {
                    "boss_id": 2,
                    "boss_name": "Boss 2",
                    "cut_time": "2024-06-15T11:00:00Z",
                    "next_gen_time": "2024-06-15T13:00:00Z"
                }
            ])))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(json!([cut_row(7, 1, 10), cut_row(8, 2, 11)]).to_string())
            .expect(1)
            .create();

        let new = |boss_id: i64, hour: u32| NewCutRecord {
            boss_id,
            boss_name: format!("Boss {boss_id}"),
            cut_time: Utc.with_ymd_and_hms(2024, 6, 15, hour, 0, 0).unwrap(),
            next_gen_time: Utc.with_ymd_and_hms(2024, 6, 15, hour + 2, 0, 0).unwrap(),
        };
        let batch = [new(1, 10), new(2, 11)];
        let stored = store(&server).insert_cut_records(&batch).unwrap();
        mock.assert();
        assert_eq!(stored, vec![batch[0].clone().with_id(7), batch[1].clone().with_id(8)]);
    }

    #[test]
    fn short_batch_response_is_malformed() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/rest/v1/boss_cut_list")
            .match_query(Matcher::Any)
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(json!([cut_row(7, 1, 10)]).to_string())
            .create();

        let record = NewCutRecord {
            boss_id: 1,
            boss_name: "Boss 1".into(),
            cut_time: Utc.with_ymd_and_hms(2024, 6, 15, 10, 0, 0).unwrap(),
            next_gen_time: Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap(),
        };
        let err = store(&server)
            .insert_cut_records(&[record.clone(), record])
            .unwrap_err();
        assert!(matches!(err, StoreError::Malformed(_)));
    }

    #[test]
    fn insert_posts_iso_timestamps_and_reads_back_id() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/rest/v1/boss_cut_list")
            .match_query(Matcher::UrlEncoded("select".into(), "*".into()))
            .match_header("prefer", "return=representation")
            .match_body(Matcher::Json(json!([{
                "boss_id": 1,
                "boss_name": "Kzarka",
                "cut_time": "2024-06-15T10:00:00Z",
                "next_gen_time": "2024-06-15T12:00:00Z"
            }])))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"id":42,"boss_id":1,"boss_name":"Kzarka",
                    "cut_time":"2024-06-15T10:00:00+00:00",
                    "next_gen_time":"2024-06-15T12:00:00+00:00"}]"#,
            )
            .create();

        let record = NewCutRecord {
            boss_id: 1,
            boss_name: "Kzarka".into(),
            cut_time: Utc.with_ymd_and_hms(2024, 6, 15, 10, 0, 0).unwrap(),
            next_gen_time: Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap(),
        };
        let stored = store(&server).insert_cut_record(&record).unwrap();
        mock.assert();
        assert_eq!(stored, record.with_id(42));
    }

    #[test]
    fn rejected_write_surfaces_status() {
        let mut server = mockito::Server::new();
        server
            .mock("DELETE", "/rest/v1/boss_cut_list")
            .match_query(Matcher::UrlEncoded("id".into(), "gt.0".into()))
            .with_status(401)
            .with_body("invalid api key")
            .create();

        let err = store(&server).delete_all_cut_records().unwrap_err();
        match err {
            StoreError::Rejected { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid api key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn delete_counts_returned_rows() {
        let mut server = mockito::Server::new();
        server
            .mock("DELETE", "/rest/v1/boss_cut_list")
            .match_query(Matcher::UrlEncoded("id".into(), "gt.0".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id":1},{"id":2}]"#)
            .create();

        assert_eq!(store(&server).delete_all_cut_records().unwrap(), 2);
    }

    #[test]
    fn event_mode_read_and_patch() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/rest/v1/boss_cut_settings")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("id".into(), "eq.1".into()),
                Matcher::UrlEncoded("select".into(), "is_double_event".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"is_double_event":true}]"#)
            .create();
        let patch = server
            .mock("PATCH", "/rest/v1/boss_cut_settings")
            .match_query(Matcher::UrlEncoded("id".into(), "eq.1".into()))
            .match_body(Matcher::Json(json!({ "is_double_event": false })))
            .with_status(204)
            .create();

        let store = store(&server);
        assert_eq!(store.get_event_mode().unwrap(), EventMode::DoubleEvent);
        store.set_event_mode(EventMode::Normal).unwrap();
        patch.assert();
    }

    #[test]
    fn missing_settings_row_is_malformed() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/rest/v1/boss_cut_settings")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .create();

        assert!(matches!(
            store(&server).get_event_mode(),
            Err(StoreError::Malformed(_))
        ));
    }
}
