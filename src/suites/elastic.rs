use crate::domain::model::StepLog;
use crate::domain::ports::{ConnectionSettings, SmokeSuite};
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

/// Document id used by the single-document operations.
const DOC_ID: &str = "doc-1";

/// Walks the REST surface of the search engine: index, bulk, get, search,
/// count, update, upsert, delete, delete-by-query. Writes pass `refresh=true`
/// so reads immediately observe them.
pub struct ElasticSuite {
    http: Client,
    base_url: String,
    index: String,
}

impl ElasticSuite {
    pub fn new(settings: &impl ConnectionSettings) -> Self {
        Self {
            http: Client::new(),
            base_url: settings.search_url().trim_end_matches('/').to_string(),
            index: settings.search_index().to_string(),
        }
    }

    fn doc_url(&self, id: &str) -> String {
        format!("{}/{}/_doc/{}", self.base_url, self.index, id)
    }

    fn index_url(&self, endpoint: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.index, endpoint)
    }

    async fn send_json(&self, request: reqwest::RequestBuilder) -> Result<Value> {
        let response = request.send().await?;
        tracing::debug!("Search engine response status: {}", response.status());

        let response = response.error_for_status()?;
        let body: Value = response.json().await?;
        tracing::debug!("Search engine response body: {}", body);
        Ok(body)
    }

    pub async fn connect(&self, log: &mut StepLog) -> Result<()> {
        let body = self.send_json(self.http.get(&self.base_url)).await?;
        let version = body["version"]["number"].as_str().unwrap_or("unknown");
        log.record("connect", format!("cluster up, version {}", version));
        Ok(())
    }

    pub async fn index_document(&self, log: &mut StepLog) -> Result<()> {
        let url = format!("{}?refresh=true", self.doc_url(DOC_ID));
        let body = self
            .send_json(self.http.put(&url).json(&json!({ "field": "value" })))
            .await?;
        log.record("index", format!("result={}", write_result(&body)));
        Ok(())
    }

    pub async fn bulk_index(&self, log: &mut StepLog) -> Result<()> {
        let payload = bulk_payload(&[
            ("1", json!({ "field": "value1" })),
            ("2", json!({ "field": "value2" })),
        ]);
        let url = format!("{}?refresh=true", self.index_url("_bulk"));
        let body = self
            .send_json(
                self.http
                    .post(&url)
                    .header("Content-Type", "application/x-ndjson")
                    .body(payload),
            )
            .await?;
        log.record("bulk", bulk_summary(&body));
        Ok(())
    }

    pub async fn get_document(&self, log: &mut StepLog) -> Result<()> {
        let body = self.send_json(self.http.get(self.doc_url(DOC_ID))).await?;
        let found = body["found"].as_bool().unwrap_or(false);
        log.record("get", format!("found={}", found));
        Ok(())
    }

    pub async fn search_documents(&self, log: &mut StepLog) -> Result<()> {
        let body = self
            .send_json(
                self.http
                    .post(self.index_url("_search"))
                    .json(&match_query("field", "value")),
            )
            .await?;
        log.record("search", format!("hits={}", hit_count(&body)));
        Ok(())
    }

    pub async fn count_documents(&self, log: &mut StepLog) -> Result<()> {
        let body = self
            .send_json(
                self.http
                    .post(self.index_url("_count"))
                    .json(&match_all_query()),
            )
            .await?;
        let count = body["count"].as_u64().unwrap_or(0);
        log.record("count", format!("count={}", count));
        Ok(())
    }

    pub async fn update_document(&self, log: &mut StepLog) -> Result<()> {
        let url = format!("{}/{}/_update/{}?refresh=true", self.base_url, self.index, DOC_ID);
        let body = self
            .send_json(self.http.post(&url).json(&update_body(json!({ "field": "new_value" }))))
            .await?;
        log.record("update", format!("result={}", write_result(&body)));
        Ok(())
    }

    pub async fn upsert_document(&self, log: &mut StepLog) -> Result<()> {
        let url = format!("{}/{}/_update/{}?refresh=true", self.base_url, self.index, DOC_ID);
        let body = self
            .send_json(self.http.post(&url).json(&upsert_body(json!({ "field": "new_value" }))))
            .await?;
        log.record("upsert", format!("result={}", write_result(&body)));
        Ok(())
    }

    pub async fn delete_document(&self, log: &mut StepLog) -> Result<()> {
        let url = format!("{}?refresh=true", self.doc_url(DOC_ID));
        let body = self.send_json(self.http.delete(&url)).await?;
        log.record("delete", format!("result={}", write_result(&body)));
        Ok(())
    }

    pub async fn delete_by_query(&self, log: &mut StepLog) -> Result<()> {
        let url = format!("{}?refresh=true", self.index_url("_delete_by_query"));
        let body = self
            .send_json(self.http.post(&url).json(&match_query("field", "value")))
            .await?;
        let deleted = body["deleted"].as_u64().unwrap_or(0);
        log.record("delete_by_query", format!("deleted={}", deleted));
        Ok(())
    }
}

#[async_trait]
impl SmokeSuite for ElasticSuite {
    fn name(&self) -> &str {
        "search"
    }

    fn operations(&self) -> Vec<&'static str> {
        vec![
            "connect",
            "index",
            "bulk",
            "get",
            "search",
            "count",
            "update",
            "upsert",
            "delete",
            "delete_by_query",
        ]
    }

    async fn run(&self, log: &mut StepLog) -> Result<()> {
        tracing::debug!("Search suite targeting {} (index {})", self.base_url, self.index);

        self.connect(log).await?;
        self.index_document(log).await?;
        self.bulk_index(log).await?;
        self.get_document(log).await?;
        self.search_documents(log).await?;
        self.count_documents(log).await?;
        self.update_document(log).await?;
        self.upsert_document(log).await?;
        self.delete_document(log).await?;
        self.delete_by_query(log).await?;

        Ok(())
    }
}

pub fn match_query(field: &str, value: &str) -> Value {
    json!({
        "query": {
            "match": {
                field: value
            }
        }
    })
}

pub fn match_all_query() -> Value {
    json!({
        "query": {
            "match_all": {}
        }
    })
}

/// NDJSON bulk body: one action line and one source line per document.
/// The bulk endpoint rejects bodies without a trailing newline.
pub fn bulk_payload(docs: &[(&str, Value)]) -> String {
    let mut payload = String::new();
    for (id, doc) in docs {
        payload.push_str(&json!({ "index": { "_id": id } }).to_string());
        payload.push('\n');
        payload.push_str(&doc.to_string());
        payload.push('\n');
    }
    payload
}

pub fn update_body(doc: Value) -> Value {
    json!({ "doc": doc })
}

pub fn upsert_body(doc: Value) -> Value {
    json!({ "doc": doc, "doc_as_upsert": true })
}

fn write_result(body: &Value) -> String {
    body["result"].as_str().unwrap_or("unknown").to_string()
}

fn hit_count(body: &Value) -> u64 {
    body["hits"]["total"]["value"].as_u64().unwrap_or(0)
}

fn bulk_summary(body: &Value) -> String {
    let items = body["items"].as_array().map(|a| a.len()).unwrap_or(0);
    let errors = body["errors"].as_bool().unwrap_or(false);
    format!("{} items, errors={}", items, errors)
}
