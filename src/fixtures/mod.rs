//! Fixture data for QA runs
//!
//! Seeds and purges the `qa_*` Firestore collections the app reads when it
//! sees the QA visit marker, so tests always find batches, expenses and
//! employees without touching production collections. Talks to Firestore
//! over its REST API; point `FIRESTORE_EMULATOR_HOST` at an emulator for
//! local runs, or set `FARMQA_FIREBASE_TOKEN` for a live project.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use colored::Colorize;
use log::debug;
use serde_json::{json, Map, Value};

/// Collections owned by QA; cleanup never looks anywhere else
pub const QA_COLLECTIONS: [&str; 7] = [
    "qa_batches",
    "qa_expenses",
    "qa_yearlyExpenses",
    "qa_employees",
    "qa_crops",
    "qa_fruits",
    "qa_invoices",
];

/// Seed the qa_* collections
///
/// Prints its own progress; a `false` return means the run continues
/// against whatever state already exists.
pub async fn setup() -> bool {
    let store = match FixtureStore::from_env() {
        Ok(store) => store,
        Err(e) => {
            println!("{} {}", "❌".red(), e);
            println!("   Set FIRESTORE_EMULATOR_HOST for the emulator, or FARMQA_FIREBASE_TOKEN for live Firestore");
            return false;
        }
    };

    match store.setup().await {
        Ok(()) => true,
        Err(e) => {
            println!("{} Failed to create test data: {:#}", "❌".red(), e);
            false
        }
    }
}

/// Delete every document in the qa_* collections
pub async fn cleanup() -> bool {
    let store = match FixtureStore::from_env() {
        Ok(store) => store,
        Err(e) => {
            println!("{} {}", "❌".red(), e);
            return false;
        }
    };

    store.cleanup().await;
    true
}

/// Firestore REST client scoped to one project
pub struct FixtureStore {
    client: reqwest::Client,
    documents_url: String,
    token: String,
}

impl FixtureStore {
    pub fn from_env() -> Result<Self> {
        let project = std::env::var("FARMQA_FIREBASE_PROJECT")
            .unwrap_or_else(|_| "demo-farm-tnf".to_string());

        let (base, token) = if let Ok(host) = std::env::var("FIRESTORE_EMULATOR_HOST") {
            // The emulator accepts any owner token
            (format!("http://{}/v1", host), "owner".to_string())
        } else if let Ok(token) = std::env::var("FARMQA_FIREBASE_TOKEN") {
            ("https://firestore.googleapis.com/v1".to_string(), token)
        } else {
            anyhow::bail!("Firestore credentials not found");
        };

        Ok(Self {
            client: reqwest::Client::new(),
            documents_url: format!(
                "{}/projects/{}/databases/(default)/documents",
                base, project
            ),
            token,
        })
    }

    pub async fn setup(&self) -> Result<()> {
        let today = Local::now();
        let batches = seed_batches(&today);
        let expenses = seed_expenses(&today);
        let employees = seed_employees(&today);

        for batch in &batches {
            let id = doc_id(batch)?;
            self.set_document("qa_batches", id, batch).await?;
            println!("  Created batch: {}", id);
        }
        for expense in &expenses {
            let id = doc_id(expense)?;
            self.set_document("qa_expenses", id, expense).await?;
            println!("  Created expense: {}", id);
        }
        for employee in &employees {
            let id = doc_id(employee)?;
            self.set_document("qa_employees", id, employee).await?;
            println!("  Created employee: {}", id);
        }

        println!("\n{} Test data setup complete!", "✅".green());
        println!("  - {} batches", batches.len());
        println!("  - {} expenses", expenses.len());
        println!("  - {} employees", employees.len());
        Ok(())
    }

    /// Purge every qa_* collection, warning per collection rather than
    /// aborting, since a half-clean slate is better than none.
    pub async fn cleanup(&self) -> usize {
        let mut total = 0;

        for collection in QA_COLLECTIONS {
            match self.purge_collection(collection).await {
                Ok(count) => {
                    if count > 0 {
                        println!("  Deleted {} documents from {}", count, collection);
                    }
                    total += count;
                }
                Err(e) => {
                    println!("  {} Error cleaning {}: {:#}", "⚠️".yellow(), collection, e);
                }
            }
        }

        println!(
            "\n{} Cleanup complete! Deleted {} total documents.",
            "✅".green(),
            total
        );
        total
    }

    async fn set_document(&self, collection: &str, doc_id: &str, data: &Value) -> Result<()> {
        let url = format!("{}/{}/{}", self.documents_url, collection, doc_id);
        let body = json!({ "fields": to_firestore_fields(data) });

        let response = self
            .client
            .patch(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Firestore write to {}/{} failed", collection, doc_id))?;

        if !response.status().is_success() {
            anyhow::bail!(
                "Firestore write to {}/{} failed: {}",
                collection,
                doc_id,
                response.status()
            );
        }
        Ok(())
    }

    async fn purge_collection(&self, collection: &str) -> Result<usize> {
        let url = format!("{}/{}?pageSize=300", self.documents_url, collection);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .with_context(|| format!("Firestore list of {} failed", collection))?;

        if !response.status().is_success() {
            anyhow::bail!("Firestore list of {} failed: {}", collection, response.status());
        }

        let listing: Value = response.json().await?;
        let ids = ids_from_listing(&listing);

        for id in &ids {
            debug!("deleting {}/{}", collection, id);
            let url = format!("{}/{}/{}", self.documents_url, collection, id);
            let response = self
                .client
                .delete(&url)
                .bearer_auth(&self.token)
                .send()
                .await
                .with_context(|| format!("Firestore delete of {}/{} failed", collection, id))?;

            if !response.status().is_success() {
                anyhow::bail!(
                    "Firestore delete of {}/{} failed: {}",
                    collection,
                    id,
                    response.status()
                );
            }
        }

        Ok(ids.len())
    }
}

/// Document IDs from a Firestore list response
///
/// Each entry's `name` is a full resource path; the ID is its last segment.
fn ids_from_listing(listing: &Value) -> Vec<String> {
    listing["documents"]
        .as_array()
        .map(|documents| {
            documents
                .iter()
                .filter_map(|doc| {
                    doc["name"]
                        .as_str()
                        .and_then(|name| name.rsplit('/').next())
                        .map(|id| id.to_string())
                })
                .collect()
        })
        .unwrap_or_default()
}

fn doc_id(data: &Value) -> Result<&str> {
    data["id"].as_str().context("fixture document missing id")
}

/// Encode a JSON object into Firestore's typed `fields` representation
///
/// Firestore REST is picky here: integers travel as strings under
/// `integerValue`, and nesting goes through `arrayValue`/`mapValue`.
pub fn to_firestore_fields(data: &Value) -> Value {
    let mut fields = Map::new();
    if let Some(object) = data.as_object() {
        for (key, value) in object {
            fields.insert(key.clone(), to_firestore_value(value));
        }
    }
    Value::Object(fields)
}

fn to_firestore_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(to_firestore_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(_) => json!({ "mapValue": { "fields": to_firestore_fields(value) } }),
    }
}

fn seed_batches(today: &DateTime<Local>) -> Vec<Value> {
    let date_days_ago =
        |days: i64| (*today - chrono::Duration::days(days)).format("%Y-%m-%d").to_string();
    let entry = today.format("%Y-%m-%d").to_string();
    let created = today.to_rfc3339();

    vec![
        json!({
            "id": "Goat-1",
            "name": "QA Test Goat Batch",
            "type": "Goat",
            "date": date_days_ago(30),
            "status": "Raising",
            "expenses": [],
            "animals": [
                {
                    "id": "GTJANM26-1",
                    "gender": "Male",
                    "weight": 25,
                    "purchaseCost": 8000,
                    "status": "Healthy",
                    "entryDate": entry.as_str(),
                    "weightHistory": [{ "date": entry.as_str(), "weight": 25 }]
                },
                {
                    "id": "GTJANF26-1",
                    "gender": "Female",
                    "weight": 22,
                    "purchaseCost": 7500,
                    "status": "Healthy",
                    "entryDate": entry.as_str(),
                    "weightHistory": [{ "date": entry.as_str(), "weight": 22 }]
                }
            ],
            "createdAt": created.as_str()
        }),
        json!({
            "id": "Sheep-1",
            "name": "QA Test Sheep Batch",
            "type": "Sheep",
            "date": date_days_ago(20),
            "status": "Raising",
            "expenses": [],
            "animals": [
                {
                    "id": "SHJANM26-1",
                    "gender": "Male",
                    "weight": 30,
                    "purchaseCost": 6000,
                    "status": "Healthy",
                    "entryDate": entry.as_str(),
                    "weightHistory": [{ "date": entry.as_str(), "weight": 30 }]
                }
            ],
            "createdAt": created.as_str()
        }),
        json!({
            "id": "Poultry-1",
            "name": "QA Test Poultry Batch",
            "type": "Poultry",
            "date": date_days_ago(10),
            "status": "Raising",
            "expenses": [],
            "animals": [],
            "createdAt": created.as_str()
        }),
        json!({
            "id": "Cow-1",
            "name": "QA Test Cow Batch",
            "type": "Cow",
            "date": date_days_ago(5),
            "status": "Raising",
            "expenses": [],
            "animals": [],
            "createdAt": created.as_str()
        }),
    ]
}

fn seed_expenses(today: &DateTime<Local>) -> Vec<Value> {
    let created = today.to_rfc3339();

    vec![
        json!({
            "id": "exp-qa-001",
            "description": "QA Test Feed Expense",
            "category": "Feed",
            "amount": 5000,
            "date": today.format("%Y-%m-%d").to_string(),
            "batchId": "Goat-1",
            "createdAt": created.as_str()
        }),
        json!({
            "id": "exp-qa-002",
            "description": "QA Test Medical Expense",
            "category": "Medical",
            "amount": 1500,
            "date": (*today - chrono::Duration::days(5)).format("%Y-%m-%d").to_string(),
            "batchId": "Sheep-1",
            "createdAt": created.as_str()
        }),
    ]
}

fn seed_employees(today: &DateTime<Local>) -> Vec<Value> {
    let created = today.to_rfc3339();

    vec![
        json!({
            "id": "emp-qa-001",
            "name": "QA Test Worker 1",
            "role": "Farm Hand",
            "phone": "9999999991",
            "salary": 15000,
            "status": "Active",
            "createdAt": created.as_str()
        }),
        json!({
            "id": "emp-qa-002",
            "name": "QA Test Worker 2",
            "role": "Supervisor",
            "phone": "9999999992",
            "salary": 25000,
            "status": "Active",
            "createdAt": created.as_str()
        }),
    ]
}
