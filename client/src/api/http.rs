//! HTTP implementation of the backend API
//!
//! Thin reqwest wrapper over the REST endpoints. Mutation acknowledgements
//! are normalized into full records so callers always get a `Bill` back.

use super::models::*;
use super::{BillApi, ReminderApi};
use crate::config::ClientConfig;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Body of a bill mutation response
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum BillAck {
    Bill(Bill),
    Created { id: String },
    Message { message: String },
}

/// Body of a reminder creation response
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum ReminderAck {
    Reminder(Reminder),
    Created { id: String },
}

/// Error body sent with non-2xx responses
#[derive(Deserialize, Debug, Default)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// reqwest-backed client for the bills backend
#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("billminder/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and map non-2xx responses onto [`AppError`]
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let text = response.text().await.unwrap_or_default();
        let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
        let message = body.message.or(body.error);

        tracing::warn!("Backend returned {} for {}", status, url);

        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound {
                resource: url,
                message,
            });
        }

        Err(AppError::Server {
            status: status.as_u16(),
            message,
        })
    }

    /// Decode a JSON body; an empty body yields `None`
    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<Option<T>> {
        let bytes = response.bytes().await?;
        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn find_bill(&self, id: &str) -> Result<Option<Bill>> {
        let bills = self.list_all_bills().await?;
        Ok(bills.into_iter().find(|bill| bill.id == id))
    }

    /// Turn an update/pay acknowledgement into the stored bill
    async fn resolve_ack(&self, id: &str, ack: Option<BillAck>) -> Result<Bill> {
        match ack {
            Some(BillAck::Bill(bill)) => Ok(bill),
            Some(BillAck::Message { message }) => {
                tracing::debug!("Backend acknowledged {}: {}", id, message);
                self.find_bill(id)
                    .await?
                    .ok_or_else(|| AppError::not_found(id))
            }
            Some(BillAck::Created { .. }) | None => self
                .find_bill(id)
                .await?
                .ok_or_else(|| AppError::not_found(id)),
        }
    }
}

#[async_trait]
impl BillApi for HttpApi {
    async fn list_bills(&self, status: BillStatus) -> Result<Vec<Bill>> {
        tracing::debug!("Fetching {} bills", status);
        let request = self
            .client
            .get(self.url("/api/bills"))
            .query(&[("status", status.as_query())]);
        let response = self.send(request).await?;
        Ok(Self::read_json(response).await?.unwrap_or_default())
    }

    async fn list_all_bills(&self) -> Result<Vec<Bill>> {
        tracing::debug!("Fetching all bills");
        let response = self.send(self.client.get(self.url("/api/bills"))).await?;
        Ok(Self::read_json(response).await?.unwrap_or_default())
    }

    async fn create_bill(&self, payload: BillPayload<'_>) -> Result<Bill> {
        let request = self.client.post(self.url("/api/bills")).json(&payload);
        let response = self.send(request).await?;
        let status = response.status();

        match Self::read_json::<BillAck>(response).await? {
            Some(BillAck::Bill(bill)) => Ok(bill),
            Some(BillAck::Created { id }) => match self.find_bill(&id).await? {
                Some(bill) => Ok(bill),
                None => {
                    tracing::debug!("Created bill {} not listed yet, using submitted fields", id);
                    Ok(payload.into_bill(id))
                }
            },
            Some(BillAck::Message { .. }) | None => Err(AppError::Server {
                status: status.as_u16(),
                message: Some("Backend did not return the created bill".to_string()),
            }),
        }
    }

    async fn update_bill(&self, id: &str, payload: BillPayload<'_>) -> Result<Bill> {
        let request = self
            .client
            .put(self.url(&format!("/api/bills/{}", id)))
            .json(&payload);
        let response = self.send(request).await?;
        let ack = Self::read_json(response).await?;
        self.resolve_ack(id, ack).await
    }

    async fn delete_bill(&self, id: &str) -> Result<()> {
        let request = self.client.delete(self.url(&format!("/api/bills/{}", id)));
        self.send(request).await?;
        Ok(())
    }

    async fn mark_bill_paid(&self, id: &str) -> Result<Bill> {
        let request = self.client.put(self.url(&format!("/api/bills/{}/pay", id)));
        let response = self.send(request).await?;
        let ack = Self::read_json(response).await?;
        self.resolve_ack(id, ack).await
    }
}

#[async_trait]
impl ReminderApi for HttpApi {
    async fn list_reminders(&self) -> Result<Vec<Reminder>> {
        tracing::debug!("Fetching reminders");
        let response = self.send(self.client.get(self.url("/api/reminders"))).await?;
        Ok(Self::read_json(response).await?.unwrap_or_default())
    }

    async fn create_reminder(&self, payload: ReminderPayload<'_>) -> Result<Reminder> {
        let request = self.client.post(self.url("/api/reminders")).json(&payload);
        let response = self.send(request).await?;
        let status = response.status();

        match Self::read_json::<ReminderAck>(response).await? {
            Some(ReminderAck::Reminder(reminder)) => Ok(reminder),
            Some(ReminderAck::Created { id }) => Ok(payload.into_reminder(id)),
            None => Err(AppError::Server {
                status: status.as_u16(),
                message: Some("Backend did not return the created reminder".to_string()),
            }),
        }
    }

    async fn delete_reminder(&self, id: &str) -> Result<()> {
        let request = self
            .client
            .delete(self.url(&format!("/api/reminders/{}", id)));
        self.send(request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bill_ack_shapes() {
        let created: BillAck = serde_json::from_str(r#"{"id": "abc"}"#).unwrap();
        assert!(matches!(created, BillAck::Created { id } if id == "abc"));

        let message: BillAck =
            serde_json::from_str(r#"{"message": "Bill updated successfully"}"#).unwrap();
        assert!(matches!(message, BillAck::Message { .. }));

        let full: BillAck = serde_json::from_str(
            r#"{"_id": "abc", "name": "Water", "amount": 40, "due_date": "2024-03-01"}"#,
        )
        .unwrap();
        assert!(matches!(full, BillAck::Bill(bill) if bill.name == "Water"));
    }

    #[test]
    fn test_url_joining() {
        let api = HttpApi::new(&ClientConfig::for_api_url("http://localhost:5000/")).unwrap();
        assert_eq!(api.base_url(), "http://localhost:5000");
        assert_eq!(api.url("/api/bills"), "http://localhost:5000/api/bills");
    }
}
