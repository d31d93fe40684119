//! User service client: registration, login, profile read/update.

use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use url::Url;

use greenbasket_core::{Role, UserId};

use super::{ApiEnvelope, ServiceError, api_error};

/// Registration payload, field names per the user service contract.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub email_id: String,
    pub password: String,
    pub user_id: String,
}

/// Login payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    email_id: &'a str,
    password: &'a str,
}

/// Identity payload returned by a successful login.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub user_id: UserId,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(rename = "roleId")]
    pub role: Role,
    #[serde(default)]
    pub token: Option<String>,
}

/// Profile record from `GET /user/{id}` and `PUT /user`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: UserId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub email_id: Option<String>,
}

/// Client for the user service.
#[derive(Clone)]
pub struct UserClient {
    client: reqwest::Client,
    base_url: Url,
}

impl UserClient {
    #[must_use]
    pub const fn new(client: reqwest::Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.as_str().trim_end_matches('/'))
    }

    /// Register a new account via `POST /user/register`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service rejects the
    /// registration (duplicate email, for instance).
    pub async fn register(&self, request: &RegistrationRequest) -> Result<(), ServiceError> {
        let response = self
            .client
            .post(self.endpoint("/user/register"))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        Ok(())
    }

    /// Authenticate via `POST /user/login`.
    ///
    /// # Errors
    ///
    /// Returns `Api` for bad credentials, `Parse` when the identity payload
    /// does not decode (including an out-of-range role value).
    pub async fn login(&self, email_id: &str, password: &str) -> Result<LoginData, ServiceError> {
        let response = self
            .client
            .post(self.endpoint("/user/login"))
            .json(&LoginRequest { email_id, password })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let envelope: ApiEnvelope<LoginData> = response
            .json()
            .await
            .map_err(|e| ServiceError::Parse(e.to_string()))?;
        Ok(envelope.data)
    }

    /// Fetch a profile via `GET /user/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the profile does not decode.
    pub async fn get_profile(
        &self,
        id: UserId,
        token: Option<&str>,
    ) -> Result<UserProfile, ServiceError> {
        let mut request = self.client.get(self.endpoint(&format!("/user/{id}")));
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| ServiceError::Parse(e.to_string()))
    }

    /// Update a profile via `PUT /user`, returning the stored record.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service rejects it.
    pub async fn update_profile(
        &self,
        profile: &UserProfile,
        token: Option<&str>,
    ) -> Result<UserProfile, ServiceError> {
        let mut request = self.client.put(self.endpoint("/user")).json(profile);
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| ServiceError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_data_decodes_the_service_payload() {
        let data: LoginData = serde_json::from_str(
            r#"{"userId":3,"fullName":"Asha Rao","roleId":1,"token":"tok-9"}"#,
        )
        .unwrap();
        assert_eq!(data.user_id, UserId::new(3));
        assert_eq!(data.role, Role::Buyer);
        assert_eq!(data.token.as_deref(), Some("tok-9"));
    }

    #[test]
    fn login_data_accepts_a_seller_with_no_token() {
        let data: LoginData =
            serde_json::from_str(r#"{"userId":1,"roleId":0}"#).unwrap();
        assert_eq!(data.role, Role::Seller);
        assert!(data.token.is_none());
        assert!(data.full_name.is_none());
    }

    #[test]
    fn registration_request_uses_service_field_names() {
        let request = RegistrationRequest {
            first_name: "A".to_owned(),
            last_name: "B".to_owned(),
            address: String::new(),
            email_id: "a@b.com".to_owned(),
            password: "pw".to_owned(),
            user_id: "a1".to_owned(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("emailId").is_some());
        assert!(json.get("firstName").is_some());
        assert!(json.get("userId").is_some());
    }
}
