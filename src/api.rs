// API client module: a small blocking HTTP client for the Graph file
// storage endpoints (containers, drive items, sharing). Every call takes
// the bearer token explicitly; the client itself holds no session state.

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::config::Settings;
use crate::error::GatewayError;

/// Default invitation text when the user leaves the message empty.
pub const DEFAULT_INVITE_MESSAGE: &str = "Here's the document we're collaborating on.";

/// A file storage container as returned by
/// `/storage/fileStorage/containers`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    pub id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_type_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date_time: Option<String>,
}

/// A file or folder inside a container's drive.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DriveItem {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<Value>,
}

impl DriveItem {
    pub fn is_folder(&self) -> bool {
        self.folder.is_some()
    }
}

/// A permission on a container or drive item. Only `id` and `roles` are
/// typed; the rest of the payload is kept for display.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Permission {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Sharing invitation for a drive item.
#[derive(Debug, Clone, PartialEq)]
pub struct Invitation {
    pub recipients: Vec<String>,
    pub message: String,
    pub require_sign_in: bool,
    pub send_invitation: bool,
    pub roles: Vec<String>,
}

impl Invitation {
    fn body(&self) -> Value {
        let recipients: Vec<Value> = self
            .recipients
            .iter()
            .map(|email| json!({ "email": email }))
            .collect();
        json!({
            "recipients": recipients,
            "message": self.message,
            "requireSignIn": self.require_sign_in,
            "sendInvitation": self.send_invitation,
            "roles": self.roles,
        })
    }
}

/// The remote operations the command table relies on.
pub trait StorageGateway {
    fn create_container(&self, token: &str, name: &str) -> Result<Container, GatewayError>;

    /// Containers of the configured container type.
    fn list_containers(&self, token: &str) -> Result<Vec<Container>, GatewayError>;

    fn grant_permission(
        &self,
        token: &str,
        container_id: &str,
        email: &str,
        role: &str,
    ) -> Result<Permission, GatewayError>;

    /// Top-level items of the container's drive.
    fn list_files(&self, token: &str, container_id: &str) -> Result<Vec<DriveItem>, GatewayError>;

    fn upload_file(
        &self,
        token: &str,
        container_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<DriveItem, GatewayError>;

    fn invite(
        &self,
        token: &str,
        container_id: &str,
        item_id: &str,
        invitation: &Invitation,
    ) -> Result<Vec<Permission>, GatewayError>;

    fn list_permissions(
        &self,
        token: &str,
        container_id: &str,
        item_id: &str,
    ) -> Result<Vec<Permission>, GatewayError>;
}

/// Graph collections wrap their items in `{"value": [...]}`.
#[derive(Deserialize)]
struct Collection<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
}

/// Blocking Graph client. Holds the reqwest client, the API root and the
/// container type used for creation and listing.
#[derive(Clone)]
pub struct GraphClient {
    client: Client,
    base_url: String,
    container_type_id: String,
}

impl GraphClient {
    pub fn new(settings: &Settings) -> Result<Self, GatewayError> {
        let client = Client::builder().build()?;
        Ok(GraphClient {
            client,
            base_url: settings.graph_base_url.trim_end_matches('/').to_string(),
            container_type_id: settings.container_type_id.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send with the bearer token and turn non-success statuses into errors.
    fn send(&self, req: RequestBuilder, token: &str) -> Result<Response, GatewayError> {
        let res = req.bearer_auth(token).send()?;
        let status = res.status();
        if !status.is_success() {
            let txt = res.text().unwrap_or_default();
            return Err(GatewayError::from_status(status, &txt));
        }
        Ok(res)
    }

    fn get<T: DeserializeOwned>(&self, token: &str, path: &str) -> Result<T, GatewayError> {
        let url = self.url(path);
        tracing::debug!(%url, "GET");
        let res = self.send(self.client.get(&url), token)?;
        decode(res, &url)
    }

    fn post<T: DeserializeOwned>(
        &self,
        token: &str,
        path: &str,
        body: &Value,
    ) -> Result<T, GatewayError> {
        let url = self.url(path);
        tracing::debug!(%url, "POST");
        let res = self.send(self.client.post(&url).json(body), token)?;
        decode(res, &url)
    }
}

fn decode<T: DeserializeOwned>(res: Response, url: &str) -> Result<T, GatewayError> {
    res.json()
        .map_err(|e| GatewayError::Decode(format!("{}: {}", url, e)))
}

impl StorageGateway for GraphClient {
    fn create_container(&self, token: &str, name: &str) -> Result<Container, GatewayError> {
        let body = json!({
            "displayName": name,
            "description": format!("{} description", name),
            "containerTypeId": self.container_type_id,
        });
        self.post(token, "/storage/fileStorage/containers", &body)
    }

    fn list_containers(&self, token: &str) -> Result<Vec<Container>, GatewayError> {
        let url = self.url("/storage/fileStorage/containers");
        let filter = format!("containerTypeId eq {}", self.container_type_id);
        tracing::debug!(%url, %filter, "GET");
        let req = self.client.get(&url).query(&[("$filter", filter.as_str())]);
        let res = self.send(req, token)?;
        let page: Collection<Container> = decode(res, &url)?;
        Ok(page.value)
    }

    fn grant_permission(
        &self,
        token: &str,
        container_id: &str,
        email: &str,
        role: &str,
    ) -> Result<Permission, GatewayError> {
        let body = json!({
            "roles": [role],
            "grantedToV2": { "user": { "userPrincipalName": email } },
        });
        let path = format!("/storage/fileStorage/containers/{}/permissions", container_id);
        self.post(token, &path, &body)
    }

    fn list_files(&self, token: &str, container_id: &str) -> Result<Vec<DriveItem>, GatewayError> {
        let path = format!("/drives/{}/root/children", container_id);
        let page: Collection<DriveItem> = self.get(token, &path)?;
        Ok(page.value)
    }

    fn upload_file(
        &self,
        token: &str,
        container_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<DriveItem, GatewayError> {
        // Pushed as a segment so `#`, `?` and spaces in the name are escaped.
        let base = self.url(&format!("/drives/{}", container_id));
        let mut target = Url::parse(&base)
            .map_err(|e| GatewayError::Network(format!("invalid URL {}: {}", base, e)))?;
        target
            .path_segments_mut()
            .map_err(|_| GatewayError::Network(format!("invalid URL {}", base)))?
            .push("root:")
            .push(&format!("{}:", file_name))
            .push("content");
        let url = target.to_string();
        tracing::debug!(%url, size = bytes.len(), "PUT");
        let req = self
            .client
            .put(target)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(bytes);
        let res = self.send(req, token)?;
        decode(res, &url)
    }

    fn invite(
        &self,
        token: &str,
        container_id: &str,
        item_id: &str,
        invitation: &Invitation,
    ) -> Result<Vec<Permission>, GatewayError> {
        let path = format!("/drives/{}/items/{}/invite", container_id, item_id);
        let page: Collection<Permission> = self.post(token, &path, &invitation.body())?;
        Ok(page.value)
    }

    fn list_permissions(
        &self,
        token: &str,
        container_id: &str,
        item_id: &str,
    ) -> Result<Vec<Permission>, GatewayError> {
        let path = format!("/drives/{}/items/{}/permissions", container_id, item_id);
        let page: Collection<Permission> = self.get(token, &path)?;
        Ok(page.value)
    }
}
