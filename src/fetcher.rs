use crate::error::{BoxError, PeekError};
use crate::model::{
    ContinueToken, NamespaceScope, ObjectList, PageBody, PageRequest, PageResponse,
    ResourceIdentifier, ServerTable,
};
use http::HeaderValue;
use http::header::ACCEPT;
use kube::Client;
use kube::api::ListParams;
use kube::core::Request;
use serde_json::Value;
use tracing::debug;

const TABLE_ACCEPT: &str = "application/json;as=Table;v=v1;g=meta.k8s.io,application/json";
const JSON_ACCEPT: &str = "application/json";

/// One bounded list call against a remote collection.
pub trait PageSource {
    async fn fetch_page(
        &self,
        resource: &ResourceIdentifier,
        request: &PageRequest,
    ) -> Result<PageResponse, PeekError>;
}

pub struct KubeFetcher {
    client: Client,
    prefer_table: bool,
}

impl KubeFetcher {
    /// `prefer_table` asks the server for server-side printed rows; it falls
    /// back to a plain object list when the type does not support that.
    pub fn new(client: Client, prefer_table: bool) -> Self {
        Self {
            client,
            prefer_table,
        }
    }
}

impl PageSource for KubeFetcher {
    async fn fetch_page(
        &self,
        resource: &ResourceIdentifier,
        request: &PageRequest,
    ) -> Result<PageResponse, PeekError> {
        let remote = |error: BoxError| PeekError::remote(resource.qualified_name(), error);

        let mut http_request = Request::new(collection_path(resource, &request.scope))
            .list(&list_params(request))
            .map_err(|error| remote(error.into()))?;
        let accept = if self.prefer_table {
            TABLE_ACCEPT
        } else {
            JSON_ACCEPT
        };
        http_request
            .headers_mut()
            .insert(ACCEPT, HeaderValue::from_static(accept));

        debug!(
            resource = %resource,
            scope = %request.scope,
            limit = request.limit.get(),
            resumed = request.continue_token.is_some(),
            selector = request.label_selector.as_deref().unwrap_or(""),
            "requesting page"
        );

        let body = self
            .client
            .request::<Value>(http_request)
            .await
            .map_err(|error| remote(error.into()))?;
        decode_page(resource, request, body)
    }
}

/// Path of the collection endpoint. Cluster-scoped types and the all-namespaces
/// scope both target the cluster-wide endpoint.
pub fn collection_path(resource: &ResourceIdentifier, scope: &NamespaceScope) -> String {
    let mut path = if resource.group.is_empty() {
        format!("/api/{}", resource.version)
    } else {
        format!("/apis/{}/{}", resource.group, resource.version)
    };

    if resource.namespaced
        && let Some(namespace) = scope.namespace()
    {
        path.push_str("/namespaces/");
        path.push_str(namespace);
    }

    path.push('/');
    path.push_str(&resource.resource);
    path
}

fn list_params(request: &PageRequest) -> ListParams {
    let mut params = ListParams::default().limit(request.limit.get());
    if let Some(token) = &request.continue_token {
        params = params.continue_token(token.as_str());
    }
    if let Some(selector) = request.label_selector.as_deref()
        && !selector.is_empty()
    {
        params = params.labels(selector);
    }
    params
}

pub fn decode_page(
    resource: &ResourceIdentifier,
    request: &PageRequest,
    mut body: Value,
) -> Result<PageResponse, PeekError> {
    let malformed = |detail: String| PeekError::remote(resource.qualified_name(), detail);

    let next_token = body
        .pointer("/metadata/continue")
        .and_then(Value::as_str)
        .and_then(ContinueToken::from_server);

    let page = if body.get("kind").and_then(Value::as_str) == Some("Table") {
        let table = serde_json::from_value::<ServerTable>(body)
            .map_err(|error| malformed(format!("malformed table response: {error}")))?;
        PageBody::Table(table)
    } else {
        let Some(Value::Array(items)) = body.get_mut("items").map(Value::take) else {
            return Err(malformed(
                "malformed list response: missing items".to_string(),
            ));
        };
        let items = items
            .into_iter()
            .map(|item| with_type_meta(resource, item))
            .collect();
        PageBody::Objects(ObjectList { items })
    };

    let limit = request.limit.get() as usize;
    if page.len() > limit {
        return Err(malformed(format!(
            "server returned {} items for a page limit of {limit}",
            page.len()
        )));
    }

    Ok(PageResponse {
        body: page,
        next_token,
    })
}

/// List items from the API server usually omit `apiVersion` and `kind`.
fn with_type_meta(resource: &ResourceIdentifier, mut item: Value) -> Value {
    if let Value::Object(fields) = &mut item {
        fields
            .entry("apiVersion")
            .or_insert_with(|| Value::String(resource.api_version()));
        fields
            .entry("kind")
            .or_insert_with(|| Value::String(resource.kind.clone()));
    }
    item
}
