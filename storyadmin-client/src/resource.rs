use std::marker::PhantomData;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use crate::{
    error::ApiError,
    pipeline::Pipeline,
    schema::Field,
    transport::ApiRequest,
};

/// JSON object sent to or received from the backend
pub type Payload = Map<String, Value>;

/// What the optional list filter means for a resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListScope {
    /// Sent as the `search` query parameter
    Search,
    /// Id of the owning entity, sent as a path segment; nothing is listed without one
    Parent,
}

/// One entity kind exposed under `/beapi/{PATH}`.
pub trait Resource: DeserializeOwned + Serialize + Clone + Send + Sync + 'static {
    const PATH: &'static str;
    /// Key carrying the id in payloads and in create answers, `story_id` for stories
    const ID_KEY: &'static str;
    /// Query key of the edit route, `storyId` for stories
    const ROUTE_KEY: &'static str;
    const LIST_SCOPE: ListScope;
    /// Allowed-field set of `update`
    const UPDATE_FIELDS: &'static [Field];
    /// Allowed-field set of `create`, on top of the create template
    const CREATE_FIELDS: &'static [Field];

    fn id(&self) -> &str;

    fn title(&self) -> &str;

    /// Placeholder values the backend expects on every create.
    fn create_template() -> Payload;
}

#[derive(Clone, Debug, PartialEq)]
pub struct Listing<R> {
    pub items: Vec<R>,
    pub total: u64,
    pub total_pages: usize,
}

impl<R> Listing<R> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            total_pages: 0,
        }
    }
}

/// Whatever the backend answered to an update or delete.
#[derive(Clone, Debug, PartialEq)]
pub struct Ack(pub Value);

pub fn total_pages(total: u64, size: usize) -> usize {
    let size = size.max(1) as u64;

    usize::try_from(total.div_ceil(size)).unwrap_or(usize::MAX)
}

/// Drops every key `allowed` refuses, logging what went.
pub fn whitelist(payload: Payload, allowed: impl Fn(&str) -> bool) -> Payload {
    payload
        .into_iter()
        .filter(|(key, _)| {
            let keep = allowed(key);

            if !keep {
                tracing::debug!(key = %key, "stripping field outside the allowed set");
            }

            keep
        })
        .collect()
}

/// Checks an id is safe to use as a single path segment.
pub fn segment(id: &str) -> Result<&str, ApiError> {
    let id = id.trim();

    if id.is_empty() || id.contains(|c: char| matches!(c, '/' | '?' | '#' | '%') || c.is_whitespace()) {
        return Err(ApiError::Validation(format!("`{}` is not a usable id", id)));
    }

    Ok(id)
}

#[derive(serde::Deserialize)]
struct ListData<R> {
    list: Vec<R>,
    #[serde(default)]
    total: Option<u64>,
    /// Spelling used by some endpoints, `total` wins when both are sent
    #[serde(default, rename = "totalCount")]
    total_count: Option<u64>,
}

impl<R> ListData<R> {
    fn total(&self) -> u64 {
        self.total.or(self.total_count).unwrap_or_default()
    }
}

#[derive(serde::Serialize)]
struct ListQuery<'q> {
    page: usize,
    size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    search: Option<&'q str>,
}

/// Typed binding of one resource kind.
pub struct ResourceClient<R> {
    pipeline: Pipeline,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for ResourceClient<R> {
    fn clone(&self) -> Self {
        Self {
            pipeline: self.pipeline.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> ResourceClient<R> {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            _resource: PhantomData,
        }
    }

    #[tracing::instrument(skip(self), fields(resource = R::PATH), err)]
    pub async fn list(
        &self,
        page: usize,
        size: usize,
        filter: Option<&str>,
    ) -> Result<Listing<R>, ApiError> {
        if page == 0 || size == 0 {
            return Err(ApiError::Validation(format!(
                "page ({}) and size ({}) must be positive",
                page, size
            )));
        }

        let filter = filter.map(str::trim).filter(|term| !term.is_empty());

        let path = match R::LIST_SCOPE {
            ListScope::Search => {
                let query = serde_urlencoded::to_string(ListQuery {
                    page,
                    size,
                    search: filter,
                })
                .map_err(|err| ApiError::Validation(err.to_string()))?;

                format!("/beapi/{}/list?{}", R::PATH, query)
            }
            ListScope::Parent => {
                let parent = match filter {
                    Some(parent) => segment(parent)?,
                    None => {
                        tracing::debug!("no parent id, nothing to list");

                        return Ok(Listing::empty());
                    }
                };

                let query = serde_urlencoded::to_string(ListQuery {
                    page,
                    size,
                    search: None,
                })
                .map_err(|err| ApiError::Validation(err.to_string()))?;

                format!("/beapi/{}/list/{}?{}", R::PATH, parent, query)
            }
        };

        let data: ListData<R> = self.pipeline.data(ApiRequest::get(path)).await?;

        let total = data.total();

        tracing::debug!(total, rows = data.list.len(), "listed");

        Ok(Listing {
            total_pages: total_pages(total, size),
            total,
            items: data.list,
        })
    }

    /// Detail payload as the server sent it, extra keys included.
    #[tracing::instrument(skip(self), fields(resource = R::PATH), err)]
    pub async fn get_raw(&self, id: &str) -> Result<Payload, ApiError> {
        let path = format!("/beapi/{}/detail/{}", R::PATH, segment(id)?);

        let data: Option<Payload> = self.pipeline.data(ApiRequest::get(path)).await?;

        data.ok_or_else(|| ApiError::Decode(format!("no {} with id `{}`", R::PATH, id)))
    }

    pub async fn get(&self, id: &str) -> Result<R, ApiError> {
        let raw = self.get_raw(id).await?;

        decode(raw)
    }

    /// Creates an entity and returns the id the server picked for it.
    #[tracing::instrument(skip(self, payload), fields(resource = R::PATH), err)]
    pub async fn create(&self, payload: Payload) -> Result<String, ApiError> {
        let template = R::create_template();
        let payload = whitelist(payload, |key| {
            template.contains_key(key) || R::CREATE_FIELDS.iter().any(|f| f.name == key)
        });

        let mut body = template;
        body.extend(payload);

        let path = format!("/beapi/{}/create", R::PATH);
        let data: Payload = self
            .pipeline
            .data(ApiRequest::post(path).json(Value::Object(body)))
            .await?;

        let id = data
            .get(R::ID_KEY)
            .and_then(id_text)
            .ok_or_else(|| ApiError::Decode(format!("create answer carries no `{}`", R::ID_KEY)))?;

        tracing::info!(id = %id, "created");

        Ok(id)
    }

    #[tracing::instrument(skip(self, payload), fields(resource = R::PATH), err)]
    pub async fn update(&self, id: &str, payload: Payload) -> Result<Ack, ApiError> {
        let payload = whitelist(payload, |key| R::UPDATE_FIELDS.iter().any(|f| f.name == key));

        let path = format!("/beapi/{}/update/{}", R::PATH, segment(id)?);
        let ack: Value = self
            .pipeline
            .json(ApiRequest::put(path).json(Value::Object(payload)))
            .await?;

        tracing::info!("updated");

        Ok(Ack(ack))
    }

    #[tracing::instrument(skip(self), fields(resource = R::PATH), err)]
    pub async fn remove(&self, id: &str) -> Result<Ack, ApiError> {
        let path = format!("/beapi/{}/delete/{}", R::PATH, segment(id)?);
        let ack: Value = self.pipeline.json(ApiRequest::delete(path)).await?;

        tracing::info!("deleted");

        Ok(Ack(ack))
    }
}

pub fn decode<R: Resource>(raw: Payload) -> Result<R, ApiError> {
    serde_json::from_value(Value::Object(raw)).map_err(ApiError::decode)
}

/// Ids arrive as strings or numbers depending on the endpoint.
pub fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn pages_round_up() {
        assert_eq!(total_pages(25, 10), 3);
        assert_eq!(total_pages(30, 10), 3);
        assert_eq!(total_pages(31, 10), 4);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(0, 10), 0);
    }

    #[test]
    fn huge_totals_do_not_overflow() {
        assert_eq!(total_pages(u64::MAX, 10), usize::try_from(u64::MAX / 10 + 1).unwrap_or(usize::MAX));
        assert_eq!(total_pages(u64::MAX, 1), usize::try_from(u64::MAX).unwrap_or(usize::MAX));
    }

    #[test]
    fn pages_match_ceiling_for_small_grid() {
        for total in 1..=60u64 {
            for size in 1..=12usize {
                let expected = (total as f64 / size as f64).ceil() as usize;

                assert_eq!(total_pages(total, size), expected, "total {} size {}", total, size);
            }
        }
    }

    #[test]
    fn whitelist_keeps_only_allowed_keys() {
        let payload = json!({ "title": "X", "story_id": "1", "junk": true });
        let payload = payload.as_object().cloned().unwrap();

        let kept = whitelist(payload, |key| key == "title");

        assert_eq!(Value::Object(kept), json!({ "title": "X" }));
    }

    #[test]
    fn segment_rejects_path_breakers() {
        assert_eq!(segment(" 42 ").unwrap(), "42");
        assert!(segment("").is_err());
        assert!(segment("1/../2").is_err());
        assert!(segment("1?x=2").is_err());
        assert!(segment("a b").is_err());
    }

    #[test]
    fn ids_from_strings_and_numbers() {
        assert_eq!(id_text(&json!("abc")), Some("abc".into()));
        assert_eq!(id_text(&json!(17)), Some("17".into()));
        assert_eq!(id_text(&json!("")), None);
        assert_eq!(id_text(&json!(null)), None);
    }
}
