//! Workflow steps exposed to the automation host.
//!
//! A host hands every node the parameters it resolved for each input item
//! and gets back one output record per item, in order. Under
//! `continue_on_fail` a failing item becomes an `{"error": ..}` record paired
//! to that item; otherwise the first failure aborts the run.

mod check_language;
mod languages;
mod translate;

use crate::api::{ApiError, FluentCApi};
use crate::config::{ConfigError, PollConfig};
use crate::poll::PollError;
use crate::request::RequestError;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::future::Future;
use std::sync::Arc;

pub use check_language::CheckLanguageNode;
pub use languages::LanguagesNode;
pub use translate::TranslateNode;

const LOG_TARGET: &str = "fluentc::node";

pub const CREDENTIAL_NAME: &str = "fluentCApi";

/// Static metadata a host shows for a node.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct NodeDescription {
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub group: &'static str,
    pub version: u32,
    pub credential: &'static str,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExecutionContext {
    pub continue_on_fail: bool,
}

/// Parameters the host resolved for one input item.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct NodeItem {
    params: Map<String, Value>,
}

impl NodeItem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.params.insert(name.to_owned(), value.into());
        self
    }

    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name).filter(|v| !v.is_null())
    }

    pub fn required(&self, name: &'static str) -> Result<&Value, NodeError> {
        self.param(name).ok_or(NodeError::MissingParameter(name))
    }

    pub fn required_str(&self, name: &'static str) -> Result<&str, NodeError> {
        self.required(name)?
            .as_str()
            .ok_or(NodeError::InvalidParameter {
                name,
                reason: "expected a string".into(),
            })
    }

    pub fn optional_str(&self, name: &'static str) -> Result<Option<&str>, NodeError> {
        match self.param(name) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(NodeError::InvalidParameter {
                name,
                reason: "expected a string".into(),
            }),
        }
    }

    pub fn str_or<'a>(&'a self, name: &'static str, default: &'a str) -> Result<&'a str, NodeError> {
        Ok(self.optional_str(name)?.unwrap_or(default))
    }

    /// A numeric field nested in a collection parameter such as
    /// `additionalFields`.
    pub fn nested_u64(&self, collection: &str, name: &'static str) -> Result<Option<u64>, NodeError> {
        match self.param(collection).and_then(|c| c.get(name)) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => v.as_u64().map(Some).ok_or(NodeError::InvalidParameter {
                name,
                reason: "expected a non-negative integer".into(),
            }),
        }
    }
}

impl From<Map<String, Value>> for NodeItem {
    fn from(params: Map<String, Value>) -> Self {
        Self { params }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct NodeOutput {
    pub json: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paired_item: Option<usize>,
}

impl NodeOutput {
    pub fn paired(json: Value, index: usize) -> Self {
        Self {
            json,
            paired_item: Some(index),
        }
    }

    pub fn unpaired(json: Value) -> Self {
        Self {
            json,
            paired_item: None,
        }
    }

    pub fn error(err: &NodeError, paired_item: Option<usize>) -> Self {
        let mut json = Map::new();
        json.insert("error".into(), Value::String(err.to_string()));
        Self {
            json: Value::Object(json),
            paired_item,
        }
    }

    pub fn is_error(&self) -> bool {
        self.json.get("error").is_some()
    }
}

#[derive(thiserror::Error, Debug)]
pub enum NodeError {
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Poll(#[from] PollError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("batch submission response did not include a job_id")]
    MissingJobId,

    #[error("item {index} failed: {source}")]
    ItemFailed {
        index: usize,
        #[source]
        source: Box<NodeError>,
    },
}

pub trait Node: Send + Sync {
    fn describe(&self) -> &NodeDescription;

    fn execute<'a>(
        &'a self,
        ctx: &'a ExecutionContext,
        items: &'a [NodeItem],
    ) -> BoxFuture<'a, Result<Vec<NodeOutput>, NodeError>>;
}

/// Every node shipped in this package, sharing one API client.
pub fn package_nodes(api: Arc<dyn FluentCApi>, poll: PollConfig) -> Vec<Box<dyn Node>> {
    vec![
        Box::new(TranslateNode::new(api.clone(), poll)),
        Box::new(CheckLanguageNode::new(api.clone())),
        Box::new(LanguagesNode::new(api)),
    ]
}

/// Metadata for every node in the package. Needs no client or credential.
pub fn package_descriptions() -> Vec<NodeDescription> {
    vec![
        translate::DESCRIPTION.clone(),
        check_language::DESCRIPTION.clone(),
        languages::DESCRIPTION.clone(),
    ]
}

/// Runs `run` over `items` one at a time and pairs each outcome with its
/// item index.
pub(crate) async fn execute_each<'a, F, Fut>(
    node: &str,
    ctx: &ExecutionContext,
    items: &'a [NodeItem],
    mut run: F,
) -> Result<Vec<NodeOutput>, NodeError>
where
    F: FnMut(&'a NodeItem) -> Fut,
    Fut: Future<Output = Result<Value, NodeError>>,
{
    let mut outputs = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        match run(item).await {
            Ok(json) => outputs.push(NodeOutput::paired(json, index)),
            Err(e) if ctx.continue_on_fail => {
                tracing::warn!(target: LOG_TARGET, node, index, error = %e, "item failed, continuing");
                outputs.push(NodeOutput::error(&e, Some(index)));
            }
            Err(e) => {
                tracing::error!(target: LOG_TARGET, node, index, error = %e, "item failed, aborting");
                return Err(NodeError::ItemFailed {
                    index,
                    source: Box::new(e),
                });
            }
        }
    }

    Ok(outputs)
}

/// Adds `fields` to a response object, overwriting keys of the same name.
pub(crate) fn merge_fields(
    response: Value,
    fields: impl IntoIterator<Item = (&'static str, Value)>,
) -> Result<Value, NodeError> {
    let Value::Object(mut map) = response else {
        return Err(ApiError::InvalidResponse("expected a JSON object".into()).into());
    };
    for (key, value) in fields {
        map.insert(key.to_owned(), value);
    }
    Ok(Value::Object(map))
}
