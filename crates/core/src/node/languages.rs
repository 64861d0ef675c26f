use crate::api::FluentCApi;
use crate::languages::fallback_languages;
use crate::node::{
    ExecutionContext, Node, NodeDescription, NodeError, NodeItem, NodeOutput, CREDENTIAL_NAME,
};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::json;
use std::sync::Arc;

const LOG_TARGET: &str = "fluentc::node::languages";

pub(super) static DESCRIPTION: NodeDescription = NodeDescription {
    name: "fluentCLanguages",
    display_name: "FluentC Languages",
    description: "Fetches supported and source languages from FluentC AI",
    group: "transform",
    version: 1,
    credential: CREDENTIAL_NAME,
};

/// Emits a single record with the account's language lists, regardless of
/// how many items come in.
#[derive(Clone)]
pub struct LanguagesNode {
    api: Arc<dyn FluentCApi>,
}

impl LanguagesNode {
    pub fn new(api: Arc<dyn FluentCApi>) -> Self {
        Self { api }
    }
}

impl Node for LanguagesNode {
    fn describe(&self) -> &NodeDescription {
        &DESCRIPTION
    }

    fn execute<'a>(
        &'a self,
        ctx: &'a ExecutionContext,
        _items: &'a [NodeItem],
    ) -> BoxFuture<'a, Result<Vec<NodeOutput>, NodeError>> {
        async move {
            match self.api.languages().await {
                Ok(response) => Ok(vec![NodeOutput::unpaired(json!({
                    "supported_languages": response.supported_languages,
                    "source_languages": response.source_languages,
                }))]),
                Err(e) if ctx.continue_on_fail => {
                    tracing::warn!(target: LOG_TARGET, error = %e, "language fetch failed, emitting fallback list");
                    let fallback = fallback_languages();
                    Ok(vec![NodeOutput::unpaired(json!({
                        "error": e.to_string(),
                        "supported_languages": fallback,
                        "source_languages": fallback,
                    }))])
                }
                Err(e) => Err(e.into()),
            }
        }
        .boxed()
    }
}
