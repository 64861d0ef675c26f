use crate::api::FluentCApi;
use crate::node::{
    execute_each, merge_fields, ExecutionContext, Node, NodeDescription, NodeError, NodeItem,
    NodeOutput, CREDENTIAL_NAME,
};
use crate::request::{CheckLanguageRequest, InputFormat};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;
use std::sync::Arc;

pub(super) static DESCRIPTION: NodeDescription = NodeDescription {
    name: "fluentCCheckLanguage",
    display_name: "FluentC Check Language",
    description: "Detect the language of text or HTML content using FluentC AI",
    group: "transform",
    version: 1,
    credential: CREDENTIAL_NAME,
};

#[derive(Clone)]
pub struct CheckLanguageNode {
    api: Arc<dyn FluentCApi>,
}

impl CheckLanguageNode {
    pub fn new(api: Arc<dyn FluentCApi>) -> Self {
        Self { api }
    }

    async fn check_item(&self, item: &NodeItem) -> Result<Value, NodeError> {
        let input = item.required_str("input")?.to_owned();
        let input_format: InputFormat = item.str_or("inputFormat", InputFormat::Text.as_str())?.parse()?;
        // length in UTF-16 code units, matching what the host reports for strings
        let input_length = input.encode_utf16().count();

        let request = CheckLanguageRequest::new(input, input_format)?;
        let response = self.api.check_language(request).await?;

        merge_fields(
            response,
            [
                ("input_format", Value::from(input_format.as_str())),
                ("input_length", Value::from(input_length)),
            ],
        )
    }
}

impl Node for CheckLanguageNode {
    fn describe(&self) -> &NodeDescription {
        &DESCRIPTION
    }

    fn execute<'a>(
        &'a self,
        ctx: &'a ExecutionContext,
        items: &'a [NodeItem],
    ) -> BoxFuture<'a, Result<Vec<NodeOutput>, NodeError>> {
        async move { execute_each(DESCRIPTION.name, ctx, items, |item| self.check_item(item)).await }
            .boxed()
    }
}
