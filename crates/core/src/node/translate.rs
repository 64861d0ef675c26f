use crate::api::FluentCApi;
use crate::config::{LanguageCode, PollConfig};
use crate::node::{
    execute_each, merge_fields, ExecutionContext, Node, NodeDescription, NodeError, NodeItem,
    NodeOutput, CREDENTIAL_NAME,
};
use crate::poll::BatchPoller;
use crate::request::{InputFormat, TranslationMode, TranslationRequest};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;
use std::sync::Arc;

const LOG_TARGET: &str = "fluentc::node::translate";

pub(super) static DESCRIPTION: NodeDescription = NodeDescription {
    name: "fluentCTranslate",
    display_name: "FluentC Translate",
    description: "Translate text or HTML using FluentC AI",
    group: "transform",
    version: 1,
    credential: CREDENTIAL_NAME,
};

/// Translates each item in real-time or batch mode.
///
/// Batch mode submits a job and waits for it with [`BatchPoller`]; the
/// per-item `additionalFields.maxPollingAttempts` overrides the attempt
/// budget.
#[derive(Clone)]
pub struct TranslateNode {
    api: Arc<dyn FluentCApi>,
    poll: PollConfig,
}

impl TranslateNode {
    pub fn new(api: Arc<dyn FluentCApi>, poll: PollConfig) -> Self {
        Self { api, poll }
    }

    fn poll_config(&self, item: &NodeItem) -> Result<PollConfig, NodeError> {
        match item.nested_u64("additionalFields", "maxPollingAttempts")? {
            Some(n) => {
                let attempts = u32::try_from(n).unwrap_or(u32::MAX);
                Ok(PollConfig::new(attempts)?
                    .with_default_wait(self.poll.default_wait)
                    .with_min_wait(self.poll.min_wait))
            }
            None => Ok(self.poll),
        }
    }

    async fn translate_item(&self, item: &NodeItem) -> Result<Value, NodeError> {
        let mode: TranslationMode = item.str_or("mode", TranslationMode::RealTime.as_str())?.parse()?;
        let input_format: InputFormat = item.str_or("inputFormat", InputFormat::Text.as_str())?.parse()?;
        let target_language = LanguageCode::new(item.str_or("targetLanguage", "")?)?;
        let source_language = item
            .optional_str("sourceLanguage")?
            .filter(|s| !s.trim().is_empty())
            .map(LanguageCode::new)
            .transpose()?;
        let poll = match mode {
            TranslationMode::Batch => Some(self.poll_config(item)?),
            TranslationMode::RealTime => None,
        };

        let request = TranslationRequest::new(
            item.required("input")?,
            input_format,
            target_language.clone(),
            source_language.clone(),
            mode,
        )?;

        let response = self.api.translate(request.into_body()).await?;

        let result = match poll {
            None => response,
            Some(poll) => {
                let job_id = match response.get("job_id") {
                    Some(Value::String(id)) if !id.is_empty() => id.clone(),
                    Some(Value::Number(id)) => id.to_string(),
                    _ => return Err(NodeError::MissingJobId),
                };
                tracing::info!(
                    target: LOG_TARGET,
                    %job_id,
                    max_attempts = poll.max_attempts,
                    "batch job submitted"
                );
                BatchPoller::new(self.api.as_ref(), poll)
                    .wait_for(&job_id)
                    .await?
            }
        };

        let mut fields = vec![
            ("mode", Value::from(mode.as_str())),
            ("input_format", Value::from(input_format.as_str())),
            ("target_language", Value::from(target_language.0)),
        ];
        if let Some(source) = source_language {
            fields.push(("source_language", Value::from(source.0)));
        }
        merge_fields(result, fields)
    }
}

impl Node for TranslateNode {
    fn describe(&self) -> &NodeDescription {
        &DESCRIPTION
    }

    fn execute<'a>(
        &'a self,
        ctx: &'a ExecutionContext,
        items: &'a [NodeItem],
    ) -> BoxFuture<'a, Result<Vec<NodeOutput>, NodeError>> {
        async move {
            execute_each(DESCRIPTION.name, ctx, items, |item| self.translate_item(item)).await
        }
        .boxed()
    }
}
