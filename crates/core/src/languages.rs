use crate::api::{FluentCApi, Language};
use serde::{Deserialize, Serialize};

const LOG_TARGET: &str = "fluentc::languages";

/// Offered when the language list cannot be fetched.
pub const FALLBACK_LANGUAGES: [(&str, &str); 10] = [
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("zh", "Chinese"),
];

pub fn fallback_languages() -> Vec<Language> {
    FALLBACK_LANGUAGES
        .iter()
        .map(|(code, name)| Language {
            code: (*code).to_owned(),
            name: (*name).to_owned(),
        })
        .collect()
}

/// One entry of a language picker.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LanguageOption {
    pub name: String,
    pub value: String,
    pub description: String,
}

impl LanguageOption {
    fn from_language(lang: &Language) -> Self {
        Self {
            name: format!("{} ({})", lang.name, lang.code),
            value: lang.code.clone(),
            description: lang.name.clone(),
        }
    }

    fn fallback(lang: &Language) -> Self {
        Self {
            description: format!(
                "{} - Visit www.fluentc.io to enable if not available",
                lang.name
            ),
            ..Self::from_language(lang)
        }
    }

    pub fn auto_detect() -> Self {
        Self {
            name: "Auto-detect".to_owned(),
            value: String::new(),
            description: "Automatically detect source language".to_owned(),
        }
    }
}

/// Languages the API key may translate into. Never fails; a fetch error
/// yields the fallback table instead.
pub async fn target_language_options<A>(api: &A) -> Vec<LanguageOption>
where
    A: FluentCApi + ?Sized,
{
    match api.languages().await.and_then(|response| response.supported()) {
        Ok(languages) => languages.iter().map(LanguageOption::from_language).collect(),
        Err(e) => {
            tracing::warn!(target: LOG_TARGET, error = %e, "language fetch failed, using fallback list");
            fallback_languages()
                .iter()
                .map(LanguageOption::fallback)
                .collect()
        }
    }
}

/// Same list as [`target_language_options`], led by an auto-detect entry.
pub async fn source_language_options<A>(api: &A) -> Vec<LanguageOption>
where
    A: FluentCApi + ?Sized,
{
    let mut options = vec![LanguageOption::auto_detect()];
    options.extend(target_language_options(api).await);
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::ScriptedApi;
    use serde_json::{json, Value};

    fn listing() -> Value {
        json!({
            "supported_languages": [
                {"code": "nl", "name": "Dutch"},
                {"code": "sv", "name": "Swedish"}
            ],
            "source_languages": []
        })
    }

    #[tokio::test]
    async fn maps_fetched_languages() {
        let api = ScriptedApi::default().with_languages(Ok(listing()));
        let options = target_language_options(&api).await;
        assert_eq!(
            options[0],
            LanguageOption {
                name: "Dutch (nl)".into(),
                value: "nl".into(),
                description: "Dutch".into(),
            }
        );
        assert_eq!(options.len(), 2);
    }

    #[tokio::test]
    async fn falls_back_to_common_languages_on_error() {
        let api = ScriptedApi::default().with_languages(Err("unauthorized".into()));
        let options = target_language_options(&api).await;
        assert_eq!(options.len(), 10);
        assert_eq!(options[0].name, "English (en)");
        assert!(options[9].description.starts_with("Chinese - Visit www.fluentc.io"));
    }

    #[tokio::test]
    async fn body_without_language_list_falls_back() {
        let api = ScriptedApi::default().with_languages(Ok(json!({"message": "no plan"})));
        let options = target_language_options(&api).await;
        assert_eq!(options.len(), 10);
        assert_eq!(options[3].value, "de");
    }

    #[tokio::test]
    async fn malformed_entry_falls_back() {
        let api = ScriptedApi::default()
            .with_languages(Ok(json!({"supported_languages": [{"code": 7}]})));
        let options = target_language_options(&api).await;
        assert_eq!(options.len(), 10);
    }

    #[tokio::test]
    async fn source_options_lead_with_auto_detect() {
        let api = ScriptedApi::default().with_languages(Ok(listing()));
        let options = source_language_options(&api).await;
        assert_eq!(options[0], LanguageOption::auto_detect());
        assert_eq!(options[0].value, "");
        assert_eq!(options.len(), 3);

        let api = ScriptedApi::default();
        assert_eq!(source_language_options(&api).await.len(), 11);
    }
}
