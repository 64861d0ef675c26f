#![deny(warnings)]

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use fluentc_nodes_core::api::{FluentCApi, HttpFluentCClient};
use fluentc_nodes_core::config::{
    resolve_api_key, resolve_string_with_default, ClientConfig, ConfigError, Env,
    PollConfig, StdEnv, DEFAULT_BASE_URL, DEFAULT_MAX_POLL_ATTEMPTS,
    DEFAULT_REQUEST_TIMEOUT_SECS, ENV_FLUENTC_API_KEY, ENV_FLUENTC_BASE_URL, MIN_POLL_WAIT_SECS,
};
use fluentc_nodes_core::languages::{source_language_options, target_language_options};
use fluentc_nodes_core::node::{
    package_descriptions, CheckLanguageNode, ExecutionContext, LanguagesNode, Node, NodeItem,
    NodeOutput, TranslateNode,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fluentc")]
#[command(about = "Run FluentC translation workflow steps from the command line")]
struct Args {
    /// Overrides FLUENTC_API_KEY.
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Overrides FLUENTC_BASE_URL.
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[arg(long, global = true, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Record failing items as error records instead of aborting.
    #[arg(long, global = true)]
    continue_on_fail: bool,

    /// Status checks per batch job before giving up (1-100).
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_POLL_ATTEMPTS)]
    max_attempts: u32,

    /// Floor applied to the server's wait hint between status checks.
    #[arg(long, global = true, default_value_t = MIN_POLL_WAIT_SECS)]
    min_wait_secs: u64,

    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Translate one item per --input.
    Translate(TranslateArgs),
    /// Detect the language of one item per --input.
    CheckLanguage(CheckLanguageArgs),
    /// Fetch the supported and source language lists.
    Languages,
    /// List language picker options, falling back to common languages.
    LanguageOptions {
        /// Include the auto-detect entry used for source languages.
        #[arg(long)]
        source: bool,
    },
    /// Describe every node in the package.
    Nodes,
    /// Check that the API key is accepted.
    VerifyKey,
}

#[derive(ClapArgs, Debug)]
struct TranslateArgs {
    #[arg(long = "input", required = true)]
    inputs: Vec<String>,

    #[arg(long, default_value = "text")]
    format: String,

    #[arg(long)]
    target: String,

    #[arg(long)]
    source: Option<String>,

    #[arg(long, default_value = "real-time")]
    mode: String,
}

#[derive(ClapArgs, Debug)]
struct CheckLanguageArgs {
    #[arg(long = "input", required = true)]
    inputs: Vec<String>,

    #[arg(long, default_value = "text")]
    format: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;
    run(args, &StdEnv).await
}

async fn run(args: Args, env: &impl Env) -> anyhow::Result<()> {
    if matches!(args.command, Command::Nodes) {
        return print_json(&package_descriptions());
    }

    let ctx = ExecutionContext {
        continue_on_fail: args.continue_on_fail,
    };

    let cfg = build_config(&args, env)?;
    tracing::info!(base_url = %cfg.base_url, "config loaded");
    let api: Arc<dyn FluentCApi> =
        Arc::new(HttpFluentCClient::new(&cfg).context("failed to build http client")?);

    match args.command {
        Command::Translate(t) => {
            let items: Vec<NodeItem> = t
                .inputs
                .iter()
                .map(|input| {
                    let mut item = NodeItem::new()
                        .with("input", input.as_str())
                        .with("inputFormat", t.format.as_str())
                        .with("targetLanguage", t.target.as_str())
                        .with("mode", t.mode.as_str());
                    if let Some(source) = &t.source {
                        item = item.with("sourceLanguage", source.as_str());
                    }
                    item
                })
                .collect();
            run_node(&TranslateNode::new(api, cfg.poll), &ctx, &items).await
        }
        Command::CheckLanguage(c) => {
            let items: Vec<NodeItem> = c
                .inputs
                .iter()
                .map(|input| {
                    NodeItem::new()
                        .with("input", input.as_str())
                        .with("inputFormat", c.format.as_str())
                })
                .collect();
            run_node(&CheckLanguageNode::new(api), &ctx, &items).await
        }
        Command::Languages => run_node(&LanguagesNode::new(api), &ctx, &[]).await,
        Command::LanguageOptions { source } => {
            let options = if source {
                source_language_options(api.as_ref()).await
            } else {
                target_language_options(api.as_ref()).await
            };
            print_json(&options)
        }
        Command::VerifyKey => {
            let languages = api
                .languages()
                .await
                .context("FluentC rejected the credential check")?;
            print_json(&json!({
                "valid": true,
                "supported_languages": languages.supported_languages.len(),
            }))
        }
        Command::Nodes => print_json(&package_descriptions()),
    }
}

async fn run_node(
    node: &dyn Node,
    ctx: &ExecutionContext,
    items: &[NodeItem],
) -> anyhow::Result<()> {
    let name = node.describe().name;
    let outputs: Vec<NodeOutput> = node
        .execute(ctx, items)
        .await
        .with_context(|| format!("{name} failed"))?;
    let failed = outputs.iter().filter(|o| o.is_error()).count();
    tracing::info!(node = name, outputs = outputs.len(), failed, "node finished");
    print_json(&outputs)
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    let rendered: Value = serde_json::to_value(value)?;
    println!("{}", serde_json::to_string_pretty(&rendered)?);
    Ok(())
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(
            level
                .parse()
                .with_context(|| format!("invalid --log-level: {level}"))?,
        )
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn build_config(args: &Args, env: &impl Env) -> anyhow::Result<ClientConfig> {
    let api_key = resolve_api_key(args.api_key.clone(), ENV_FLUENTC_API_KEY, env)?
        .ok_or(ConfigError::MissingApiKey)?;
    let base_url =
        resolve_string_with_default(args.base_url.clone(), ENV_FLUENTC_BASE_URL, env, DEFAULT_BASE_URL);

    let poll =
        PollConfig::new(args.max_attempts)?.with_min_wait(Duration::from_secs(args.min_wait_secs));

    Ok(ClientConfig::new(api_key)?
        .with_base_url(&base_url)?
        .with_request_timeout(Duration::from_secs(args.timeout_secs))
        .with_poll(poll))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluentc_nodes_core::config::MapEnv;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).expect("valid args")
    }

    #[test]
    fn api_key_flag_overrides_env() {
        let env = MapEnv::default().with_var(ENV_FLUENTC_API_KEY, "env-key");
        let args = parse(&["fluentc", "--api-key", "cli-key", "languages"]);
        let cfg = build_config(&args, &env).expect("config");
        assert_eq!(cfg.api_key.expose(), "cli-key");
        assert_eq!(cfg.base_url.as_str(), DEFAULT_BASE_URL);
    }

    #[test]
    fn missing_api_key_is_reported() {
        let args = parse(&["fluentc", "languages"]);
        let err = build_config(&args, &MapEnv::default()).unwrap_err();
        assert!(err.to_string().contains("api key is required"), "{err}");
    }

    #[test]
    fn base_url_comes_from_env() {
        let env = MapEnv::default()
            .with_var(ENV_FLUENTC_API_KEY, "k")
            .with_var(ENV_FLUENTC_BASE_URL, "http://localhost:8080/ai_agent");
        let cfg = build_config(&parse(&["fluentc", "verify-key"]), &env).expect("config");
        assert_eq!(cfg.base_url.as_str(), "http://localhost:8080/ai_agent");
    }

    #[test]
    fn poll_flags_reach_the_client_config() {
        let env = MapEnv::default().with_var(ENV_FLUENTC_API_KEY, "k");
        let args = parse(&[
            "fluentc",
            "translate",
            "--input",
            "Hi",
            "--target",
            "fr",
            "--max-attempts",
            "7",
            "--min-wait-secs",
            "2",
            "--timeout-secs",
            "15",
        ]);
        let cfg = build_config(&args, &env).expect("config");
        assert_eq!(cfg.poll.max_attempts, 7);
        assert_eq!(cfg.poll.min_wait, Duration::from_secs(2));
        assert_eq!(cfg.request_timeout, Duration::from_secs(15));

        let defaults = build_config(&parse(&["fluentc", "languages"]), &env).expect("config");
        assert_eq!(defaults.poll, PollConfig::default());
    }

    #[test]
    fn out_of_range_max_attempts_is_rejected() {
        let env = MapEnv::default().with_var(ENV_FLUENTC_API_KEY, "k");
        let args = parse(&["fluentc", "--max-attempts", "101", "languages"]);
        let err = build_config(&args, &env).unwrap_err();
        assert!(err.to_string().contains("1..=100"), "{err}");
    }

    #[tokio::test]
    async fn nodes_listing_needs_no_api_key() {
        run(parse(&["fluentc", "nodes"]), &MapEnv::default())
            .await
            .expect("nodes without credentials");
    }

    #[test]
    fn translate_accepts_repeated_inputs() {
        let args = parse(&[
            "fluentc",
            "translate",
            "--input",
            "Hello",
            "--input",
            "World",
            "--target",
            "de",
            "--mode",
            "batch",
            "--continue-on-fail",
        ]);
        assert!(args.continue_on_fail);
        match args.command {
            Command::Translate(t) => {
                assert_eq!(t.inputs, vec!["Hello", "World"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
