//! Sitelingo 命令行入口
//!
//! 薄调用层：解析参数、构建上下文，然后驱动库里的核心操作。

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sitelingo::content::node::component_record;
use sitelingo::content::{normalize, FieldSchema, PlatformWriter, SchemaTable, WriteTarget};
use sitelingo::core::{
    Credentials, LocaleTarget, RunMode, WorkflowContext, WorkflowOptions, DEFAULT_PAGE_SIZE,
    DEFAULT_TIMEOUT_SECS,
};
use sitelingo::env::{self, EnvVar};
use sitelingo::error::{SyncError, SyncResult};
use sitelingo::network::client::{ApiClient, DEFAULT_API_BASE};
use sitelingo::translation::gateway::{
    DialectRoute, RoutedTranslator, TranslatorConfig, DIALECT_ENDPOINT,
};
use sitelingo::translation::pipeline::Orchestrator;
use sitelingo::TranslatableRecord;

#[derive(Parser)]
#[command(
    name = "sitelingo",
    about = "Translate website platform content across locales",
    version
)]
struct Cli {
    /// 站点ID（缺省读 SITELINGO_SITE_ID）
    #[arg(long, global = true)]
    site_id: Option<String>,

    /// 平台API令牌（缺省读 SITELINGO_PLATFORM_TOKEN）
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 列出站点语言目标
    Locales {
        /// 使用CMS命名空间（条目写回用的locale id）
        #[arg(long)]
        cms: bool,
    },
    /// 列出站点页面
    Pages,
    /// 列出CMS集合
    Collections,
    /// 列出站点组件
    Components,
    /// 翻译并写回一个内容单元
    Sync {
        /// 页面DOM节点
        #[arg(long, group = "target")]
        page: Option<String>,

        /// 组件DOM节点
        #[arg(long, group = "target")]
        component: Option<String>,

        /// 组件文本属性（传组件ID）
        #[arg(long, group = "target", value_name = "COMPONENT_ID")]
        properties: Option<String>,

        /// CMS集合条目
        #[arg(long, group = "target")]
        collection: Option<String>,

        /// 目标语言标签，可重复；缺省为全部非默认语言
        #[arg(long = "locale")]
        locales: Vec<String>,

        /// 并发工作数；缺省顺序执行
        #[arg(long)]
        parallel: Option<usize>,

        /// 顺序模式下请求之间的间隔毫秒数
        #[arg(long, default_value_t = 1000)]
        pacing_ms: u64,

        /// 方言路由命中的语言标签
        #[arg(long, default_value = "pt-BR")]
        dialect_tag: String,
    },
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = env::LogLevel::get().unwrap_or_else(|_| "info".to_string());
        EnvFilter::new(level)
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    if let Err(error) = run(cli).await {
        eprintln!("错误: {}", error);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> SyncResult<()> {
    let site_id = cli
        .site_id
        .or_else(|| env::SiteId::get_optional())
        .ok_or_else(|| SyncError::Config("缺少站点ID（--site-id 或 SITELINGO_SITE_ID）".into()))?;
    let token = cli
        .token
        .or_else(|| env::PlatformToken::get_optional())
        .ok_or_else(|| {
            SyncError::Config("缺少平台令牌（--token 或 SITELINGO_PLATFORM_TOKEN）".into())
        })?;

    let client = ApiClient::new(
        DEFAULT_API_BASE,
        &token,
        Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        DEFAULT_PAGE_SIZE,
    )?;

    match cli.command {
        Command::Locales { cms } => {
            let locales = if cms {
                client.cms_locales(&site_id).await?
            } else {
                client.site_locales(&site_id).await?
            };
            for locale in &locales {
                let kind = if locale.is_default { "Primary" } else { "Secondary" };
                println!("{:<10} {} ({}) -> {}", kind, locale.name, locale.tag, locale.id);
            }
        }
        Command::Pages => {
            for page in client.pages(&site_id).await? {
                let title = if page.title.is_empty() {
                    "Untitled"
                } else {
                    page.title.as_str()
                };
                println!("{} ({}) /{}", title, page.id, page.slug);
            }
        }
        Command::Collections => {
            let table = SchemaTable::builtin();
            for collection in client.collections(&site_id).await? {
                let configured = match table.lookup(&collection.display_name) {
                    Some((key, _)) => format!("schema: {}", key),
                    None => "unconfigured".to_string(),
                };
                println!("{} ({}) [{}]", collection.display_name, collection.id, configured);
            }
        }
        Command::Components => {
            let outcome = client.components(&site_id).await?;
            if !outcome.complete {
                tracing::warn!("组件列表不完整：{}/{}", outcome.items.len(), outcome.total);
            }
            // "Break" 占位组件不参与翻译，过滤并报告数量
            let mut excluded = 0usize;
            for component in &outcome.items {
                if component.name == "Break" {
                    excluded += 1;
                    continue;
                }
                let name = if component.name.is_empty() {
                    "Unnamed"
                } else {
                    component.name.as_str()
                };
                println!("{} ({})", name, component.id);
            }
            if excluded > 0 {
                println!("(excluded {} 'Break' component(s))", excluded);
            }
        }
        Command::Sync {
            page,
            component,
            properties,
            collection,
            locales,
            parallel,
            pacing_ms,
            dialect_tag,
        } => {
            let translator_key = env::TranslatorKey::get_optional().ok_or_else(|| {
                SyncError::Credential("缺少翻译服务API密钥（SITELINGO_TRANSLATOR_KEY）".into())
            })?;
            let credentials = Credentials {
                platform_token: token.clone(),
                translator_key,
                dialect_key: env::DialectKey::get_optional(),
            };
            let context = WorkflowContext::new(&site_id, credentials);
            context.validate()?;
            // 先做一次最便宜的令牌校验，再开始抓取
            client.validate_token().await?;

            // 组装内容单元：记录集合、写回目标和语言命名空间
            let (records, target, mut targets) = if let Some(page_id) = page {
                let outcome = client.page_nodes(&page_id).await?;
                warn_if_partial(outcome.complete, outcome.items.len(), outcome.total);
                (
                    normalize(&outcome.items, &FieldSchema::dom()),
                    WriteTarget::PageDom { page_id },
                    client.site_locales(&site_id).await?,
                )
            } else if let Some(component_id) = component {
                let outcome = client.component_nodes(&site_id, &component_id).await?;
                warn_if_partial(outcome.complete, outcome.items.len(), outcome.total);
                (
                    normalize(&outcome.items, &FieldSchema::dom()),
                    WriteTarget::ComponentDom {
                        site_id: site_id.clone(),
                        component_id,
                    },
                    client.site_locales(&site_id).await?,
                )
            } else if let Some(component_id) = properties {
                let outcome = client.component_properties(&site_id, &component_id).await?;
                warn_if_partial(outcome.complete, outcome.items.len(), outcome.total);
                let records: Vec<TranslatableRecord> =
                    component_record(&component_id, &outcome.items)
                        .into_iter()
                        .collect();
                (
                    records,
                    WriteTarget::ComponentProperties {
                        site_id: site_id.clone(),
                        component_id,
                    },
                    client.site_locales(&site_id).await?,
                )
            } else if let Some(collection_id) = collection {
                let table = SchemaTable::builtin();
                let summary = client
                    .collections(&site_id)
                    .await?
                    .into_iter()
                    .find(|c| c.id == collection_id)
                    .ok_or_else(|| {
                        SyncError::Config(format!("站点下找不到集合 {}", collection_id))
                    })?;
                let (key, schema) = table.lookup(&summary.display_name).ok_or_else(|| {
                    SyncError::Config(format!(
                        "集合类型 '{}' 未配置字段模式，可用类型: {}",
                        summary.display_name,
                        table
                            .collections
                            .keys()
                            .cloned()
                            .collect::<Vec<_>>()
                            .join(", ")
                    ))
                })?;
                tracing::info!("按 {} 模式处理集合 {}", key, summary.display_name);

                let outcome = client.collection_items(&collection_id).await?;
                warn_if_partial(outcome.complete, outcome.items.len(), outcome.total);
                (
                    normalize(&outcome.items, schema),
                    WriteTarget::Collection { collection_id },
                    client.cms_locales(&site_id).await?,
                )
            } else {
                return Err(SyncError::Config(
                    "需要指定 --page、--component、--properties 或 --collection 之一".into(),
                ));
            };

            if records.is_empty() {
                println!("没有可同步的内容");
                return Ok(());
            }

            // 语言筛选：显式给了标签就只留命中的目标
            if !locales.is_empty() {
                targets.retain(|t| locales.iter().any(|tag| tag.eq_ignore_ascii_case(&t.tag)));
                if targets.iter().all(|t: &LocaleTarget| t.is_default) {
                    return Err(SyncError::Config("没有命中的非默认语言目标".into()));
                }
            }

            let workers = parallel.or_else(|| env::MaxWorkers::get_optional());
            let options = WorkflowOptions {
                mode: match workers {
                    Some(max_workers) => RunMode::Parallel { max_workers },
                    None => RunMode::Sequential,
                },
                pacing: Duration::from_millis(pacing_ms),
                ..WorkflowOptions::default()
            };

            let translator_config = TranslatorConfig {
                timeout: options.request_timeout,
                dialect: context.credentials.dialect_key.clone().map(|api_key| {
                    DialectRoute {
                        tag: dialect_tag.clone(),
                        endpoint: DIALECT_ENDPOINT.to_string(),
                        model: "deepseek-chat".to_string(),
                        api_key,
                    }
                }),
                ..TranslatorConfig::new(&context.credentials.translator_key)
            };
            let translator = Arc::new(RoutedTranslator::from_config(
                &translator_config,
                context.rules.clone(),
            )?);
            let writer = Arc::new(PlatformWriter::new(client.clone(), target));

            let orchestrator = Orchestrator::new(options)?;

            let report = orchestrator
                .translate_and_publish(&records, &targets, &context.glossary, translator, writer)
                .await?;

            for outcome in &report.outcomes {
                let mark = if outcome.is_success() { "✅" } else { "❌" };
                println!(
                    "{} {} [{}]: {}",
                    mark, outcome.item_identifier, outcome.locale_name, outcome.message
                );
                for warning in &outcome.warnings {
                    println!("   ⚠️  {}", warning);
                }
            }
            println!(
                "完成 {} 项: 成功 {}, 失败 {}, 带警告 {}, 耗时 {:.1}s",
                report.total,
                report.succeeded,
                report.failed,
                report.with_warnings,
                report.elapsed.as_secs_f32()
            );

            if report.failed > 0 {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn warn_if_partial(complete: bool, fetched: usize, total: usize) {
    if !complete {
        tracing::warn!("内容抓取不完整：{}/{}，结果可能缺页", fetched, total);
    }
}
