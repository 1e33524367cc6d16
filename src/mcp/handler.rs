//! MCP server handler, shared application state, and tool router.

use std::future::Future;
use std::sync::Arc;

use rmcp::handler::server::{
    tool::{ToolCallContext, ToolRoute, ToolRouter},
    ServerHandler,
};
use rmcp::model::{
    CallToolRequestParam, CallToolResult, GetPromptRequestParam, GetPromptResult, Implementation,
    ListPromptsResult, ListToolsResult, PaginatedRequestParam, ServerCapabilities, ServerInfo,
    Tool,
};
use rmcp::service::{RequestContext, RoleServer};
use tracing::{info_span, Instrument};

use crate::config::GlobalConfig;
use crate::jobs::launcher::JobLauncher;
use crate::jobs::registry::JobRegistry;
use crate::jobs::spawner::{DetachedSpawner, ProcessSpawner};
use crate::models::scanner::ScannerKind;
use crate::persistence::result_store::ResultStore;
use crate::probe::StatusProber;

use super::{prompts, tools};

/// Workflow guidance advertised to the connecting agent.
const INSTRUCTIONS: &str = "Reconnaissance bridge. Scans run in the background and outlive \
    the call that starts them.\n\
    1. launch_scan(target) starts a subdomain scan (scanner=\"directory\" for a directory scan).\n\
    2. probe_status(target) reports pending or complete; poll it every minute or two.\n\
    3. Once complete, list_schema() shows the result tables and run_query(sql) analyzes them. \
    Directory scan reports are read with read_report(target).\n\
    If a launch fails, self_test() checks whether the scanner can be started at all. \
    The pentest_expert_mode(domain) prompt runs the whole workflow for one domain.";

/// Shared application state accessible by all MCP tool handlers.
pub struct AppState {
    /// Global configuration with resolved paths.
    pub config: Arc<GlobalConfig>,
    /// Launches scanner jobs into the shared registry.
    pub launcher: JobLauncher,
    /// Shared `SQLite` result store.
    pub store: ResultStore,
    /// Artifact-based completion checks.
    pub prober: StatusProber,
}

impl AppState {
    /// Build state that spawns real detached scanner processes.
    #[must_use]
    pub fn new(config: GlobalConfig) -> Self {
        Self::with_spawner(config, Arc::new(DetachedSpawner))
    }

    /// Build state around an injected spawn strategy.
    #[must_use]
    pub fn with_spawner(config: GlobalConfig, spawner: Arc<dyn ProcessSpawner>) -> Self {
        let store = ResultStore::new(config.store_path(), config.lock_timeout());
        let prober = StatusProber::new(store.clone(), config.reports_dir());
        let launcher = JobLauncher::new(Arc::new(JobRegistry::new()), spawner);

        Self {
            config: Arc::new(config),
            launcher,
            store,
            prober,
        }
    }

    /// Registry of launched jobs.
    #[must_use]
    pub fn registry(&self) -> &Arc<JobRegistry> {
        self.launcher.registry()
    }
}

/// MCP server implementation that exposes the reconnaissance tools.
#[derive(Clone)]
pub struct ReconServer {
    state: Arc<AppState>,
    tool_router: ToolRouter<Self>,
}

impl ReconServer {
    /// Create a new MCP server bound to shared application state.
    #[must_use]
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
        }
    }

    /// Access the shared application state.
    #[must_use]
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    fn tool_router() -> ToolRouter<Self> {
        let mut router = ToolRouter::new();
        router.add_route(ToolRoute::new_dyn(Self::launch_scan_tool(), |context| {
            Box::pin(tools::launch_scan::handle(context))
        }));
        router.add_route(ToolRoute::new_dyn(Self::probe_status_tool(), |context| {
            Box::pin(tools::probe_status::handle(context))
        }));
        router.add_route(ToolRoute::new_dyn(Self::list_schema_tool(), |context| {
            Box::pin(tools::list_schema::handle(context))
        }));
        router.add_route(ToolRoute::new_dyn(Self::run_query_tool(), |context| {
            Box::pin(tools::run_query::handle(context))
        }));
        router.add_route(ToolRoute::new_dyn(Self::self_test_tool(), |context| {
            Box::pin(tools::self_test::handle(context))
        }));
        router.add_route(ToolRoute::new_dyn(Self::read_report_tool(), |context| {
            Box::pin(tools::read_report::handle(context))
        }));
        router.add_route(ToolRoute::new_dyn(Self::list_jobs_tool(), |context| {
            Box::pin(tools::list_jobs::handle(context))
        }));
        router
    }

    /// Convert a `serde_json::Value::Object` into the `Arc<Map>` expected by `Tool`.
    fn schema(value: serde_json::Value) -> Arc<serde_json::Map<String, serde_json::Value>> {
        match value {
            serde_json::Value::Object(map) => Arc::new(map),
            _ => Arc::new(serde_json::Map::default()),
        }
    }

    fn scanner_property() -> serde_json::Value {
        let names: Vec<&str> = ScannerKind::ALL.iter().map(|kind| kind.as_str()).collect();
        serde_json::json!({
            "type": "string",
            "enum": names,
            "default": ScannerKind::default().as_str(),
            "description": "Which scanner: subdomain enumeration (result table) or directory brute-force (report file)."
        })
    }

    /// Every tool exposed by the server, with its input schema, sorted by
    /// name.
    #[must_use]
    pub fn all_tools() -> Vec<Tool> {
        let mut tools = Self::tool_router().list_all();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    fn launch_scan_tool() -> Tool {
        Tool::new(
            "launch_scan",
            "Start a scan of the target domain in the background. Returns immediately; \
             the scan keeps running after this call. Poll probe_status to see when it \
             finishes.",
            Self::schema(serde_json::json!({
                "type": "object",
                "properties": {
                    "target": { "type": "string", "description": "Target domain, e.g. example.com" },
                    "scanner": Self::scanner_property()
                },
                "required": ["target"]
            })),
        )
    }

    fn probe_status_tool() -> Tool {
        Tool::new(
            "probe_status",
            "Check whether the scan for a target has finished by looking for its result \
             table (subdomain) or report file (directory). Works even after a bridge restart.",
            Self::schema(serde_json::json!({
                "type": "object",
                "properties": {
                    "target": { "type": "string", "description": "Target domain, e.g. example.com" },
                    "scanner": Self::scanner_property()
                },
                "required": ["target"]
            })),
        )
    }

    fn list_schema_tool() -> Tool {
        Tool::new(
            "list_schema",
            "List the CREATE TABLE statement of every table in the subdomain result store.",
            Self::schema(serde_json::json!({
                "type": "object",
                "properties": {}
            })),
        )
    }

    fn run_query_tool() -> Tool {
        Tool::new(
            "run_query",
            "Run a SQLite query against the subdomain result store and return at most 50 \
             rows as a table. Each finished scan has a table named after the target with \
             dots replaced by underscores (example.com -> example_com). Useful columns: \
             subdomain, url, ip, port, status (HTTP status), title, banner (fingerprint), \
             cname, alive (1 when reachable), resolve (DNS resolved), request (HTTP request \
             succeeded), public (public IP), cdn (IP belongs to a CDN), level (subdomain \
             depth), asn, cidr, addr, isp, module and source (how it was found).",
            Self::schema(serde_json::json!({
                "type": "object",
                "properties": {
                    "sql": {
                        "type": "string",
                        "description": "SQLite query, e.g. SELECT subdomain, ip FROM example_com WHERE subdomain LIKE '%admin%'"
                    }
                },
                "required": ["sql"]
            })),
        )
    }

    fn self_test_tool() -> Tool {
        Tool::new(
            "self_test",
            "Check that the scanner can be started by running it with --help. Use this \
             when launch_scan fails.",
            Self::schema(serde_json::json!({
                "type": "object",
                "properties": {
                    "scanner": Self::scanner_property()
                }
            })),
        )
    }

    fn read_report_tool() -> Tool {
        Tool::new(
            "read_report",
            "Return the plain-text report of a finished directory scan.",
            Self::schema(serde_json::json!({
                "type": "object",
                "properties": {
                    "target": {
                        "type": "string",
                        "description": "Target domain (example.com) or its report name (example_com)"
                    }
                },
                "required": ["target"]
            })),
        )
    }

    fn list_jobs_tool() -> Tool {
        Tool::new(
            "list_jobs",
            "List scan jobs launched since the bridge started and whether each is still running.",
            Self::schema(serde_json::json!({
                "type": "object",
                "properties": {}
            })),
        )
    }
}

impl ServerHandler for ReconServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder()
                .enable_prompts()
                .enable_tools()
                .build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(INSTRUCTIONS.into()),
            ..Default::default()
        }
    }

    fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, rmcp::ErrorData>> + Send + '_ {
        let span = info_span!("call_tool", tool = %request.name);

        async move {
            self.tool_router
                .call(ToolCallContext::new(self, request, context))
                .await
        }
        .instrument(span)
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, rmcp::ErrorData>> + Send + '_ {
        std::future::ready(Ok(ListToolsResult::with_all_items(
            self.tool_router.list_all(),
        )))
    }

    fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<GetPromptResult, rmcp::ErrorData>> + Send + '_ {
        let _span = info_span!("get_prompt", prompt = %request.name).entered();
        std::future::ready(prompts::render(&request.name, request.arguments.as_ref()))
    }

    fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListPromptsResult, rmcp::ErrorData>> + Send + '_ {
        std::future::ready(Ok(ListPromptsResult::with_all_items(
            prompts::all_prompts(),
        )))
    }
}
