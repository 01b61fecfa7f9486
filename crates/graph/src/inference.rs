//! Keyword tables used to guess container types, protocols and technology
//! stacks from free text and declared properties.
//!
//! Every table is an ordered list of `(keywords, classification)` pairs and is
//! evaluated first-match-wins. Keywords match case-insensitively on
//! non-alphanumeric boundaries, so `post` does not match `PostgreSQL` while
//! `c#` and `.net` still match inside prose.

use crate::types::{ContainerType, Direction, Protocol, TechnologySource};
use archview_model::{normalize_token, Properties};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

struct KeywordRule<T> {
    pattern: Regex,
    value: T,
}

/// Whole-word, case-insensitive alternation over `keywords`. A group that
/// fails to compile is logged and skipped rather than matched.
fn keyword_pattern(keywords: &[&str]) -> Option<Regex> {
    let alternatives = keywords
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    match Regex::new(&format!(
        r"(?i)(?:^|[^a-z0-9])(?:{alternatives})(?:[^a-z0-9]|$)"
    )) {
        Ok(pattern) => Some(pattern),
        Err(e) => {
            log::error!("Skipping keyword group {:?}: {}", keywords, e);
            None
        }
    }
}

fn compile<T: Copy>(table: &[(&[&str], T)]) -> Vec<KeywordRule<T>> {
    table
        .iter()
        .filter_map(|(keywords, value)| {
            Some(KeywordRule {
                pattern: keyword_pattern(keywords)?,
                value: *value,
            })
        })
        .collect()
}

fn first_match<T: Copy>(rules: &[KeywordRule<T>], text: &str) -> Option<T> {
    rules
        .iter()
        .find(|rule| rule.pattern.is_match(text))
        .map(|rule| rule.value)
}

const CONTAINER_TYPE_KEYWORDS: &[(&[&str], ContainerType)] = &[
    (
        &[
            "web app", "webapp", "web application", "frontend", "front-end", "front end",
            "spa", "website", "portal", "web ui", "ui", "react", "angular", "vue", "svelte",
            "next.js", "nextjs",
        ],
        ContainerType::WebApp,
    ),
    (
        &["mobile", "mobile app", "ios", "android", "react native", "flutter"],
        ContainerType::Mobile,
    ),
    (
        &["desktop", "electron", "wpf", "winforms", "tauri"],
        ContainerType::Desktop,
    ),
    (
        &[
            "api", "apis", "rest", "restful", "graphql", "grpc", "endpoint", "endpoints",
            "gateway", "openapi", "swagger", "http", "route", "routes", "path", "method",
        ],
        ContainerType::Api,
    ),
    (
        &[
            "database", "db", "postgres", "postgresql", "mysql", "mariadb", "mongodb", "mongo",
            "sql", "sqlite", "oracle", "dynamodb", "cassandra", "datastore", "data store",
        ],
        ContainerType::Database,
    ),
    (
        &[
            "queue", "message queue", "kafka", "rabbitmq", "amqp", "sqs", "pubsub", "pub/sub",
            "event bus", "broker", "topic", "nats", "mqtt",
        ],
        ContainerType::Queue,
    ),
    (
        &["cache", "caching", "redis", "memcached"],
        ContainerType::Cache,
    ),
    (
        &[
            "file storage", "storage", "s3", "blob", "bucket", "object storage", "filesystem",
            "file system",
        ],
        ContainerType::FileStorage,
    ),
    (
        &["function", "lambda", "serverless", "faas", "cloud function", "azure function"],
        ContainerType::Function,
    ),
];

const PROTOCOL_KEYWORDS: &[(&[&str], Protocol)] = &[
    (&["grpc", "protobuf", "protocol buffers"], Protocol::Grpc),
    (&["graphql", "gql"], Protocol::GraphQl),
    (&["websocket", "websockets", "ws", "wss", "socket.io"], Protocol::WebSocket),
    (&["amqp", "rabbitmq"], Protocol::Amqp),
    (&["kafka"], Protocol::Kafka),
    (&["mqtt"], Protocol::Mqtt),
    (&["jdbc", "odbc", "sql", "postgres", "postgresql", "mysql"], Protocol::Jdbc),
    (&["redis"], Protocol::Redis),
    (&["rest", "restful", "http", "https", "openapi"], Protocol::Rest),
];

/// Canonical technology name and the spellings that identify it in prose
const TECHNOLOGY_VOCABULARY: &[(&str, &[&str])] = &[
    ("PostgreSQL", &["postgresql", "postgres"]),
    ("MySQL", &["mysql"]),
    ("MongoDB", &["mongodb", "mongo"]),
    ("SQLite", &["sqlite"]),
    ("DynamoDB", &["dynamodb"]),
    ("Cassandra", &["cassandra"]),
    ("Redis", &["redis"]),
    ("Memcached", &["memcached"]),
    ("Elasticsearch", &["elasticsearch", "elastic search"]),
    ("Kafka", &["kafka"]),
    ("RabbitMQ", &["rabbitmq"]),
    ("GraphQL", &["graphql"]),
    ("gRPC", &["grpc"]),
    ("React", &["react", "react.js", "reactjs"]),
    ("Angular", &["angular"]),
    ("Vue", &["vue", "vue.js"]),
    ("Svelte", &["svelte"]),
    ("Next.js", &["next.js", "nextjs"]),
    ("Node.js", &["node.js", "nodejs"]),
    ("Express", &["express.js", "expressjs"]),
    ("Spring Boot", &["spring boot", "springboot"]),
    ("Django", &["django"]),
    ("Flask", &["flask"]),
    ("FastAPI", &["fastapi"]),
    ("Rails", &["rails", "ruby on rails"]),
    ("Laravel", &["laravel"]),
    ("Rust", &["rust"]),
    ("Go", &["golang"]),
    ("Java", &["java"]),
    ("Kotlin", &["kotlin"]),
    ("Scala", &["scala"]),
    ("Python", &["python"]),
    ("TypeScript", &["typescript"]),
    ("JavaScript", &["javascript"]),
    ("Ruby", &["ruby"]),
    ("Elixir", &["elixir"]),
    ("Swift", &["swift"]),
    ("C#", &["c#", "csharp"]),
    (".NET", &[".net", "dotnet"]),
    ("PHP", &["php"]),
    ("Docker", &["docker"]),
    ("Kubernetes", &["kubernetes", "k8s"]),
    ("AWS Lambda", &["aws lambda"]),
    ("S3", &["s3"]),
    ("Nginx", &["nginx"]),
];

const LANGUAGES: &[&str] = &[
    "Rust", "Go", "Java", "Kotlin", "Scala", "Python", "TypeScript", "JavaScript", "Ruby",
    "Elixir", "Swift", "C#", "PHP",
];

/// Property-key fragments that declare a technology
const TECHNOLOGY_KEY_FRAGMENTS: &[&str] = &[
    "technology",
    "stack",
    "framework",
    "language",
    "platform",
    "runtime",
    "implementation",
];

static CONTAINER_TYPE_RULES: Lazy<Vec<KeywordRule<ContainerType>>> =
    Lazy::new(|| compile(CONTAINER_TYPE_KEYWORDS));

static PROTOCOL_RULES: Lazy<Vec<KeywordRule<Protocol>>> =
    Lazy::new(|| compile(PROTOCOL_KEYWORDS));

static TECHNOLOGY_RULES: Lazy<Vec<KeywordRule<&'static str>>> = Lazy::new(|| {
    TECHNOLOGY_VOCABULARY
        .iter()
        .filter_map(|(canonical, aliases)| {
            Some(KeywordRule {
                pattern: keyword_pattern(aliases)?,
                value: *canonical,
            })
        })
        .collect()
});

/// First container type whose keyword group matches `text`
pub fn match_container_type(text: &str) -> Option<ContainerType> {
    first_match(&CONTAINER_TYPE_RULES, text)
}

/// First protocol whose keyword group matches `text`
pub fn match_protocol(text: &str) -> Option<Protocol> {
    first_match(&PROTOCOL_RULES, text)
}

/// Parse an explicit `containerType` property. Unknown values are `Custom`.
pub fn parse_container_type(raw: &str) -> ContainerType {
    match normalize_token(raw).as_str() {
        "webapp" | "web" | "webapplication" | "frontend" | "spa" => ContainerType::WebApp,
        "mobile" | "mobileapp" => ContainerType::Mobile,
        "desktop" | "desktopapp" => ContainerType::Desktop,
        "api" | "restapi" | "apigateway" => ContainerType::Api,
        "database" | "db" => ContainerType::Database,
        "queue" | "messagequeue" | "broker" => ContainerType::Queue,
        "cache" => ContainerType::Cache,
        "filestorage" | "storage" | "objectstorage" => ContainerType::FileStorage,
        "service" | "microservice" => ContainerType::Service,
        "function" | "lambda" | "serverless" => ContainerType::Function,
        _ => ContainerType::Custom,
    }
}

/// Parse an explicit `protocol` property; known keywords first, else `Custom`
pub fn parse_protocol(raw: &str) -> Protocol {
    match_protocol(raw).unwrap_or(Protocol::Custom)
}

/// Parse an explicit direction property; unknown values are synchronous
pub fn parse_direction(raw: &str) -> Direction {
    match normalize_token(raw).as_str() {
        "async" | "asynchronous" | "event" | "eventdriven" | "fireandforget" => Direction::Async,
        "bidirectional" | "duplex" | "twoway" | "both" => Direction::Bidirectional,
        _ => Direction::Sync,
    }
}

/// Whether a property key declares technology
pub fn is_technology_key(key: &str) -> bool {
    let key = normalize_token(key);
    TECHNOLOGY_KEY_FRAGMENTS.iter().any(|f| key.contains(f))
}

/// Technology names declared in a property bag, in declaration order
pub fn explicit_technologies(properties: &Properties) -> Vec<String> {
    let mut out = Vec::new();
    for (key, value) in properties {
        if !is_technology_key(key) {
            continue;
        }
        match value {
            Value::String(s) => out.extend(split_technology_list(s)),
            Value::Array(items) => {
                for item in items.iter().filter_map(Value::as_str) {
                    out.extend(split_technology_list(item));
                }
            }
            _ => {}
        }
    }
    out
}

fn split_technology_list(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split([',', ';', '/', '|', '+'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Canonical technology names mentioned in free text, in vocabulary order
pub fn scan_technologies(text: &str) -> Vec<String> {
    TECHNOLOGY_RULES
        .iter()
        .filter(|rule| rule.pattern.is_match(text))
        .map(|rule| rule.value.to_string())
        .collect()
}

/// Technology list of one element with its provenance
#[derive(Debug, Clone, PartialEq)]
pub struct TechnologyProfile {
    pub technologies: Vec<String>,
    pub source: TechnologySource,
}

/// Union of declared and (optionally) inferred technologies, deduplicated
/// case-insensitively with declared spellings taking precedence.
pub fn technology_profile(properties: &Properties, text: &str, infer: bool) -> TechnologyProfile {
    let explicit = explicit_technologies(properties);
    let mut technologies: Vec<String> = Vec::new();
    push_unique(&mut technologies, explicit.iter().cloned());
    let explicit_len = technologies.len();

    if infer {
        push_unique(&mut technologies, scan_technologies(text));
    }
    let inferred_len = technologies.len() - explicit_len;

    let source = match (explicit_len > 0, inferred_len > 0) {
        (true, true) => TechnologySource::Mixed,
        (true, false) => TechnologySource::Explicit,
        (false, true) => TechnologySource::Inferred,
        (false, false) => TechnologySource::None,
    };

    TechnologyProfile {
        technologies,
        source,
    }
}

fn push_unique(into: &mut Vec<String>, items: impl IntoIterator<Item = String>) {
    for item in items {
        if !into.iter().any(|t| t.eq_ignore_ascii_case(&item)) {
            into.push(item);
        }
    }
}

/// First technology that names a programming language
pub fn primary_language(technologies: &[String]) -> Option<String> {
    technologies.iter().find_map(|tech| {
        LANGUAGES
            .iter()
            .find(|lang| lang.eq_ignore_ascii_case(tech))
            .map(|lang| lang.to_string())
    })
}

/// How a model relationship is treated by the builder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    Containment,
    Deployment,
    Realization,
    Serving,
    Access,
    Flow,
    Triggering,
    Uses,
    Calls,
    Consumes,
    References,
}

/// Normalized relationship-type spellings (see [`normalize_token`])
const RELATION_VOCABULARY: &[(&[&str], RelationKind)] = &[
    (
        &[
            "composition", "aggregation", "contains", "composes", "composedof", "haspart",
            "partof", "containment", "nesting", "includes", "parentof", "childof",
        ],
        RelationKind::Containment,
    ),
    (
        &[
            "deployedon", "runson", "hostedon", "executeson", "deployedto", "hostedby",
            "deployment",
        ],
        RelationKind::Deployment,
    ),
    (&["realization", "realizes", "realises", "implements"], RelationKind::Realization),
    (&["serving", "serves", "servedby"], RelationKind::Serving),
    (
        &["access", "accesses", "reads", "writes", "readwrite", "queries", "stores"],
        RelationKind::Access,
    ),
    (
        &["flow", "flows", "dataflow", "sends", "publishes", "streams"],
        RelationKind::Flow,
    ),
    (&["triggering", "triggers", "emits", "notifies"], RelationKind::Triggering),
    (&["uses", "use", "dependson", "depends", "requires"], RelationKind::Uses),
    (&["calls", "invokes", "requests"], RelationKind::Calls),
    (&["consumes", "subscribes", "listens", "subscribesto"], RelationKind::Consumes),
    (&["references", "refers", "association", "associates"], RelationKind::References),
];

/// Classify a declared relationship type; `None` for unrecognized types
pub fn classify_relation(raw: &str) -> Option<RelationKind> {
    let token = normalize_token(raw);
    RELATION_VOCABULARY
        .iter()
        .find(|(aliases, _)| aliases.contains(&token.as_str()))
        .map(|(_, kind)| *kind)
}

/// Containment spellings whose source is the child and target the parent
const CHILD_TO_PARENT: &[&str] = &["partof", "childof"];

/// Whether a containment relationship points from child to parent
pub fn is_child_to_parent(raw: &str) -> bool {
    CHILD_TO_PARENT.contains(&normalize_token(raw).as_str())
}

impl RelationKind {
    /// Relationships that become edges
    pub fn is_communication(self) -> bool {
        !matches!(
            self,
            RelationKind::Containment | RelationKind::Deployment | RelationKind::Realization
        )
    }

    /// Types that imply an HTTP-style request when nothing else is known
    pub fn implies_rest(self) -> bool {
        matches!(self, RelationKind::Access | RelationKind::Flow)
    }

    /// Human-readable edge label toward `target`
    pub fn describe(self, target: &str) -> String {
        match self {
            RelationKind::Access => format!("Accesses {target}"),
            RelationKind::Flow => format!("Sends data to {target}"),
            RelationKind::Serving => format!("Serves {target}"),
            RelationKind::Uses => format!("Uses {target}"),
            RelationKind::Triggering => format!("Triggers {target}"),
            RelationKind::Calls => format!("Calls {target}"),
            RelationKind::Consumes => format!("Consumes from {target}"),
            RelationKind::Deployment => format!("Deployed on {target}"),
            _ => format!("Communicates with {target}"),
        }
    }
}
