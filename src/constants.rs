#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Directory under the root holding all course sources
pub const SRC_DIR_NAME: &str = "src";

/// Directory under [`SRC_DIR_NAME`] holding one subdirectory per exercise
pub const EXERCISES_DIR_NAME: &str = "exercises";

/// Directory under [`SRC_DIR_NAME`] holding the starter repository templates
pub const STARTER_REPO_DIR_NAME: &str = "starter_repo";

/// Git template directory (hooks, config) inside the starter repo directory
pub const REPO_TEMPLATE_DIR_NAME: &str = "template";

/// Working tree contents copied into every starter repository
pub const REPO_CONTENTS_DIR_NAME: &str = "contents";

/// Optional per-exercise directory whose contents are copied verbatim
pub const RESOURCES_DIR_NAME: &str = "resources";

/// Name of the configuration module inside each exercise directory
pub const CONFIG_FILE_NAME: &str = "config.js";

/// Output directory under the root, one subdirectory per exercise
pub const GEN_DIR_NAME: &str = "exercises";

/// Path of the starter repository inside an exercise's output directory
pub const REPO_DIR_NAME: &str = "starting.git";

/// Generated machine registry
pub const MACHINES_FILE_NAME: &str = "machines.js";

/// Generated viewer registry
pub const VIEWERS_FILE_NAME: &str = "viewers.js";

/// Generated repo registry
pub const REPOS_FILE_NAME: &str = "repos.js";

/// Webhook URL written into each starter repository's config
pub const DEFAULT_WEBHOOK_URL: &str = "http://localhost/hooks";

/// Git config key holding the webhook URL
pub const WEBHOOK_CONFIG_KEY: &str = "angler.url";

/// Git config key allowing pushes to the checked-out branch
pub const DENY_CURRENT_BRANCH_KEY: &str = "receive.denyCurrentBranch";

/// Name npm gives to `.gitignore` files when packing
pub const NPM_IGNORE: &str = ".npmignore";

/// The name those files are restored to
pub const GIT_IGNORE: &str = ".gitignore";

/// Reserved viewer registry entry holding the ordered exercise names
pub const ORDER_KEY: &str = "_order";

/// Default time a single `git` invocation may take, in seconds
pub const GIT_TIMEOUT_SECS: u64 = 60;

/// Environment variable overriding [`DEFAULT_WEBHOOK_URL`]
pub const WEBHOOK_URL_ENV: &str = "CREATEX_WEBHOOK_URL";

/// Environment variable with comma-separated extra globals
pub const GLOBALS_ENV: &str = "CREATEX_GLOBALS";

/// Header written at the top of every generated registry
pub const GENERATED_HEADER: &str = "// Generated by createx from src/exercises. Do not edit.";

/// Identifiers that resolve without a declaration when a registry is loaded
/// by node.
pub const KNOWN_GLOBALS: &[&str] = &[
    "Array",
    "ArrayBuffer",
    "Boolean",
    "Buffer",
    "Date",
    "Error",
    "Function",
    "Infinity",
    "JSON",
    "Map",
    "Math",
    "NaN",
    "Number",
    "Object",
    "Promise",
    "Proxy",
    "RangeError",
    "Reflect",
    "RegExp",
    "Set",
    "String",
    "Symbol",
    "TypeError",
    "URL",
    "WeakMap",
    "WeakSet",
    "__dirname",
    "__filename",
    "clearInterval",
    "clearTimeout",
    "console",
    "decodeURIComponent",
    "encodeURIComponent",
    "exports",
    "globalThis",
    "isFinite",
    "isNaN",
    "module",
    "parseFloat",
    "parseInt",
    "process",
    "require",
    "setImmediate",
    "setInterval",
    "setTimeout",
    "undefined",
];
