//! # CLI Module
//!
//! Runs a single synthetic request through the dispatcher from the command
//! line, against the built-in [`EchoResource`](crate::echo::EchoResource).
//!
//! ## Commands
//!
//! ### `request`
//!
//! ```bash
//! restdispatch request --resource /pets.json --headers '{"accept":"*/*"}' \
//!     --method post --post 'name=rex&tags[]=good'
//! ```
//!
//! Options:
//! - `--resource <PATH>` - Resource path, may carry a format extension (required, non-empty)
//! - `--headers <JSON>` - JSON object of request headers (required, non-empty).
//!   Names are lower-cased with `_` turned into `-`. Invalid JSON is ignored.
//! - `--method <VERB>` - Transport method, upper-cased (default: `GET`)
//! - `--get <QUERY>` - URL-encoded query parameters, replacing any in `--resource`
//! - `--post <FORM>` - URL-encoded posted form values (also sent as the body)
//! - `--views <DIR>` - Directory of HTML views
//! - `--config <FILE>` - YAML configuration; environment variables otherwise
//!
//! The response body is printed verbatim to stdout. Logs go to stderr.

mod commands;


pub use commands::{build_request, run_cli, run_command, Cli, Commands, RequestArgs};
