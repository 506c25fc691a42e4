//! Agent dashboard back-end.
//!
//! ## Overview
//!
//! The dashboard lets a user pick a GitHub repository, browse its issues and
//! launch a background coding agent against one of them. Each launch gets its
//! own workspace directory and a detached shell pipeline (clone, branch,
//! agent run). Progress is never pushed: status is worked out when asked for,
//! by probing the recorded pid and scanning the transcript for markers.
//!
//! ## Module Map
//!
//! ```text
//! ┌──────────┐   HTTP   ┌──────────────────────────────────────────────────┐
//! │  Client  │ ───────> │  server.rs  (axum Router, ServerConfig)          │
//! │ (browser)│ <─────── │    └─ api.rs  (route handlers, AppState)         │
//! └──────────┘          │         │                                        │
//!                       │         │ AgentLauncher::launch()                │
//!                       │         v                                        │
//!                       │  launcher.rs  (validation, detached pipeline)    │
//!                       │         │                                        │
//!                       │         │ Provisioner::provision()               │
//!                       │         v                                        │
//!                       │  workspace.rs (per-agent directory + inputs)     │
//!                       │                                                  │
//!                       │  resolver.rs  (liveness check + marker scan)     │
//!                       │         │                                        │
//!                       │         v                                        │
//!                       │  registry.rs  (in-memory AgentRecord map)        │
//!                       └──────────────────────────────────────────────────┘
//! ```
//!
//! ## Supporting Modules
//!
//! | Module     | Responsibility                                             |
//! |------------|------------------------------------------------------------|
//! | `models`   | `AgentRecord`, `AgentStatus`, `LogKind`, gh payload types  |
//! | `markers`  | Ordered transcript rules: PR, roadblock, auth failure      |
//! | `process`  | Null-signal liveness check                                 |
//! | `logs`     | Reads output/error/structured logs out of a workspace      |
//! | `github`   | `IssueTracker` trait + `GhCli` implementation              |
//!
//! ## Typical Request Flow (launch → poll)
//!
//! 1. `POST /api/launch-agent` → `api::launch_agent()`
//! 2. `AgentLauncher` validates every field, provisions the workspace, opens
//!    `output.log`/`error.log` and spawns `bash -c <pipeline>` in its own
//!    process group. The record is inserted as `running` and returned.
//! 3. `GET /api/agent/{id}` → `StatusResolver::resolve()`. While the pid is
//!    alive nothing changes. Once it is gone the transcript is classified,
//!    debug artifacts are loaded, and the record becomes terminal for good.
//! 4. `GET /api/agent/{id}/logs?type=...` returns the raw log text for live
//!    tailing in the UI.

pub mod api;
pub mod github;
pub mod launcher;
pub mod logs;
pub mod markers;
pub mod models;
pub mod process;
pub mod registry;
pub mod resolver;
pub mod server;
pub mod workspace;
