//! Application layer use cases for the agent.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (pure business rules in `hidrelay-core`) and the infrastructure
//! (OS hooks, sockets, files).
//!
//! Use cases in this layer:
//!
//! - **Orchestrate** domain objects to fulfil a goal (e.g., "forward this
//!   key press to the endpoint if forwarding is on").
//! - **Depend on abstractions** (traits) rather than concrete implementations,
//!   so the infrastructure can be swapped without changing this code.
//! - **Contain no OS calls, no network I/O, no file system access**.
//!
//! # Sub-modules
//!
//! - **`context`**       – The shared state (mode, modifiers, toggle, rate
//!   limiter) every other piece reads or updates.
//!
//! - **`mode_control`**  – Flips between Local and Forwarding and grabs or
//!   releases the devices.
//!
//! - **`forward_input`** – Runs on every keystroke and mouse movement and
//!   decides whether, and as what, it reaches the endpoint.

pub mod context;
pub mod forward_input;
pub mod mode_control;
