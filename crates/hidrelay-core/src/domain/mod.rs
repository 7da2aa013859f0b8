//! Domain entities for HidRelay.
//!
//! This module contains pure business logic with no infrastructure dependencies.
//!
//! # What is "domain" in Clean Architecture? (for beginners)
//!
//! Clean Architecture organises code into concentric layers.  The innermost
//! layer is called the **domain**.  Domain code has **no** imports from OS
//! APIs, network libraries or UI frameworks, so it can be compiled and tested
//! on any platform without external setup.
//!
//! Here the domain is the state that sits between capture and transport:
//! which modifiers are held, whether the toggle key is mid-press, which mode
//! is active, how much pointer motion is waiting to be sent, and how long to
//! wait before the next reconnect attempt.  Time is always passed in by the
//! caller, never read from the clock.

pub mod backoff;
pub mod event;
pub mod mode;
pub mod modifiers;
pub mod rate_limit;
pub mod toggle;
