//! Scenario tests driving the tool surface through a scripted az executor


mod auth_cache;
mod bulk_trigger;
mod tool_surface;
