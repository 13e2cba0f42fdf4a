//! Closed tool registry: every callable tool is a [`ToolId`] variant with a typed handler.
//!
//! Adding a tool means adding a variant, its argument coercion and a match arm in
//! [`FunctionRegistry::dispatch`]; the compiler points at every place to update.

use std::fmt::{self, Display};
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::TurnError;
use crate::holidays::{Holiday, HolidayProvider};
use crate::ollama::{ToolArguments, ToolCallRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolId {
    GetHolidays,
}

impl ToolId {
    pub const ALL: [ToolId; 1] = [ToolId::GetHolidays];

    pub fn name(self) -> &'static str {
        match self {
            ToolId::GetHolidays => "get_holidays",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.name() == name)
    }
}

impl Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Typed arguments of `get_holidays`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolidayArgs {
    pub state: String,
    pub year: i32,
    pub month: i64,
}

impl HolidayArgs {
    /// `Ok(None)` when any argument is absent, empty or zero: the call is skipped.
    /// `Err` when a non-empty `year`/`month` is not an integer (surrounding whitespace is allowed).
    /// A whitespace-only `state` is non-empty and is passed through unchanged.
    pub fn coerce(args: &ToolArguments) -> Result<Option<Self>, TurnError> {
        let state = present(args, "state").map(str::to_string);
        let year = parse_int(args, "year")?;
        let month = parse_int(args, "month")?;

        match (state, year, month) {
            (Some(state), Some(year), Some(month)) if year != 0 && month != 0 => {
                let year = i32::try_from(year).map_err(|_| TurnError::ArgumentCoercion {
                    argument: "year",
                    value: year.to_string(),
                })?;
                Ok(Some(Self { state, year, month }))
            }
            _ => Ok(None),
        }
    }
}

fn present<'a>(args: &'a ToolArguments, key: &str) -> Option<&'a str> {
    args.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

fn parse_int(args: &ToolArguments, key: &'static str) -> Result<Option<i64>, TurnError> {
    present(args, key)
        .map(|raw| {
            raw.trim().parse::<i64>().map_err(|_| TurnError::ArgumentCoercion {
                argument: key,
                value: raw.to_string(),
            })
        })
        .transpose()
}

/// What a dispatched tool produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutput {
    Holidays(Vec<Holiday>),
}

impl ToolOutput {
    pub fn is_empty(&self) -> bool {
        match self {
            ToolOutput::Holidays(items) => items.is_empty(),
        }
    }

    /// Text embedded in the follow-up prompt, e.g. `[25/12/2024 - Natal]`.
    pub fn render(&self) -> String {
        match self {
            ToolOutput::Holidays(items) => {
                let parts: Vec<String> = items.iter().map(|h| h.to_string()).collect();
                format!("[{}]", parts.join(", "))
            }
        }
    }
}

/// Result of offering one tool call to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Name not in the registry
    Unregistered,
    /// Registered, but required arguments were absent
    Skipped(ToolId),
    /// Handler ran
    Completed(ToolId, ToolOutput),
}

/// Fixed name → handler table, built once per assistant.
#[derive(Clone)]
pub struct FunctionRegistry {
    holidays: Arc<dyn HolidayProvider>,
}

impl FunctionRegistry {
    pub fn new(holidays: Arc<dyn HolidayProvider>) -> Self {
        Self { holidays }
    }

    /// Coerce and, if complete, run the requested tool.
    ///
    /// `call.name` and `call.args` must already be checked for presence by the caller.
    pub fn dispatch(&self, call: &ToolCallRequest) -> Result<Dispatch, TurnError> {
        let (Some(name), Some(args)) = (call.name.as_deref(), call.args.as_ref()) else {
            return Ok(Dispatch::Unregistered);
        };
        let Some(id) = ToolId::from_name(name) else {
            debug!(target: "assistant", tool = name, "tool not registered, ignoring call");
            return Ok(Dispatch::Unregistered);
        };

        match id {
            ToolId::GetHolidays => {
                let Some(a) = HolidayArgs::coerce(args)? else {
                    info!(target: "assistant", tool = %id, args = ?args, "tool_call_skipped: missing arguments");
                    return Ok(Dispatch::Skipped(id));
                };
                let items = match u32::try_from(a.month) {
                    Ok(month) if (1..=12).contains(&month) => {
                        self.holidays.get_holidays(&a.state, a.year, month)?
                    }
                    _ => {
                        debug!(target: "assistant", month = a.month, "month out of range, no lookup");
                        Vec::new()
                    }
                };
                info!(target: "assistant", tool = %id, state = %a.state, year = a.year, month = a.month, found = items.len(), "tool_call_executed");
                Ok(Dispatch::Completed(id, ToolOutput::Holidays(items)))
            }
        }
    }
}
