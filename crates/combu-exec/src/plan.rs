use std::fs;
use std::path::Path;

use combu_core::errors::{CombuError, ErrorInfo};
use combu_core::{from_json_slice, from_yaml_slice, stable_hash_string, to_yaml_string};
use combu_core::{ParamSpec, Record};
use serde::{Deserialize, Serialize};

use crate::execution::{execute, Outcomes};
use crate::options::ExecOptions;

fn io_error(code: &str, err: impl ToString) -> CombuError {
    CombuError::Serde(ErrorInfo::new(code, err.to_string()))
}

/// Declarative parameter plan: a specification plus dispatch options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Plan {
    /// Parameter specification to traverse.
    pub parameters: ParamSpec,
    /// Dispatch options; defaults apply when omitted.
    #[serde(default)]
    pub options: ExecOptions,
}

impl Plan {
    /// Returns the deterministic hash associated with the plan contents.
    pub fn plan_hash(&self) -> Result<String, CombuError> {
        stable_hash_string(self)
    }

    /// Produces a YAML representation of the plan.
    pub fn to_yaml_string(&self) -> Result<String, CombuError> {
        to_yaml_string(self)
    }

    /// Runs `target` over the plan's parameters with the plan's options.
    pub fn execute<F, R>(&self, target: F) -> Result<Outcomes<'static, R>, CombuError>
    where
        F: Fn(&Record) -> Result<R, CombuError> + Send + Sync + 'static,
        R: Send + 'static,
    {
        execute(target, &self.parameters, &self.options)
    }
}

/// Loads a plan from disk; `.json` files are read as JSON, anything else as YAML.
pub fn load_plan<P: AsRef<Path>>(path: P) -> Result<Plan, CombuError> {
    let plan_path = path.as_ref();
    let bytes = fs::read(plan_path).map_err(|err| {
        CombuError::Serde(
            ErrorInfo::new("plan_read", err.to_string())
                .with_context("path", plan_path.display().to_string()),
        )
    })?;
    let is_json = plan_path
        .extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("json"));
    if is_json {
        from_json_slice(&bytes)
    } else {
        from_yaml_slice(&bytes)
    }
}

/// Writes `plan` as YAML to `path`.
pub fn save_plan<P: AsRef<Path>>(plan: &Plan, path: P) -> Result<(), CombuError> {
    fs::write(path, plan.to_yaml_string()?).map_err(|err| io_error("plan_write", err))
}
