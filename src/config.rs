/*!
 * Harness Configuration
 * Read once at startup from HARNESS_* environment variables
 */

use crate::core::errors::{HarnessError, HarnessResult};
use crate::core::limits::{BUILTIN_MODULE_PATH, DEFAULT_DEPTHS, MAX_DEPTH, TEST_EXCEPTION_CODE};
use crate::orchestrator::Driver;
use path_clean::PathClean;
use std::path::PathBuf;

pub const MODULE_VAR: &str = "HARNESS_MODULE";
pub const DEPTHS_VAR: &str = "HARNESS_DEPTHS";
pub const ERROR_CODE_VAR: &str = "HARNESS_ERROR_CODE";
pub const COLLECT_VAR: &str = "HARNESS_COLLECT";
pub const REPORT_VAR: &str = "HARNESS_REPORT";
pub const TRACE_JSON_VAR: &str = "HARNESS_TRACE_JSON";
pub const DRIVERS_VAR: &str = "HARNESS_DRIVERS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    pub module_path: PathBuf,
    pub depths: Vec<usize>,
    pub drivers: Vec<Driver>,
    pub error_code: u32,
    pub collect_between_cases: bool,
    pub report_path: Option<PathBuf>,
    pub trace_json: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            module_path: PathBuf::from(BUILTIN_MODULE_PATH).clean(),
            depths: DEFAULT_DEPTHS.to_vec(),
            drivers: Driver::ALL.to_vec(),
            error_code: TEST_EXCEPTION_CODE,
            collect_between_cases: true,
            report_path: None,
            trace_json: false,
        }
    }
}

impl HarnessConfig {
    pub fn from_env() -> HarnessResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any variable source; unset or blank variables keep defaults
    pub fn from_lookup<F>(lookup: F) -> HarnessResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut config = Self::default();

        if let Some(module) = get(MODULE_VAR) {
            config.module_path = PathBuf::from(module).clean();
        }
        if let Some(depths) = get(DEPTHS_VAR) {
            config.depths = parse_depths(&depths)?;
        }
        if let Some(drivers) = get(DRIVERS_VAR) {
            config.drivers = parse_drivers(&drivers)?;
        }
        if let Some(code) = get(ERROR_CODE_VAR) {
            config.error_code = parse_code(&code)?;
        }
        if let Some(collect) = get(COLLECT_VAR) {
            config.collect_between_cases = parse_bool(COLLECT_VAR, &collect)?;
        }
        if let Some(report) = get(REPORT_VAR) {
            config.report_path = Some(PathBuf::from(report).clean());
        }
        if let Some(json) = get(TRACE_JSON_VAR) {
            config.trace_json = parse_bool(TRACE_JSON_VAR, &json)?;
        }

        Ok(config)
    }
}

fn parse_depths(raw: &str) -> HarnessResult<Vec<usize>> {
    let depths = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            let depth: usize = s
                .parse()
                .map_err(|_| HarnessError::Config(format!("{DEPTHS_VAR}: {s:?} is not a depth")))?;
            if depth > MAX_DEPTH {
                return Err(HarnessError::Config(format!(
                    "{DEPTHS_VAR}: depth {depth} exceeds {MAX_DEPTH}"
                )));
            }
            Ok(depth)
        })
        .collect::<HarnessResult<Vec<_>>>()?;

    if depths.is_empty() {
        return Err(HarnessError::Config(format!("{DEPTHS_VAR} lists no depths")));
    }
    Ok(depths)
}

fn parse_drivers(raw: &str) -> HarnessResult<Vec<Driver>> {
    let mut drivers = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let driver = match name.to_ascii_lowercase().as_str() {
            "typed" => Driver::Typed,
            "hosted" => Driver::Hosted,
            _ => {
                return Err(HarnessError::Config(format!(
                    "{DRIVERS_VAR}: {name:?} is not a driver"
                )))
            }
        };
        if !drivers.contains(&driver) {
            drivers.push(driver);
        }
    }

    if drivers.is_empty() {
        return Err(HarnessError::Config(format!("{DRIVERS_VAR} lists no drivers")));
    }
    Ok(drivers)
}

fn parse_code(raw: &str) -> HarnessResult<u32> {
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => raw.parse(),
    };
    parsed.map_err(|_| HarnessError::Config(format!("{ERROR_CODE_VAR}: {raw:?} is not a 32-bit code")))
}

fn parse_bool(var: &str, raw: &str) -> HarnessResult<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(HarnessError::Config(format!("{var}: {raw:?} is not a boolean"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahash::AHashMap;
    use pretty_assertions::assert_eq;

    fn config(vars: &[(&str, &str)]) -> HarnessResult<HarnessConfig> {
        let vars: AHashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        HarnessConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config, HarnessConfig::default());
        assert_eq!(config.depths, vec![0, 3, 5, 9, 11]);
        assert_eq!(config.drivers, vec![Driver::Typed, Driver::Hosted]);
        assert_eq!(config.error_code, 0xE000_1111);
        assert_eq!(config.module_path, PathBuf::from("unwind-frames.module"));
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            (MODULE_VAR, "./lib/../frames.module"),
            (DEPTHS_VAR, " 1, 2 ,4"),
            (ERROR_CODE_VAR, "0xE0002222"),
            (COLLECT_VAR, "off"),
            (REPORT_VAR, "out/./report.json"),
            (TRACE_JSON_VAR, "1"),
        ])
        .unwrap();
        assert_eq!(config.module_path, PathBuf::from("frames.module"));
        assert_eq!(config.depths, vec![1, 2, 4]);
        assert_eq!(config.error_code, 0xE000_2222);
        assert!(!config.collect_between_cases);
        assert_eq!(config.report_path, Some(PathBuf::from("out/report.json")));
        assert!(config.trace_json);
    }

    #[test]
    fn test_drivers() {
        let drivers = |raw| config(&[(DRIVERS_VAR, raw)]).map(|c| c.drivers);
        assert_eq!(drivers("hosted").unwrap(), vec![Driver::Hosted]);
        assert_eq!(
            drivers("Hosted, typed,hosted").unwrap(),
            vec![Driver::Hosted, Driver::Typed]
        );
        assert!(drivers("managed").is_err());
        assert!(drivers(" , ").is_err());
    }

    #[test]
    fn test_decimal_code() {
        assert_eq!(config(&[(ERROR_CODE_VAR, "42")]).unwrap().error_code, 42);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(config(&[(DEPTHS_VAR, "3,x")]).is_err());
        assert!(config(&[(DEPTHS_VAR, ",")]).is_err());
        assert!(config(&[(DEPTHS_VAR, &(MAX_DEPTH + 1).to_string())]).is_err());
        assert!(config(&[(ERROR_CODE_VAR, "0x1_0000_0000")]).is_err());
        assert!(config(&[(COLLECT_VAR, "maybe")]).is_err());
    }
}
