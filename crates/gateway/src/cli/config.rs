//! `autosage config show|validate`.

use autosage_core::config::{Config, ConfigSeverity};

/// Print every validation issue, then a summary line. Returns `true` iff
/// no error-severity issue was found.
pub fn validate(config: &Config) -> bool {
    let issues = config.validate();
    for issue in &issues {
        println!("{issue}");
    }
    let errors = issues.iter().filter(|i| i.severity == ConfigSeverity::Error).count();
    let warnings = issues.len() - errors;
    println!("{errors} error(s), {warnings} warning(s)");
    errors == 0
}

/// Print the resolved configuration as pretty TOML.
pub fn show(config: &Config) {
    match toml::to_string_pretty(config) {
        Ok(rendered) => println!("{rendered}"),
        Err(e) => eprintln!("failed to render config: {e}"),
    }
}
