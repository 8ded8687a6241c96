//! `autosage doctor` — sequential named checks against the resolved
//! configuration and workspace, in the teacher's `cli/doctor.rs` style.

use autosage_core::config::Config;

pub async fn run(config: &Config, config_path: &str) -> bool {
    let mut all_passed = true;

    check_config_file(config_path, &mut all_passed);
    check_config_validation(config, &mut all_passed);
    check_workspace(config, &mut all_passed);
    check_registry(&mut all_passed);

    all_passed
}

fn check_config_file(config_path: &str, all_passed: &mut bool) {
    let exists = std::path::Path::new(config_path).exists();
    print_check(
        "config file",
        true,
        if exists {
            format!("loaded {config_path}")
        } else {
            format!("{config_path} not found — running on defaults")
        },
    );
    let _ = all_passed;
}

fn check_config_validation(config: &Config, all_passed: &mut bool) {
    let issues = config.validate();
    let errors = issues
        .iter()
        .filter(|i| i.severity == autosage_core::config::ConfigSeverity::Error)
        .count();
    if errors > 0 {
        *all_passed = false;
    }
    print_check(
        "config validation",
        errors == 0,
        format!("{} issue(s), {errors} error(s)", issues.len()),
    );
}

fn check_workspace(config: &Config, all_passed: &mut bool) {
    for (label, path) in [
        ("jobs workspace", &config.workspace.jobs_path),
        ("sessions workspace", &config.workspace.sessions_path),
    ] {
        let ok = std::fs::create_dir_all(path).is_ok();
        if !ok {
            *all_passed = false;
        }
        print_check(label, ok, path.display().to_string());
    }
}

fn check_registry(all_passed: &mut bool) {
    match autosage_tools::default_registry() {
        Ok(registry) => print_check("tool registry", true, format!("{} tool(s) registered", registry.len())),
        Err(e) => {
            *all_passed = false;
            print_check("tool registry", false, e.to_string());
        }
    }
}

fn print_check(name: &str, passed: bool, detail: String) {
    let label = if passed { "PASS" } else { "FAIL" };
    println!("  [{label}] {name}: {detail}");
}
