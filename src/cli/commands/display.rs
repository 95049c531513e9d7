//! Plain-text renderings of profiles and plans.

use std::fmt::Write;

use crate::build::BuildPlan;
use crate::environment::EnvironmentProfile;

/// Human readable environment report.
pub fn render_profile(profile: &EnvironmentProfile) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<12}{}", "subsystem", profile.subsystem_root().display());
    let _ = writeln!(out, "{:<12}{}", "shell", profile.shell().display());
    let _ = writeln!(out, "{:<12}{}", "compiler", profile.compiler().display());
    let _ = writeln!(out, "{:<12}{}", "cpus", profile.cpu_count());
    for status in profile.features() {
        match &status.location {
            Some(location) => {
                let _ = writeln!(
                    out,
                    "{:<12}{} ({})",
                    status.name,
                    location.root.display(),
                    location.source
                );
            }
            None => {
                let _ = writeln!(out, "{:<12}not found", status.name);
            }
        }
    }
    out
}

/// Every phase script of `plan`, one block per phase.
pub fn render_plan(plan: &BuildPlan) -> String {
    let mut out = String::new();
    for planned in plan.phases() {
        let _ = writeln!(out, "# {}", planned.phase);
        let _ = writeln!(out, "{}", planned.script);
    }
    out
}
