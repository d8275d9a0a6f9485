// src/matrix/builder.rs

use tracing::debug;

use super::{MatrixConfig, TaskKind, TaskSpec};

pub const VARIANT_PLACEHOLDER: &str = "{variant}";
pub const SUFFIX_PLACEHOLDER: &str = "{suffix}";

/// Substitute a variant label and flavor suffix into the test template.
pub fn render_command(template: &str, variant: &str, suffix: &str) -> String {
    template
        .replace(VARIANT_PLACEHOLDER, variant)
        .replace(SUFFIX_PLACEHOLDER, suffix)
}

/// Build the ordered task list for one cycle.
///
/// Flavor-major, variant-minor: each flavor contributes its separator and
/// then one command per variant. Performs no IO.
pub fn build_matrix(cfg: &MatrixConfig) -> Vec<TaskSpec> {
    let mut specs = Vec::with_capacity(cfg.task_count());

    for flavor in &cfg.flavors {
        specs.push(TaskSpec {
            slot: specs.len(),
            label: flavor.label.clone(),
            flavor: flavor.label.clone(),
            kind: TaskKind::Separator,
        });

        for variant in &cfg.variants {
            let cmd = render_command(&cfg.template, variant, &flavor.suffix);
            specs.push(TaskSpec {
                slot: specs.len(),
                label: variant.clone(),
                flavor: flavor.label.clone(),
                kind: TaskKind::Command(cmd),
            });
        }
    }

    debug!(tasks = specs.len(), "built task matrix");
    specs
}
