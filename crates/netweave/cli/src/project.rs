use anyhow::{Context, Result, bail};
use netweave_core::ProjectState;
use netweave_core::model::{GroupContext, InterfaceRef, LayerGroupDefaults, Netclass, PendingProcess, RelationIntent, RuleArea};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// On-disk project file: the full project state plus the last
/// pending-process snapshot
#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectFile {
    pub project_id: String,
    pub state: ProjectState,
    #[serde(default)]
    pub pending: Option<PendingProcess>,
}

impl ProjectFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).with_context(|| format!("reading project file {}", path.display()))?;
        let file = serde_json::from_str(&text).with_context(|| format!("parsing project file {}", path.display()))?;
        Ok(file)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text).with_context(|| format!("writing project file {}", path.display()))?;
        Ok(())
    }
}

/// Write a starter project: one PCIE interface with two netclasses and a
/// root group declaring a toAll rule, ready for `compile`
pub fn write_starter(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists, pass --force to overwrite", path.display());
    }

    let interface = InterfaceRef::new("PCIE");
    let mut group = GroupContext::skeleton("demo", interface.id.clone(), "", "");
    group.to_all = RelationIntent::enabled();

    let state = ProjectState {
        interfaces: vec![interface.clone()],
        netclasses: vec![Netclass::new("demo", interface.id.clone(), "DATA"), Netclass::new("demo", interface.id.clone(), "CLK")],
        brands: Vec::new(),
        rule_areas: vec![RuleArea::new("demo", "Default area")],
        defaults: LayerGroupDefaults {
            clearance_default_set_id: "lgs_default".to_string(),
            golden_set_id: "lgs_golden".to_string(),
        },
        rows: Vec::new(),
        groups: vec![group],
    };

    let file = ProjectFile {
        project_id: "demo".to_string(),
        state,
        pending: None,
    };
    file.save(path)?;
    println!("Wrote starter project to {}", path.display());
    println!("Next: netweave --project {} compile", path.display());
    Ok(())
}
