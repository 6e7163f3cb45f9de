use super::CommandContext;
use anyhow::{Result, anyhow, bail};
use netweave_core::g2g::parse_channel_range;
use netweave_core::model::Netclass;
use netweave_core::store::{InterfaceStore, NetclassStore};
use std::collections::HashSet;

/// Validate a channel specification and print the channels it expands to
pub fn print_channels(spec: &str) -> Result<()> {
    let channels = parse_channel_range(spec)?;
    println!("Specification '{}' expands to {} channels:", spec, channels.len());
    println!("  {}", channels.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(", "));
    Ok(())
}

/// Expand an interface layout and resynchronize the slot matrix
pub async fn expand_layout(ctx: &CommandContext, interface_id: &str, spec: &str) -> Result<()> {
    let interfaces = ctx.store.interfaces_by_project(&ctx.project_id).await?;
    let interface = interfaces.into_iter().find(|i| i.id == interface_id).ok_or_else(|| anyhow!("unknown interface {}", interface_id))?;

    let population = ctx.store.netclasses_by_interface(&ctx.project_id, interface_id).await?;
    let base = base_templates(&interface.name, population);
    if base.is_empty() {
        bail!("interface {} has no netclasses to expand", interface.name);
    }

    let report = ctx.engine.sync_interface_layout(&ctx.project_id, interface_id, spec, base, true).await?;
    ctx.save().await?;

    println!("Layout Expansion");
    println!("================");
    println!("  Interface: {}", interface.name);
    println!("  Netclasses: {}", report.netclasses);
    println!("  Groups: {} created, {} kept, {} deleted", report.groups_created, report.groups_kept, report.groups_deleted);
    println!("  Grid rows: {} created, {} updated, {} deleted", report.grid.rows_created, report.grid.rows_updated, report.grid.rows_deleted);
    Ok(())
}

/// Recover the unchanneled base templates from the current population.
///
/// Channeled clones carry derived names; stripping the interface/channel
/// prefix gives one template per distinct base name. Clones whose name
/// was edited away from the derived form are skipped.
fn base_templates(interface_name: &str, population: Vec<Netclass>) -> Vec<Netclass> {
    let mut seen = HashSet::new();
    let mut base = Vec::new();
    for mut nc in population {
        if !nc.is_channeled() {
            if seen.insert(nc.name.to_lowercase()) {
                base.push(nc);
            }
            continue;
        }
        let prefix = format!("{}{}_", interface_name, nc.channel);
        if let Some(stripped) = nc.name.strip_prefix(&prefix) {
            nc.name = stripped.to_string();
            nc.channel.clear();
            if seen.insert(nc.name.to_lowercase()) {
                base.push(nc);
            }
        }
    }
    base
}
