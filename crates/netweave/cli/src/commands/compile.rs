use super::CommandContext;
use anyhow::Result;
use netweave_core::store::{BrandStore, GroupContextStore, NetclassStore, PendingProcessIndicator, SlotRowStore};

/// Recompile every declared group context and apply the result to the matrix
pub async fn run_compile(ctx: &CommandContext) -> Result<()> {
    let incoming = ctx.store.groups_by_project(&ctx.project_id).await?;
    let outcome = ctx.engine.compile_and_apply(&ctx.project_id, incoming).await;
    // Save even when the run failed so the indicator state lands in the file
    ctx.save().await?;
    let report = outcome?;

    println!("G2G Compile");
    println!("===========");
    println!("  Groups processed: {}", report.groups_processed);
    println!("  Pairings: {} claimed, {} duplicates skipped, {} unmatched", report.pairings_claimed, report.duplicate_pairs_skipped, report.pairings_unmatched);
    println!("  Slots: {} applied, {} reset", report.slots_applied, report.slots_reset);
    println!("  Rows changed: {}", report.rows_changed);
    println!("  Brands: {} created, {} reused, {} dropped", report.brands_created, report.brands_reused, report.brands_dropped);
    Ok(())
}

/// Print the netclasses a group context currently resolves to
pub async fn resolve_group(ctx: &CommandContext, group_id: &str) -> Result<()> {
    let members = ctx.engine.resolve_group_netclasses(&ctx.project_id, group_id).await?;
    println!("Group {} resolves to {} netclasses:", group_id, members.len());
    for nc in &members {
        let channel = if nc.channel.is_empty() { "-" } else { nc.channel.as_str() };
        let segment = if nc.segment.is_empty() { "-" } else { nc.segment.as_str() };
        println!("  {} (channel {}, segment {})", nc.name, channel, segment);
    }
    Ok(())
}

/// Show a project summary and the last pending-process state
pub async fn show_status(ctx: &CommandContext) -> Result<()> {
    let netclasses = ctx.store.netclasses_by_project(&ctx.project_id).await?;
    let groups = ctx.store.groups_by_project(&ctx.project_id).await?;
    let rows = ctx.store.rows_by_project(&ctx.project_id).await?;
    let brands = ctx.store.brands(&ctx.project_id).await?;

    println!("Project Status");
    println!("==============");
    println!("  Project: {}", ctx.project_id);
    println!("  Netclasses: {}", netclasses.len());
    println!("  Group contexts: {} ({} with rules)", groups.len(), groups.iter().filter(|g| g.has_enabled_intent()).count());
    println!("  Brands: {}", brands.len());
    let assigned: usize = rows.iter().map(|r| r.slots.iter().filter(|s| s.is_assigned()).count()).sum();
    println!("  Matrix: {} rows, {} assigned slots", rows.len(), assigned);

    match ctx.store.current(&ctx.project_id).await? {
        Some(pending) => {
            println!("  Last operation: {} ({:?})", pending.operation, pending.state);
            if !pending.message.is_empty() {
                println!("    {}", pending.message);
            }
        }
        None => println!("  Last operation: none recorded"),
    }
    Ok(())
}
