// system-tests/tests/suites/hot_tier.rs
// ============================================================================
// Module: Hot-Tier Lifecycle Tests
// Description: Topology-dependent hot-tier activation, status, and disable.
// Purpose: Verify hot tiers work when distributed and are refused standalone.
// Dependencies: logstream-harness, system-tests helpers
// ============================================================================

//! Hot-tier conformance against the service emulation.

use logstream_harness::HotTierDescriptor;
use logstream_harness::hot_tier::activate_hot_tier;
use logstream_harness::hot_tier::disable_hot_tier;
use logstream_harness::hot_tier::get_hot_tier_status;
use logstream_harness::lifecycle::create_stream;
use logstream_harness::lifecycle::delete_stream;
use logstream_harness::metadata::get_stream_info;
use logstream_harness::model::DEFAULT_HOT_TIER_SIZE;
use reqwest::StatusCode;

use crate::helpers::artifacts::TestReporter;
use crate::helpers::harness::ContractHarness;

#[tokio::test(flavor = "multi_thread")]
async fn distributed_hot_tier_lifecycle() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("distributed_hot_tier_lifecycle")?;
    let harness = ContractHarness::distributed("hottier")?;
    let ctx = harness.ctx();

    create_stream(ctx, harness.admin(), ctx.stream()).await?;

    let (status, _) = activate_hot_tier(ctx, None, true).await?;
    if status != StatusCode::OK {
        return Err(format!("activation returned {status}").into());
    }
    let descriptor = get_hot_tier_status(ctx, false).await?;
    reporter.artifacts().write_json("hot_tier.json", &descriptor)?;
    if descriptor.size != DEFAULT_HOT_TIER_SIZE {
        return Err(format!("status size {} differs from activation", descriptor.size).into());
    }
    if get_stream_info(ctx).await?.cache_enabled != Some(true) {
        return Err("stream info should report the cache".into());
    }

    disable_hot_tier(ctx, false).await?;
    if get_hot_tier_status(ctx, true).await? != HotTierDescriptor::absent() {
        return Err("disabled tier should read as absent".into());
    }
    disable_hot_tier(ctx, true).await?;

    delete_stream(ctx, harness.admin(), ctx.stream()).await?;

    harness.finish(&mut reporter, vec!["activate, read, disable, re-disable".to_string()])?;
    drop(reporter);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn standalone_refuses_hot_tier() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("standalone_refuses_hot_tier")?;
    let harness = ContractHarness::standalone("nohottier")?;
    let ctx = harness.ctx();

    create_stream(ctx, harness.admin(), ctx.stream()).await?;

    let (status, body) = activate_hot_tier(ctx, Some("10 GiB"), true).await?;
    get_hot_tier_status(ctx, true).await?;
    disable_hot_tier(ctx, true).await?;

    delete_stream(ctx, harness.admin(), ctx.stream()).await?;

    harness.finish(&mut reporter, vec![format!("activation refused with {status}: {body}")])?;
    drop(reporter);
    Ok(())
}
