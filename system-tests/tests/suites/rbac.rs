// system-tests/tests/suites/rbac.rs
// ============================================================================
// Module: Role-Based Access Tests
// Description: Per-role probe sequences and stream-scoped privileges.
// Purpose: Verify every probe role can read, only ingestors write, none delete.
// Dependencies: logstream-harness, system-tests helpers
// ============================================================================

//! Role-based access conformance against the service emulation.

use logstream_harness::Credentials;
use logstream_harness::assertions::StatusExpectation;
use logstream_harness::assertions::call;
use logstream_harness::ingest::put_single_event;
use logstream_harness::ingest::put_single_event_expect_forbidden;
use logstream_harness::lifecycle::create_role;
use logstream_harness::lifecycle::create_stream;
use logstream_harness::lifecycle::create_user;
use logstream_harness::lifecycle::delete_role;
use logstream_harness::lifecycle::delete_stream;
use logstream_harness::lifecycle::delete_user;
use logstream_harness::lifecycle::set_default_role;
use logstream_harness::lifecycle::stream_path;
use logstream_harness::names::unique_name;
use logstream_harness::rbac::ProbeRole;
use logstream_harness::rbac::check_api_access;
use logstream_harness::rbac::probe_plan;
use logstream_harness::rbac::provision_role_user;
use logstream_harness::rbac::role_document;
use reqwest::Method;

use crate::helpers::artifacts::TestReporter;
use crate::helpers::harness::ContractHarness;

#[tokio::test(flavor = "multi_thread")]
async fn every_role_reads_and_none_deletes() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("every_role_reads_and_none_deletes")?;
    let harness = ContractHarness::standalone("rbac")?;
    let ctx = harness.ctx();
    let stream = ctx.stream();

    create_stream(ctx, harness.admin(), stream).await?;
    let mut notes = Vec::new();
    for role in ProbeRole::ALL {
        let role_name = unique_name(role.as_str());
        let user = unique_name("probe");
        let client =
            provision_role_user(ctx, harness.admin(), &role_name, &user, role, stream).await?;
        check_api_access(client.as_ref(), stream, role).await?;
        delete_user(ctx, harness.admin(), &user).await?;
        delete_role(ctx, harness.admin(), &role_name).await?;
        notes.push(format!("{role}: {:?}", probe_plan(role)));
    }
    if !harness.service().stream_names().contains(&stream.to_string()) {
        return Err("a forbidden delete removed the stream".into());
    }
    if harness.service().event_count(stream) != 1 {
        return Err("only the ingestor probe should write".into());
    }

    delete_stream(ctx, harness.admin(), stream).await?;

    harness.finish(&mut reporter, notes)?;
    drop(reporter);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn ingestor_writes_only_its_stream() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("ingestor_writes_only_its_stream")?;
    let harness = ContractHarness::standalone("scoped")?;
    let ctx = harness.ctx();
    let own = ctx.stream();
    let other = unique_name("foreign");
    let role_name = unique_name("ingestor");
    let user = unique_name("writer");

    create_stream(ctx, harness.admin(), own).await?;
    create_stream(ctx, harness.admin(), &other).await?;
    let client =
        provision_role_user(ctx, harness.admin(), &role_name, &user, ProbeRole::Ingestor, own)
            .await?;

    put_single_event(client.as_ref(), own).await?;
    put_single_event_expect_forbidden(client.as_ref(), &other).await?;

    delete_user(ctx, harness.admin(), &user).await?;
    delete_role(ctx, harness.admin(), &role_name).await?;
    delete_stream(ctx, harness.admin(), own).await?;
    delete_stream(ctx, harness.admin(), &other).await?;

    harness.finish(&mut reporter, vec!["ingest privilege is scoped to its stream".to_string()])?;
    drop(reporter);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn default_role_covers_unassigned_users() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("default_role_covers_unassigned_users")?;
    let harness = ContractHarness::standalone("fallback")?;
    let ctx = harness.ctx();
    let stream = ctx.stream();
    let role_name = unique_name("reader");
    let user = unique_name("unassigned");
    let info_path = format!("{}/info", stream_path(stream));

    create_stream(ctx, harness.admin(), stream).await?;
    let password = create_user(ctx, harness.admin(), &user).await?;
    let client = harness.admin().with_credentials(Credentials::new(&user, password.trim()))?;

    call(client.as_ref(), Method::GET, &info_path, None, StatusExpectation::FORBIDDEN).await?;
    create_role(ctx, harness.admin(), &role_name, &role_document(ProbeRole::Reader, stream).to_string())
        .await?;
    set_default_role(harness.admin(), &role_name).await?;
    call(client.as_ref(), Method::GET, &info_path, None, StatusExpectation::OK).await?;

    delete_user(ctx, harness.admin(), &user).await?;
    delete_role(ctx, harness.admin(), &role_name).await?;
    delete_stream(ctx, harness.admin(), stream).await?;

    harness.finish(&mut reporter, vec!["default role grants read to unassigned users".to_string()])?;
    drop(reporter);
    Ok(())
}
