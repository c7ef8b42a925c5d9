// system-tests/tests/suites/lifecycle.rs
// ============================================================================
// Module: Resource Lifecycle Tests
// Description: Stream, role, default-role, and user lifecycles over HTTP.
// Purpose: Verify create/read/delete round trips and ledger accounting.
// Dependencies: logstream-harness, system-tests helpers
// ============================================================================

//! Resource lifecycle conformance against the service emulation.

use logstream_harness::StreamOptions;
use logstream_harness::lifecycle::assert_default_role;
use logstream_harness::lifecycle::assert_role;
use logstream_harness::lifecycle::assert_user_role;
use logstream_harness::lifecycle::assign_roles;
use logstream_harness::lifecycle::create_role;
use logstream_harness::lifecycle::create_stream;
use logstream_harness::lifecycle::create_stream_with_options;
use logstream_harness::lifecycle::create_stream_with_schema_body;
use logstream_harness::lifecycle::create_user;
use logstream_harness::lifecycle::create_user_with_roles;
use logstream_harness::lifecycle::delete_role;
use logstream_harness::lifecycle::delete_stream;
use logstream_harness::lifecycle::delete_user;
use logstream_harness::lifecycle::regenerate_password;
use logstream_harness::lifecycle::set_default_role;
use logstream_harness::metadata::get_stream_info;
use logstream_harness::model::STATIC_SCHEMA_HEADER;
use logstream_harness::model::static_schema_document;
use logstream_harness::names::unique_name;
use logstream_harness::query::assert_stream_schema;
use logstream_harness::rbac::ProbeRole;
use logstream_harness::rbac::role_document;

use crate::helpers::artifacts::TestReporter;
use crate::helpers::harness::ContractHarness;

#[tokio::test(flavor = "multi_thread")]
async fn stream_lifecycle_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("stream_lifecycle_round_trip")?;
    let harness = ContractHarness::standalone("lifecycle")?;
    let ctx = harness.ctx();
    let stream = ctx.stream();

    create_stream(ctx, harness.admin(), stream).await?;
    if !harness.service().stream_names().contains(&stream.to_string()) {
        return Err(format!("stream {stream} missing after creation").into());
    }

    let duplicate = create_stream(ctx, harness.admin(), stream).await;
    match duplicate {
        Err(err) if err.kind() == "unexpected_status" => {}
        other => return Err(format!("duplicate creation should be rejected: {other:?}").into()),
    }
    if harness.sink().violations().len() != 1 {
        return Err("duplicate creation should record one violation".into());
    }

    delete_stream(ctx, harness.admin(), stream).await?;

    harness.finish(
        &mut reporter,
        vec!["stream created, duplicate rejected, stream deleted".to_string()],
    )?;
    drop(reporter);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn stream_options_are_reported_by_info() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("stream_options_are_reported_by_info")?;
    let harness = ContractHarness::standalone("options")?;
    let ctx = harness.ctx();

    let options = StreamOptions::default()
        .time_partition("source_time")
        .time_partition_limit("60d")
        .custom_partition("level");
    create_stream_with_options(ctx, harness.admin(), ctx.stream(), &options).await?;

    let info = get_stream_info(ctx).await?;
    reporter.artifacts().write_json("stream_info.json", &info)?;
    if info.time_partition_field.as_deref() != Some("source_time")
        || info.time_partition_limit.as_deref() != Some("60d")
        || info.custom_partition_fields.as_deref() != Some("level")
        || info.static_schema_flag.as_deref() != Some("false")
    {
        return Err(format!("declared options not reported: {info:?}").into());
    }

    delete_stream(ctx, harness.admin(), ctx.stream()).await?;

    harness.finish(&mut reporter, vec!["partition options round-trip through info".to_string()])?;
    drop(reporter);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn static_schema_body_reads_back() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("static_schema_body_reads_back")?;
    let harness = ContractHarness::standalone("schema")?;
    let ctx = harness.ctx();

    create_stream_with_schema_body(ctx, harness.admin(), ctx.stream(), &[(
        STATIC_SCHEMA_HEADER,
        "true",
    )])
    .await?;
    assert_stream_schema(harness.admin(), ctx.stream(), &static_schema_document().to_string())
        .await?;

    let info = get_stream_info(ctx).await?;
    if info.static_schema_flag.as_deref() != Some("true") {
        return Err(format!("static flag not reported: {info:?}").into());
    }

    delete_stream(ctx, harness.admin(), ctx.stream()).await?;

    harness.finish(&mut reporter, vec!["schema document read back structurally".to_string()])?;
    drop(reporter);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn role_and_default_role_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("role_and_default_role_round_trip")?;
    let harness = ContractHarness::standalone("roles")?;
    let ctx = harness.ctx();
    let role_name = unique_name("role");
    let role = role_document(ProbeRole::Reader, ctx.stream()).to_string();

    create_role(ctx, harness.admin(), &role_name, &role).await?;
    assert_role(harness.admin(), &role_name, &role).await?;
    set_default_role(harness.admin(), &role_name).await?;
    assert_default_role(harness.admin(), &role_name).await?;
    delete_role(ctx, harness.admin(), &role_name).await?;

    harness.finish(&mut reporter, vec!["role and default role read back verbatim".to_string()])?;
    drop(reporter);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn user_lifecycle_with_roles() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("user_lifecycle_with_roles")?;
    let harness = ContractHarness::standalone("users")?;
    let ctx = harness.ctx();
    let admin = harness.admin();
    let role_name = unique_name("writer");
    let role = role_document(ProbeRole::Writer, ctx.stream()).to_string();
    let bare_user = unique_name("bare");
    let bound_user = unique_name("bound");

    create_role(ctx, admin, &role_name, &role).await?;

    let first_password = create_user(ctx, admin, &bare_user).await?;
    assign_roles(admin, &bare_user, &[role_name.as_str()]).await?;
    assert_user_role(admin, &bare_user, &role_name, &role).await?;
    let second_password = regenerate_password(admin, &bare_user).await?;
    if first_password.trim().is_empty() || first_password == second_password {
        return Err("password regeneration must issue a new credential".into());
    }

    create_user_with_roles(ctx, admin, &bound_user, &[role_name.as_str()]).await?;
    assert_user_role(admin, &bound_user, &role_name, &role).await?;

    delete_user(ctx, admin, &bare_user).await?;
    delete_user(ctx, admin, &bound_user).await?;
    delete_role(ctx, admin, &role_name).await?;

    harness.finish(&mut reporter, vec!["users created, bound, rotated, deleted".to_string()])?;
    drop(reporter);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn undeleted_resources_are_reported() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("undeleted_resources_are_reported")?;
    let harness = ContractHarness::standalone("leak")?;
    let ctx = harness.ctx();

    create_stream(ctx, harness.admin(), ctx.stream()).await?;
    match ctx.ledger().ensure_no_leaks() {
        Err(err) if err.kind() == "leaked_resources" && err.to_string().contains(ctx.stream()) => {}
        other => return Err(format!("outstanding stream should be reported: {other:?}").into()),
    }
    delete_stream(ctx, harness.admin(), ctx.stream()).await?;

    harness.finish(&mut reporter, vec!["ledger reports outstanding streams".to_string()])?;
    drop(reporter);
    Ok(())
}
